use std::sync::Arc;

use super::*;
use crate::cycle::stamp::StampSurface;

#[test]
fn sorted_view_is_reused_until_membership_changes() {
    let mut store = SurfaceStore::new();
    store.register(StampSurface::new("b").with_order(1.0)).unwrap();
    store.register(StampSurface::new("a")).unwrap();

    let first = store.sorted_surfaces();
    let second = store.sorted_surfaces();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(&*first, ["a".to_string(), "b".to_string()]);

    assert!(store.deregister("a").is_some());
    let third = store.sorted_surfaces();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(&*third, ["b".to_string()]);
}

#[test]
fn duplicate_names_are_rejected() {
    let mut store = SurfaceStore::new();
    store.register(StampSurface::new("main")).unwrap();
    assert!(store.register(StampSurface::new("main")).is_err());
    assert_eq!(store.len(), 1);
    assert!(store.deregister("other").is_none());
}

#[test]
fn typed_access_downcasts_to_the_registered_surface() {
    let mut store = SurfaceStore::new();
    store.register(StampSurface::new("main").with_order(3.0)).unwrap();
    assert_eq!(store.order_of("main"), Some(3.0));
    assert_eq!(store.get("main").map(|s| s.name()), Some("main"));
    assert!(store.get_as::<StampSurface>("main").is_some());
    assert!(store.get_as_mut::<StampSurface>("main").is_some());
    assert!(store.get_as::<StampSurface>("missing").is_none());
}
