use super::*;

fn ids() -> (EntityId, EntityId, EntityId) {
    (EntityId::from_raw(1), EntityId::from_raw(2), EntityId::from_raw(3))
}

#[test]
fn relinking_moves_the_back_reference() {
    let (a, b, c) = ids();
    let mut links = Links::default();
    assert_eq!(links.link(c, LinkKind::Pivot, a), None);
    assert_eq!(links.link(c, LinkKind::Pivot, a), Some(a));
    assert_eq!(links.subscribers(a, LinkKind::Pivot), &[c]);

    assert_eq!(links.link(c, LinkKind::Pivot, b), Some(a));
    assert!(links.subscribers(a, LinkKind::Pivot).is_empty());
    assert_eq!(links.subscribers(b, LinkKind::Pivot), &[c]);
    assert_eq!(links.reference(c, LinkKind::Pivot), Some(b));
    assert_eq!(links.reference(c, LinkKind::Path), None);
}

#[test]
fn reachability_follows_every_kind() {
    let (a, b, c) = ids();
    let mut links = Links::default();
    links.link(b, LinkKind::Path, a);
    links.link(c, LinkKind::Mimic, b);
    assert!(links.reaches(c, a));
    assert!(!links.reaches(a, c));
}

#[test]
fn removing_an_entity_reports_orphans_and_leaves_nothing_behind() {
    let (a, b, c) = ids();
    let mut links = Links::default();
    links.link(b, LinkKind::Pivot, a);
    links.link(c, LinkKind::Path, a);
    links.link(a, LinkKind::Mimic, c);

    let orphans = links.remove_entity(a);
    assert_eq!(orphans, vec![(b, LinkKind::Pivot), (c, LinkKind::Path)]);
    assert!(links.is_empty());
}
