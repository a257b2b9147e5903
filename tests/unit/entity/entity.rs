use super::*;

fn line(end: (f64, f64)) -> Entity {
    Entity::new(
        "line".to_string(),
        EntityKind::Shape {
            species: ShapeSpecies::Line {
                end: Vec2::new(end.0, end.1),
            },
        },
        &PathSettings::default(),
    )
}

fn prepared(mut e: Entity) -> Entity {
    e.prepare(&References::default(), &mut ScratchPool::default())
        .unwrap();
    e
}

fn near(a: Point, b: Point) -> bool {
    a.distance(b) < 1e-9
}

#[test]
fn fresh_entity_resolves_every_stage() {
    let e = prepared(line((100.0, 0.0)));
    assert!(!e.dirty().intersects(Dirty::STAGES));
    assert!(e.dirty().contains(Dirty::POSITION_SUBSCRIBERS));
    assert_eq!(e.path_length(), 100.0);
}

#[test]
fn setters_raise_only_their_own_flags() {
    let mut e = prepared(line((100.0, 0.0)));
    e.dirty = Dirty::empty();

    e.set_scale(2.0);
    assert_eq!(e.dirty(), Dirty::SCALE);
    e.set_roll(10.0);
    assert_eq!(e.dirty(), Dirty::SCALE | Dirty::ROTATION);
    e.set_order(3.0);
    assert_eq!(e.dirty(), Dirty::SCALE | Dirty::ROTATION);

    e.prepare(&References::default(), &mut ScratchPool::default())
        .unwrap();
    assert_eq!(e.path_length(), 200.0);
    assert_eq!(e.rotation(), 10.0);
}

#[test]
fn failed_pass_keeps_flags_for_retry() {
    let mut e = prepared(line((100.0, 0.0)));
    e.dirty = Dirty::empty();
    e.set_scale(f64::NAN);
    e.set_start((5.0, 5.0));

    let err = e
        .prepare(&References::default(), &mut ScratchPool::default())
        .unwrap_err();
    assert!(matches!(err, SceneError::Recompute(_)));
    assert!(e.dirty().contains(Dirty::SCALE | Dirty::START));

    e.set_scale(1.0);
    e.prepare(&References::default(), &mut ScratchPool::default())
        .unwrap();
    assert_eq!(e.stamp_position(), Point::new(5.0, 5.0));
}

#[test]
fn percent_handle_is_measured_from_the_local_box() {
    let mut e = Entity::new(
        "box".to_string(),
        EntityKind::Shape {
            species: ShapeSpecies::Rectangle {
                width: 40.0,
                height: 20.0,
                radius: 0.0,
            },
        },
        &PathSettings::default(),
    );
    e.set_handle(CoordPair::percent(50.0, 50.0));
    e.set_start((100.0, 100.0));
    let e = prepared(e);

    assert_eq!(e.stamp_handle_position(), Vec2::new(20.0, 10.0));
    assert_eq!(e.stamp_path().bounding_box(), Rect::new(-20.0, -10.0, 20.0, 10.0));
    assert_eq!(
        e.local_box(),
        LocalBox {
            x: 0.0,
            y: 0.0,
            width: 40.0,
            height: 20.0
        }
    );
}

#[test]
fn block_dimensions_follow_the_host() {
    let mut e = Entity::new(
        "block".to_string(),
        EntityKind::Block {
            width: Coord::Percent(50.0),
            height: Coord::Px(10.0),
        },
        &PathSettings::default(),
    );
    e.set_host_dimensions(Size::new(300.0, 200.0));
    let mut e = prepared(e);
    assert_eq!(e.local_box().width, 150.0);

    e.set_host_dimensions(Size::new(100.0, 200.0));
    assert!(e.dirty().contains(Dirty::SPECIES));
    let e = prepared(e);
    assert_eq!(e.local_box().width, 50.0);
}

#[test]
fn path_data_applies_roll_and_flip() {
    let mut e = line((100.0, 0.0));
    e.set_use_as_path(true);
    e.set_start((10.0, 10.0));
    e.set_roll(90.0);
    let e = prepared(e);

    let hit = e.path_position_data(0.5, false).unwrap();
    assert!(near(hit.point(), Point::new(10.0, 60.0)));
    assert!((hit.angle - 90.0).abs() < 1e-9);

    let mut e = line((100.0, 100.0));
    e.set_use_as_path(true);
    e.set_flip_upend(true);
    let e = prepared(e);
    let hit = e.path_position_data(0.5, false).unwrap();
    assert!(near(hit.point(), Point::new(50.0, -50.0)));
    assert!((hit.angle + 45.0).abs() < 1e-9);

    assert!(prepared(line((1.0, 0.0))).path_position_data(0.5, false).is_none());
}

#[test]
fn pivot_lock_adds_own_start_and_optional_rotation() {
    let mut e = line((10.0, 0.0));
    e.set_start((5.0, 5.0));
    e.set_lock_to(LockTo::Pivot);
    e.set_add_pivot_rotation(true);
    let refs = References {
        pivot: Some(PivotData {
            stamp_position: Point::new(100.0, 100.0),
            rotation: 30.0,
        }),
        ..References::default()
    };
    e.prepare(&refs, &mut ScratchPool::default()).unwrap();
    assert_eq!(e.stamp_position(), Point::new(105.0, 105.0));
    assert_eq!(e.rotation(), 30.0);

    // a missing reference degrades to own coordinates
    e.set_start((6.0, 6.0));
    e.prepare(&References::default(), &mut ScratchPool::default())
        .unwrap();
    assert_eq!(e.stamp_position(), Point::new(6.0, 6.0));
}

#[test]
fn bad_recipe_degrades_to_an_empty_path() {
    let e = Entity::new(
        "broken".to_string(),
        EntityKind::Shape {
            species: ShapeSpecies::path("M0,0 X1,1"),
        },
        &PathSettings::default(),
    );
    let e = prepared(e);
    assert_eq!(e.path_length(), 0.0);
    assert_eq!(e.local_box(), LocalBox::ZERO);
}
