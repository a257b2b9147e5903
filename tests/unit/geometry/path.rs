use super::*;

const EPS: f64 = 0.0001;

fn build(d: &str, precision: f64) -> PathGeometry {
    let path = BezPath::from_svg(d).unwrap();
    let mut pool = ScratchPool::default();
    let g = PathGeometry::build(&path, true, precision, &mut pool);
    assert_eq!(pool.stats().outstanding, 0);
    g
}

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn straight_line_midpoint_and_ends() {
    let g = build("M0,0 L100,0", 10.0);
    assert_eq!(g.length(), 100.0);
    assert_eq!(g.local_box(), LocalBox { x: 0.0, y: 0.0, width: 100.0, height: 0.0 });

    let mid = g.point_at(0.5, false, EPS).unwrap();
    assert!(close(mid.point.x, 50.0, 1e-9) && close(mid.point.y, 0.0, 1e-9));
    assert_eq!(mid.angle, 0.0);

    let start = g.point_at(0.0, false, EPS).unwrap();
    assert_eq!(start.point, Point::new(0.0, 0.0));
    let end = g.point_at(1.0, false, EPS).unwrap();
    assert!(close(end.point.x, 100.0, 0.05));

    let down = build("M0,0 L0,50", 10.0).point_at(0.25, true, EPS).unwrap();
    assert!(close(down.angle, 90.0, 1e-9));
    assert!(close(down.point.y, 12.5, 1e-9));
}

#[test]
fn positions_wrap_and_reject_non_finite() {
    let g = build("M0,0 L100,0", 10.0);
    let a = g.point_at(1.25, false, EPS).unwrap();
    let b = g.point_at(-0.75, false, EPS).unwrap();
    assert!(close(a.point.x, 25.0, 1e-9));
    assert!(close(b.point.x, 25.0, 1e-9));
    assert!(g.point_at(f64::NAN, false, EPS).is_none());
    assert!(g.point_at(f64::INFINITY, true, EPS).is_none());
}

#[test]
fn partials_split_by_length_across_units() {
    let g = build("M0,0 L30,0 L30,10 Z", 10.0);
    // move, 30, 10, close-line back (~31.62)
    assert_eq!(g.units().len(), 4);
    assert_eq!(g.unit_lengths()[0], 0.0);
    assert!(close(g.length(), 40.0 + 1000f64.sqrt(), 1e-9));
    let partials = g.unit_partials();
    assert!(close(partials[3], 1.0, 1e-12));
    assert!(partials.windows(2).all(|w| w[0] <= w[1]));

    // 35px along lands on the second edge
    let p = g.point_at(35.0 / g.length(), false, EPS).unwrap();
    assert!(close(p.point.x, 30.0, 1e-9) && close(p.point.y, 5.0, 1e-9));
    assert!(close(p.angle, 90.0, 1e-9));
}

#[test]
fn constant_speed_evens_out_curve_spacing() {
    let g = build("M0,0 C10,80 20,100 100,100", 0.5);
    let spread = |constant: bool| {
        let pts: Vec<Point> = (0..10)
            .map(|i| g.point_at(i as f64 / 10.0, constant, EPS).unwrap().point)
            .collect();
        let gaps: Vec<f64> = pts.windows(2).map(|w| w[0].distance(w[1])).collect();
        let max = gaps.iter().copied().fold(f64::MIN, f64::max);
        let min = gaps.iter().copied().fold(f64::MAX, f64::min);
        max - min
    };
    assert!(spread(true) < 1.0, "constant-speed spread {}", spread(true));
    assert!(spread(false) > 5.0);
}

#[test]
fn curve_length_converges_with_finer_precision() {
    let coarse = build("M0,0 C10,80 20,100 100,100", 10.0).length();
    let fine = build("M0,0 C10,80 20,100 100,100", 0.01).length();
    assert!(coarse <= fine);
    assert!(close(fine, 165.73, 0.01));
}

#[test]
fn zero_length_path_returns_origin_with_flat_angle() {
    let g = build("M20,30 L20,30", 10.0);
    assert_eq!(g.length(), 0.0);
    for p in [0.0, 0.3, 1.0] {
        for constant in [false, true] {
            let hit = g.point_at(p, constant, EPS).unwrap();
            assert_eq!(hit.point, Point::new(20.0, 30.0));
            assert_eq!(hit.angle, 0.0);
        }
    }

    let empty = PathGeometry::build(&BezPath::new(), true, 10.0, &mut ScratchPool::default());
    assert_eq!(empty.local_box(), LocalBox::ZERO);
    assert_eq!(empty.point_at(0.5, false, EPS).unwrap().point, Point::ZERO);
}

#[test]
fn geometry_not_used_as_path_answers_nothing() {
    let path = BezPath::from_svg("M0,0 L10,0").unwrap();
    let g = PathGeometry::build(&path, false, 10.0, &mut ScratchPool::default());
    assert!(!g.is_path());
    assert_eq!(g.length(), 10.0);
    assert!(g.point_at(0.5, false, EPS).is_none());
}
