use super::*;

#[test]
fn order_bucket_floors_and_coerces() {
    assert_eq!(order_bucket(0.0), 0);
    assert_eq!(order_bucket(1.9), 1);
    assert_eq!(order_bucket(2.0), 2);
    assert_eq!(order_bucket(-0.5), -1);
    assert_eq!(order_bucket(f64::NAN), 0);
    assert_eq!(order_bucket(f64::INFINITY), 0);
}

#[test]
fn local_box_from_rect_keeps_origin_and_extent() {
    let b = LocalBox::from_rect(Rect::new(-10.0, 5.0, 30.0, 25.0));
    assert_eq!(b.to_array(), [-10.0, 5.0, 40.0, 20.0]);
    assert_eq!(b.size(), Size::new(40.0, 20.0));
}
