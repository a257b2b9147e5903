pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Bucket index for an `order` value: `floor(order)`, with non-finite values in bucket 0.
pub fn order_bucket(order: f64) -> i64 {
    if !order.is_finite() {
        return 0;
    }
    let floored = order.floor();
    if floored >= i64::MAX as f64 {
        i64::MAX
    } else if floored <= i64::MIN as f64 {
        i64::MIN
    } else {
        floored as i64
    }
}

/// Axis-aligned local bounding box `[x, y, width, height]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LocalBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LocalBox {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn from_rect(r: Rect) -> Self {
        Self {
            x: r.x0,
            y: r.y0,
            width: r.width(),
            height: r.height(),
        }
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
