use kurbo::{Size, Vec2};

/// A single coordinate, either absolute or relative to some extent.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coord {
    Px(f64),
    /// Percentage (0..=100) of the relevant extent.
    Percent(f64),
}

impl Default for Coord {
    fn default() -> Self {
        Coord::Px(0.0)
    }
}

impl From<f64> for Coord {
    fn from(v: f64) -> Self {
        Coord::Px(v)
    }
}

impl Coord {
    pub const CENTER: Self = Coord::Percent(50.0);

    /// Absolute value against `extent`.
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Coord::Px(v) => v,
            Coord::Percent(v) => v / 100.0 * extent,
        }
    }

    pub fn is_finite(self) -> bool {
        match self {
            Coord::Px(v) | Coord::Percent(v) => v.is_finite(),
        }
    }
}

/// An `x`/`y` pair of [`Coord`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CoordPair {
    pub x: Coord,
    pub y: Coord,
}

impl CoordPair {
    pub const ZERO: Self = Self {
        x: Coord::Px(0.0),
        y: Coord::Px(0.0),
    };

    pub fn px(x: f64, y: f64) -> Self {
        Self {
            x: Coord::Px(x),
            y: Coord::Px(y),
        }
    }

    pub fn percent(x: f64, y: f64) -> Self {
        Self {
            x: Coord::Percent(x),
            y: Coord::Percent(y),
        }
    }

    pub fn resolve(self, extent: Size) -> Vec2 {
        Vec2::new(self.x.resolve(extent.width), self.y.resolve(extent.height))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for CoordPair {
    fn from((x, y): (f64, f64)) -> Self {
        Self::px(x, y)
    }
}
