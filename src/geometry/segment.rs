use kurbo::{
    BezPath, CubicBez, Line, ParamCurve, ParamCurveDeriv, ParamCurveExtrema, PathEl, Point, QuadBez,
    Rect, Vec2,
};

/// One drawing command of a path, in absolute local coordinates.
///
/// `ClosePath` becomes a [`Unit::Line`] back to the subpath start when that edge has length,
/// otherwise a zero-length [`Unit::Close`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Unit {
    Move(Point),
    Line(Line),
    Quad(QuadBez),
    Cubic(CubicBez),
    Close(Point),
}

impl Unit {
    /// Whether the unit contributes length (and can own a path position).
    pub fn is_drawable(&self) -> bool {
        matches!(self, Self::Line(_) | Self::Quad(_) | Self::Cubic(_))
    }

    pub fn start(&self) -> Point {
        match self {
            Self::Move(p) | Self::Close(p) => *p,
            Self::Line(l) => l.p0,
            Self::Quad(q) => q.p0,
            Self::Cubic(c) => c.p0,
        }
    }

    pub fn eval(&self, t: f64) -> Point {
        match self {
            Self::Move(p) | Self::Close(p) => *p,
            Self::Line(l) => l.eval(t),
            Self::Quad(q) => q.eval(t),
            Self::Cubic(c) => c.eval(t),
        }
    }

    /// Derivative of the parametric form at `t`.
    pub fn tangent(&self, t: f64) -> Vec2 {
        match self {
            Self::Move(_) | Self::Close(_) => Vec2::ZERO,
            Self::Line(l) => l.deriv().eval(t).to_vec2(),
            Self::Quad(q) => q.deriv().eval(t).to_vec2(),
            Self::Cubic(c) => c.deriv().eval(t).to_vec2(),
        }
    }

    /// Tangent direction in degrees, `atan2(dy, dx)`; 0 for a degenerate tangent.
    pub fn angle_deg(&self, t: f64) -> f64 {
        let d = self.tangent(t);
        if d.hypot2() == 0.0 {
            return 0.0;
        }
        d.y.atan2(d.x).to_degrees()
    }

    pub fn bounding_box(&self) -> Rect {
        match self {
            Self::Move(p) | Self::Close(p) => Rect::from_points(*p, *p),
            Self::Line(l) => l.bounding_box(),
            Self::Quad(q) => q.bounding_box(),
            Self::Cubic(c) => c.bounding_box(),
        }
    }
}

/// Split a path into units, tracking the current point and subpath start.
pub fn units_from_path(path: &BezPath) -> Vec<Unit> {
    let mut units = Vec::with_capacity(path.elements().len());
    let mut current = Point::ZERO;
    let mut subpath_start = Point::ZERO;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                units.push(Unit::Move(p));
                current = p;
                subpath_start = p;
            }
            PathEl::LineTo(p) => {
                units.push(Unit::Line(Line::new(current, p)));
                current = p;
            }
            PathEl::QuadTo(c, p) => {
                units.push(Unit::Quad(QuadBez::new(current, c, p)));
                current = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                units.push(Unit::Cubic(CubicBez::new(current, c1, c2, p)));
                current = p;
            }
            PathEl::ClosePath => {
                if current != subpath_start {
                    units.push(Unit::Line(Line::new(current, subpath_start)));
                } else {
                    units.push(Unit::Close(subpath_start));
                }
                current = subpath_start;
            }
        }
    }
    units
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/segment.rs"]
mod tests;
