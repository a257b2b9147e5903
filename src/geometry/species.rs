use kurbo::{BezPath, Ellipse, Point, Rect, RoundedRect, Shape, Vec2};

use crate::foundation::error::{SceneError, SceneResult};

/// Declarative recipe for a shape's outline, in unscaled local coordinates.
///
/// The recipe is turned into a path whenever the species changes; scale is applied
/// afterwards so a scale change never re-runs the recipe.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpecies {
    /// Raw SVG path data.
    Path { d: String },
    Line {
        end: Vec2,
    },
    Quadratic {
        control: Vec2,
        end: Vec2,
    },
    Bezier {
        start_control: Vec2,
        end_control: Vec2,
        end: Vec2,
    },
    Rectangle {
        width: f64,
        height: f64,
        #[serde(default)]
        radius: f64,
    },
    Oval {
        radius_x: f64,
        radius_y: f64,
    },
    Polygon {
        sides: u32,
        radius: f64,
    },
    Star {
        points: u32,
        outer_radius: f64,
        inner_radius: f64,
        /// Rotation of the inner vertices, in degrees.
        #[serde(default)]
        twist: f64,
    },
}

impl ShapeSpecies {
    pub fn path(d: impl Into<String>) -> Self {
        Self::Path { d: d.into() }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Path { .. } => "path",
            Self::Line { .. } => "line",
            Self::Quadratic { .. } => "quadratic",
            Self::Bezier { .. } => "bezier",
            Self::Rectangle { .. } => "rectangle",
            Self::Oval { .. } => "oval",
            Self::Polygon { .. } => "polygon",
            Self::Star { .. } => "star",
        }
    }

    /// Build the outline. `tolerance` bounds the error of curve approximations.
    pub fn build_path(&self, tolerance: f64) -> SceneResult<BezPath> {
        match self {
            Self::Path { d } => {
                let d = d.trim();
                if d.is_empty() {
                    return Ok(BezPath::new());
                }
                BezPath::from_svg(d)
                    .map_err(|e| SceneError::validation(format!("invalid path data: {e}")))
            }
            Self::Line { end } => {
                finite_vecs(&[*end])?;
                let mut p = BezPath::new();
                p.move_to(Point::ZERO);
                p.line_to(end.to_point());
                Ok(p)
            }
            Self::Quadratic { control, end } => {
                finite_vecs(&[*control, *end])?;
                let mut p = BezPath::new();
                p.move_to(Point::ZERO);
                p.quad_to(control.to_point(), end.to_point());
                Ok(p)
            }
            Self::Bezier {
                start_control,
                end_control,
                end,
            } => {
                finite_vecs(&[*start_control, *end_control, *end])?;
                let mut p = BezPath::new();
                p.move_to(Point::ZERO);
                p.curve_to(
                    start_control.to_point(),
                    end_control.to_point(),
                    end.to_point(),
                );
                Ok(p)
            }
            Self::Rectangle {
                width,
                height,
                radius,
            } => {
                non_negative(&[*width, *height, *radius], "rectangle")?;
                let rect = Rect::new(0.0, 0.0, *width, *height);
                if *radius > 0.0 {
                    Ok(RoundedRect::from_rect(rect, *radius).to_path(tolerance))
                } else {
                    Ok(rect.to_path(tolerance))
                }
            }
            Self::Oval { radius_x, radius_y } => {
                non_negative(&[*radius_x, *radius_y], "oval")?;
                let e = Ellipse::new((*radius_x, *radius_y), (*radius_x, *radius_y), 0.0);
                Ok(e.to_path(tolerance))
            }
            Self::Polygon { sides, radius } => {
                if *sides < 3 {
                    return Err(SceneError::validation("polygon needs at least 3 sides"));
                }
                non_negative(&[*radius], "polygon")?;
                let step = std::f64::consts::TAU / f64::from(*sides);
                Ok(closed_ring((0..*sides).map(|i| {
                    polar(*radius, f64::from(i) * step)
                })))
            }
            Self::Star {
                points,
                outer_radius,
                inner_radius,
                twist,
            } => {
                if *points < 2 {
                    return Err(SceneError::validation("star needs at least 2 points"));
                }
                non_negative(&[*outer_radius, *inner_radius], "star")?;
                if !twist.is_finite() {
                    return Err(SceneError::validation("star twist must be finite"));
                }
                let step = std::f64::consts::TAU / f64::from(*points);
                let twist = twist.to_radians();
                Ok(closed_ring((0..*points).flat_map(|i| {
                    let a = f64::from(i) * step;
                    [
                        polar(*outer_radius, a),
                        polar(*inner_radius, a + step / 2.0 + twist),
                    ]
                })))
            }
        }
    }
}

/// Point at `radius` from the origin, measured clockwise from straight up.
fn polar(radius: f64, angle: f64) -> Point {
    let a = angle - std::f64::consts::FRAC_PI_2;
    Point::new(radius * a.cos(), radius * a.sin())
}

fn closed_ring(points: impl Iterator<Item = Point>) -> BezPath {
    let mut p = BezPath::new();
    for (i, pt) in points.enumerate() {
        if i == 0 {
            p.move_to(pt);
        } else {
            p.line_to(pt);
        }
    }
    p.close_path();
    p
}

fn finite_vecs(vs: &[Vec2]) -> SceneResult<()> {
    if vs.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SceneError::validation("shape coordinates must be finite"))
    }
}

fn non_negative(vals: &[f64], what: &str) -> SceneResult<()> {
    if vals.iter().all(|v| v.is_finite() && *v >= 0.0) {
        Ok(())
    } else {
        Err(SceneError::validation(format!(
            "{what} dimensions must be finite and >= 0"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/species.rs"]
mod tests;
