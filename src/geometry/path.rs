use kurbo::{BezPath, Point, Rect};

use crate::foundation::core::LocalBox;
use crate::foundation::pool::ScratchPool;
use crate::geometry::segment::{Unit, units_from_path};

const INITIAL_STEP_SAMPLES: usize = 4;
const MAX_STEP_SAMPLES: usize = 128;

/// A point on a path in the path's own coordinates, with the tangent angle in degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LocalPathPoint {
    pub point: Point,
    pub angle: f64,
}

/// Cached geometry derived from one path: per-unit lengths, the normalized cumulative
/// length table used for position lookup and (for paths used as paths) the flat
/// constant-speed table.
#[derive(Clone, Debug, Default)]
pub struct PathGeometry {
    units: Vec<Unit>,
    unit_lengths: Vec<f64>,
    unit_partials: Vec<f64>,
    progression: Vec<f64>,
    positions: Vec<f64>,
    length: f64,
    local_box: LocalBox,
    origin: Point,
    use_as_path: bool,
}

impl PathGeometry {
    /// Measure `path`.
    ///
    /// Straight units are measured exactly. Curves are sampled with 4, 8, 16, ... evenly spaced
    /// steps until the summed chord length grows by less than `precision` pixels, capped at
    /// 128 steps. The constant-speed table is only filled when `use_as_path` is set.
    pub fn build(
        path: &BezPath,
        use_as_path: bool,
        precision: f64,
        scratch: &mut ScratchPool<f64>,
    ) -> Self {
        let units = units_from_path(path);
        let precision = if precision.is_finite() && precision > 0.0 {
            precision
        } else {
            f64::EPSILON
        };

        // Per-unit cumulative chord lengths, laid end to end; `spans` records each unit's
        // (offset, count) in `samples`.
        let mut samples = scratch.acquire();
        let mut spans = Vec::with_capacity(units.len());
        let mut unit_lengths = Vec::with_capacity(units.len());

        for unit in &units {
            let offset = samples.len();
            let len = match unit {
                Unit::Move(_) | Unit::Close(_) => 0.0,
                Unit::Line(l) => {
                    let len = l.p0.distance(l.p1);
                    samples.push(len);
                    len
                }
                Unit::Quad(_) | Unit::Cubic(_) => sample_curve(unit, precision, &mut samples),
            };
            spans.push((offset, samples.len() - offset));
            unit_lengths.push(len);
        }

        let length: f64 = unit_lengths.iter().sum();

        let mut unit_partials = Vec::with_capacity(units.len());
        let mut acc = 0.0;
        for len in &unit_lengths {
            acc += len;
            unit_partials.push(if length > 0.0 { acc / length } else { 0.0 });
        }

        let mut progression = Vec::new();
        let mut positions = Vec::new();
        if use_as_path && length > 0.0 {
            let mut base_px = 0.0;
            let mut prev_partial = 0.0;
            for (i, &(offset, count)) in spans.iter().enumerate() {
                let partial = unit_partials[i];
                if unit_lengths[i] > 0.0 {
                    let span = partial - prev_partial;
                    for (k, local_px) in samples[offset..offset + count].iter().enumerate() {
                        let t = (k + 1) as f64 / count as f64;
                        progression.push(base_px + local_px);
                        positions.push(prev_partial + t * span);
                    }
                }
                base_px += unit_lengths[i];
                prev_partial = partial;
            }
        }
        scratch.release(samples);

        let local_box = units
            .iter()
            .map(Unit::bounding_box)
            .reduce(|a, b| a.union(b))
            .map(LocalBox::from_rect)
            .unwrap_or(LocalBox::ZERO);
        let origin = units.first().map(Unit::start).unwrap_or(Point::ZERO);

        Self {
            units,
            unit_lengths,
            unit_partials,
            progression,
            positions,
            length,
            local_box,
            origin,
            use_as_path,
        }
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn local_box(&self) -> LocalBox {
        self.local_box
    }

    pub fn bounds(&self) -> Rect {
        let b = self.local_box;
        Rect::new(b.x, b.y, b.x + b.width, b.y + b.height)
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit_lengths(&self) -> &[f64] {
        &self.unit_lengths
    }

    pub fn unit_partials(&self) -> &[f64] {
        &self.unit_partials
    }

    pub fn is_path(&self) -> bool {
        self.use_as_path
    }

    /// Point and tangent angle at normalized distance `p` along the path.
    ///
    /// `None` when the geometry was not built for path use or `p` is not finite. `p` wraps
    /// into `[0, 1)`; exactly `1.0` maps to `1 - epsilon`. A zero-length path yields its first
    /// point with angle 0.
    pub fn point_at(&self, p: f64, constant_speed: bool, epsilon: f64) -> Option<LocalPathPoint> {
        if !self.use_as_path || !p.is_finite() {
            return None;
        }
        let top = 1.0 - epsilon.clamp(0.0, 0.5);
        let mut r = if p == 1.0 { top } else { p.rem_euclid(1.0).min(top) };

        if self.length <= 0.0 {
            return Some(LocalPathPoint {
                point: self.origin,
                angle: 0.0,
            });
        }
        if constant_speed {
            r = self.constant_position(r, top);
        }

        let (unit, t) = self.locate(r)?;
        Some(LocalPathPoint {
            point: unit.eval(t),
            angle: unit.angle_deg(t),
        })
    }

    /// Map a distance fraction onto the native (per-unit linear) parametrization.
    fn constant_position(&self, r: f64, top: f64) -> f64 {
        if r <= 0.0 {
            return 0.0;
        }
        if r >= 1.0 {
            return top;
        }
        let Some(first_px) = self.progression.first().copied() else {
            return r;
        };
        let required = r * self.length;
        let Some(i) = self.progression.iter().position(|&px| required <= px) else {
            return top;
        };
        if i == 0 {
            return if first_px > 0.0 {
                required / first_px * self.positions[0]
            } else {
                self.positions[0]
            };
        }
        let (px0, px1) = (self.progression[i - 1], self.progression[i]);
        let (pos0, pos1) = (self.positions[i - 1], self.positions[i]);
        let diff = px1 - px0;
        if diff <= 0.0 {
            return pos1;
        }
        pos0 + (required - px0) / diff * (pos1 - pos0)
    }

    fn locate(&self, r: f64) -> Option<(&Unit, f64)> {
        let mut previous = 0.0;
        let mut last = None;
        for (i, unit) in self.units.iter().enumerate() {
            if !unit.is_drawable() || self.unit_lengths[i] <= 0.0 {
                continue;
            }
            let stop = self.unit_partials[i];
            if r <= stop {
                let span = stop - previous;
                let t = if span > 0.0 { (r - previous) / span } else { 0.0 };
                return Some((unit, t.clamp(0.0, 1.0)));
            }
            previous = stop;
            last = Some(unit);
        }
        last.map(|u| (u, 1.0))
    }
}

/// Chord-length sampling of a curve unit; leaves the final pass's cumulative lengths in
/// `out` and returns the total.
fn sample_curve(unit: &Unit, precision: f64, out: &mut Vec<f64>) -> f64 {
    let offset = out.len();
    let mut len = 0.0;
    let mut steps = INITIAL_STEP_SAMPLES;
    loop {
        out.truncate(offset);
        let mut new_len = 0.0;
        let mut prev = unit.eval(0.0);
        for k in 1..=steps {
            let pt = unit.eval(k as f64 / steps as f64);
            new_len += prev.distance(pt);
            out.push(new_len);
            prev = pt;
        }
        let converged = new_len < len + precision;
        len = new_len;
        if converged || steps >= MAX_STEP_SAMPLES {
            return len;
        }
        steps *= 2;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/path.rs"]
mod tests;
