use std::io::Read;

use crate::foundation::error::{SceneError, SceneResult};

/// Tunables for path sampling and arc-length queries.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathSettings {
    /// Curve sampling stops once the summed chord length grows by less than this (px).
    pub precision: f64,
    /// Inward nudge applied to `p >= 1` path queries.
    pub endpoint_epsilon: f64,
    /// Flattening tolerance used when generating outlines for built-in shapes.
    pub curve_tolerance: f64,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            precision: 10.0,
            endpoint_epsilon: 0.0001,
            curve_tolerance: 0.1,
        }
    }
}

/// Default orders handed to tasks built by the factories.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerSettings {
    pub render_order: f64,
    pub task_order: f64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            render_order: 1.0,
            task_order: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Scratch buffers retained per pool.
    pub max_retained: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self { max_retained: 16 }
    }
}

/// Crate-wide settings, loadable from JSON. Every field is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub path: PathSettings,
    pub scheduler: SchedulerSettings,
    pub pool: PoolSettings,
}

impl Settings {
    pub fn from_json_str(s: &str) -> SceneResult<Self> {
        let settings: Self = serde_json::from_str(s)
            .map_err(|e| SceneError::serde(format!("invalid settings json: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_reader(r: impl Read) -> SceneResult<Self> {
        let settings: Self = serde_json::from_reader(r)
            .map_err(|e| SceneError::serde(format!("invalid settings json: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_pretty(&self) -> SceneResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SceneError::serde(e.to_string()))
    }

    pub fn validate(&self) -> SceneResult<()> {
        let p = &self.path;
        if !p.precision.is_finite() || p.precision <= 0.0 {
            return Err(SceneError::validation(
                "path.precision must be finite and > 0",
            ));
        }
        if !p.endpoint_epsilon.is_finite() || !(0.0..0.5).contains(&p.endpoint_epsilon) {
            return Err(SceneError::validation(
                "path.endpoint_epsilon must be in [0, 0.5)",
            ));
        }
        if !p.curve_tolerance.is_finite() || p.curve_tolerance <= 0.0 {
            return Err(SceneError::validation(
                "path.curve_tolerance must be finite and > 0",
            ));
        }
        Ok(())
    }

    pub(crate) fn pool_opts(&self) -> crate::foundation::pool::ScratchPoolOpts {
        crate::foundation::pool::ScratchPoolOpts {
            max_retained: self.pool.max_retained,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
