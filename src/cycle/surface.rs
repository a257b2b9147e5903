use std::any::Any;

use crate::entity::store::EntityStore;
use crate::foundation::error::SceneResult;

/// One step of the render cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Clear,
    Compile,
    Show,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Clear, Phase::Compile, Phase::Show];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Clear => "clear",
            Phase::Compile => "compile",
            Phase::Show => "show",
        }
    }
}

/// Reset whatever the surface drew last frame.
pub trait Clearable {
    fn clear(&mut self) -> SceneResult<()>;
}

/// Bring entities up to date and record what to draw.
pub trait Compilable {
    fn compile(&mut self, entities: &mut EntityStore) -> SceneResult<()>;
}

/// Present the compiled frame.
pub trait Showable {
    fn show(&mut self) -> SceneResult<()>;
}

/// A top-level drawing surface taking part in the render cycle.
///
/// A surface opts into each phase by returning `Some` from the matching accessor; phases it
/// does not support are skipped without error.
pub trait RootSurface: Any {
    fn name(&self) -> &str;

    /// Initial position in the root ordering, used when the surface is registered.
    fn order(&self) -> f64 {
        0.0
    }

    fn as_clearable(&mut self) -> Option<&mut dyn Clearable> {
        None
    }

    fn as_compilable(&mut self) -> Option<&mut dyn Compilable> {
        None
    }

    fn as_showable(&mut self) -> Option<&mut dyn Showable> {
        None
    }

    /// Refresh accessibility state derived from the surface (labels, motion preferences).
    fn check_accessibility_values(&mut self) {}
}
