//! Clear, compile and show over root surfaces.
//!
//! Each phase runs over every resolved surface before the next phase starts. Failures are
//! isolated per surface and phase: they are logged, recorded in the [`CycleReport`] and the
//! cycle carries on.

use crate::cycle::store::SurfaceStore;
use crate::cycle::surface::Phase;
use crate::entity::store::EntityStore;
use crate::foundation::error::SceneError;

/// A surface phase that failed during a cycle.
#[derive(Debug)]
pub struct PhaseFailure {
    pub phase: Phase,
    pub surface: String,
    pub error: SceneError,
}

/// What one orchestrator call did.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// `(phase, surface)` pairs that actually ran, in call order.
    pub calls: Vec<(Phase, String)>,
    /// Target names with no registered surface.
    pub missing: Vec<String>,
    pub failures: Vec<PhaseFailure>,
}

impl CycleReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.missing.is_empty()
    }

    pub fn failed(&self, phase: Phase, surface: &str) -> bool {
        self.failures
            .iter()
            .any(|f| f.phase == phase && f.surface == surface)
    }
}

/// Explicit targets verbatim, or every root surface in sorted order.
pub(crate) fn resolve_targets(surfaces: &mut SurfaceStore, targets: &[&str]) -> Vec<String> {
    if targets.is_empty() {
        surfaces.sorted_surfaces().to_vec()
    } else {
        targets.iter().map(|t| t.to_string()).collect()
    }
}

pub(crate) fn run_phase(
    phase: Phase,
    surfaces: &mut SurfaceStore,
    entities: &mut EntityStore,
    targets: &[String],
    report: &mut CycleReport,
) {
    for name in targets {
        let Some(surface) = surfaces.get_mut(name) else {
            if !report.missing.contains(name) {
                tracing::warn!(
                    surface = %name,
                    phase = phase.label(),
                    "unknown render target skipped"
                );
                report.missing.push(name.clone());
            }
            continue;
        };

        let result = match phase {
            Phase::Clear => surface.as_clearable().map(|s| s.clear()),
            Phase::Compile => surface.as_compilable().map(|s| s.compile(entities)),
            Phase::Show => surface.as_showable().map(|s| s.show()),
        };
        match result {
            None => {}
            Some(Ok(())) => report.calls.push((phase, name.clone())),
            Some(Err(error)) => {
                tracing::warn!(
                    surface = %name,
                    phase = phase.label(),
                    %error,
                    "surface phase failed"
                );
                report.calls.push((phase, name.clone()));
                report.failures.push(PhaseFailure {
                    phase,
                    surface: name.clone(),
                    error,
                });
            }
        }
    }
}

fn single(
    phase: Phase,
    surfaces: &mut SurfaceStore,
    entities: &mut EntityStore,
    targets: &[&str],
) -> CycleReport {
    let resolved = resolve_targets(surfaces, targets);
    let mut report = CycleReport::default();
    run_phase(phase, surfaces, entities, &resolved, &mut report);
    report
}

pub fn clear(
    surfaces: &mut SurfaceStore,
    entities: &mut EntityStore,
    targets: &[&str],
) -> CycleReport {
    single(Phase::Clear, surfaces, entities, targets)
}

pub fn compile(
    surfaces: &mut SurfaceStore,
    entities: &mut EntityStore,
    targets: &[&str],
) -> CycleReport {
    single(Phase::Compile, surfaces, entities, targets)
}

pub fn show(
    surfaces: &mut SurfaceStore,
    entities: &mut EntityStore,
    targets: &[&str],
) -> CycleReport {
    single(Phase::Show, surfaces, entities, targets)
}

/// `clear`, `compile` then `show` over one resolution of `targets`.
#[tracing::instrument(level = "debug", skip_all, fields(targets = targets.len()))]
pub fn render(
    surfaces: &mut SurfaceStore,
    entities: &mut EntityStore,
    targets: &[&str],
) -> CycleReport {
    let resolved = resolve_targets(surfaces, targets);
    let mut report = CycleReport::default();
    for phase in Phase::ALL {
        run_phase(phase, surfaces, entities, &resolved, &mut report);
    }
    report
}

#[cfg(test)]
#[path = "../../tests/unit/cycle/orchestrator.rs"]
mod tests;
