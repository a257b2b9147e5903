use crate::config::settings::Settings;
use crate::cycle::orchestrator::{CycleReport, resolve_targets, run_phase};
use crate::cycle::scene::Scene;
use crate::cycle::surface::Phase;
use crate::foundation::error::SceneError;
use crate::schedule::task::Task;

type SceneHook = Box<dyn FnMut(&mut Scene)>;
type ErrorHook = Box<dyn FnMut(&mut Scene, &CycleReport)>;

#[derive(Default)]
struct Hooks {
    commence: Option<SceneHook>,
    after_clear: Option<SceneHook>,
    after_compile: Option<SceneHook>,
    after_show: Option<SceneHook>,
    after_created: Option<SceneHook>,
    error: Option<ErrorHook>,
}

fn call(hook: &mut Option<SceneHook>, scene: &mut Scene) {
    if let Some(h) = hook {
        h(scene);
    }
}

/// Builder for the per-frame render task.
///
/// Each tick runs `commence`, then clear/compile/show over the targets (all root surfaces when
/// none are named) with the matching `after_*` hook after each phase. The first tick also
/// refreshes the targets' accessibility values and runs `after_created`. When any phase fails,
/// the `error` hook receives the report; without one, the tick fails with a task error.
pub struct RenderTask {
    name: String,
    order: f64,
    targets: Vec<String>,
    no_target: bool,
    hooks: Hooks,
    on_run: Option<Box<dyn FnMut()>>,
    on_halt: Option<Box<dyn FnMut()>>,
    on_kill: Option<Box<dyn FnMut()>>,
}

impl std::fmt::Debug for RenderTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTask")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("targets", &self.targets)
            .field("no_target", &self.no_target)
            .finish_non_exhaustive()
    }
}

impl RenderTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_settings(name, &Settings::default())
    }

    /// Order comes from `scheduler.render_order`.
    pub fn with_settings(name: impl Into<String>, settings: &Settings) -> Self {
        Self {
            name: name.into(),
            order: settings.scheduler.render_order,
            targets: Vec::new(),
            no_target: false,
            hooks: Hooks::default(),
            on_run: None,
            on_halt: None,
            on_kill: None,
        }
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = order;
        self
    }

    pub fn target(mut self, name: impl Into<String>) -> Self {
        self.targets.push(name.into());
        self
    }

    pub fn targets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets.extend(names.into_iter().map(Into::into));
        self
    }

    /// Run the hooks only; no surface is touched.
    pub fn no_target(mut self) -> Self {
        self.no_target = true;
        self
    }

    pub fn commence(mut self, f: impl FnMut(&mut Scene) + 'static) -> Self {
        self.hooks.commence = Some(Box::new(f));
        self
    }

    pub fn after_clear(mut self, f: impl FnMut(&mut Scene) + 'static) -> Self {
        self.hooks.after_clear = Some(Box::new(f));
        self
    }

    pub fn after_compile(mut self, f: impl FnMut(&mut Scene) + 'static) -> Self {
        self.hooks.after_compile = Some(Box::new(f));
        self
    }

    pub fn after_show(mut self, f: impl FnMut(&mut Scene) + 'static) -> Self {
        self.hooks.after_show = Some(Box::new(f));
        self
    }

    /// Runs once, after the first completed cycle.
    pub fn after_created(mut self, f: impl FnMut(&mut Scene) + 'static) -> Self {
        self.hooks.after_created = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&mut Scene, &CycleReport) + 'static) -> Self {
        self.hooks.error = Some(Box::new(f));
        self
    }

    pub fn on_run(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_run = Some(Box::new(f));
        self
    }

    pub fn on_halt(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_halt = Some(Box::new(f));
        self
    }

    pub fn on_kill(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_kill = Some(Box::new(f));
        self
    }

    pub fn into_task(self) -> Task<Scene> {
        let RenderTask {
            name,
            order,
            targets,
            no_target,
            mut hooks,
            on_run,
            on_halt,
            on_kill,
        } = self;
        let mut created = false;

        let mut task = Task::<Scene>::new(name, move |frame| {
            let scene: &mut Scene = &mut *frame.ctx;
            let report = if no_target {
                run_hooks_only(&mut hooks, scene);
                CycleReport::default()
            } else {
                run_cycle(&mut hooks, scene, &targets)
            };

            if !created {
                if !no_target {
                    let names: Vec<&str> = targets.iter().map(String::as_str).collect();
                    for name in resolve_targets(&mut scene.surfaces, &names) {
                        if let Some(surface) = scene.surfaces.get_mut(&name) {
                            surface.check_accessibility_values();
                        }
                    }
                }
                call(&mut hooks.after_created, scene);
                created = true;
            }

            if report.failures.is_empty() {
                return Ok(());
            }
            match &mut hooks.error {
                Some(h) => {
                    h(scene, &report);
                    Ok(())
                }
                None => Err(cycle_error(&report)),
            }
        })
        .with_order(order);

        if let Some(h) = on_run {
            task = task.on_run(h);
        }
        if let Some(h) = on_halt {
            task = task.on_halt(h);
        }
        if let Some(h) = on_kill {
            task = task.on_kill(h);
        }
        task
    }
}

fn run_hooks_only(hooks: &mut Hooks, scene: &mut Scene) {
    call(&mut hooks.commence, scene);
    call(&mut hooks.after_clear, scene);
    call(&mut hooks.after_compile, scene);
    call(&mut hooks.after_show, scene);
}

fn run_cycle(hooks: &mut Hooks, scene: &mut Scene, targets: &[String]) -> CycleReport {
    call(&mut hooks.commence, scene);
    let names: Vec<&str> = targets.iter().map(String::as_str).collect();
    let resolved = resolve_targets(&mut scene.surfaces, &names);
    let mut report = CycleReport::default();
    for phase in Phase::ALL {
        run_phase(phase, &mut scene.surfaces, &mut scene.entities, &resolved, &mut report);
        match phase {
            Phase::Clear => call(&mut hooks.after_clear, scene),
            Phase::Compile => call(&mut hooks.after_compile, scene),
            Phase::Show => call(&mut hooks.after_show, scene),
        }
    }
    report
}

fn cycle_error(report: &CycleReport) -> SceneError {
    let detail = report
        .failures
        .iter()
        .map(|f| format!("{} {}: {}", f.surface, f.phase.label(), f.error))
        .collect::<Vec<_>>()
        .join("; ");
    SceneError::task(format!("render cycle failed: {detail}"))
}

#[cfg(test)]
#[path = "../../tests/unit/cycle/render_task.rs"]
mod tests;
