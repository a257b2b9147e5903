use std::collections::HashMap;

use crate::config::settings::Settings;
use crate::foundation::error::{SceneError, SceneResult};
use crate::schedule::driver::FrameDriver;
use crate::schedule::registry::OrderedRegistry;
use crate::schedule::task::{Task, TaskFn, TaskHook};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Change {
    Activate(String),
    Deactivate(String),
    StopLoop,
}

/// Per-callback view handed to a running task.
///
/// Membership changes requested here are applied right after the callback returns. They never
/// alter the list of tasks executing in the current tick; they show up in the next one.
pub struct Frame<'a, C> {
    /// Caller-supplied context shared by every task in the tick.
    pub ctx: &'a mut C,
    tick: u64,
    task: &'a str,
    active: &'a OrderedRegistry<String>,
    changes: &'a mut Vec<Change>,
}

impl<C> Frame<'_, C> {
    /// Zero-based index of the current tick.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Name of the task currently running.
    pub fn task_name(&self) -> &str {
        self.task
    }

    pub fn activate(&mut self, name: impl Into<String>) {
        self.changes.push(Change::Activate(name.into()));
    }

    pub fn deactivate(&mut self, name: impl Into<String>) {
        self.changes.push(Change::Deactivate(name.into()));
    }

    /// Deactivate the running task after this callback.
    pub fn halt(&mut self) {
        self.changes.push(Change::Deactivate(self.task.to_string()));
    }

    pub fn stop_loop(&mut self) {
        self.changes.push(Change::StopLoop);
    }

    /// Membership as it will be for the next tick, including changes requested so far.
    pub fn is_active(&self, name: &str) -> bool {
        let pending = self.changes.iter().rev().find_map(|c| match c {
            Change::Activate(n) if n == name => Some(true),
            Change::Deactivate(n) if n == name => Some(false),
            _ => None,
        });
        pending.unwrap_or_else(|| self.active.contains(&name.to_string()))
    }
}

/// Outcome of one [`Scheduler::tick`].
#[derive(Debug, Default)]
pub struct TickReport {
    pub tick: u64,
    /// Number of callbacks invoked.
    pub ran: usize,
    /// Whether the active set was re-sorted before running.
    pub resorted: bool,
    /// Tasks whose callback returned an error; later tasks still ran.
    pub failures: Vec<(String, SceneError)>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct TaskSlot<C> {
    order: f64,
    callback: Option<TaskFn<C>>,
    on_run: Option<TaskHook>,
    on_halt: Option<TaskHook>,
    on_kill: Option<TaskHook>,
}

/// Deterministic per-frame task scheduler.
///
/// Holds the task library, the active set (an [`OrderedRegistry`] keyed by task name) and the
/// frame-loop flags. Each tick runs a snapshot of the bucket-sorted active set taken before
/// the first callback, so activation changes made during a tick only affect the next one.
pub struct Scheduler<C> {
    tasks: HashMap<String, TaskSlot<C>>,
    active: OrderedRegistry<String>,
    running: bool,
    frame_requested: bool,
    tick_count: u64,
    changes: Vec<Change>,
}

impl<C> std::fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("tasks", &self.tasks.len())
            .field("active", &self.active.len())
            .field("running", &self.running)
            .field("tick_count", &self.tick_count)
            .finish_non_exhaustive()
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self::with_settings(&Settings::default())
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            tasks: HashMap::new(),
            active: OrderedRegistry::with_pool_opts(settings.pool_opts()),
            running: false,
            frame_requested: false,
            tick_count: 0,
            changes: Vec::new(),
        }
    }

    /// Register a task. It is activated immediately unless built with [`Task::delayed`].
    pub fn add_task(&mut self, task: Task<C>) -> SceneResult<()> {
        if self.tasks.contains_key(&task.name) {
            return Err(SceneError::validation(format!(
                "task '{}' is already registered",
                task.name
            )));
        }
        let Task {
            name,
            order,
            activate_on_add,
            callback,
            on_run,
            on_halt,
            on_kill,
        } = task;
        self.tasks.insert(
            name.clone(),
            TaskSlot {
                order,
                callback: Some(callback),
                on_run,
                on_halt,
                on_kill,
            },
        );
        if activate_on_add {
            self.activate(&name)?;
        }
        Ok(())
    }

    /// Add a registered task to the active set. Returns `false` if it was already active.
    ///
    /// `on_run` fires only when the task actually joins the active set.
    pub fn activate(&mut self, name: &str) -> SceneResult<bool> {
        let slot = self
            .tasks
            .get_mut(name)
            .ok_or_else(|| SceneError::validation(format!("unknown task '{name}'")))?;
        let joined = self.active.insert(name.to_string(), slot.order);
        if joined && let Some(hook) = slot.on_run.as_mut() {
            hook();
        }
        Ok(joined)
    }

    /// Remove a task from the active set. Returns `false` if it was not active.
    ///
    /// `on_halt` fires only when the task actually leaves the active set.
    pub fn deactivate(&mut self, name: &str) -> SceneResult<bool> {
        let slot = self
            .tasks
            .get_mut(name)
            .ok_or_else(|| SceneError::validation(format!("unknown task '{name}'")))?;
        let left = self.active.remove(&name.to_string());
        if left && let Some(hook) = slot.on_halt.as_mut() {
            hook();
        }
        Ok(left)
    }

    /// Deactivate and forget a task.
    pub fn kill_task(&mut self, name: &str) -> SceneResult<()> {
        let mut slot = self
            .tasks
            .remove(name)
            .ok_or_else(|| SceneError::validation(format!("unknown task '{name}'")))?;
        if let Some(hook) = slot.on_kill.as_mut() {
            hook();
        }
        self.active.remove(&name.to_string());
        Ok(())
    }

    pub fn set_task_order(&mut self, name: &str, order: f64) -> SceneResult<()> {
        let slot = self
            .tasks
            .get_mut(name)
            .ok_or_else(|| SceneError::validation(format!("unknown task '{name}'")))?;
        slot.order = order;
        self.active.set_order(&name.to_string(), order);
        Ok(())
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains(&name.to_string())
    }

    pub fn has_task(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Active task names in execution order.
    pub fn execution_order(&mut self) -> Vec<String> {
        self.active.sorted().to_vec()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Run every active task once, in bucket order, against a snapshot of the active set.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn tick(&mut self, ctx: &mut C) -> TickReport {
        let resorted = self.active.is_stale();
        let snapshot = self.active.sorted();
        let tick = self.tick_count;
        self.tick_count = self.tick_count.wrapping_add(1);

        let mut report = TickReport {
            tick,
            resorted,
            ..TickReport::default()
        };

        for name in snapshot.iter() {
            // Killed earlier in this tick: nothing left to run.
            let Some(mut callback) = self.tasks.get_mut(name).and_then(|s| s.callback.take())
            else {
                continue;
            };

            let mut changes = std::mem::take(&mut self.changes);
            let result = {
                let mut frame = Frame {
                    ctx: &mut *ctx,
                    tick,
                    task: name,
                    active: &self.active,
                    changes: &mut changes,
                };
                callback(&mut frame)
            };
            report.ran += 1;

            if let Some(slot) = self.tasks.get_mut(name)
                && slot.callback.is_none()
            {
                slot.callback = Some(callback);
            }

            if let Err(err) = result {
                tracing::warn!(task = %name, error = %err, "task failed; continuing tick");
                report.failures.push((name.clone(), err));
            }

            for change in changes.drain(..) {
                self.apply(change);
            }
            self.changes = changes;
        }

        report
    }

    fn apply(&mut self, change: Change) {
        let outcome = match &change {
            Change::Activate(name) => self.activate(name).map(|_| ()),
            Change::Deactivate(name) => self.deactivate(name).map(|_| ()),
            Change::StopLoop => {
                self.stop_loop();
                Ok(())
            }
        };
        if let Err(err) = outcome {
            tracing::warn!(?change, error = %err, "ignoring membership change from task");
        }
    }

    /// Start the frame loop. Returns `false` (and does nothing) if it is already running.
    pub fn start_loop(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.frame_requested = true;
        true
    }

    /// Stop the frame loop; a pending frame request is cancelled.
    pub fn stop_loop(&mut self) {
        self.running = false;
        self.frame_requested = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Handle one frame signal: tick if a frame was requested, then re-request while running.
    ///
    /// Signals arriving without an outstanding request are ignored, so repeated start/stop
    /// toggles never produce duplicate ticks for one signal.
    pub fn on_frame(&mut self, ctx: &mut C) -> Option<TickReport> {
        if !self.frame_requested {
            return None;
        }
        self.frame_requested = false;
        let report = self.tick(ctx);
        if self.running {
            self.frame_requested = true;
        }
        Some(report)
    }

    /// Pump `driver` until the loop stops or the driver runs dry. Returns the ticks executed.
    pub fn drive(&mut self, driver: &mut dyn FrameDriver, ctx: &mut C) -> u64 {
        let mut ticks = 0;
        while self.frame_requested {
            let Some(signal) = driver.next_frame() else {
                break;
            };
            if let Some(report) = self.on_frame(ctx) {
                ticks += 1;
                tracing::trace!(
                    frame = signal.index,
                    ran = report.ran,
                    failures = report.failures.len(),
                    "frame"
                );
            }
        }
        ticks
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
