use crate::foundation::error::SceneResult;
use crate::schedule::scheduler::Frame;

/// Per-tick callback of a [`Task`].
pub type TaskFn<C> = Box<dyn FnMut(&mut Frame<'_, C>) -> SceneResult<()>>;

/// Lifecycle hook run when a task is activated, deactivated or killed.
pub type TaskHook = Box<dyn FnMut()>;

/// A named unit of per-frame work.
///
/// Tasks are registered with a [`Scheduler`](crate::Scheduler) and, once active, run once per
/// tick in bucket order (`floor(order)`, lowest first, insertion order within a bucket).
pub struct Task<C> {
    pub(crate) name: String,
    pub(crate) order: f64,
    pub(crate) activate_on_add: bool,
    pub(crate) callback: TaskFn<C>,
    pub(crate) on_run: Option<TaskHook>,
    pub(crate) on_halt: Option<TaskHook>,
    pub(crate) on_kill: Option<TaskHook>,
}

impl<C> std::fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("activate_on_add", &self.activate_on_add)
            .finish_non_exhaustive()
    }
}

impl<C> Task<C> {
    /// New task with order 0 that activates as soon as it is added.
    pub fn new(
        name: impl Into<String>,
        callback: impl FnMut(&mut Frame<'_, C>) -> SceneResult<()> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            order: 0.0,
            activate_on_add: true,
            callback: Box::new(callback),
            on_run: None,
            on_halt: None,
            on_kill: None,
        }
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = order;
        self
    }

    /// Register without activating; call [`Scheduler::activate`](crate::Scheduler::activate) later.
    pub fn delayed(mut self) -> Self {
        self.activate_on_add = false;
        self
    }

    pub fn on_run(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_run = Some(Box::new(hook));
        self
    }

    pub fn on_halt(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_halt = Some(Box::new(hook));
        self
    }

    pub fn on_kill(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_kill = Some(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> f64 {
        self.order
    }
}
