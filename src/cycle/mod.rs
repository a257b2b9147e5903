pub(crate) mod orchestrator;
pub(crate) mod render_task;
pub(crate) mod scene;
pub(crate) mod stamp;
pub(crate) mod store;
pub(crate) mod surface;
