pub(crate) mod driver;
pub(crate) mod registry;
pub(crate) mod scheduler;
pub(crate) mod task;
