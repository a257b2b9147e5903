pub(crate) mod coord;
pub(crate) mod entity;
pub(crate) mod flags;
pub(crate) mod links;
pub(crate) mod store;
