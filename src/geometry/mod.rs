pub(crate) mod path;
pub(crate) mod segment;
pub(crate) mod species;
