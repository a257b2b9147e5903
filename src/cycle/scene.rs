use crate::config::settings::Settings;
use crate::cycle::store::SurfaceStore;
use crate::entity::store::EntityStore;

/// Root surfaces plus the entities they draw; the usual scheduler context.
#[derive(Debug, Default)]
pub struct Scene {
    pub surfaces: SurfaceStore,
    pub entities: EntityStore,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            surfaces: SurfaceStore::with_settings(settings),
            entities: EntityStore::with_settings(settings),
        }
    }
}
