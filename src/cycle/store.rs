use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::settings::Settings;
use crate::cycle::surface::RootSurface;
use crate::foundation::error::{SceneError, SceneResult};
use crate::schedule::registry::OrderedRegistry;

/// Registry of root surfaces and their processing order.
pub struct SurfaceStore {
    surfaces: HashMap<String, Box<dyn RootSurface>>,
    roots: OrderedRegistry<String>,
}

impl std::fmt::Debug for SurfaceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceStore")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl Default for SurfaceStore {
    fn default() -> Self {
        Self::with_settings(&Settings::default())
    }
}

impl SurfaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            surfaces: HashMap::new(),
            roots: OrderedRegistry::with_pool_opts(settings.pool_opts()),
        }
    }

    /// Add a root surface. Names must be unique.
    pub fn register(&mut self, surface: impl RootSurface) -> SceneResult<()> {
        self.register_boxed(Box::new(surface))
    }

    pub fn register_boxed(&mut self, surface: Box<dyn RootSurface>) -> SceneResult<()> {
        let name = surface.name().to_string();
        if self.surfaces.contains_key(&name) {
            return Err(SceneError::validation(format!(
                "surface '{name}' is already registered"
            )));
        }
        self.roots.insert(name.clone(), surface.order());
        self.surfaces.insert(name, surface);
        Ok(())
    }

    pub fn deregister(&mut self, name: &str) -> Option<Box<dyn RootSurface>> {
        let surface = self.surfaces.remove(name)?;
        self.roots.remove(&name.to_string());
        Some(surface)
    }

    /// Move a surface within the root ordering. Returns `false` for unknown names.
    pub fn set_order(&mut self, name: &str, order: f64) -> bool {
        self.roots.set_order(&name.to_string(), order)
    }

    pub fn order_of(&self, name: &str) -> Option<f64> {
        self.roots.order_of(&name.to_string())
    }

    /// Root names in processing order. The same `Arc` comes back until membership or an
    /// order bucket changes.
    pub fn sorted_surfaces(&mut self) -> Arc<[String]> {
        self.roots.sorted()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.surfaces.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&dyn RootSurface> {
        self.surfaces.get(name).map(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn RootSurface + 'static)> {
        self.surfaces.get_mut(name).map(|s| s.as_mut())
    }

    /// Typed view of a registered surface.
    pub fn get_as<T: RootSurface>(&self, name: &str) -> Option<&T> {
        let surface: &(dyn RootSurface + 'static) = self.surfaces.get(name)?.as_ref();
        let any: &(dyn Any + 'static) = surface;
        any.downcast_ref::<T>()
    }

    pub fn get_as_mut<T: RootSurface>(&mut self, name: &str) -> Option<&mut T> {
        let surface: &mut (dyn RootSurface + 'static) = self.surfaces.get_mut(name)?.as_mut();
        let any: &mut (dyn Any + 'static) = surface;
        any.downcast_mut::<T>()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cycle/store.rs"]
mod tests;
