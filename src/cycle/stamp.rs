use kurbo::{Affine, BezPath};

use crate::cycle::surface::{Clearable, Compilable, RootSurface, Showable};
use crate::entity::entity::EntityId;
use crate::entity::store::EntityStore;
use crate::foundation::error::{SceneError, SceneResult};
use crate::schedule::registry::OrderedRegistry;

/// One entity ready to be drawn: its outline around the handle and the world transform.
#[derive(Clone, Debug, PartialEq)]
pub struct StampOp {
    pub entity: EntityId,
    pub path: BezPath,
    pub transform: Affine,
}

/// Root surface that stamps a group of entities into a display list.
///
/// `compile` walks the group in stacking order, preparing each entity; entities that fail to
/// prepare are left out of this frame and retried on the next. `show` publishes the compiled
/// list as the presented frame.
#[derive(Debug)]
pub struct StampSurface {
    name: String,
    order: f64,
    group: OrderedRegistry<EntityId>,
    pending: Vec<StampOp>,
    presented: Vec<StampOp>,
    frames_shown: u64,
    accessibility_checks: u64,
}

impl StampSurface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: 0.0,
            group: OrderedRegistry::new(),
            pending: Vec::new(),
            presented: Vec::new(),
            frames_shown: 0,
            accessibility_checks: 0,
        }
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = order;
        self
    }

    /// Add an entity to the group at its current stacking order.
    pub fn add(&mut self, entities: &EntityStore, id: EntityId) -> SceneResult<bool> {
        let entity = entities
            .get(id)
            .ok_or_else(|| SceneError::validation(format!("unknown entity {id}")))?;
        Ok(self.group.insert(id, entity.order()))
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        self.group.remove(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.group.contains(&id)
    }

    pub fn group_len(&self) -> usize {
        self.group.len()
    }

    /// Display list of the last `show`.
    pub fn presented(&self) -> &[StampOp] {
        &self.presented
    }

    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }

    pub fn accessibility_checks(&self) -> u64 {
        self.accessibility_checks
    }

    fn sync_group(&mut self, entities: &EntityStore) {
        let mut gone = Vec::new();
        let mut moved = Vec::new();
        for (&id, order) in self.group.entries() {
            match entities.get(id) {
                None => gone.push(id),
                Some(e) if e.order() != order => moved.push((id, e.order())),
                Some(_) => {}
            }
        }
        for id in gone {
            tracing::debug!(
                surface = %self.name,
                entity = %id,
                "dropping killed entity from group"
            );
            self.group.remove(&id);
        }
        for (id, order) in moved {
            self.group.set_order(&id, order);
        }
    }
}

impl RootSurface for StampSurface {
    fn name(&self) -> &str {
        &self.name
    }

    fn order(&self) -> f64 {
        self.order
    }

    fn as_clearable(&mut self) -> Option<&mut dyn Clearable> {
        Some(self)
    }

    fn as_compilable(&mut self) -> Option<&mut dyn Compilable> {
        Some(self)
    }

    fn as_showable(&mut self) -> Option<&mut dyn Showable> {
        Some(self)
    }

    fn check_accessibility_values(&mut self) {
        self.accessibility_checks += 1;
    }
}

impl Clearable for StampSurface {
    fn clear(&mut self) -> SceneResult<()> {
        self.pending.clear();
        Ok(())
    }
}

impl Compilable for StampSurface {
    fn compile(&mut self, entities: &mut EntityStore) -> SceneResult<()> {
        self.sync_group(entities);
        let mut failed = 0usize;
        for id in self.group.sorted().iter() {
            if let Err(err) = entities.prepare_stamp(*id) {
                tracing::warn!(
                    surface = %self.name,
                    entity = %id,
                    %err,
                    "entity skipped this frame"
                );
                failed += 1;
                continue;
            }
            if let Some((path, transform)) = entities.stamp_parts(*id) {
                self.pending.push(StampOp {
                    entity: *id,
                    path,
                    transform,
                });
            }
        }
        if failed > 0 {
            return Err(SceneError::recompute(format!(
                "{failed} entities on '{}' could not be prepared",
                self.name
            )));
        }
        Ok(())
    }
}

impl Showable for StampSurface {
    fn show(&mut self) -> SceneResult<()> {
        self.presented = std::mem::take(&mut self.pending);
        self.frames_shown += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cycle/stamp.rs"]
mod tests;
