use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use kurbo::{BezPath, Point, Vec2};

use crate::config::settings::{PathSettings, Settings};
use crate::entity::coord::Coord;
use crate::entity::entity::{Entity, EntityId, EntityKind, LockTo, PathPositionData, References};
use crate::entity::flags::Dirty;
use crate::entity::links::{LinkKind, Links};
use crate::foundation::core::LocalBox;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::pool::ScratchPool;
use crate::geometry::species::ShapeSpecies;

/// Owns every entity plus the reference relation between them.
///
/// Entities are mutated only through [`EntityStore::update`] and the reference setters, so the
/// store sees every change and can push invalidation onto subscribers before anyone reads them.
#[derive(Debug)]
pub struct EntityStore {
    entities: BTreeMap<EntityId, Entity>,
    names: HashMap<String, EntityId>,
    links: Links,
    next_id: u32,
    path_settings: PathSettings,
    scratch: ScratchPool<f64>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::with_settings(&Settings::default())
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            entities: BTreeMap::new(),
            names: HashMap::new(),
            links: Links::default(),
            next_id: 1,
            path_settings: settings.path,
            scratch: ScratchPool::new(settings.pool_opts()),
        }
    }

    /// Create a shape entity with a unique name.
    pub fn shape(
        &mut self,
        name: impl Into<String>,
        species: ShapeSpecies,
    ) -> SceneResult<EntityId> {
        self.insert(name.into(), EntityKind::Shape { species })
    }

    /// Create a block entity with a unique name.
    pub fn block(
        &mut self,
        name: impl Into<String>,
        width: impl Into<Coord>,
        height: impl Into<Coord>,
    ) -> SceneResult<EntityId> {
        self.insert(
            name.into(),
            EntityKind::Block {
                width: width.into(),
                height: height.into(),
            },
        )
    }

    fn insert(&mut self, name: String, kind: EntityKind) -> SceneResult<EntityId> {
        if name.is_empty() {
            return Err(SceneError::validation("entity name must be non-empty"));
        }
        if self.names.contains_key(&name) {
            return Err(SceneError::validation(format!(
                "entity name '{name}' is already in use"
            )));
        }
        let id = EntityId::from_raw(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.names.insert(name.clone(), id);
        self.entities
            .insert(id, Entity::new(name, kind, &self.path_settings));
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn id_by_name(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// Read-only view of an entity's authoritative attributes and dirty flags.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Apply setters to one entity.
    ///
    /// When the change moves the entity, every (transitive) subscriber is invalidated before
    /// this returns.
    pub fn update<R>(&mut self, id: EntityId, f: impl FnOnce(&mut Entity) -> R) -> SceneResult<R> {
        let entity = self.entity_mut(id)?;
        let before = entity.dirty;
        let out = f(entity);
        let raised = entity.dirty.difference(before);
        if raised.intersects(Dirty::POSITIONAL) {
            self.push_to_subscribers(id);
        }
        Ok(out)
    }

    pub fn reference(&self, subscriber: EntityId, kind: LinkKind) -> Option<EntityId> {
        self.links.reference(subscriber, kind)
    }

    pub fn subscribers(&self, reference: EntityId, kind: LinkKind) -> &[EntityId] {
        self.links.subscribers(reference, kind)
    }

    pub fn set_pivot(&mut self, subscriber: EntityId, pivot: Option<EntityId>) -> SceneResult<()> {
        self.set_reference(subscriber, LinkKind::Pivot, pivot)
    }

    pub fn set_path(&mut self, subscriber: EntityId, path: Option<EntityId>) -> SceneResult<()> {
        self.set_reference(subscriber, LinkKind::Path, path)
    }

    pub fn set_mimic(&mut self, subscriber: EntityId, mimic: Option<EntityId>) -> SceneResult<()> {
        self.set_reference(subscriber, LinkKind::Mimic, mimic)
    }

    fn set_reference(
        &mut self,
        subscriber: EntityId,
        kind: LinkKind,
        reference: Option<EntityId>,
    ) -> SceneResult<()> {
        self.entity_mut(subscriber)?;
        match reference {
            Some(r) => {
                if !self.contains(r) {
                    return Err(SceneError::validation(format!("unknown {kind:?} reference {r}")));
                }
                if r == subscriber || self.links.reaches(r, subscriber) {
                    return Err(SceneError::validation(format!(
                        "{kind:?} reference {r} would make {subscriber} depend on itself"
                    )));
                }
                self.links.link(subscriber, kind, r);
            }
            None => {
                self.links.unlink(subscriber, kind);
            }
        }
        let entity = self.entity_mut(subscriber)?;
        entity.dirty |= kind.pushed_flags();
        if kind == LinkKind::Path {
            entity.current_path_data = None;
        }
        self.push_to_subscribers(subscriber);
        Ok(())
    }

    /// Remove an entity and clear every link that pointed at it.
    ///
    /// Former subscribers fall back to their own coordinates on the axes that followed it.
    pub fn kill(&mut self, id: EntityId) -> SceneResult<()> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or_else(|| SceneError::validation(format!("unknown entity {id}")))?;
        self.names.remove(entity.name());

        for (sub, kind) in self.links.remove_entity(id) {
            if let Some(e) = self.entities.get_mut(&sub) {
                e.release_lock(match kind {
                    LinkKind::Pivot => LockTo::Pivot,
                    LinkKind::Path => LockTo::Path,
                    LinkKind::Mimic => LockTo::Mimic,
                });
                tracing::debug!(
                    subscriber = %e.name(),
                    reference = %entity.name(),
                    ?kind,
                    "link cleared by kill"
                );
            }
            self.push_to_subscribers(sub);
        }
        Ok(())
    }

    /// Bring every derived value of `id` up to date, references first.
    pub fn prepare_stamp(&mut self, id: EntityId) -> SceneResult<()> {
        let mut visiting = Vec::new();
        self.prepare_inner(id, &mut visiting)
    }

    fn prepare_inner(&mut self, id: EntityId, visiting: &mut Vec<EntityId>) -> SceneResult<()> {
        if visiting.contains(&id) {
            return Err(SceneError::recompute(format!(
                "reference cycle through entity {id}"
            )));
        }
        let dirty = self.entity(id)?.dirty;
        let refs: Vec<EntityId> = self.links.references(id).map(|(_, r)| r).collect();
        let refs_dirty = refs
            .iter()
            .any(|r| self.entities.get(r).is_some_and(|e| !e.dirty.is_empty()));
        if dirty.is_empty() && !refs_dirty {
            return Ok(());
        }

        visiting.push(id);
        let result = self.recompute(id, &refs, visiting);
        visiting.pop();
        result?;

        self.drain_position_subscribers(id);
        Ok(())
    }

    fn recompute(
        &mut self,
        id: EntityId,
        refs: &[EntityId],
        visiting: &mut Vec<EntityId>,
    ) -> SceneResult<()> {
        self.prepare_references(id, refs, visiting)?;
        let snapshot = self.snapshot(id)?;
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or_else(|| SceneError::validation(format!("unknown entity {id}")))?;
        entity.prepare(&snapshot, &mut self.scratch)
    }

    fn prepare_references(
        &mut self,
        id: EntityId,
        refs: &[EntityId],
        visiting: &mut Vec<EntityId>,
    ) -> SceneResult<()> {
        for r in refs {
            if self.contains(*r) {
                self.prepare_inner(*r, visiting).map_err(|err| {
                    SceneError::recompute(format!("entity {id}: reference {r} failed: {err}"))
                })?;
            }
        }
        Ok(())
    }

    /// Gather fresh reference values for `id`, refreshing its cached path sample if needed.
    fn snapshot(&mut self, id: EntityId) -> SceneResult<References> {
        let mut refs = References::default();
        let linked = |kind| {
            self.links
                .reference(id, kind)
                .and_then(|r| self.entities.get(&r))
        };
        refs.pivot = linked(LinkKind::Pivot).map(Entity::pivot_data);
        refs.mimic = linked(LinkKind::Mimic).map(Entity::mimic_data);

        let cached = self.entity(id)?.current_path_data;
        refs.path = match cached {
            Some(data) => Some(data),
            None => {
                let position = self.entity(id)?.path_position();
                self.links
                    .reference(id, LinkKind::Path)
                    .and_then(|r| self.entities.get(&r))
                    .and_then(|path| path.path_position_data(position, path.constant_path_speed()))
            }
        };
        self.entity_mut(id)?.current_path_data = refs.path;
        Ok(refs)
    }

    fn drain_position_subscribers(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if entity.dirty.contains(Dirty::POSITION_SUBSCRIBERS) {
            entity.dirty.remove(Dirty::POSITION_SUBSCRIBERS);
            self.push_to_subscribers(id);
        }
    }

    /// Raise the link-specific flags on every subscriber of `id`, transitively.
    fn push_to_subscribers(&mut self, id: EntityId) {
        let mut queue = VecDeque::from([id]);
        let mut seen = HashSet::from([id]);
        while let Some(reference) = queue.pop_front() {
            for kind in LinkKind::ALL {
                for &sub in self.links.subscribers(reference, kind) {
                    if let Some(e) = self.entities.get_mut(&sub) {
                        e.dirty |= kind.pushed_flags();
                        if kind == LinkKind::Path {
                            e.current_path_data = None;
                        }
                    }
                    if seen.insert(sub) {
                        queue.push_back(sub);
                    }
                }
            }
        }
    }

    fn entity(&self, id: EntityId) -> SceneResult<&Entity> {
        self.entities
            .get(&id)
            .ok_or_else(|| SceneError::validation(format!("unknown entity {id}")))
    }

    fn entity_mut(&mut self, id: EntityId) -> SceneResult<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or_else(|| SceneError::validation(format!("unknown entity {id}")))
    }

    /// Prepared entity, for reads that must see fresh derived values.
    fn fresh(&mut self, id: EntityId) -> SceneResult<&Entity> {
        self.prepare_stamp(id)?;
        self.entity(id)
    }

    pub fn stamp_position(&mut self, id: EntityId) -> SceneResult<Point> {
        Ok(self.fresh(id)?.stamp_position())
    }

    pub fn stamp_handle_position(&mut self, id: EntityId) -> SceneResult<Vec2> {
        Ok(self.fresh(id)?.stamp_handle_position())
    }

    pub fn local_box(&mut self, id: EntityId) -> SceneResult<LocalBox> {
        Ok(self.fresh(id)?.local_box())
    }

    pub fn path_length(&mut self, id: EntityId) -> SceneResult<f64> {
        Ok(self.fresh(id)?.path_length())
    }

    /// Outline relative to the stamp position, handle already applied.
    pub fn stamp_path(&mut self, id: EntityId) -> SceneResult<BezPath> {
        Ok(self.fresh(id)?.stamp_path().clone())
    }

    /// Resolved rotation in degrees.
    pub fn rotation(&mut self, id: EntityId) -> SceneResult<f64> {
        Ok(self.fresh(id)?.rotation())
    }

    /// World-space point and angle at `p` along the entity's path.
    ///
    /// `Ok(None)` when the entity is not used as a path or `p` is not finite.
    pub fn path_position_data(
        &mut self,
        id: EntityId,
        p: f64,
        constant_speed: bool,
    ) -> SceneResult<Option<PathPositionData>> {
        Ok(self.fresh(id)?.path_position_data(p, constant_speed))
    }

    /// Stamp path and world transform of an already prepared entity.
    pub(crate) fn stamp_parts(&self, id: EntityId) -> Option<(BezPath, kurbo::Affine)> {
        self.entities
            .get(&id)
            .map(|e| (e.stamp_path().clone(), e.transform()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/entity/store.rs"]
mod tests;
