use std::collections::{HashMap, HashSet};

use crate::entity::entity::EntityId;
use crate::entity::flags::Dirty;

/// Kind of reference one entity can hold on another.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Pivot,
    Path,
    Mimic,
}

impl LinkKind {
    pub const ALL: [LinkKind; 3] = [LinkKind::Pivot, LinkKind::Path, LinkKind::Mimic];

    /// Flags raised on a subscriber when its reference moves.
    pub fn pushed_flags(self) -> Dirty {
        match self {
            LinkKind::Pivot | LinkKind::Path => Dirty::START | Dirty::ROTATION,
            LinkKind::Mimic => Dirty::SCALE | Dirty::START | Dirty::OFFSET | Dirty::ROTATION,
        }
    }
}

/// Non-owning reference relation between entities.
///
/// `forward` answers "what does this subscriber follow", `back` answers "who follows this
/// reference"; the back lists keep subscription order and never hold duplicates.
#[derive(Debug, Default)]
pub struct Links {
    forward: HashMap<(EntityId, LinkKind), EntityId>,
    back: HashMap<(EntityId, LinkKind), Vec<EntityId>>,
}

impl Links {
    /// Point `subscriber` at `reference`, returning the previous reference.
    pub fn link(
        &mut self,
        subscriber: EntityId,
        kind: LinkKind,
        reference: EntityId,
    ) -> Option<EntityId> {
        let previous = self.unlink(subscriber, kind);
        self.forward.insert((subscriber, kind), reference);
        // `unlink` above removed any earlier entry for this subscriber and kind.
        let subs = self.back.entry((reference, kind)).or_default();
        subs.push(subscriber);
        previous
    }

    pub fn unlink(&mut self, subscriber: EntityId, kind: LinkKind) -> Option<EntityId> {
        let previous = self.forward.remove(&(subscriber, kind))?;
        if let Some(subs) = self.back.get_mut(&(previous, kind)) {
            subs.retain(|s| *s != subscriber);
            if subs.is_empty() {
                self.back.remove(&(previous, kind));
            }
        }
        Some(previous)
    }

    pub fn reference(&self, subscriber: EntityId, kind: LinkKind) -> Option<EntityId> {
        self.forward.get(&(subscriber, kind)).copied()
    }

    /// Every `(kind, reference)` the subscriber follows, in [`LinkKind::ALL`] order.
    pub fn references(
        &self,
        subscriber: EntityId,
    ) -> impl Iterator<Item = (LinkKind, EntityId)> + '_ {
        LinkKind::ALL
            .into_iter()
            .filter_map(move |kind| self.reference(subscriber, kind).map(|r| (kind, r)))
    }

    pub fn subscribers(&self, reference: EntityId, kind: LinkKind) -> &[EntityId] {
        self.back
            .get(&(reference, kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether following references from `from` ever arrives at `to`.
    pub fn reaches(&self, from: EntityId, to: EntityId) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            stack.extend(self.references(id).map(|(_, r)| r));
        }
        false
    }

    /// Drop every relation mentioning `id`. Returns the orphaned subscribers.
    pub fn remove_entity(&mut self, id: EntityId) -> Vec<(EntityId, LinkKind)> {
        for kind in LinkKind::ALL {
            self.unlink(id, kind);
        }
        let mut orphans = Vec::new();
        for kind in LinkKind::ALL {
            if let Some(subs) = self.back.remove(&(id, kind)) {
                for sub in subs {
                    self.forward.remove(&(sub, kind));
                    orphans.push((sub, kind));
                }
            }
        }
        orphans
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.back.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/entity/links.rs"]
mod tests;
