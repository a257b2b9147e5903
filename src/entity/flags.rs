bitflags::bitflags! {
    /// Stale derived values of one entity.
    ///
    /// Only setters raise these; callers never mark an entity dirty directly.
    #[derive(
        Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
    )]
    pub struct Dirty: u16 {
        const SCALE = 1 << 0;
        const START = 1 << 1;
        const OFFSET = 1 << 2;
        const ROTATION = 1 << 3;
        const SPECIES = 1 << 4;
        const PATH_OBJECT = 1 << 5;
        const HANDLE = 1 << 6;
        const STAMP_POSITIONS = 1 << 7;
        /// Position or geometry changed; subscribers must be told.
        const POSITION_SUBSCRIBERS = 1 << 8;
    }
}

impl Dirty {
    /// Flags that are not stages; any stage may raise them.
    pub const SIGNALS: Self = Self::POSITION_SUBSCRIBERS;

    /// Flags whose change moves the entity or reshapes its geometry.
    pub const POSITIONAL: Self = Self::SCALE
        .union(Self::START)
        .union(Self::OFFSET)
        .union(Self::ROTATION)
        .union(Self::SPECIES)
        .union(Self::PATH_OBJECT)
        .union(Self::HANDLE)
        .union(Self::STAMP_POSITIONS)
        .union(Self::POSITION_SUBSCRIBERS);

    /// Every stage flag; a freshly created entity starts with all of them.
    pub const STAGES: Self = Self::POSITIONAL.difference(Self::SIGNALS);
}

/// One derived value in the fixed recompute order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Scale,
    Start,
    Offset,
    Rotation,
    Species,
    PathObject,
    Handle,
    StampPositions,
}

impl Stage {
    pub const ORDER: [Stage; 8] = [
        Stage::Scale,
        Stage::Start,
        Stage::Offset,
        Stage::Rotation,
        Stage::Species,
        Stage::PathObject,
        Stage::Handle,
        Stage::StampPositions,
    ];

    pub fn flag(self) -> Dirty {
        match self {
            Stage::Scale => Dirty::SCALE,
            Stage::Start => Dirty::START,
            Stage::Offset => Dirty::OFFSET,
            Stage::Rotation => Dirty::ROTATION,
            Stage::Species => Dirty::SPECIES,
            Stage::PathObject => Dirty::PATH_OBJECT,
            Stage::Handle => Dirty::HANDLE,
            Stage::StampPositions => Dirty::STAMP_POSITIONS,
        }
    }

    /// Everything recomputing this stage is allowed to raise.
    pub fn downstream(self) -> Dirty {
        let later = match self {
            Stage::Scale => Dirty::PATH_OBJECT | Dirty::HANDLE | Dirty::STAMP_POSITIONS,
            Stage::Start | Stage::Offset | Stage::Rotation | Stage::Handle => {
                Dirty::STAMP_POSITIONS
            }
            Stage::Species => Dirty::PATH_OBJECT,
            Stage::PathObject => Dirty::HANDLE | Dirty::STAMP_POSITIONS,
            Stage::StampPositions => Dirty::empty(),
        };
        later | Dirty::SIGNALS
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Scale => "scale",
            Stage::Start => "start",
            Stage::Offset => "offset",
            Stage::Rotation => "rotation",
            Stage::Species => "species",
            Stage::PathObject => "path_object",
            Stage::Handle => "handle",
            Stage::StampPositions => "stamp_positions",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/entity/flags.rs"]
mod tests;
