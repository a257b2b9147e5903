use kurbo::{Affine, BezPath, Point, Rect, Shape, Size, Vec2};

use crate::config::settings::PathSettings;
use crate::entity::coord::{Coord, CoordPair};
use crate::entity::flags::{Dirty, Stage};
use crate::foundation::core::LocalBox;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::pool::ScratchPool;
use crate::geometry::path::PathGeometry;
use crate::geometry::species::ShapeSpecies;

/// Stable handle to an entity in an [`EntityStore`](crate::EntityStore).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct EntityId(u32);

impl EntityId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an entity follows on each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockTo {
    /// Own start coordinate.
    #[default]
    Start,
    Pivot,
    Path,
    Mimic,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    Shape { species: ShapeSpecies },
    /// Plain rectangle sized against the host.
    Block { width: Coord, height: Coord },
}

/// World-space point on an entity's path.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PathPositionData {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl PathPositionData {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct PivotData {
    pub stamp_position: Point,
    pub rotation: f64,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct MimicData {
    pub start: Point,
    pub offset: Vec2,
    pub rotation: f64,
    pub scale: f64,
}

/// Fresh values read from an entity's references before its pass runs.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct References {
    pub pivot: Option<PivotData>,
    pub path: Option<PathPositionData>,
    pub mimic: Option<MimicData>,
}

/// A positionable, optionally path-bearing scene entity.
///
/// Setters store the value and raise the flags it directly implies; nothing is recomputed
/// until the owning store prepares the entity.
#[derive(Clone, Debug)]
pub struct Entity {
    name: String,
    kind: EntityKind,

    start: CoordPair,
    handle: CoordPair,
    offset: CoordPair,
    scale: f64,
    roll: f64,
    flip_reverse: bool,
    flip_upend: bool,
    host: Size,
    order: f64,

    use_as_path: bool,
    constant_path_speed: bool,
    precision: f64,
    curve_tolerance: f64,
    endpoint_epsilon: f64,

    lock_x: LockTo,
    lock_y: LockTo,
    path_position: f64,
    add_pivot_offset: bool,
    add_pivot_rotation: bool,
    add_path_offset: bool,
    add_path_rotation: bool,
    use_mimic_start: bool,
    use_mimic_offset: bool,
    use_mimic_rotation: bool,
    use_mimic_scale: bool,

    pub(crate) dirty: Dirty,
    pub(crate) current_path_data: Option<PathPositionData>,

    current_scale: f64,
    current_start: Point,
    current_offset: Vec2,
    current_rotation: f64,
    base_path: BezPath,
    local_path: BezPath,
    geometry: PathGeometry,
    current_handle: Vec2,
    stamp_position: Point,
    stamp_path: BezPath,
    transform: Affine,
}

impl Entity {
    pub(crate) fn new(name: String, kind: EntityKind, path: &PathSettings) -> Self {
        Self {
            name,
            kind,
            start: CoordPair::ZERO,
            handle: CoordPair::ZERO,
            offset: CoordPair::ZERO,
            scale: 1.0,
            roll: 0.0,
            flip_reverse: false,
            flip_upend: false,
            host: Size::ZERO,
            order: 0.0,
            use_as_path: false,
            constant_path_speed: false,
            precision: path.precision,
            curve_tolerance: path.curve_tolerance,
            endpoint_epsilon: path.endpoint_epsilon,
            lock_x: LockTo::Start,
            lock_y: LockTo::Start,
            path_position: 0.0,
            add_pivot_offset: true,
            add_pivot_rotation: false,
            add_path_offset: true,
            add_path_rotation: false,
            use_mimic_start: true,
            use_mimic_offset: true,
            use_mimic_rotation: true,
            use_mimic_scale: true,
            dirty: Dirty::STAGES,
            current_path_data: None,
            current_scale: 1.0,
            current_start: Point::ZERO,
            current_offset: Vec2::ZERO,
            current_rotation: 0.0,
            base_path: BezPath::new(),
            local_path: BezPath::new(),
            geometry: PathGeometry::default(),
            current_handle: Vec2::ZERO,
            stamp_position: Point::ZERO,
            stamp_path: BezPath::new(),
            transform: Affine::IDENTITY,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Flags still waiting for the next prepare.
    pub fn dirty(&self) -> Dirty {
        self.dirty
    }

    pub fn start(&self) -> CoordPair {
        self.start
    }

    pub fn handle(&self) -> CoordPair {
        self.handle
    }

    pub fn offset(&self) -> CoordPair {
        self.offset
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn roll(&self) -> f64 {
        self.roll
    }

    pub fn order(&self) -> f64 {
        self.order
    }

    pub fn lock(&self) -> (LockTo, LockTo) {
        (self.lock_x, self.lock_y)
    }

    pub fn path_position(&self) -> f64 {
        self.path_position
    }

    pub fn use_as_path(&self) -> bool {
        self.use_as_path
    }

    pub fn constant_path_speed(&self) -> bool {
        self.constant_path_speed
    }

    pub fn set_start(&mut self, start: impl Into<CoordPair>) {
        self.start = start.into();
        self.dirty |= Dirty::START;
    }

    pub fn set_handle(&mut self, handle: impl Into<CoordPair>) {
        self.handle = handle.into();
        self.dirty |= Dirty::HANDLE;
    }

    pub fn set_offset(&mut self, offset: impl Into<CoordPair>) {
        self.offset = offset.into();
        self.dirty |= Dirty::OFFSET;
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
        self.dirty |= Dirty::SCALE;
    }

    /// Rotation in degrees.
    pub fn set_roll(&mut self, roll: f64) {
        self.roll = roll;
        self.dirty |= Dirty::ROTATION;
    }

    /// Mirror horizontally.
    pub fn set_flip_reverse(&mut self, on: bool) {
        self.flip_reverse = on;
        self.dirty |= Dirty::STAMP_POSITIONS;
    }

    /// Mirror vertically.
    pub fn set_flip_upend(&mut self, on: bool) {
        self.flip_upend = on;
        self.dirty |= Dirty::STAMP_POSITIONS;
    }

    /// Replace the shape recipe. No effect on block entities.
    pub fn set_species(&mut self, species: ShapeSpecies) {
        if let EntityKind::Shape { species: s } = &mut self.kind {
            *s = species;
            self.dirty |= Dirty::SPECIES;
        }
    }

    /// Resize a block entity. No effect on shapes.
    pub fn set_dimensions(&mut self, width: Coord, height: Coord) {
        if let EntityKind::Block { width: w, height: h } = &mut self.kind {
            *w = width;
            *h = height;
            self.dirty |= Dirty::SPECIES;
        }
    }

    pub fn set_use_as_path(&mut self, on: bool) {
        self.use_as_path = on;
        self.dirty |= Dirty::PATH_OBJECT;
    }

    pub fn set_constant_path_speed(&mut self, on: bool) {
        self.constant_path_speed = on;
        self.dirty |= Dirty::POSITION_SUBSCRIBERS;
    }

    pub fn set_precision(&mut self, precision: f64) {
        self.precision = precision;
        self.dirty |= Dirty::PATH_OBJECT;
    }

    pub fn set_lock_to(&mut self, lock: LockTo) {
        self.relock(lock, lock);
    }

    pub fn set_lock_x(&mut self, lock: LockTo) {
        self.relock(lock, self.lock_y);
    }

    pub fn set_lock_y(&mut self, lock: LockTo) {
        self.relock(self.lock_x, lock);
    }

    fn relock(&mut self, x: LockTo, y: LockTo) {
        // Scale only depends on the lock through a mimic reference.
        let mimic = [self.lock_x, self.lock_y, x, y].contains(&LockTo::Mimic);
        self.lock_x = x;
        self.lock_y = y;
        self.dirty |= Dirty::START | Dirty::OFFSET | Dirty::ROTATION;
        if mimic {
            self.dirty |= Dirty::SCALE;
        }
    }

    /// Normalized distance along the path reference.
    pub fn set_path_position(&mut self, p: f64) {
        self.path_position = p;
        self.current_path_data = None;
        self.dirty |= Dirty::START | Dirty::ROTATION;
    }

    pub fn set_host_dimensions(&mut self, host: Size) {
        self.host = host;
        self.dirty |= Dirty::START | Dirty::OFFSET;
        if matches!(self.kind, EntityKind::Block { .. }) {
            self.dirty |= Dirty::SPECIES;
        }
    }

    /// Stacking order inside the groups that draw this entity.
    pub fn set_order(&mut self, order: f64) {
        self.order = order;
    }

    pub fn set_add_pivot_offset(&mut self, on: bool) {
        self.add_pivot_offset = on;
        self.dirty |= Dirty::START;
    }

    pub fn set_add_pivot_rotation(&mut self, on: bool) {
        self.add_pivot_rotation = on;
        self.dirty |= Dirty::ROTATION;
    }

    pub fn set_add_path_offset(&mut self, on: bool) {
        self.add_path_offset = on;
        self.dirty |= Dirty::START;
    }

    pub fn set_add_path_rotation(&mut self, on: bool) {
        self.add_path_rotation = on;
        self.dirty |= Dirty::ROTATION;
    }

    pub fn set_use_mimic_start(&mut self, on: bool) {
        self.use_mimic_start = on;
        self.dirty |= Dirty::START;
    }

    pub fn set_use_mimic_offset(&mut self, on: bool) {
        self.use_mimic_offset = on;
        self.dirty |= Dirty::OFFSET;
    }

    pub fn set_use_mimic_rotation(&mut self, on: bool) {
        self.use_mimic_rotation = on;
        self.dirty |= Dirty::ROTATION;
    }

    pub fn set_use_mimic_scale(&mut self, on: bool) {
        self.use_mimic_scale = on;
        self.dirty |= Dirty::SCALE;
    }

    // Derived values. The store only hands these out after a successful prepare.

    pub(crate) fn stamp_position(&self) -> Point {
        self.stamp_position
    }

    pub(crate) fn stamp_handle_position(&self) -> Vec2 {
        self.current_handle
    }

    pub(crate) fn local_box(&self) -> LocalBox {
        self.geometry.local_box()
    }

    pub(crate) fn path_length(&self) -> f64 {
        self.geometry.length()
    }

    pub(crate) fn stamp_path(&self) -> &BezPath {
        &self.stamp_path
    }

    pub(crate) fn transform(&self) -> Affine {
        self.transform
    }

    pub(crate) fn rotation(&self) -> f64 {
        self.current_rotation
    }

    pub(crate) fn pivot_data(&self) -> PivotData {
        PivotData {
            stamp_position: self.stamp_position,
            rotation: self.current_rotation,
        }
    }

    pub(crate) fn mimic_data(&self) -> MimicData {
        MimicData {
            start: self.current_start,
            offset: self.current_offset,
            rotation: self.current_rotation,
            scale: self.current_scale,
        }
    }

    pub(crate) fn follows(&self, lock: LockTo) -> bool {
        self.lock_x == lock || self.lock_y == lock
    }

    /// Drop back to own coordinates on every axis that followed `lock`.
    pub(crate) fn release_lock(&mut self, lock: LockTo) {
        if self.lock_x == lock {
            self.lock_x = LockTo::Start;
        }
        if self.lock_y == lock {
            self.lock_y = LockTo::Start;
        }
        if lock == LockTo::Path {
            self.current_path_data = None;
        }
        self.dirty |= Dirty::START | Dirty::OFFSET | Dirty::ROTATION | Dirty::SCALE;
    }

    /// World-space position and tangent angle at `p` along this entity's path.
    pub(crate) fn path_position_data(
        &self,
        p: f64,
        constant_speed: bool,
    ) -> Option<PathPositionData> {
        let local = self
            .geometry
            .point_at(p, constant_speed, self.endpoint_epsilon)?;
        let world = self.transform * (local.point - self.current_handle);
        let mut angle = local.angle;
        if self.flip_reverse != self.flip_upend {
            angle = -angle;
        }
        angle += self.current_rotation;
        Some(PathPositionData {
            x: world.x,
            y: world.y,
            angle,
        })
    }

    /// Run the ordered recompute pass over whatever is dirty.
    ///
    /// On error the flags of the pass are restored so the entity retries next frame.
    pub(crate) fn prepare(
        &mut self,
        refs: &References,
        scratch: &mut ScratchPool<f64>,
    ) -> SceneResult<()> {
        let before = self.dirty;
        for stage in Stage::ORDER {
            if !self.dirty.contains(stage.flag()) {
                continue;
            }
            match self.clean(stage, refs, scratch) {
                Ok(raised) => {
                    debug_assert!(
                        stage.downstream().contains(raised),
                        "{} raised {raised:?} outside its downstream set",
                        stage.label()
                    );
                    self.dirty.remove(stage.flag());
                    self.dirty |= raised;
                }
                Err(err) => {
                    self.dirty |= before;
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn clean(
        &mut self,
        stage: Stage,
        refs: &References,
        scratch: &mut ScratchPool<f64>,
    ) -> SceneResult<Dirty> {
        tracing::trace!(entity = %self.name, stage = stage.label(), "recompute");
        match stage {
            Stage::Scale => self.clean_scale(refs),
            Stage::Start => self.clean_start(refs),
            Stage::Offset => self.clean_offset(refs),
            Stage::Rotation => Ok(self.clean_rotation(refs)),
            Stage::Species => Ok(self.clean_species()),
            Stage::PathObject => Ok(self.clean_path_object(scratch)),
            Stage::Handle => Ok(self.clean_handle()),
            Stage::StampPositions => Ok(self.clean_stamp_positions()),
        }
    }

    fn clean_scale(&mut self, refs: &References) -> SceneResult<Dirty> {
        let mut scale = self.scale;
        if self.use_mimic_scale
            && self.follows(LockTo::Mimic)
            && let Some(m) = refs.mimic
        {
            scale *= m.scale;
        }
        if !scale.is_finite() {
            return Err(SceneError::recompute(format!(
                "entity '{}': scale {scale} is not finite",
                self.name
            )));
        }
        if scale == self.current_scale {
            return Ok(Dirty::empty());
        }
        self.current_scale = scale;
        Ok(Dirty::PATH_OBJECT | Dirty::HANDLE | Dirty::STAMP_POSITIONS)
    }

    fn axis_start(&self, lock: LockTo, own: f64, refs: &References, pick: fn(Point) -> f64) -> f64 {
        match lock {
            LockTo::Start => own,
            LockTo::Pivot => match refs.pivot {
                Some(p) => pick(p.stamp_position) + if self.add_pivot_offset { own } else { 0.0 },
                None => own,
            },
            LockTo::Path => match refs.path {
                Some(p) => pick(p.point()) + if self.add_path_offset { own } else { 0.0 },
                None => own,
            },
            LockTo::Mimic => match refs.mimic {
                Some(m) if self.use_mimic_start => pick(m.start) + own,
                _ => own,
            },
        }
    }

    fn clean_start(&mut self, refs: &References) -> SceneResult<Dirty> {
        if !self.start.is_finite() {
            return Err(SceneError::recompute(format!(
                "entity '{}': start is not finite",
                self.name
            )));
        }
        let own = self.start.resolve(self.host);
        let start = Point::new(
            self.axis_start(self.lock_x, own.x, refs, |p| p.x),
            self.axis_start(self.lock_y, own.y, refs, |p| p.y),
        );
        if !start.is_finite() {
            return Err(SceneError::recompute(format!(
                "entity '{}': reference position is not finite",
                self.name
            )));
        }
        if start == self.current_start {
            return Ok(Dirty::empty());
        }
        self.current_start = start;
        Ok(Dirty::STAMP_POSITIONS)
    }

    fn clean_offset(&mut self, refs: &References) -> SceneResult<Dirty> {
        if !self.offset.is_finite() {
            return Err(SceneError::recompute(format!(
                "entity '{}': offset is not finite",
                self.name
            )));
        }
        let mut offset = self.offset.resolve(self.host);
        if self.use_mimic_offset
            && self.follows(LockTo::Mimic)
            && let Some(m) = refs.mimic
        {
            offset += m.offset;
        }
        if offset == self.current_offset {
            return Ok(Dirty::empty());
        }
        self.current_offset = offset;
        Ok(Dirty::STAMP_POSITIONS)
    }

    fn clean_rotation(&mut self, refs: &References) -> Dirty {
        let mut rotation = self.roll;
        if self.add_pivot_rotation
            && self.follows(LockTo::Pivot)
            && let Some(p) = refs.pivot
        {
            rotation += p.rotation;
        }
        if self.add_path_rotation
            && self.follows(LockTo::Path)
            && let Some(p) = refs.path
        {
            rotation += p.angle;
        }
        if self.use_mimic_rotation
            && self.follows(LockTo::Mimic)
            && let Some(m) = refs.mimic
        {
            rotation += m.rotation;
        }
        if rotation == self.current_rotation {
            return Dirty::empty();
        }
        self.current_rotation = rotation;
        Dirty::STAMP_POSITIONS
    }

    fn clean_species(&mut self) -> Dirty {
        let built = match &self.kind {
            EntityKind::Shape { species } => species.build_path(self.curve_tolerance),
            EntityKind::Block { width, height } => {
                let (w, h) = (width.resolve(self.host.width), height.resolve(self.host.height));
                if w.is_finite() && h.is_finite() {
                    Ok(Rect::new(0.0, 0.0, w, h).to_path(self.curve_tolerance))
                } else {
                    Err(SceneError::validation("block dimensions must be finite"))
                }
            }
        };
        self.base_path = built.unwrap_or_else(|err| {
            tracing::warn!(entity = %self.name, %err, "shape recipe failed; drawing an empty path");
            BezPath::new()
        });
        Dirty::PATH_OBJECT
    }

    fn clean_path_object(&mut self, scratch: &mut ScratchPool<f64>) -> Dirty {
        self.local_path = Affine::scale(self.current_scale) * &self.base_path;
        self.geometry =
            PathGeometry::build(&self.local_path, self.use_as_path, self.precision, scratch);
        Dirty::HANDLE | Dirty::STAMP_POSITIONS | Dirty::POSITION_SUBSCRIBERS
    }

    fn clean_handle(&mut self) -> Dirty {
        let b = self.geometry.local_box();
        let resolve = |c: Coord, origin: f64, extent: f64| match c {
            Coord::Px(v) => v,
            Coord::Percent(_) => origin + c.resolve(extent),
        };
        let handle = Vec2::new(
            resolve(self.handle.x, b.x, b.width),
            resolve(self.handle.y, b.y, b.height),
        );
        if handle == self.current_handle {
            return Dirty::empty();
        }
        self.current_handle = handle;
        Dirty::STAMP_POSITIONS
    }

    fn clean_stamp_positions(&mut self) -> Dirty {
        let position = self.current_start + self.current_offset;
        let flip = Affine::scale_non_uniform(
            if self.flip_reverse { -1.0 } else { 1.0 },
            if self.flip_upend { -1.0 } else { 1.0 },
        );
        let transform = Affine::translate(position.to_vec2())
            * Affine::rotate(self.current_rotation.to_radians())
            * flip;
        self.stamp_path = Affine::translate(-self.current_handle) * &self.local_path;

        let moved = position != self.stamp_position || transform != self.transform;
        self.stamp_position = position;
        self.transform = transform;
        if moved {
            Dirty::POSITION_SUBSCRIBERS
        } else {
            Dirty::empty()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/entity/entity.rs"]
mod tests;
