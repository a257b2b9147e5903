//! scene-cycle is the per-frame core of a retained-mode 2D scene library.
//!
//! It decides *when* work runs and *when* cached geometry must be rebuilt:
//!
//! 1. **Schedule**: a [`Scheduler`] runs named [`Task`]s once per frame signal, in bucket
//!    order (`floor(order)`, ties by insertion), against a snapshot of the active set.
//! 2. **Render cycle**: [`render`] runs `clear`, `compile` and `show` over the root surfaces in
//!    a [`SurfaceStore`], finishing each phase on every surface before the next phase starts.
//! 3. **Invalidate**: entities in an [`EntityStore`] carry [`Dirty`] flags raised by setters
//!    and resolved lazily, in a fixed order, when a surface compiles them or a read needs them.
//!    Pivot, path and mimic references push invalidation onto their subscribers.
//! 4. **Measure**: [`PathGeometry`] caches unit lengths and an arc-length table so positions
//!    along a path can be queried at constant speed.
//!
//! Everything is single-threaded and synchronous within a tick. `unsafe` is forbidden.
#![forbid(unsafe_code)]

mod config;
mod cycle;
mod entity;
mod foundation;
mod geometry;
mod schedule;

pub use config::settings::{PathSettings, PoolSettings, SchedulerSettings, Settings};
pub use cycle::orchestrator::{CycleReport, PhaseFailure, clear, compile, render, show};
pub use cycle::render_task::RenderTask;
pub use cycle::scene::Scene;
pub use cycle::stamp::{StampOp, StampSurface};
pub use cycle::store::SurfaceStore;
pub use cycle::surface::{Clearable, Compilable, Phase, RootSurface, Showable};
pub use entity::coord::{Coord, CoordPair};
pub use entity::entity::{Entity, EntityId, EntityKind, LockTo, PathPositionData};
pub use entity::flags::{Dirty, Stage};
pub use entity::links::LinkKind;
pub use entity::store::EntityStore;
pub use foundation::core::{Affine, BezPath, LocalBox, Point, Rect, Size, Vec2, order_bucket};
pub use foundation::error::{SceneError, SceneResult};
pub use foundation::pool::{Scratch, ScratchPool, ScratchPoolOpts, ScratchPoolStats};
pub use geometry::path::{LocalPathPoint, PathGeometry};
pub use geometry::segment::Unit;
pub use geometry::species::ShapeSpecies;
pub use schedule::driver::{FixedFrames, FrameDriver, FrameSignal, IntervalDriver};
pub use schedule::registry::OrderedRegistry;
pub use schedule::scheduler::{Frame, Scheduler, TickReport};
pub use schedule::task::{Task, TaskFn, TaskHook};
