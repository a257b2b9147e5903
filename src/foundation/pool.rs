use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(1);

/// Pool configuration for retained scratch buffers.
#[derive(Debug, Clone, Copy)]
pub struct ScratchPoolOpts {
    /// Maximum number of cleared buffers kept for reuse.
    pub max_retained: usize,
}

impl Default for ScratchPoolOpts {
    fn default() -> Self {
        Self { max_retained: 16 }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScratchPoolStats {
    pub retained: usize,
    pub outstanding: usize,
    pub acquired: u64,
    pub allocated: u64,
    pub dropped_on_release: u64,
}

/// A scratch buffer on loan from a [`ScratchPool`].
///
/// The handle is not `Clone` and [`ScratchPool::release`] takes it by value, so a released
/// buffer cannot be touched again.
#[derive(Debug)]
pub struct Scratch<T> {
    buf: Vec<T>,
    pool_id: u32,
    generation: u64,
}

impl<T> Deref for Scratch<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.buf
    }
}

impl<T> DerefMut for Scratch<T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.buf
    }
}

/// Bounded pool of reusable `Vec<T>` buffers.
///
/// Used for per-frame scratch work (bucket sorting, curve sampling) so steady-state frames
/// do not allocate. Acquire/release must bracket a single call; handles never outlive it.
#[derive(Debug)]
pub struct ScratchPool<T> {
    id: u32,
    opts: ScratchPoolOpts,
    stats: ScratchPoolStats,
    free: Vec<Vec<T>>,
    next_generation: u64,
    live: BTreeSet<u64>,
}

impl<T> Default for ScratchPool<T> {
    fn default() -> Self {
        Self::new(ScratchPoolOpts::default())
    }
}

impl<T> ScratchPool<T> {
    pub fn new(opts: ScratchPoolOpts) -> Self {
        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            opts,
            stats: ScratchPoolStats::default(),
            free: Vec::new(),
            next_generation: 0,
            live: BTreeSet::new(),
        }
    }

    pub fn stats(&self) -> ScratchPoolStats {
        self.stats.clone()
    }

    pub fn acquire(&mut self) -> Scratch<T> {
        self.stats.acquired = self.stats.acquired.saturating_add(1);
        let buf = match self.free.pop() {
            Some(buf) => {
                self.stats.retained = self.stats.retained.saturating_sub(1);
                buf
            }
            None => {
                self.stats.allocated = self.stats.allocated.saturating_add(1);
                Vec::new()
            }
        };

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        self.live.insert(generation);
        self.stats.outstanding = self.live.len();

        Scratch {
            buf,
            pool_id: self.id,
            generation,
        }
    }

    pub fn release(&mut self, scratch: Scratch<T>) {
        debug_assert_eq!(
            scratch.pool_id, self.id,
            "scratch buffer released into a pool that did not hand it out"
        );
        let was_live = self.live.remove(&scratch.generation);
        debug_assert!(was_live, "scratch buffer released twice");
        self.stats.outstanding = self.live.len();

        if scratch.pool_id != self.id || self.free.len() >= self.opts.max_retained {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let mut buf = scratch.buf;
        buf.clear();
        self.free.push(buf);
        self.stats.retained = self.free.len();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/pool.rs"]
mod tests;
