use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::foundation::core::order_bucket;
use crate::foundation::pool::{ScratchPool, ScratchPoolOpts};

/// Bucket spans wider than this (beyond the member count) fall back to a stable comparison
/// sort; the result is identical, only the scratch footprint differs.
const MAX_DENSE_SPAN: i64 = 4096;

#[derive(Clone, Debug)]
struct Member<K> {
    key: K,
    order: f64,
}

/// Membership set with a lazily rebuilt, bucket-sorted view.
///
/// Members are grouped by `floor(order)` (non-finite orders land in bucket 0) and listed from
/// the lowest bucket to the highest. Within a bucket, insertion order is preserved. Any change
/// to membership or to a member's bucket marks the view stale; the next [`sorted`] call
/// rebuilds it once and hands out the same `Arc` until the next change.
///
/// [`sorted`]: OrderedRegistry::sorted
#[derive(Debug)]
pub struct OrderedRegistry<K> {
    members: Vec<Member<K>>,
    index: HashMap<K, usize>,
    sorted: Arc<[K]>,
    stale: bool,
    pool: ScratchPool<usize>,
}

impl<K: Clone + Eq + Hash> Default for OrderedRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash> OrderedRegistry<K> {
    pub fn new() -> Self {
        Self::with_pool_opts(ScratchPoolOpts::default())
    }

    pub fn with_pool_opts(opts: ScratchPoolOpts) -> Self {
        Self {
            members: Vec::new(),
            index: HashMap::new(),
            sorted: Arc::from(Vec::<K>::new()),
            stale: false,
            pool: ScratchPool::new(opts),
        }
    }

    /// Add `key`; returns `false` if it was already a member (its order is still updated).
    pub fn insert(&mut self, key: K, order: f64) -> bool {
        if self.set_order(&key, order) {
            return false;
        }
        self.index.insert(key.clone(), self.members.len());
        self.members.push(Member { key, order });
        self.stale = true;
        true
    }

    pub fn remove(&mut self, key: &K) -> bool {
        let Some(idx) = self.index.remove(key) else {
            return false;
        };
        self.members.remove(idx);
        for m in &self.members[idx..] {
            if let Some(i) = self.index.get_mut(&m.key) {
                *i -= 1;
            }
        }
        self.stale = true;
        true
    }

    /// Update a member's order; returns `false` if `key` is not a member.
    pub fn set_order(&mut self, key: &K, order: f64) -> bool {
        let Some(&i) = self.index.get(key) else {
            return false;
        };
        let m = &mut self.members[i];
        if order_bucket(m.order) != order_bucket(order) {
            self.stale = true;
        }
        m.order = order;
        true
    }

    pub fn order_of(&self, key: &K) -> Option<f64> {
        self.index.get(key).map(|&i| self.members[i].order)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Members in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.members.iter().map(|m| &m.key)
    }

    /// Members and their current orders, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&K, f64)> {
        self.members.iter().map(|m| (&m.key, m.order))
    }

    /// The bucket-sorted view, rebuilt only if membership or a bucket changed.
    pub fn sorted(&mut self) -> Arc<[K]> {
        if self.stale {
            self.rebuild();
        }
        Arc::clone(&self.sorted)
    }

    fn rebuild(&mut self) {
        self.stale = false;

        let n = self.members.len();
        if n == 0 {
            self.sorted = Arc::from(Vec::<K>::new());
            return;
        }

        let (min, max) = self
            .members
            .iter()
            .map(|m| order_bucket(m.order))
            .fold((i64::MAX, i64::MIN), |(lo, hi), b| (lo.min(b), hi.max(b)));
        let span = max.saturating_sub(min);

        let mut out = self.pool.acquire();
        if span <= MAX_DENSE_SPAN.saturating_add(n as i64) {
            // Counting sort over buckets [min, max]; stable by construction.
            let k = span as usize + 1;
            let mut starts = self.pool.acquire();
            starts.resize(k + 1, 0);
            for m in &self.members {
                starts[(order_bucket(m.order) - min) as usize + 1] += 1;
            }
            for i in 1..starts.len() {
                starts[i] += starts[i - 1];
            }
            out.resize(n, 0);
            for (i, m) in self.members.iter().enumerate() {
                let slot = &mut starts[(order_bucket(m.order) - min) as usize];
                out[*slot] = i;
                *slot += 1;
            }
            self.pool.release(starts);
        } else {
            out.extend(0..n);
            out.sort_by_key(|&i| order_bucket(self.members[i].order));
        }

        self.sorted = out
            .iter()
            .map(|&i| self.members[i].key.clone())
            .collect::<Vec<_>>()
            .into();
        self.pool.release(out);

        tracing::debug!(
            members = n,
            buckets = span.saturating_add(1),
            "registry re-sorted"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/registry.rs"]
mod tests;
