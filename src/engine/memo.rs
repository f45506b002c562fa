//! Caller-owned memoization of adjustment results.
//!
//! Interactive front-ends recompute on every refresh even when neither the
//! upload nor the column choice changed. `MemoizedEngine` keys results by a
//! content hash of the inputs so identical requests share one `Adjustment`.
//! There is no global state: whoever owns the engine owns the cache.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use crate::domain::{Adjustment, InflationReference, RawObservation};
use crate::engine::adjust::compute;
use crate::error::EngineError;

const DEFAULT_CAPACITY: usize = 16;

struct Entry {
    observations: Vec<RawObservation>,
    reference: InflationReference,
    result: Arc<Adjustment>,
}

/// Bounded cache in front of `engine::compute` (oldest insertion evicted first).
pub struct MemoizedEngine {
    entries: HashMap<u64, Entry>,
    order: VecDeque<u64>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for MemoizedEngine {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MemoizedEngine {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Same contract as `engine::compute`; errors are never cached.
    pub fn compute(
        &mut self,
        observations: &[RawObservation],
        reference: &InflationReference,
    ) -> Result<Arc<Adjustment>, EngineError> {
        let key = content_hash(observations, reference);

        // The hash only narrows the lookup; equality of the stored inputs decides.
        if let Some(entry) = self.entries.get(&key) {
            if entry.observations == observations && &entry.reference == reference {
                self.hits += 1;
                debug!(key, "adjustment cache hit");
                return Ok(Arc::clone(&entry.result));
            }
        }

        self.misses += 1;
        let result = Arc::new(compute(observations, reference)?);
        self.insert(
            key,
            Entry {
                observations: observations.to_vec(),
                reference: reference.clone(),
                result: Arc::clone(&result),
            },
        );
        Ok(result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn insert(&mut self, key: u64, entry: Entry) {
        if self.entries.insert(key, entry).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else { break };
            self.entries.remove(&oldest);
        }
    }
}

/// Deterministic hash of the engine inputs (amounts/rates hashed by bit pattern).
pub fn content_hash(observations: &[RawObservation], reference: &InflationReference) -> u64 {
    let mut hasher = DefaultHasher::new();
    observations.len().hash(&mut hasher);
    for obs in observations {
        obs.period.hash(&mut hasher);
        obs.amount.to_bits().hash(&mut hasher);
    }
    reference.len().hash(&mut hasher);
    for (period, rate) in reference.iter() {
        period.hash(&mut hasher);
        rate.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}
