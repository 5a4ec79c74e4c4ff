//! Seeds and the deduplicating seed queue.

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

/// One unit of crawl work, usually a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub data: String,
    /// How many times this seed has been re-enqueued after a retry request.
    pub retries: u32,
}

impl Seed {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            retries: 0,
        }
    }

    pub(crate) fn retried(&self) -> Self {
        Self {
            data: self.data.clone(),
            retries: self.retries + 1,
        }
    }
}

/// FIFO seed queue with a seen-set.
///
/// `add` drops seeds whose data has been enqueued before; `add_force`
/// bypasses the seen-set, which is how retries re-enter the queue.
#[derive(Debug, Default)]
pub struct SeedManager {
    state: Mutex<SeedState>,
}

#[derive(Debug, Default)]
struct SeedState {
    queue: VecDeque<Seed>,
    seen: HashSet<String>,
}

impl SeedManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a seed unless its data was seen before. Returns whether it
    /// was enqueued.
    pub fn add(&self, seed: Seed) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.seen.insert(seed.data.clone()) {
            state.queue.push_back(seed);
            true
        } else {
            false
        }
    }

    /// Enqueues a seed regardless of the seen-set.
    pub fn add_force(&self, seed: Seed) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.seen.insert(seed.data.clone());
        state.queue.push_back(seed);
    }

    pub fn consume(&self) -> Option<Seed> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .queue
            .pop_front()
    }

    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .queue
            .len()
    }
}
