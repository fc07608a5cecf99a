//! Bounded experience replay with optional priority sampling

use rand::{
    Rng,
    distr::{Distribution, weighted::WeightedIndex},
    seq::index,
};
use serde::{Deserialize, Serialize};

use crate::types::CanonicalKey;

/// One observed transition, in the canonical frame of `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub key: CanonicalKey,
    pub action: usize,
    pub reward: f64,
    pub next_key: CanonicalKey,
    pub terminal: bool,
}

/// Fixed-capacity ring arena of transitions.
///
/// Payloads and priorities live in parallel vectors sharing one index. Once
/// full, `head` points at the oldest slot and each push overwrites it.
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    payload: Vec<Experience>,
    priorities: Vec<f64>,
    capacity: usize,
    head: usize,
    prioritized: bool,
}

impl ReplayBuffer {
    pub fn new(capacity: usize, prioritized: bool) -> Self {
        let capacity = capacity.max(1);
        ReplayBuffer {
            payload: Vec::with_capacity(capacity),
            priorities: Vec::with_capacity(capacity),
            capacity,
            head: 0,
            prioritized,
        }
    }

    /// Store a transition, evicting the oldest when full. Returns its slot.
    pub fn push(&mut self, experience: Experience, priority: f64) -> usize {
        let slot = self.head;
        if self.payload.len() < self.capacity {
            self.payload.push(experience);
            self.priorities.push(priority);
        } else {
            self.payload[slot] = experience;
            self.priorities[slot] = priority;
        }
        self.head = (self.head + 1) % self.capacity;
        slot
    }

    /// Choose slots to replay.
    ///
    /// Returns every slot when the buffer holds no more than `batch_size`
    /// transitions. Otherwise prioritized buffers draw with replacement in
    /// proportion to priority, and uniform buffers draw without replacement.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<usize> {
        let len = self.len();
        if len <= batch_size {
            return (0..len).collect();
        }

        if self.prioritized {
            if let Ok(dist) = WeightedIndex::new(&self.priorities) {
                return (0..batch_size).map(|_| dist.sample(rng)).collect();
            }
        }

        index::sample(rng, len, batch_size).into_vec()
    }

    pub fn get(&self, slot: usize) -> Option<&Experience> {
        self.payload.get(slot)
    }

    pub fn priority(&self, slot: usize) -> Option<f64> {
        self.priorities.get(slot).copied()
    }

    pub fn update_priority(&mut self, slot: usize, priority: f64) {
        if let Some(p) = self.priorities.get_mut(slot) {
            *p = priority;
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_prioritized(&self) -> bool {
        self.prioritized
    }

    pub fn clear(&mut self) {
        self.payload.clear();
        self.priorities.clear();
        self.head = 0;
    }
}
