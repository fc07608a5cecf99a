//! Action-value table keyed by canonical state

use std::collections::HashMap;

use crate::types::{ActionValues, BOARD_SIZE, CanonicalKey};

/// Maps canonical keys to nine action values.
///
/// Entries grow lazily: a key that was never written reads as all zeros.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    values: HashMap<CanonicalKey, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values stored for `key`, or zeros if absent
    pub fn get(&self, key: &CanonicalKey) -> ActionValues {
        self.values.get(key).copied().unwrap_or([0.0; BOARD_SIZE])
    }

    pub fn contains(&self, key: &CanonicalKey) -> bool {
        self.values.contains_key(key)
    }

    /// Mutable entry for `key`, inserted as zeros on first access
    pub fn entry(&mut self, key: &CanonicalKey) -> &mut ActionValues {
        self.values.entry(key.clone()).or_insert([0.0; BOARD_SIZE])
    }

    pub fn insert(&mut self, key: CanonicalKey, values: ActionValues) {
        self.values.insert(key, values);
    }

    /// Largest value over `actions`, zero when there are none
    pub fn max_over(&self, key: &CanonicalKey, actions: &[usize]) -> f64 {
        let Some(values) = self.values.get(key) else {
            return 0.0;
        };
        actions
            .iter()
            .map(|&a| values[a])
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))))
            .unwrap_or(0.0)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CanonicalKey> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &ActionValues)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
