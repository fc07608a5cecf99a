//! Double Q-learning with prioritized replay and Dyna-style planning

use std::collections::{BTreeMap, HashMap, HashSet};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    config::LearnerConfig,
    q_learning::{
        q_table::QTable,
        replay::{Experience, ReplayBuffer},
        schedule::TrainingSchedule,
    },
    tictactoe::GameState,
    types::{ActionValues, BOARD_SIZE, CanonicalKey},
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Snapshot of the learner's counters and rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerStatistics {
    pub total_states: usize,
    pub episodes_trained: u64,
    pub total_steps: u64,
    pub alpha: f64,
    pub epsilon: f64,
    pub gamma: f64,
    pub double_q: bool,
    pub dyna: bool,
    pub experience_buffer_size: usize,
    pub move_patterns: usize,
}

/// Aggregate of positive combined values seen at one board position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPreference {
    pub average_q: f64,
    pub max_q: f64,
    pub frequency: usize,
}

/// Combined values for one position, in the position's own coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSummary {
    pub key: CanonicalKey,
    pub q_values: ActionValues,
    pub max_q: f64,
    pub min_q: f64,
    /// Up to three legal moves, best first
    pub preferred_actions: Vec<usize>,
}

/// Two action-value tables trained asymmetrically.
///
/// Each update picks one table to change and bootstraps from the other.
/// Values are stored in the canonical frame of their key; callers holding an
/// original-frame [`GameState`] go through [`select_action`](Self::select_action)
/// or [`action_values`](Self::action_values), which handle the mapping.
///
/// The learner owns its random source for table selection and replay
/// sampling. Action selection borrows a caller-provided source instead, so
/// worker threads can share `&DualQLearner` read-only.
#[derive(Debug, Clone)]
pub struct DualQLearner {
    config: LearnerConfig,
    schedule: TrainingSchedule,
    table_a: QTable,
    table_b: QTable,
    buffer: ReplayBuffer,
    total_steps: u64,
    episodes_trained: u64,
    move_frequency: HashMap<String, u64>,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl DualQLearner {
    pub fn new(config: LearnerConfig) -> Self {
        Self {
            schedule: TrainingSchedule::from_config(&config),
            buffer: ReplayBuffer::new(config.replay_capacity, config.prioritized_replay),
            config,
            table_a: QTable::new(),
            table_b: QTable::new(),
            total_steps: 0,
            episodes_trained: 0,
            move_frequency: HashMap::new(),
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn schedule(&self) -> &TrainingSchedule {
        &self.schedule
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn episodes_trained(&self) -> u64 {
        self.episodes_trained
    }

    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    pub fn table_a(&self) -> &QTable {
        &self.table_a
    }

    pub fn table_b(&self) -> &QTable {
        &self.table_b
    }

    pub fn move_frequency(&self) -> &HashMap<String, u64> {
        &self.move_frequency
    }

    /// Current exploration rate
    pub fn epsilon(&self) -> f64 {
        self.schedule.epsilon(self.total_steps)
    }

    /// Current learning rate
    pub fn alpha(&self) -> f64 {
        self.schedule.alpha(self.total_steps)
    }

    /// Combined (mean) value vector of both tables, canonical frame.
    ///
    /// A key absent from a table counts as all zeros there.
    pub fn value(&self, key: &CanonicalKey) -> ActionValues {
        let a = self.table_a.get(key);
        let b = self.table_b.get(key);
        let mut combined = [0.0; BOARD_SIZE];
        for (slot, (x, y)) in combined.iter_mut().zip(a.iter().zip(b.iter())) {
            *slot = (x + y) / 2.0;
        }
        combined
    }

    /// Combined values re-indexed to the state's own board coordinates
    pub fn action_values(&self, state: &GameState) -> ActionValues {
        let ctx = state.canonical_context();
        ctx.values_to_original(&self.value(&ctx.key))
    }

    /// Pick a legal move for `state`.
    ///
    /// With `explore`, a uniform draw below the current ε plays a random legal
    /// move. Otherwise the legal move with the highest combined value is
    /// played, ties broken uniformly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLegalActions`] if the state is terminal.
    pub fn select_action<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        explore: bool,
        rng: &mut R,
    ) -> Result<usize> {
        let legal = state.legal_actions();
        if legal.is_empty() {
            return Err(Error::NoLegalActions);
        }

        if explore && rng.random::<f64>() < self.epsilon() {
            return legal.choose(rng).copied().ok_or(Error::NoLegalActions);
        }

        self.greedy_action(state, &legal, rng)
    }

    fn greedy_action<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        legal: &[usize],
        rng: &mut R,
    ) -> Result<usize> {
        let ctx = state.canonical_context();
        let values = self.value(&ctx.key);

        let mut best = f64::NEG_INFINITY;
        let mut candidates = Vec::with_capacity(legal.len());
        for &action in legal {
            let v = values[ctx.map_to_canonical(action)];
            if v > best {
                best = v;
                candidates.clear();
                candidates.push(action);
            } else if v == best {
                candidates.push(action);
            }
        }

        candidates.choose(rng).copied().ok_or(Error::NoLegalActions)
    }

    /// Record one transition and learn from it.
    ///
    /// Performs one live double-Q update, stores the transition with
    /// priority `|TD error| + priority_floor`, advances the step counter, and
    /// then runs planning updates from the buffer once it is large enough.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMove`] if `action` is not a board index.
    pub fn observe(
        &mut self,
        key: CanonicalKey,
        action: usize,
        reward: f64,
        next_key: CanonicalKey,
        terminal: bool,
    ) -> Result<f64> {
        if action >= BOARD_SIZE {
            return Err(Error::InvalidMove { position: action });
        }

        let experience = Experience {
            key,
            action,
            reward,
            next_key,
            terminal,
        };
        let td_error = self.update(&experience);
        let priority = td_error.abs() + self.config.priority_floor;
        self.buffer.push(experience, priority);
        self.total_steps += 1;

        if self.config.dyna && self.buffer.len() > self.config.planning_threshold {
            self.replay(self.config.planning_steps);
        }

        Ok(td_error)
    }

    /// Re-apply the update rule to a batch drawn from the buffer, refreshing
    /// the priorities of the replayed slots.
    pub fn replay(&mut self, batch_size: usize) -> usize {
        let slots = self.buffer.sample(batch_size, &mut self.rng);
        let mut applied = 0;
        for slot in slots {
            let Some(experience) = self.buffer.get(slot).cloned() else {
                continue;
            };
            let td_error = self.update(&experience);
            self.buffer
                .update_priority(slot, td_error.abs() + self.config.priority_floor);
            applied += 1;
        }
        applied
    }

    /// One double-Q update; returns the TD error before the step.
    fn update(&mut self, experience: &Experience) -> f64 {
        let alpha = self.alpha();
        let gamma = self.config.gamma;
        let update_a = !self.config.double_q || self.rng.random_bool(0.5);

        let bootstrap = if experience.terminal {
            0.0
        } else {
            let next_actions = experience.next_key.empty_positions();
            let target_table = match (self.config.double_q, update_a) {
                (false, _) => &self.table_a,
                (true, true) => &self.table_b,
                (true, false) => &self.table_a,
            };
            target_table.max_over(&experience.next_key, &next_actions)
        };
        let target = experience.reward + gamma * bootstrap;

        let table = if update_a {
            &mut self.table_a
        } else {
            &mut self.table_b
        };
        let entry = table.entry(&experience.key);
        let td_error = target - entry[experience.action];
        entry[experience.action] += alpha * td_error;

        if !self.config.double_q {
            let values = *entry;
            self.table_b.insert(experience.key.clone(), values);
        }

        td_error
    }

    /// Count a move in the frequency histogram (canonical-frame action).
    pub fn record_move(&mut self, key: &CanonicalKey, action: usize) {
        *self
            .move_frequency
            .entry(format!("{key}_{action}"))
            .or_insert(0) += 1;
    }

    pub fn finish_episode(&mut self) {
        self.episodes_trained += 1;
    }

    /// Every key present in either table
    pub fn keys(&self) -> HashSet<&CanonicalKey> {
        self.table_a.keys().chain(self.table_b.keys()).collect()
    }

    pub fn statistics(&self) -> LearnerStatistics {
        LearnerStatistics {
            total_states: self.keys().len(),
            episodes_trained: self.episodes_trained,
            total_steps: self.total_steps,
            alpha: self.alpha(),
            epsilon: self.epsilon(),
            gamma: self.config.gamma,
            double_q: self.config.double_q,
            dyna: self.config.dyna,
            experience_buffer_size: self.buffer.len(),
            move_patterns: self.move_frequency.len(),
        }
    }

    /// Per-position summary of positive combined values, keyed `position_{n}`.
    pub fn strategic_preferences(&self) -> BTreeMap<String, PositionPreference> {
        let mut by_position: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        for key in self.keys() {
            let values = self.value(key);
            for (pos, &v) in values.iter().enumerate() {
                if v > 0.0 {
                    by_position.entry(pos).or_default().push(v);
                }
            }
        }

        by_position
            .into_iter()
            .map(|(pos, values)| {
                let sum: f64 = values.iter().sum();
                let max_q = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (
                    format!("position_{pos}"),
                    PositionPreference {
                        average_q: sum / values.len() as f64,
                        max_q,
                        frequency: values.len(),
                    },
                )
            })
            .collect()
    }

    /// Value breakdown for `state`: the combined vector, its extremes and
    /// the three highest-valued legal moves (lower index first on ties).
    pub fn value_summary(&self, state: &GameState) -> ValueSummary {
        let q_values = self.action_values(state);
        let mut preferred = state.legal_actions();
        preferred.sort_by(|&a, &b| q_values[b].total_cmp(&q_values[a]));
        preferred.truncate(3);

        ValueSummary {
            key: state.canonical_context().key,
            q_values,
            max_q: q_values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            min_q: q_values.iter().copied().fold(f64::INFINITY, f64::min),
            preferred_actions: preferred,
        }
    }

    /// Replace both tables with one set of values and restore counters.
    ///
    /// Tables A and B become identical; the replay buffer starts empty.
    pub(crate) fn restore(
        &mut self,
        entries: Vec<(CanonicalKey, ActionValues)>,
        episodes_trained: u64,
        total_steps: u64,
        move_frequency: HashMap<String, u64>,
    ) {
        self.table_a.clear();
        self.table_b.clear();
        self.buffer.clear();
        for (key, values) in entries {
            self.table_a.insert(key.clone(), values);
            self.table_b.insert(key, values);
        }
        self.episodes_trained = episodes_trained;
        self.total_steps = total_steps;
        self.move_frequency = move_frequency;
    }

    /// Drop all learned state and counters.
    pub fn reset(&mut self) {
        self.restore(Vec::new(), 0, 0, HashMap::new());
        self.rng = build_rng(self.rng_seed);
    }
}
