//! Batched self-play training
//!
//! Episodes of a batch run on a worker pool against a read-only learner.
//! Each worker returns an [`EpisodeTrace`]; the coordinator then replays the
//! traces in episode order into the learner, so the tables and the replay
//! buffer only ever change on one thread.

use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    time::Instant,
};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use rayon::{ThreadPool, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Result,
    config::{LearnerConfig, TrainingConfig},
    policy::HybridPolicy,
    ports::Observer,
    q_learning::{DualQLearner, shaped_reward},
    tictactoe::{GameState, Outcome, Player, canonicalize},
    types::CanonicalKey,
};

/// One move of a self-play episode, in the canonical frame of the mover.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub key: CanonicalKey,
    pub action: usize,
    pub mover: Player,
    pub next_key: CanonicalKey,
    /// Shaping reward for the position after the move
    pub reward: f64,
}

/// Everything the coordinator needs to learn from one finished episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeTrace {
    pub outcome: Outcome,
    pub steps: Vec<Step>,
}

impl EpisodeTrace {
    pub fn length(&self) -> usize {
        self.steps.len()
    }
}

/// Running statistics at one point of a training run.
///
/// Rates are cumulative percentages over the episodes of the current run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSnapshot {
    pub episode: u64,
    pub p1_win_rate: f64,
    pub p2_win_rate: f64,
    pub draw_rate: f64,
    pub epsilon: f64,
    pub alpha: f64,
    pub total_states: usize,
    /// Mean length of the most recent episodes
    pub avg_episode_length: f64,
    pub experience_buffer_size: usize,
    pub episodes_per_second: f64,
}

/// Stability measure computed at one statistics point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceMetric {
    pub episode: u64,
    pub score: f64,
    pub p1_std: f64,
    pub draw_std: f64,
}

/// Summary returned by [`SelfPlayTrainer::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub episodes: u64,
    pub converged: bool,
    pub elapsed_secs: f64,
    pub final_snapshot: TrainingSnapshot,
    pub history: Vec<TrainingSnapshot>,
    pub convergence: Vec<ConvergenceMetric>,
}

impl TrainingReport {
    /// Save the report as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct OutcomeCounts {
    p1: u64,
    p2: u64,
    draws: u64,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win(Player::X) => self.p1 += 1,
            Outcome::Win(Player::O) => self.p2 += 1,
            _ => self.draws += 1,
        }
    }

    fn total(&self) -> u64 {
        self.p1 + self.p2 + self.draws
    }

    fn percentages(&self) -> (f64, f64, f64) {
        let total = self.total();
        if total == 0 {
            return (0.0, 0.0, 0.0);
        }
        let pct = |n: u64| n as f64 / total as f64 * 100.0;
        (pct(self.p1), pct(self.p2), pct(self.draws))
    }
}

/// Episodes kept for the running mean length
const LENGTH_WINDOW: usize = 10_000;

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Convergence score over the last `window` snapshots, if there are enough.
///
/// The score is the mean of the standard deviations of the P1-win and draw
/// percentages. Read-only.
pub fn convergence_score(
    history: &[TrainingSnapshot],
    window: usize,
) -> Option<ConvergenceMetric> {
    if window == 0 || history.len() < window {
        return None;
    }
    let recent = &history[history.len() - window..];
    let p1: Vec<f64> = recent.iter().map(|s| s.p1_win_rate).collect();
    let draws: Vec<f64> = recent.iter().map(|s| s.draw_rate).collect();
    let p1_std = std_dev(&p1);
    let draw_std = std_dev(&draws);
    Some(ConvergenceMetric {
        episode: recent[recent.len() - 1].episode,
        score: (p1_std + draw_std) / 2.0,
        p1_std,
        draw_std,
    })
}

/// Random position with 2-4 pieces placed alternately, X first.
///
/// Falls back to the empty board when the placement already decides the game.
pub fn random_start<R: Rng + ?Sized>(rng: &mut R) -> GameState {
    let pieces = rng.random_range(2..=4);
    let mut state = GameState::new();
    for _ in 0..pieces {
        let legal = state.legal_actions();
        let Some(&action) = legal.choose(rng) else {
            break;
        };
        if state.apply(action).is_err() {
            return GameState::new();
        }
    }
    if state.is_terminal() {
        GameState::new()
    } else {
        state
    }
}

/// Play one episode with the exploring hybrid policy, without learning.
pub fn play_episode<R: Rng + ?Sized>(
    learner: &DualQLearner,
    start: GameState,
    rng: &mut R,
) -> Result<EpisodeTrace> {
    let policy = HybridPolicy::new(learner);
    let shaping = &learner.config().shaping;
    let mut state = start;
    let mut steps = Vec::new();

    while !state.is_terminal() {
        let mover = state.to_move();
        let ctx = state.canonical_context();
        let action = policy.choose(&state, rng)?;
        state.apply(action)?;

        let reward = shaped_reward(state.cells(), mover, steps.len() + 1, shaping);
        let canonical_action = ctx.map_to_canonical(action);
        steps.push(Step {
            key: ctx.key,
            action: canonical_action,
            mover,
            next_key: canonicalize(&state),
            reward,
        });
    }

    Ok(EpisodeTrace {
        outcome: state.outcome(),
        steps,
    })
}

/// Feed a finished episode into the learner.
///
/// Every move but the last is learned with its shaping reward. The last move
/// is learned with the win or draw reward; after a win the loser's last move
/// is learned again with the loss reward. Both terminal updates do not
/// bootstrap.
pub fn apply_trace(learner: &mut DualQLearner, trace: &EpisodeTrace) -> Result<()> {
    let terminal = learner.config().terminal.clone();
    let Some((last, rest)) = trace.steps.split_last() else {
        learner.finish_episode();
        return Ok(());
    };

    for step in rest {
        learner.record_move(&step.key, step.action);
        learner.observe(
            step.key.clone(),
            step.action,
            step.reward,
            step.next_key.clone(),
            false,
        )?;
    }

    learner.record_move(&last.key, last.action);
    let last_reward = match trace.outcome {
        Outcome::Win(winner) if winner == last.mover => terminal.win,
        Outcome::Win(_) => terminal.loss,
        _ => terminal.draw,
    };
    learner.observe(
        last.key.clone(),
        last.action,
        last_reward,
        last.next_key.clone(),
        true,
    )?;

    if let (Outcome::Win(_), Some(loser_step)) = (trace.outcome, rest.last()) {
        learner.observe(
            loser_step.key.clone(),
            loser_step.action,
            terminal.loss,
            loser_step.next_key.clone(),
            true,
        )?;
    }

    learner.finish_episode();
    Ok(())
}

fn should_random_start<R: Rng + ?Sized>(
    config: &LearnerConfig,
    episode: u64,
    rng: &mut R,
) -> bool {
    episode > config.random_start_after && rng.random::<f64>() < config.random_start_probability
}

/// Seed of the episode with the given run-local index.
fn episode_seed(base: u64, index: u64) -> u64 {
    base.wrapping_add(index)
}

/// Owns a learner and runs self-play episodes into it.
pub struct SelfPlayTrainer {
    config: TrainingConfig,
    learner: DualQLearner,
    observers: Vec<Box<dyn Observer>>,
    output: Option<PathBuf>,
    base_seed: u64,
}

impl SelfPlayTrainer {
    pub fn new(config: TrainingConfig, learner: DualQLearner) -> Self {
        let base_seed = config.seed.unwrap_or_else(rand::random);
        Self {
            config,
            learner,
            observers: Vec::new(),
            output: None,
            base_seed,
        }
    }

    /// Add an observer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Save the table to this path at every save interval and at the end.
    pub fn with_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn learner(&self) -> &DualQLearner {
        &self.learner
    }

    pub fn into_learner(self) -> DualQLearner {
        self.learner
    }

    fn build_pool(&self) -> Option<ThreadPool> {
        if !self.config.parallel {
            return None;
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!(error = %e, "worker pool unavailable, training sequentially");
                None
            }
        }
    }

    /// Play `count` episodes starting at run-local index `first`.
    ///
    /// Results come back in episode order whether or not a pool is used.
    fn play_batch(
        &self,
        pool: Option<&ThreadPool>,
        first: u64,
        count: u64,
    ) -> Result<Vec<EpisodeTrace>> {
        let learner = &self.learner;
        let learner_config = learner.config();
        let trained_before = learner.episodes_trained();
        let base = self.base_seed;

        let run_one = |index: u64| -> Result<EpisodeTrace> {
            let mut rng = StdRng::seed_from_u64(episode_seed(base, index));
            let global = trained_before + (index - first) + 1;
            let start = if should_random_start(learner_config, global, &mut rng) {
                random_start(&mut rng)
            } else {
                GameState::new()
            };
            play_episode(learner, start, &mut rng)
        };

        match pool {
            Some(pool) => pool.install(|| {
                (first..first + count)
                    .into_par_iter()
                    .map(run_one)
                    .collect()
            }),
            None => (first..first + count).map(run_one).collect(),
        }
    }

    fn snapshot(
        &self,
        done: u64,
        counts: &OutcomeCounts,
        lengths: &VecDeque<usize>,
        started: Instant,
    ) -> TrainingSnapshot {
        let (p1, p2, draws) = counts.percentages();
        let stats = self.learner.statistics();
        let elapsed = started.elapsed().as_secs_f64();
        TrainingSnapshot {
            episode: done,
            p1_win_rate: p1,
            p2_win_rate: p2,
            draw_rate: draws,
            epsilon: stats.epsilon,
            alpha: stats.alpha,
            total_states: stats.total_states,
            avg_episode_length: if lengths.is_empty() {
                0.0
            } else {
                lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
            },
            experience_buffer_size: stats.experience_buffer_size,
            episodes_per_second: if elapsed > 0.0 {
                done as f64 / elapsed
            } else {
                0.0
            },
        }
    }

    fn save(&self) -> Result<()> {
        if let Some(path) = &self.output {
            self.learner.save(path)?;
        }
        Ok(())
    }

    /// Run the configured number of episodes, or fewer on convergence.
    ///
    /// # Errors
    ///
    /// Fails if an observer fails or a save cannot be written. The learner
    /// keeps everything learned up to the failing batch.
    pub fn run(&mut self) -> Result<TrainingReport> {
        let total = self.config.episodes;
        let batch_size = self.config.batch_size.max(1) as u64;
        let stats_interval = self.config.stats_interval.max(1);
        let save_interval = self.config.save_interval;
        let pool = self.build_pool();

        info!(
            episodes = total,
            batch_size,
            parallel = pool.is_some(),
            workers = pool.as_ref().map_or(1, |p| p.current_num_threads()),
            seed = self.base_seed,
            "starting self-play training"
        );

        for observer in &mut self.observers {
            observer.on_training_start(total)?;
        }

        let started = Instant::now();
        let mut counts = OutcomeCounts::default();
        let mut lengths = VecDeque::with_capacity(LENGTH_WINDOW);
        let mut history = Vec::new();
        let mut convergence = Vec::new();
        let mut converged = false;
        let mut done = 0u64;

        while done < total {
            let count = batch_size.min(total - done);
            let traces = self.play_batch(pool.as_ref(), done, count)?;

            for trace in &traces {
                apply_trace(&mut self.learner, trace)?;
                counts.record(trace.outcome);
                if lengths.len() == LENGTH_WINDOW {
                    lengths.pop_front();
                }
                lengths.push_back(trace.length());
            }

            let previous = done;
            done += count;
            let snapshot = self.snapshot(done, &counts, &lengths, started);
            debug!(episode = done, states = snapshot.total_states, "batch applied");

            for observer in &mut self.observers {
                observer.on_batch_end(done, &snapshot)?;
            }

            if done / stats_interval > previous / stats_interval {
                info!(
                    episode = done,
                    p1_win_rate = snapshot.p1_win_rate,
                    p2_win_rate = snapshot.p2_win_rate,
                    draw_rate = snapshot.draw_rate,
                    epsilon = snapshot.epsilon,
                    alpha = snapshot.alpha,
                    states = snapshot.total_states,
                    buffer = snapshot.experience_buffer_size,
                    "training statistics"
                );
                for observer in &mut self.observers {
                    observer.on_statistics(&snapshot)?;
                }
                history.push(snapshot);

                if self.config.early_stopping && done > self.config.convergence_min_episodes {
                    let window = self.config.convergence_window;
                    if let Some(metric) = convergence_score(&history, window) {
                        let score = metric.score;
                        convergence.push(metric);
                        if score < self.config.convergence_threshold {
                            info!(episode = done, score, "training converged");
                            converged = true;
                        }
                    }
                }
            }

            if save_interval > 0 && done / save_interval > previous / save_interval {
                self.save()?;
            }

            if converged {
                break;
            }
        }

        self.save()?;

        let final_snapshot = self.snapshot(done, &counts, &lengths, started);
        for observer in &mut self.observers {
            observer.on_training_end(&final_snapshot)?;
        }

        info!(
            episodes = done,
            states = final_snapshot.total_states,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "training finished"
        );

        Ok(TrainingReport {
            episodes: done,
            converged,
            elapsed_secs: started.elapsed().as_secs_f64(),
            final_snapshot,
            history,
            convergence,
        })
    }
}
