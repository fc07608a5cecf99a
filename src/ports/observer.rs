//! Observer port - abstraction for training observation
//!
//! Observers receive coordinator-side events only. They never see worker
//! threads, so implementations need no synchronisation of their own.

use crate::{Result, pipeline::TrainingSnapshot};

/// Observer trait for monitoring self-play training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. After every batch has been applied to the learner:
///    - `on_batch_end(episodes_done, snapshot)`
///    - `on_statistics(snapshot)` whenever a statistics interval is crossed
/// 3. `on_training_end(snapshot)` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use oxo::{pipeline::TrainingSnapshot, ports::Observer};
///
/// struct CountingObserver {
///     batches: usize,
/// }
///
/// impl Observer for CountingObserver {
///     fn on_batch_end(&mut self, _done: u64, _snapshot: &TrainingSnapshot) -> oxo::Result<()> {
///         self.batches += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called once before the first batch.
    fn on_training_start(&mut self, _total_episodes: u64) -> Result<()> {
        Ok(())
    }

    /// Called after each batch with the running totals.
    fn on_batch_end(&mut self, _episodes_done: u64, _snapshot: &TrainingSnapshot) -> Result<()> {
        Ok(())
    }

    /// Called each time a statistics interval is reached.
    fn on_statistics(&mut self, _snapshot: &TrainingSnapshot) -> Result<()> {
        Ok(())
    }

    /// Called once after the last batch (or on early stop).
    fn on_training_end(&mut self, _snapshot: &TrainingSnapshot) -> Result<()> {
        Ok(())
    }
}
