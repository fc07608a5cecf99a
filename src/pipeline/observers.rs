//! Observers for self-play training
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};

use super::TrainingSnapshot;
use crate::{Result, ports::Observer};

fn rates_message(snapshot: &TrainingSnapshot) -> String {
    format!(
        "X:{:.1}% O:{:.1}% D:{:.1}% ε:{:.3}",
        snapshot.p1_win_rate, snapshot.p2_win_rate, snapshot.draw_rate, snapshot.epsilon
    )
}

/// Progress bar observer - Shows training progress
#[derive(Default)]
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: u64) -> Result<()> {
        let pb = ProgressBar::new(total_episodes);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_batch_end(&mut self, episodes_done: u64, snapshot: &TrainingSnapshot) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(episodes_done);
            pb.set_message(rates_message(snapshot));
        }
        Ok(())
    }

    fn on_training_end(&mut self, snapshot: &TrainingSnapshot) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(rates_message(snapshot));
        }
        Ok(())
    }
}

/// Metrics observer - Keeps every statistics snapshot in memory
#[derive(Debug, Default)]
pub struct MetricsObserver {
    history: Vec<TrainingSnapshot>,
    batches: usize,
    last: Option<TrainingSnapshot>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[TrainingSnapshot] {
        &self.history
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Snapshot passed to `on_training_end`, if training finished
    pub fn last(&self) -> Option<&TrainingSnapshot> {
        self.last.as_ref()
    }
}

impl Observer for MetricsObserver {
    fn on_batch_end(&mut self, _episodes_done: u64, _snapshot: &TrainingSnapshot) -> Result<()> {
        self.batches += 1;
        Ok(())
    }

    fn on_statistics(&mut self, snapshot: &TrainingSnapshot) -> Result<()> {
        self.history.push(snapshot.clone());
        Ok(())
    }

    fn on_training_end(&mut self, snapshot: &TrainingSnapshot) -> Result<()> {
        self.last = Some(snapshot.clone());
        Ok(())
    }
}

/// JSONL observer - One statistics snapshot per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_statistics(&mut self, snapshot: &TrainingSnapshot) -> Result<()> {
        serde_json::to_writer(&mut self.writer, snapshot)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(episode: u64) -> TrainingSnapshot {
        TrainingSnapshot {
            episode,
            p1_win_rate: 50.0,
            p2_win_rate: 20.0,
            draw_rate: 30.0,
            ..TrainingSnapshot::default()
        }
    }

    #[test]
    fn test_metrics_observer_collects() {
        let mut observer = MetricsObserver::new();
        observer.on_training_start(10).unwrap();
        observer.on_batch_end(5, &snapshot(5)).unwrap();
        observer.on_statistics(&snapshot(5)).unwrap();
        observer.on_batch_end(10, &snapshot(10)).unwrap();
        observer.on_training_end(&snapshot(10)).unwrap();

        assert_eq!(observer.batches(), 2);
        assert_eq!(observer.history().len(), 1);
        assert_eq!(observer.last().map(|s| s.episode), Some(10));
    }

    #[test]
    fn test_jsonl_observer_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.jsonl");
        let mut observer = JsonlObserver::new(&path).unwrap();
        observer.on_statistics(&snapshot(1)).unwrap();
        observer.on_statistics(&snapshot(2)).unwrap();
        drop(observer);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<TrainingSnapshot> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].episode, 2);
    }

    #[test]
    fn test_progress_observer_runs_hidden() {
        let mut observer = ProgressObserver::new();
        observer.on_training_start(3).unwrap();
        observer.on_batch_end(3, &snapshot(3)).unwrap();
        observer.on_training_end(&snapshot(3)).unwrap();
    }
}
