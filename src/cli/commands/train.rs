//! Train command - Self-play training of the double Q-learner

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::output::{format_number, print_kv, print_section},
    config::TrainingConfig,
    pipeline::{JsonlObserver, ProgressObserver, SelfPlayTrainer},
    q_learning::DualQLearner,
};

#[derive(Parser, Debug)]
#[command(about = "Train the learner by self-play")]
pub struct TrainArgs {
    /// Number of training episodes (overrides the config file)
    #[arg(long, short = 'n')]
    pub episodes: Option<u64>,

    /// TOML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Table file to write (.json, .json.gz or .msgpack)
    #[arg(long, short = 'o', default_value = "q_table.json")]
    pub output: PathBuf,

    /// Continue from the existing table at the output path
    #[arg(long)]
    pub resume: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Episodes per coordinator batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Worker threads (0 = all cores)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Run every episode on the calling thread
    #[arg(long)]
    pub sequential: bool,

    /// Train for the full episode count even after convergence
    #[arg(long)]
    pub no_early_stopping: bool,

    /// Write the training report (history and convergence) as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Append each statistics snapshot to a JSON Lines file
    #[arg(long)]
    pub metrics: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl TrainArgs {
    fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::load_or_default(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => TrainingConfig::default(),
        };

        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.sequential {
            config.parallel = false;
        }
        if self.no_early_stopping {
            config.early_stopping = false;
        }

        config.validate().context("invalid training configuration")?;
        Ok(config)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = args.training_config()?;

    let mut learner = if args.resume {
        DualQLearner::load_or_empty(&args.output, config.learner.clone())
    } else {
        DualQLearner::new(config.learner.clone())
    };
    if let Some(seed) = config.seed {
        learner = learner.with_seed(seed);
    }

    print_section("Self-Play Training");
    print_kv("Episodes", &format_number(config.episodes));
    print_kv("Batch size", &config.batch_size.to_string());
    print_kv("Parallel", &config.parallel.to_string());
    print_kv(
        "Learning rate",
        &format!("{} -> {}", config.learner.alpha_start, config.learner.alpha_end),
    );
    print_kv(
        "Epsilon",
        &format!(
            "{} -> {}",
            config.learner.epsilon_start, config.learner.epsilon_end
        ),
    );
    print_kv("Double Q", &config.learner.double_q.to_string());
    print_kv("Dyna", &config.learner.dyna.to_string());
    print_kv("Output", &args.output.display().to_string());

    let mut trainer = SelfPlayTrainer::new(config, learner).with_output(&args.output);
    if !args.no_progress {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.metrics {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("failed to open metrics file {}", path.display()))?;
        trainer = trainer.with_observer(Box::new(observer));
    }

    let report = trainer.run().context("training failed")?;

    print_section("Training Complete");
    let snapshot = &report.final_snapshot;
    print_kv("Episodes", &format_number(report.episodes));
    print_kv("Converged", &report.converged.to_string());
    print_kv("States", &format_number(snapshot.total_states as u64));
    print_kv("X wins", &format!("{:.1}%", snapshot.p1_win_rate));
    print_kv("O wins", &format!("{:.1}%", snapshot.p2_win_rate));
    print_kv("Draws", &format!("{:.1}%", snapshot.draw_rate));
    print_kv("Epsilon", &format!("{:.4}", snapshot.epsilon));
    print_kv("Alpha", &format!("{:.4}", snapshot.alpha));
    print_kv("Elapsed", &format!("{:.1}s", report.elapsed_secs));
    if let Some(metric) = report.convergence.last() {
        print_kv("Convergence score", &format!("{:.4}", metric.score));
    }

    if let Some(path) = &args.report {
        report
            .save(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("\n✓ Report written to: {}", path.display());
    }
    println!("\n✓ Table saved to: {}", args.output.display());

    Ok(())
}
