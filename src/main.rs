use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kokoro::agent::PolicyProvider;
use kokoro::config::SimConfig;
use kokoro::experience;
use kokoro::simulation::Simulation;
use kokoro::training::{self, dashboard, TrainOptions};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a headless simulation and flush the experience log at the end
    Run {
        /// Number of ticks to simulate
        #[arg(long, default_value_t = 10_000)]
        ticks: u64,
        /// RNG seed; random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Optional RON config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Where to flush the experience log
        #[arg(long, default_value = "agent_log.json")]
        log_out: PathBuf,
        /// Model directory probed for the latest learned policy
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,
        /// Suppress the progress bar
        #[arg(long)]
        quiet: bool,
    },
    /// Train the next model version from a flushed experience log
    Train {
        /// Experience log to train on
        #[arg(long, default_value = "agent_log.json")]
        log: PathBuf,
        /// Model directory to version into
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,
        /// Seed for the train/test shuffle
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Held-out fraction
        #[arg(long, default_value_t = 0.2)]
        test_split: f32,
        /// Maximum tree depth
        #[arg(long, default_value_t = 5)]
        max_depth: usize,
        /// Chart output directory
        #[arg(long, default_value = "plots")]
        plots_dir: PathBuf,
        /// Dashboard page path
        #[arg(long, default_value = "dashboard.html")]
        dashboard_out: PathBuf,
    },
    /// Regenerate the dashboard page from existing model versions
    Dashboard {
        /// Model directory to read versions from
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,
        /// Chart output directory
        #[arg(long, default_value = "plots")]
        plots_dir: PathBuf,
        /// Dashboard page path
        #[arg(long, default_value = "dashboard.html")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            ticks,
            seed,
            config,
            log_out,
            models_dir,
            quiet,
        } => run_simulation(ticks, seed, config.as_deref(), &log_out, &models_dir, quiet),
        Command::Train {
            log,
            models_dir,
            seed,
            test_split,
            max_depth,
            plots_dir,
            dashboard_out,
        } => run_training(
            &log,
            &models_dir,
            TrainOptions {
                seed,
                test_split,
                max_depth,
                ..TrainOptions::default()
            },
            &plots_dir,
            &dashboard_out,
        ),
        Command::Dashboard {
            models_dir,
            plots_dir,
            out,
        } => dashboard::write_dashboard(&models_dir, &plots_dir, &out),
    }
}

fn run_simulation(
    ticks: u64,
    seed: Option<u64>,
    config_path: Option<&Path>,
    log_out: &Path,
    models_dir: &Path,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let seed = seed.unwrap_or_else(rand::random);
    log::info!("Starting simulation: {ticks} ticks, seed {seed}");

    let policy = PolicyProvider::from_models_dir(models_dir);
    let policy_name = policy.name();
    let mut sim = Simulation::new(config, policy, seed);

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(ticks);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        bar
    };

    for _ in 0..ticks {
        sim.step();
        progress.inc(1);
    }
    progress.finish_and_clear();

    sim.log.flush(log_out)?;

    let mut emotion_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in sim.log.records() {
        *emotion_counts.entry(record.emotion.as_str()).or_default() += 1;
    }

    println!("Simulation finished after {} ticks (seed {seed})", sim.tick);
    println!("  policy:      {policy_name}");
    println!(
        "  agent:       {} (health {:.1}, hunger {:.1}, energy {:.1})",
        if sim.agent_alive() { "alive" } else { "dead" },
        sim.agent.state.health,
        sim.agent.state.hunger,
        sim.agent.state.energy
    );
    println!(
        "  populations: {} prey, {} predators",
        sim.prey.len(),
        sim.predators.len()
    );
    println!(
        "  log:         {} records, {} emotion transitions -> {:?}",
        sim.log.len(),
        sim.log.transitions().len(),
        log_out
    );
    for (emotion, count) in &emotion_counts {
        println!("    {emotion:<10} {count} ticks");
    }
    Ok(())
}

fn run_training(
    log_path: &Path,
    models_dir: &Path,
    options: TrainOptions,
    plots_dir: &Path,
    dashboard_out: &Path,
) -> anyhow::Result<()> {
    let report = training::train(log_path, models_dir, &options)?;

    println!("Trained model v{}", report.version);
    println!(
        "  {} training records, {} held out, f1_macro {:.3}",
        report.trained_on, report.test_count, report.f1_macro
    );
    println!("\n{}", report.report_text);

    // Regenerate the dashboard wholesale: this version's charts, then the
    // page and learning curve over every version on disk
    let records = experience::load_records(log_path)?;
    dashboard::write_version_charts(
        plots_dir,
        report.version,
        &records,
        &report.feature_importances,
    )?;
    dashboard::write_dashboard(models_dir, plots_dir, dashboard_out)?;
    println!("Dashboard updated at {:?}", dashboard_out);
    Ok(())
}
