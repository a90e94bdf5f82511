//! Iris MLOps CLI Module
//!
//! Command-line interface for the training pipeline, model promotion,
//! and the prediction server.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::data;
use crate::registry::{self, ModelRegistry};
use crate::server::{run_server, ServerConfig};
use crate::tracking::ExperimentStore;
use crate::training::{Trainer, TrainerConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "iris-mlops")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Iris classification pipeline: train, promote, serve")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train all candidate models and record runs
    Train {
        /// Input CSV with the four iris measurements and a target column
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Experiment name for the recorded runs
        #[arg(short, long, default_value = "iris-classification")]
        experiment: String,

        /// Experiment store directory
        #[arg(long, default_value = "./mlruns")]
        store: PathBuf,
    },

    /// Promote the best recorded run to the production stage
    Promote {
        /// Experiment name to select runs from
        #[arg(short, long, default_value = "iris-classification")]
        experiment: String,

        /// Registered model name
        #[arg(short, long, default_value = "iris-classifier")]
        model: String,

        /// Experiment store directory
        #[arg(long, default_value = "./mlruns")]
        store: PathBuf,

        /// Model registry directory
        #[arg(long, default_value = "./registry")]
        registry: PathBuf,
    },

    /// Serve predictions from the production model
    Serve {
        /// Host to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,

        /// Model registry directory
        #[arg(long)]
        registry: Option<PathBuf>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(data_path: Option<&PathBuf>, experiment: &str, store_dir: &PathBuf) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let df = match data_path {
        Some(path) => data::load_csv(path)?,
        None => data::sample_dataset(42)?,
    };
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    let store = ExperimentStore::open(store_dir)?;
    let trainer = Trainer::new(TrainerConfig::default());

    step_run("Training candidates");
    let start = Instant::now();
    let candidates = trainer.fit_all(&df)?;
    step_done(&format!("{} models in {:?}", candidates.len(), start.elapsed()));

    println!();
    for candidate in &candidates {
        let run = store.record_run(
            experiment,
            &candidate.run_name,
            candidate.params.clone(),
            candidate.report.to_metric_map(),
            &candidate.model,
        )?;
        println!(
            "  {:<24} {} {}  {} {}  {}",
            candidate.run_name.cyan(),
            muted("accuracy"),
            format!("{:.4}", candidate.report.accuracy).white().bold(),
            muted("f1"),
            format!("{:.4}", candidate.report.f1_weighted).white(),
            dim(&format!("run {}", run.run_id)),
        );
    }
    println!();

    Ok(())
}

pub fn cmd_promote(
    experiment: &str,
    model_name: &str,
    store_dir: &PathBuf,
    registry_dir: &PathBuf,
) -> anyhow::Result<()> {
    section("Promote");

    let store = ExperimentStore::open(store_dir)?;
    let model_registry = ModelRegistry::open(registry_dir)?;

    step_run(&format!("Promoting best run of {}", experiment.cyan()));
    let entry = registry::promote_best(&store, &model_registry, experiment, model_name)?;
    step_done("");

    println!();
    println!("  {:<16} {}", muted("Model"), entry.name.white().bold());
    println!("  {:<16} {}", muted("Version"), format!("v{}", entry.version).white());
    println!("  {:<16} {}", muted("Stage"), entry.stage.to_string().white());
    if let Some(run_id) = &entry.source_run_id {
        println!("  {:<16} {}", muted("Source run"), dim(run_id));
    }
    println!();

    Ok(())
}

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    registry_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut config = ServerConfig::default();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(dir) = registry_dir {
        config.registry_dir = dir.display().to_string();
    }

    run_server(config).await
}
