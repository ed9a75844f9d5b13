//! Case-outcome CLI Module
//!
//! Command-line interface for the train, tune and baseline runs.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::evaluation::ClassificationReport;
use crate::runs::{run_baseline, run_train, run_tune, ModelEvaluation};
use crate::training::CVResults;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

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

fn print_report(title: &str, report: &ClassificationReport) {
    println!();
    println!("  {}", muted(title));
    for line in report.to_string().lines() {
        println!("  {}", line);
    }
}

fn print_cv(cv: &CVResults) {
    let scores: Vec<String> = cv.scores.iter().map(|s| format!("{:.4}", s)).collect();
    println!();
    println!("  {}", muted(&format!("{}-fold CV", cv.n_folds)));
    println!("  [{}]", scores.join(" "));
    kv("CV Accuracy", &format!("{:.2}%", cv.mean_score * 100.0));
}

fn print_evaluation(eval: &ModelEvaluation) {
    step_ok(&format!("saved and reloaded {}", dim(&eval.model_path.display().to_string())));
    println!();
    kv("Train Accuracy", &format!("{:.4}", eval.train_accuracy));
    kv("Test Accuracy", &format!("{:.4}", eval.test_accuracy));
}

fn print_reports(eval: &ModelEvaluation) {
    print_report("Classification report for train data", &eval.train_report);
    print_report("Classification report for test data", &eval.test_report);
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "case-outcome")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train, tune and evaluate case-outcome classifiers")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every run
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// JSON configuration file; defaults are used for absent fields
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Processed case records (CSV), overrides the configured path
    #[arg(short, long)]
    pub data: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit AdaBoost and Random Forest, report accuracy, CV scores and per-class metrics
    Train(RunArgs),

    /// Grid-search AdaBoost on a row-limited sample and keep the best model
    Tune(RunArgs),

    /// Fit a depth-limited decision tree as a reference point
    Baseline(RunArgs),
}

/// Resolve the configuration once, before any run starts
pub fn load_config(args: &RunArgs) -> anyhow::Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(data) = &args.data {
        config = config.with_data_path(data);
    }
    config.validate()?;
    Ok(config)
}

fn print_source(config: &PipelineConfig) {
    kv("Data", &config.data_path.display().to_string());
    kv("Models", &config.models_dir.display().to_string());
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(args: &RunArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    section("Train");
    print_source(&config);
    println!();

    step_run(&format!("Training {} models", config.train.models.len()));
    let start = Instant::now();
    let outcomes = run_train(&config)?;
    step_done(&format!("{:?}", start.elapsed()));

    for outcome in &outcomes {
        section(&outcome.evaluation.spec.kind.to_string());
        kv("Params", &outcome.evaluation.spec.params.describe());
        print_evaluation(&outcome.evaluation);
        print_cv(&outcome.cv);
        print_reports(&outcome.evaluation);
    }

    println!();
    Ok(())
}

pub fn cmd_tune(args: &RunArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    section("Tune");
    print_source(&config);
    if let Some(rows) = config.tune.row_limit {
        kv("Rows", &rows.to_string());
    }
    kv("Candidates", &config.tune.grid.len().to_string());
    kv("Folds", &config.tune.cv_folds.to_string());
    println!();

    step_run(&format!("Searching {}", config.tune.model.kind.to_string().cyan()));
    let start = Instant::now();
    let outcome = run_tune(&config)?;
    step_done(&format!("{:?}", start.elapsed()));
    step_ok(&format!("results written to {}", dim(&outcome.results_path.display().to_string())));

    section("Best Parameters");
    for (name, value) in outcome.best_params.iter() {
        kv(name, &value.to_string());
    }
    kv(&outcome.refit, &format!("{:.4}", outcome.best_score));
    println!();
    print_evaluation(&outcome.evaluation);

    println!();
    Ok(())
}

pub fn cmd_baseline(args: &RunArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    section("Baseline");
    print_source(&config);
    kv("Params", &config.baseline.model.params.describe());
    println!();

    step_run(&format!("Training {}", config.baseline.model.kind.to_string().cyan()));
    let start = Instant::now();
    let eval = run_baseline(&config)?;
    step_done(&format!("{:?}", start.elapsed()));

    print_reports(&eval);
    println!();
    print_evaluation(&eval);

    println!();
    Ok(())
}

/// Dispatch a parsed command line; no subcommand runs `train`
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Train(args)) => cmd_train(&args),
        Some(Commands::Tune(args)) => cmd_tune(&args),
        Some(Commands::Baseline(args)) => cmd_baseline(&args),
        None => cmd_train(&RunArgs::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["case-outcome", "tune", "--data", "cases.csv"]).unwrap();
        match cli.command {
            Some(Commands::Tune(args)) => {
                assert_eq!(args.data, Some(PathBuf::from("cases.csv")));
                assert!(args.config.is_none());
            }
            _ => panic!("expected tune"),
        }

        let cli = Cli::try_parse_from(["case-outcome"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_load_config_data_override() {
        let args = RunArgs {
            config: None,
            data: Some(PathBuf::from("elsewhere.csv")),
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.data_path, PathBuf::from("elsewhere.csv"));
        assert_eq!(config.train.cv_folds, 10);
    }
}
