//! Non-interactive command-line surface for maintenance and inspection.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::ConfigManager;
use crate::core::services::SummaryService;
use crate::core::time::{Clock, SystemClock};
use crate::core::utils::app_data_dir;
use crate::errors::TrackerError;
use crate::schedule::{MaterializationJob, RunOutcome};
use crate::storage::{DueRule, JsonStorage, RecurringRuleStore};

#[derive(Debug, Parser)]
#[command(
    name = "fintrack",
    about = "Personal finance tracker maintenance commands",
    version
)]
pub struct Cli {
    /// Override the data directory (defaults to ~/.fintrack or $FINTRACK_HOME).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Reference date used instead of today.
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub as_of: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one materialization pass over all due recurring schedules.
    Process,
    /// List schedules due on or before the reference date.
    Due,
    /// Show the current-month overview for one user.
    Stats {
        /// User whose book should be summarized.
        #[arg(long)]
        user: Uuid,
    },
}

/// User-facing CLI error wrapper.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] TrackerError),
    #[error("Command failed: {0}")]
    Command(String),
}

pub fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();
    run_command(cli)
}

fn run_command(cli: Cli) -> Result<(), CliError> {
    let today = cli.as_of.unwrap_or_else(|| SystemClock.today());
    let storage = Arc::new(JsonStorage::new(cli.data_dir.clone())?);

    match cli.command {
        Command::Process => {
            let job = MaterializationJob::new(storage);
            match job.run_once(today) {
                RunOutcome::Completed(report) => {
                    println!(
                        "processed {} schedule(s), ended {}, {} error(s)",
                        report.processed,
                        report.ended,
                        report.errors.len()
                    );
                    for failure in &report.errors {
                        eprintln!("  rule {}: {}", failure.rule_id, failure.reason);
                    }
                    if report.errors.is_empty() {
                        Ok(())
                    } else {
                        Err(CliError::Command(
                            "some schedules failed to process".into(),
                        ))
                    }
                }
                RunOutcome::Skipped => {
                    println!("a pass is already running, trigger skipped");
                    Ok(())
                }
            }
        }
        Command::Due => {
            let due = storage.find_due_rules(today)?;
            if due.is_empty() {
                println!("no schedules due on {today}");
                return Ok(());
            }
            for rule in due {
                match rule {
                    DueRule::Ready(rule) => {
                        let next = rule
                            .next_occurrence
                            .map(|next| next.to_string())
                            .unwrap_or_default();
                        println!(
                            "{}  {}  {}  {:.2}  due {}",
                            rule.id, rule.kind, rule.frequency, rule.amount, next
                        );
                    }
                    DueRule::Invalid(invalid) => {
                        println!("{}  invalid: {}", invalid.id, invalid.reason);
                    }
                }
            }
            Ok(())
        }
        Command::Stats { user } => {
            let base = cli.data_dir.unwrap_or_else(app_data_dir);
            let config = ConfigManager::with_base_dir(base)?.load()?;
            let report = storage.load_book(user)?;
            for warning in &report.warnings {
                tracing::warn!(%warning, "book decode warning");
            }
            let overview = SummaryService::month_overview(&report.book, today);
            println!("{} to {}", overview.window.start, overview.window.end);
            println!("income:   {:.2} {}", overview.total_income, config.currency);
            println!(
                "expenses: {:.2} {}",
                overview.total_expenses, config.currency
            );
            println!("net:      {:.2} {}", overview.net_balance, config.currency);
            println!("active recurring schedules: {}", overview.active_rules);
            Ok(())
        }
    }
}
