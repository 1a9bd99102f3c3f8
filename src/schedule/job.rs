//! The periodic pass that turns due schedules into ledger entries.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::RecurringRule;
use crate::errors::{Result, TrackerError};
use crate::storage::{DueRule, MaterializationStore};

/// Outcome of one trigger of the materialization job.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunReport),
    /// A previous pass was still running; nothing was done.
    Skipped,
}

#[derive(Debug, Default)]
pub struct RunReport {
    /// Rules whose occurrence was materialized and whose schedule write
    /// committed (advanced or completed).
    pub processed: usize,
    /// Stale schedules terminated without materialization.
    pub ended: usize,
    pub errors: Vec<RuleFailure>,
}

#[derive(Debug)]
pub struct RuleFailure {
    pub rule_id: Uuid,
    pub reason: String,
}

enum RuleOutcome {
    Materialized,
    Ended,
}

/// Materializes due recurring rules into concrete ledger entries.
///
/// The job holds no state between passes; everything lives in the store.
/// Invocations never overlap: a trigger arriving while a pass is running
/// returns [`RunOutcome::Skipped`] immediately.
pub struct MaterializationJob {
    store: Arc<dyn MaterializationStore>,
    running: Mutex<()>,
}

impl MaterializationJob {
    pub fn new(store: Arc<dyn MaterializationStore>) -> Self {
        Self {
            store,
            running: Mutex::new(()),
        }
    }

    /// Runs one pass over every schedule due on or before `today`.
    ///
    /// Per-rule failures are collected in the report and never abort the
    /// pass. A rule whose commit fails keeps its stored next occurrence and
    /// is naturally retried on the next trigger.
    pub fn run_once(&self, today: NaiveDate) -> RunOutcome {
        let _guard = match self.running.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!("materialization pass already running, skipping trigger");
                return RunOutcome::Skipped;
            }
        };

        let mut report = RunReport::default();
        let due = match self.store.find_due_rules(today) {
            Ok(due) => due,
            Err(err) => {
                tracing::error!(error = %err, "failed to query due schedules");
                report.errors.push(RuleFailure {
                    rule_id: Uuid::nil(),
                    reason: err.to_string(),
                });
                return RunOutcome::Completed(report);
            }
        };

        if due.is_empty() {
            tracing::debug!(%today, "no recurring schedules due");
            return RunOutcome::Completed(report);
        }

        for due_rule in due {
            match due_rule {
                DueRule::Ready(rule) => match self.process_rule(&rule, today) {
                    Ok(RuleOutcome::Materialized) => report.processed += 1,
                    Ok(RuleOutcome::Ended) => report.ended += 1,
                    Err(err) => {
                        tracing::error!(
                            rule = %rule.id,
                            error = %err,
                            "failed to process recurring schedule"
                        );
                        report.errors.push(RuleFailure {
                            rule_id: rule.id,
                            reason: err.to_string(),
                        });
                    }
                },
                DueRule::Invalid(invalid) => {
                    tracing::error!(
                        rule = %invalid.id,
                        reason = %invalid.reason,
                        "terminating undecodable recurring schedule"
                    );
                    report.errors.push(RuleFailure {
                        rule_id: invalid.id,
                        reason: invalid.reason,
                    });
                    if let Err(err) = self.store.end_schedule(invalid.user_id, invalid.id) {
                        report.errors.push(RuleFailure {
                            rule_id: invalid.id,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            ended = report.ended,
            errors = report.errors.len(),
            "materialization pass finished"
        );
        RunOutcome::Completed(report)
    }

    fn process_rule(&self, rule: &RecurringRule, today: NaiveDate) -> Result<RuleOutcome> {
        let due_on = rule.next_occurrence.ok_or_else(|| {
            TrackerError::InvalidInput("due rule carries no next occurrence".into())
        })?;

        if rule.ended_before(today) {
            // The end date passed while this occurrence was pending, e.g.
            // after missed triggers; discard it instead of backfilling.
            self.store.end_schedule(rule.user_id, rule.id)?;
            tracing::warn!(
                rule = %rule.id,
                "end date has passed, schedule terminated without materializing"
            );
            return Ok(RuleOutcome::Ended);
        }

        let entry = rule.materialize(due_on);
        let advanced = rule.advance_schedule();
        self.store.commit_occurrence(&entry, &advanced)?;

        match advanced.next_occurrence {
            Some(next) => tracing::info!(
                rule = %rule.id,
                user = %rule.user_id,
                kind = %rule.kind,
                occurrence = %due_on,
                next = %next,
                "materialized recurring entry"
            ),
            None => tracing::info!(
                rule = %rule.id,
                user = %rule.user_id,
                kind = %rule.kind,
                occurrence = %due_on,
                "materialized final recurring entry, schedule complete"
            ),
        }
        Ok(RuleOutcome::Materialized)
    }
}
