pub mod json_backend;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Expense, Income, LedgerEntry, RecurringRule};
use crate::errors::Result;

pub use json_backend::{BookLoadReport, JsonStorage};

/// A due schedule as decoded from persistence.
///
/// Records whose stored `frequency`/`kind` strings no longer parse are
/// surfaced instead of dropped, so the job can terminate them without
/// failing the whole pass.
#[derive(Debug, Clone)]
pub enum DueRule {
    Ready(RecurringRule),
    Invalid(InvalidRule),
}

/// A rule record that could not be decoded into its domain form.
#[derive(Debug, Clone)]
pub struct InvalidRule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
}

/// Read/write access to recurring schedules.
pub trait RecurringRuleStore: Send + Sync {
    /// Rules with a non-null next occurrence on or before `as_of`, across
    /// all users. Order is not significant.
    fn find_due_rules(&self, as_of: NaiveDate) -> Result<Vec<DueRule>>;

    /// Persists the full rule state. Must be atomic per rule.
    fn save_rule(&self, rule: &RecurringRule) -> Result<()>;

    /// Marks the schedule as ended (`next_occurrence = None`) without
    /// touching any other field; works even when the record itself no
    /// longer decodes.
    fn end_schedule(&self, user_id: Uuid, rule_id: Uuid) -> Result<()>;
}

/// Create-only access to the concrete ledger.
pub trait LedgerWriter: Send + Sync {
    fn create_expense(&self, expense: &Expense) -> Result<()>;
    fn create_income(&self, income: &Income) -> Result<()>;
}

/// Store surface the materialization job runs against.
pub trait MaterializationStore: RecurringRuleStore + LedgerWriter {
    /// Persists a materialized entry together with the advanced rule as a
    /// single unit: when this fails, neither write may become visible, so
    /// the rule stays due for the next pass.
    fn commit_occurrence(&self, entry: &LedgerEntry, advanced: &RecurringRule) -> Result<()>;
}
