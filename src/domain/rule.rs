//! Recurring rule definitions and per-occurrence helpers.

use chrono::NaiveDate;
use uuid::Uuid;

use super::common::{EntryKind, Identifiable};
use super::entry::{Expense, Income, LedgerEntry};
use super::frequency::Frequency;

/// Suffix appended to descriptions of entries produced from a schedule.
const RECURRING_SUFFIX: &str = "(Recurring)";

/// A repeating transaction schedule owned by one user.
///
/// `next_occurrence` tracks the date of the next entry to materialize;
/// `None` is the terminal state and only a user edit brings the schedule
/// back to life.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringRule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub kind: EntryKind,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
    pub next_occurrence: Option<NaiveDate>,
}

impl RecurringRule {
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_occurrence.map_or(false, |next| next <= today)
    }

    /// True when the end date has already passed, so a pending occurrence
    /// must be discarded instead of materialized.
    pub fn ended_before(&self, today: NaiveDate) -> bool {
        self.end_date.map_or(false, |end| end < today)
    }

    /// Builds the concrete ledger record for the occurrence on `on`.
    pub fn materialize(&self, on: NaiveDate) -> LedgerEntry {
        let label = self.recurring_label();
        match self.kind {
            EntryKind::Expense => {
                let mut expense = Expense::new(self.user_id, self.amount, on);
                expense.category_id = self.category_id;
                expense.payment_method_id = self.payment_method_id;
                expense.description = Some(label);
                LedgerEntry::Expense(expense)
            }
            EntryKind::Income => {
                let mut income = Income::new(self.user_id, self.amount, label.clone(), on);
                income.description = Some(label);
                LedgerEntry::Income(income)
            }
        }
    }

    /// Returns a copy with the schedule moved one period past the current
    /// occurrence, or terminated when that would exceed the end date.
    pub fn advance_schedule(&self) -> RecurringRule {
        let mut advanced = self.clone();
        advanced.next_occurrence = self
            .next_occurrence
            .map(|current| self.frequency.advance(current))
            .filter(|next| self.end_date.map_or(true, |end| *next <= end));
        advanced
    }

    fn recurring_label(&self) -> String {
        match self.description.as_deref() {
            Some(text) if !text.is_empty() => format!("{text} {RECURRING_SUFFIX}"),
            _ => RECURRING_SUFFIX.to_string(),
        }
    }
}

impl Identifiable for RecurringRule {
    fn id(&self) -> Uuid {
        self.id
    }
}
