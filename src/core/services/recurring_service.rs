//! Lifecycle operations for recurring rules.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Book, EntryKind, Frequency, RecurringRule};
use crate::errors::{Result, TrackerError};
use crate::schedule::next_occurrence;

/// Field set accepted when creating or editing a rule.
#[derive(Debug, Clone)]
pub struct RuleDraft {
    pub amount: f64,
    pub kind: EntryKind,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
}

/// Validated create/update/delete helpers for recurring rules.
///
/// Both create and update recompute `next_occurrence` from the submitted
/// fields; an edit is the only way a terminal schedule comes back to life.
pub struct RecurringService;

impl RecurringService {
    pub fn create(book: &mut Book, draft: RuleDraft, today: NaiveDate) -> Result<Uuid> {
        Self::validate(book, &draft)?;
        let next = next_occurrence(draft.start_date, draft.frequency, draft.end_date, today);
        let rule = RecurringRule {
            id: Uuid::new_v4(),
            user_id: book.user_id,
            amount: draft.amount,
            kind: draft.kind,
            description: draft.description,
            frequency: draft.frequency,
            start_date: draft.start_date,
            end_date: draft.end_date,
            category_id: draft.category_id,
            payment_method_id: draft.payment_method_id,
            next_occurrence: next,
        };
        Ok(book.add_rule(rule))
    }

    pub fn update(book: &mut Book, id: Uuid, draft: RuleDraft, today: NaiveDate) -> Result<()> {
        Self::validate(book, &draft)?;
        let next = next_occurrence(draft.start_date, draft.frequency, draft.end_date, today);
        let rule = book.rule_mut(id).ok_or(TrackerError::RuleNotFound(id))?;
        rule.amount = draft.amount;
        rule.kind = draft.kind;
        rule.description = draft.description;
        rule.frequency = draft.frequency;
        rule.start_date = draft.start_date;
        rule.end_date = draft.end_date;
        rule.category_id = draft.category_id;
        rule.payment_method_id = draft.payment_method_id;
        rule.next_occurrence = next;
        book.touch();
        Ok(())
    }

    pub fn remove(book: &mut Book, id: Uuid) -> Result<RecurringRule> {
        book.remove_rule(id).ok_or(TrackerError::RuleNotFound(id))
    }

    /// Rules that have not reached their end date yet.
    pub fn active_count(book: &Book, today: NaiveDate) -> usize {
        book.recurring_rules
            .iter()
            .filter(|rule| rule.end_date.map_or(true, |end| end >= today))
            .count()
    }

    fn validate(book: &Book, draft: &RuleDraft) -> Result<()> {
        if draft.amount < 0.01 {
            return Err(TrackerError::InvalidInput(
                "amount must be at least 0.01".into(),
            ));
        }
        if let Some(end) = draft.end_date {
            if end < draft.start_date {
                return Err(TrackerError::InvalidInput(
                    "end date must not precede the start date".into(),
                ));
            }
        }
        if let Some(category_id) = draft.category_id {
            let category = book
                .category(category_id)
                .ok_or(TrackerError::CategoryNotFound(category_id))?;
            if category.kind != draft.kind {
                return Err(TrackerError::InvalidInput(format!(
                    "category `{}` is an {} category but the rule is an {}",
                    category.name, category.kind, draft.kind
                )));
            }
        }
        if let Some(method_id) = draft.payment_method_id {
            book.payment_method(method_id)
                .ok_or(TrackerError::PaymentMethodNotFound(method_id))?;
        }
        Ok(())
    }
}
