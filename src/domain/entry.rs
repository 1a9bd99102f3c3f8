//! Concrete ledger records, created by direct entry or by materializing a
//! recurring rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{EntryKind, Identifiable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<Uuid>,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl Expense {
    pub fn new(user_id: Uuid, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            category_id: None,
            payment_method_id: None,
            amount,
            description: None,
            date,
        }
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
}

impl Income {
    pub fn new(user_id: Uuid, amount: f64, source: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            source: source.into(),
            description: None,
            date,
        }
    }
}

impl Identifiable for Income {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Either side of the ledger; the output of materializing one occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEntry {
    Expense(Expense),
    Income(Income),
}

impl LedgerEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            LedgerEntry::Expense(_) => EntryKind::Expense,
            LedgerEntry::Income(_) => EntryKind::Income,
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            LedgerEntry::Expense(expense) => expense.user_id,
            LedgerEntry::Income(income) => income.user_id,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            LedgerEntry::Expense(expense) => expense.amount,
            LedgerEntry::Income(income) => income.amount,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            LedgerEntry::Expense(expense) => expense.date,
            LedgerEntry::Income(income) => income.date,
        }
    }
}
