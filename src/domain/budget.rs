//! Per-category spending budgets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{DateWindow, Identifiable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Budgeted category; `None` represents the overall budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    pub amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Budget {
    pub fn new(
        user_id: Uuid,
        category_id: Option<Uuid>,
        amount: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            category_id,
            amount,
            start_date,
            end_date,
        }
    }

    /// True when any part of the budget period falls inside the window.
    pub fn overlaps(&self, window: DateWindow) -> bool {
        self.start_date <= window.end && self.end_date >= window.start
    }
}

impl Identifiable for Budget {
    fn id(&self) -> Uuid {
        self.id
    }
}
