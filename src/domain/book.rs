//! The per-user aggregate holding all tracker state.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::budget::Budget;
use super::category::{Category, PaymentMethod};
use super::common::find_by_id;
use super::entry::{Expense, Income};
use super::rule::RecurringRule;

/// Everything the tracker knows about one user, persisted as one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub user_id: Uuid,
    pub categories: Vec<Category>,
    pub payment_methods: Vec<PaymentMethod>,
    pub expenses: Vec<Expense>,
    pub incomes: Vec<Income>,
    pub budgets: Vec<Budget>,
    pub recurring_rules: Vec<RecurringRule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            categories: Vec::new(),
            payment_methods: Vec::new(),
            expenses: Vec::new(),
            incomes: Vec::new(),
            budgets: Vec::new(),
            recurring_rules: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn add_category(&mut self, category: Category) -> Uuid {
        let id = category.id;
        self.categories.push(category);
        self.touch();
        id
    }

    pub fn add_payment_method(&mut self, method: PaymentMethod) -> Uuid {
        let id = method.id;
        self.payment_methods.push(method);
        self.touch();
        id
    }

    pub fn add_expense(&mut self, expense: Expense) -> Uuid {
        let id = expense.id;
        self.expenses.push(expense);
        self.touch();
        id
    }

    pub fn add_income(&mut self, income: Income) -> Uuid {
        let id = income.id;
        self.incomes.push(income);
        self.touch();
        id
    }

    pub fn add_budget(&mut self, budget: Budget) -> Uuid {
        let id = budget.id;
        self.budgets.push(budget);
        self.touch();
        id
    }

    pub fn add_rule(&mut self, rule: RecurringRule) -> Uuid {
        let id = rule.id;
        self.recurring_rules.push(rule);
        self.touch();
        id
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        find_by_id(&self.categories, id)
    }

    pub fn payment_method(&self, id: Uuid) -> Option<&PaymentMethod> {
        find_by_id(&self.payment_methods, id)
    }

    pub fn rule(&self, id: Uuid) -> Option<&RecurringRule> {
        find_by_id(&self.recurring_rules, id)
    }

    pub fn rule_mut(&mut self, id: Uuid) -> Option<&mut RecurringRule> {
        self.recurring_rules.iter_mut().find(|rule| rule.id == id)
    }

    pub fn remove_rule(&mut self, id: Uuid) -> Option<RecurringRule> {
        let index = self.recurring_rules.iter().position(|rule| rule.id == id)?;
        let removed = self.recurring_rules.remove(index);
        self.touch();
        Some(removed)
    }

    /// Resolves a category reference to its display name.
    pub fn category_name(&self, id: Option<Uuid>) -> Option<&str> {
        id.and_then(|id| self.category(id)).map(|c| c.name.as_str())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
