//! Read-only aggregation over a user's book.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::{Book, DateWindow, EntryKind};

use super::RecurringService;

const UNCATEGORIZED: &str = "Uncategorized";
const OVERALL_BUDGET: &str = "Overall Budget";

#[derive(Debug, Clone)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone)]
pub struct ExpenseSummary {
    pub window: DateWindow,
    pub rows: Vec<CategoryTotal>,
    pub total: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct MonthlyTotals {
    pub month: u32,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStanding {
    Under,
    On,
    Over,
    /// Spending recorded without any budget covering it.
    NoBudget,
    /// Neither budget nor spending in the window.
    NotApplicable,
}

impl std::fmt::Display for BudgetStanding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BudgetStanding::Under => "Under Budget",
            BudgetStanding::On => "On Budget",
            BudgetStanding::Over => "Over Budget",
            BudgetStanding::NoBudget => "No Budget Set",
            BudgetStanding::NotApplicable => "N/A",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct BudgetLine {
    pub category: String,
    pub budgeted: f64,
    pub actual: f64,
    pub difference: f64,
    pub standing: BudgetStanding,
}

#[derive(Debug, Clone)]
pub struct BudgetComparison {
    pub window: DateWindow,
    pub rows: Vec<BudgetLine>,
    pub total_budgeted: f64,
    pub total_actual: f64,
    pub total_difference: f64,
}

#[derive(Debug, Clone)]
pub struct TransactionRow {
    pub date: NaiveDate,
    pub kind: EntryKind,
    pub description: String,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Clone)]
pub struct TransactionList {
    pub window: DateWindow,
    pub rows: Vec<TransactionRow>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
}

#[derive(Debug, Clone)]
pub struct MonthOverview {
    pub window: DateWindow,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
    pub active_rules: usize,
}

/// Aggregate reporting over one book; computation only, no rendering.
pub struct SummaryService;

impl SummaryService {
    /// Expense totals per category inside the window, largest first.
    pub fn expense_summary(book: &Book, window: DateWindow) -> ExpenseSummary {
        let mut by_category: BTreeMap<String, f64> = BTreeMap::new();
        let mut total = 0.0;
        for expense in &book.expenses {
            if !window.contains(expense.date) {
                continue;
            }
            let label = book
                .category_name(expense.category_id)
                .unwrap_or(UNCATEGORIZED)
                .to_string();
            *by_category.entry(label).or_insert(0.0) += expense.amount;
            total += expense.amount;
        }

        let mut rows: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, amount)| CategoryTotal { category, amount })
            .collect();
        rows.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        ExpenseSummary {
            window,
            rows,
            total,
        }
    }

    /// Income, expense, and net totals for each month of `year`.
    pub fn income_expense_trend(book: &Book, year: i32) -> Vec<MonthlyTotals> {
        let mut months: Vec<MonthlyTotals> = (1..=12)
            .map(|month| MonthlyTotals {
                month,
                income: 0.0,
                expenses: 0.0,
                net: 0.0,
            })
            .collect();

        for income in &book.incomes {
            if income.date.year() == year {
                months[income.date.month() as usize - 1].income += income.amount;
            }
        }
        for expense in &book.expenses {
            if expense.date.year() == year {
                months[expense.date.month() as usize - 1].expenses += expense.amount;
            }
        }
        for month in &mut months {
            month.net = month.income - month.expenses;
        }
        months
    }

    /// Budgeted versus actual spending per category.
    ///
    /// Budgets count when their period overlaps the window; actuals count
    /// when the expense date falls inside it.
    pub fn budget_vs_actual(book: &Book, window: DateWindow) -> BudgetComparison {
        let mut lines: BTreeMap<String, (f64, f64)> = BTreeMap::new();

        for budget in &book.budgets {
            if !budget.overlaps(window) {
                continue;
            }
            let label = match budget.category_id {
                Some(id) => book
                    .category_name(Some(id))
                    .unwrap_or(UNCATEGORIZED)
                    .to_string(),
                None => OVERALL_BUDGET.to_string(),
            };
            lines.entry(label).or_insert((0.0, 0.0)).0 += budget.amount;
        }

        for expense in &book.expenses {
            if !window.contains(expense.date) {
                continue;
            }
            let label = book
                .category_name(expense.category_id)
                .unwrap_or(UNCATEGORIZED)
                .to_string();
            lines.entry(label).or_insert((0.0, 0.0)).1 += expense.amount;
        }

        let mut total_budgeted = 0.0;
        let mut total_actual = 0.0;
        let rows: Vec<BudgetLine> = lines
            .into_iter()
            .map(|(category, (budgeted, actual))| {
                total_budgeted += budgeted;
                total_actual += actual;
                let difference = budgeted - actual;
                let standing = if budgeted > 0.0 {
                    if difference < 0.0 {
                        BudgetStanding::Over
                    } else if difference == 0.0 {
                        BudgetStanding::On
                    } else {
                        BudgetStanding::Under
                    }
                } else if actual > 0.0 {
                    BudgetStanding::NoBudget
                } else {
                    BudgetStanding::NotApplicable
                };
                BudgetLine {
                    category,
                    budgeted,
                    actual,
                    difference,
                    standing,
                }
            })
            .collect();

        BudgetComparison {
            window,
            rows,
            total_budgeted,
            total_actual,
            total_difference: total_budgeted - total_actual,
        }
    }

    /// Merged expense and income rows inside the window, newest first.
    pub fn transaction_list(book: &Book, window: DateWindow) -> TransactionList {
        let mut rows = Vec::new();
        let mut total_income = 0.0;
        let mut total_expenses = 0.0;

        for expense in &book.expenses {
            if !window.contains(expense.date) {
                continue;
            }
            let category = book.category_name(expense.category_id).map(str::to_string);
            let description = expense
                .description
                .clone()
                .or_else(|| category.clone())
                .unwrap_or_else(|| "Expense".to_string());
            let payment_method = expense
                .payment_method_id
                .and_then(|id| book.payment_method(id))
                .map(|method| method.name.clone());
            total_expenses += expense.amount;
            rows.push(TransactionRow {
                date: expense.date,
                kind: EntryKind::Expense,
                description,
                category,
                payment_method,
                amount: expense.amount,
            });
        }

        for income in &book.incomes {
            if !window.contains(income.date) {
                continue;
            }
            let description = income
                .description
                .clone()
                .unwrap_or_else(|| income.source.clone());
            total_income += income.amount;
            rows.push(TransactionRow {
                date: income.date,
                kind: EntryKind::Income,
                description,
                category: None,
                payment_method: None,
                amount: income.amount,
            });
        }

        rows.sort_by(|a, b| b.date.cmp(&a.date));

        TransactionList {
            window,
            rows,
            total_income,
            total_expenses,
            net: total_income - total_expenses,
        }
    }

    /// The dashboard numbers for the month containing `today`.
    pub fn month_overview(book: &Book, today: NaiveDate) -> MonthOverview {
        let window = DateWindow::month_of(today);
        let mut total_income = 0.0;
        let mut total_expenses = 0.0;
        for income in &book.incomes {
            if window.contains(income.date) {
                total_income += income.amount;
            }
        }
        for expense in &book.expenses {
            if window.contains(expense.date) {
                total_expenses += expense.amount;
            }
        }
        MonthOverview {
            window,
            total_income,
            total_expenses,
            net_balance: total_income - total_expenses,
            active_rules: RecurringService::active_count(book, today),
        }
    }
}
