//! End-to-end passes of the materialization job against JSON storage.

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;
use uuid::Uuid;

use fintrack_core::core::services::{RecurringService, RuleDraft};
use fintrack_core::domain::{
    Book, Category, EntryKind, Frequency, PaymentMethod, RecurringRule,
};
use fintrack_core::schedule::{MaterializationJob, RunOutcome, RunReport};
use fintrack_core::storage::JsonStorage;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn storage() -> (Arc<JsonStorage>, TempDir) {
    let temp = TempDir::new().expect("temp dir");
    let storage = JsonStorage::new(Some(temp.path().to_path_buf())).expect("storage");
    (Arc::new(storage), temp)
}

fn expect_report(outcome: RunOutcome) -> RunReport {
    match outcome {
        RunOutcome::Completed(report) => report,
        RunOutcome::Skipped => panic!("pass unexpectedly skipped"),
    }
}

#[test]
fn monthly_rule_materializes_once_and_advances() {
    let (storage, _guard) = storage();
    let mut book = Book::new(Uuid::new_v4());
    let category = book.add_category(Category::new(
        Some(book.user_id),
        "Subscriptions",
        EntryKind::Expense,
    ));
    let card = book.add_payment_method(PaymentMethod::new(book.user_id, "Credit card"));
    let rule_id = RecurringService::create(
        &mut book,
        RuleDraft {
            amount: 15.99,
            kind: EntryKind::Expense,
            description: Some("Streaming".into()),
            frequency: Frequency::Monthly,
            start_date: date(2024, 1, 15),
            end_date: None,
            category_id: Some(category),
            payment_method_id: Some(card),
        },
        date(2024, 1, 15),
    )
    .expect("create rule");
    storage.save_book(&book).expect("save book");

    let job = MaterializationJob::new(storage.clone());
    let report = expect_report(job.run_once(date(2024, 1, 15)));
    assert_eq!(report.processed, 1);
    assert!(report.errors.is_empty());

    let reloaded = storage.load_book(book.user_id).expect("reload").book;
    assert_eq!(reloaded.expenses.len(), 1);
    let expense = &reloaded.expenses[0];
    assert_eq!(expense.date, date(2024, 1, 15));
    assert_eq!(expense.amount, 15.99);
    assert_eq!(expense.category_id, Some(category));
    assert_eq!(expense.payment_method_id, Some(card));
    assert_eq!(
        expense.description.as_deref(),
        Some("Streaming (Recurring)")
    );
    assert_eq!(
        reloaded.rule(rule_id).unwrap().next_occurrence,
        Some(date(2024, 2, 15))
    );

    // Same-day rerun finds nothing due.
    let rerun = expect_report(job.run_once(date(2024, 1, 15)));
    assert_eq!(rerun.processed, 0);
    let after = storage.load_book(book.user_id).unwrap().book;
    assert_eq!(after.expenses.len(), 1);
}

#[test]
fn daily_income_rule_runs_to_completion() {
    let (storage, _guard) = storage();
    let mut book = Book::new(Uuid::new_v4());
    let rule_id = RecurringService::create(
        &mut book,
        RuleDraft {
            amount: 100.0,
            kind: EntryKind::Income,
            description: Some("Per diem".into()),
            frequency: Frequency::Daily,
            start_date: date(2024, 6, 1),
            end_date: Some(date(2024, 6, 3)),
            category_id: None,
            payment_method_id: None,
        },
        date(2024, 6, 1),
    )
    .expect("create rule");
    storage.save_book(&book).expect("save book");

    let job = MaterializationJob::new(storage.clone());
    for day in 1..=3 {
        let report = expect_report(job.run_once(date(2024, 6, day)));
        assert_eq!(report.processed, 1, "day {day}");
    }

    let reloaded = storage.load_book(book.user_id).unwrap().book;
    assert_eq!(reloaded.incomes.len(), 3);
    assert_eq!(reloaded.incomes[0].source, "Per diem (Recurring)");
    assert_eq!(reloaded.rule(rule_id).unwrap().next_occurrence, None);

    // The schedule stays terminal on later days.
    let after_end = expect_report(job.run_once(date(2024, 6, 4)));
    assert_eq!(after_end.processed, 0);
    assert_eq!(storage.load_book(book.user_id).unwrap().book.incomes.len(), 3);
}

#[test]
fn future_start_is_not_due_until_it_arrives() {
    let (storage, _guard) = storage();
    let mut book = Book::new(Uuid::new_v4());
    let rule_id = RecurringService::create(
        &mut book,
        RuleDraft {
            amount: 30.0,
            kind: EntryKind::Expense,
            description: None,
            frequency: Frequency::Weekly,
            start_date: date(2024, 7, 1),
            end_date: None,
            category_id: None,
            payment_method_id: None,
        },
        date(2024, 6, 20),
    )
    .expect("create rule");
    assert_eq!(
        book.rule(rule_id).unwrap().next_occurrence,
        Some(date(2024, 7, 1))
    );
    storage.save_book(&book).expect("save book");

    let job = MaterializationJob::new(storage.clone());
    let early = expect_report(job.run_once(date(2024, 6, 25)));
    assert_eq!(early.processed, 0);
    assert!(storage.load_book(book.user_id).unwrap().book.expenses.is_empty());

    let on_start = expect_report(job.run_once(date(2024, 7, 1)));
    assert_eq!(on_start.processed, 1);
}

#[test]
fn missed_schedule_past_its_end_terminates_without_entry() {
    let (storage, _guard) = storage();
    let mut book = Book::new(Uuid::new_v4());
    // A pending occurrence left over from before the end date passed, as
    // happens when triggers were missed for a while.
    let rule = RecurringRule {
        id: Uuid::new_v4(),
        user_id: book.user_id,
        amount: 45.0,
        kind: EntryKind::Expense,
        description: Some("Insurance".into()),
        frequency: Frequency::Yearly,
        start_date: date(2023, 3, 1),
        end_date: Some(date(2024, 2, 28)),
        category_id: None,
        payment_method_id: None,
        next_occurrence: Some(date(2024, 3, 1)),
    };
    let rule_id = book.add_rule(rule);
    storage.save_book(&book).expect("save book");

    let job = MaterializationJob::new(storage.clone());
    let report = expect_report(job.run_once(date(2024, 3, 1)));
    assert_eq!(report.processed, 0);
    assert_eq!(report.ended, 1);

    let reloaded = storage.load_book(book.user_id).unwrap().book;
    assert!(reloaded.expenses.is_empty());
    assert_eq!(reloaded.rule(rule_id).unwrap().next_occurrence, None);
}

#[test]
fn rules_across_users_are_processed_in_one_pass() {
    let (storage, _guard) = storage();
    let mut first = Book::new(Uuid::new_v4());
    RecurringService::create(
        &mut first,
        RuleDraft {
            amount: 10.0,
            kind: EntryKind::Expense,
            description: None,
            frequency: Frequency::Daily,
            start_date: date(2024, 5, 1),
            end_date: None,
            category_id: None,
            payment_method_id: None,
        },
        date(2024, 5, 1),
    )
    .unwrap();
    let mut second = Book::new(Uuid::new_v4());
    RecurringService::create(
        &mut second,
        RuleDraft {
            amount: 2_500.0,
            kind: EntryKind::Income,
            description: Some("Salary".into()),
            frequency: Frequency::Monthly,
            start_date: date(2024, 5, 1),
            end_date: None,
            category_id: None,
            payment_method_id: None,
        },
        date(2024, 5, 1),
    )
    .unwrap();
    storage.save_book(&first).unwrap();
    storage.save_book(&second).unwrap();

    let job = MaterializationJob::new(storage.clone());
    let report = expect_report(job.run_once(date(2024, 5, 1)));
    assert_eq!(report.processed, 2);
    assert_eq!(storage.load_book(first.user_id).unwrap().book.expenses.len(), 1);
    assert_eq!(storage.load_book(second.user_id).unwrap().book.incomes.len(), 1);
}
