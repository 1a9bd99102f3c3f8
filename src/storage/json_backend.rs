//! JSON-file persistence, one document per user book.
//!
//! Rule records store `kind` and `frequency` as lowercase strings and
//! decode them into the closed domain enums on read. A record that no
//! longer decodes is reported, never silently dropped from a
//! materialization pass.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use uuid::Uuid;

use crate::{
    core::utils::{app_data_dir, books_dir_in, ensure_dir},
    domain::{Book, Budget, Category, Expense, Income, LedgerEntry, PaymentMethod, RecurringRule},
    errors::{Result, TrackerError},
};

use super::{DueRule, InvalidRule, LedgerWriter, MaterializationStore, RecurringRuleStore};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// File-backed store for user books.
#[derive(Clone)]
pub struct JsonStorage {
    books_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(app_data_dir);
        ensure_dir(&root)?;
        let books_dir = books_dir_in(&root);
        ensure_dir(&books_dir)?;
        Ok(Self { books_dir })
    }

    pub fn book_path(&self, user_id: Uuid) -> PathBuf {
        self.books_dir.join(format!("{user_id}.json"))
    }

    /// Users with a persisted book, in stable order.
    pub fn list_users(&self) -> Result<Vec<Uuid>> {
        let mut users = Vec::new();
        for entry in fs::read_dir(&self.books_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if let Ok(user_id) = stem.parse::<Uuid>() {
                users.push(user_id);
            }
        }
        users.sort();
        Ok(users)
    }

    pub fn load_book(&self, user_id: Uuid) -> Result<BookLoadReport> {
        let document = self.load_document(user_id)?;
        Ok(document.into_book())
    }

    pub fn save_book(&self, book: &Book) -> Result<()> {
        self.write_document(&BookDocument::from_book(book))
    }

    fn load_document(&self, user_id: Uuid) -> Result<BookDocument> {
        let path = self.book_path(user_id);
        if !path.exists() {
            return Err(TrackerError::BookNotFound(user_id));
        }
        read_document(&path)
    }

    fn write_document(&self, document: &BookDocument) -> Result<()> {
        let path = self.book_path(document.user_id);
        let json = serde_json::to_string_pretty(document)?;
        write_atomic(&path, &json)
    }

    /// Loads, mutates, and atomically rewrites one user's document. The
    /// closure either fully applies or the file is left untouched.
    fn mutate_document<F>(&self, user_id: Uuid, apply: F) -> Result<()>
    where
        F: FnOnce(&mut BookDocument) -> Result<()>,
    {
        let mut document = self.load_document(user_id)?;
        apply(&mut document)?;
        document.updated_at = Utc::now();
        self.write_document(&document)
    }
}

impl RecurringRuleStore for JsonStorage {
    fn find_due_rules(&self, as_of: NaiveDate) -> Result<Vec<DueRule>> {
        let mut due = Vec::new();
        for user_id in self.list_users()? {
            let document = match self.load_document(user_id) {
                Ok(document) => document,
                Err(err) => {
                    tracing::error!(user = %user_id, error = %err, "skipping unreadable book");
                    continue;
                }
            };
            for record in &document.recurring_rules {
                let is_due = record
                    .next_occurrence_date
                    .map_or(false, |next| next <= as_of);
                if !is_due {
                    continue;
                }
                match record.decode() {
                    Ok(rule) => due.push(DueRule::Ready(rule)),
                    Err(err) => due.push(DueRule::Invalid(InvalidRule {
                        id: record.id,
                        user_id: record.user_id,
                        reason: err.to_string(),
                    })),
                }
            }
        }
        Ok(due)
    }

    fn save_rule(&self, rule: &RecurringRule) -> Result<()> {
        self.mutate_document(rule.user_id, |document| {
            let record = RuleRecord::from_rule(rule);
            match document.recurring_rules.iter_mut().find(|r| r.id == rule.id) {
                Some(slot) => *slot = record,
                None => document.recurring_rules.push(record),
            }
            Ok(())
        })
    }

    fn end_schedule(&self, user_id: Uuid, rule_id: Uuid) -> Result<()> {
        self.mutate_document(user_id, |document| {
            let record = document
                .recurring_rules
                .iter_mut()
                .find(|r| r.id == rule_id)
                .ok_or(TrackerError::RuleNotFound(rule_id))?;
            record.next_occurrence_date = None;
            Ok(())
        })
    }
}

impl LedgerWriter for JsonStorage {
    fn create_expense(&self, expense: &Expense) -> Result<()> {
        self.mutate_document(expense.user_id, |document| {
            document.expenses.push(expense.clone());
            Ok(())
        })
    }

    fn create_income(&self, income: &Income) -> Result<()> {
        self.mutate_document(income.user_id, |document| {
            document.incomes.push(income.clone());
            Ok(())
        })
    }
}

impl MaterializationStore for JsonStorage {
    fn commit_occurrence(&self, entry: &LedgerEntry, advanced: &RecurringRule) -> Result<()> {
        self.mutate_document(advanced.user_id, |document| {
            match entry {
                LedgerEntry::Expense(expense) => document.expenses.push(expense.clone()),
                LedgerEntry::Income(income) => document.incomes.push(income.clone()),
            }
            let record = document
                .recurring_rules
                .iter_mut()
                .find(|r| r.id == advanced.id)
                .ok_or(TrackerError::RuleNotFound(advanced.id))?;
            *record = RuleRecord::from_rule(advanced);
            Ok(())
        })
    }
}

/// A loaded book plus any rule records that failed to decode.
#[derive(Debug)]
pub struct BookLoadReport {
    pub book: Book,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BookDocument {
    user_id: Uuid,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    payment_methods: Vec<PaymentMethod>,
    #[serde(default)]
    expenses: Vec<Expense>,
    #[serde(default)]
    incomes: Vec<Income>,
    #[serde(default)]
    budgets: Vec<Budget>,
    #[serde(default)]
    recurring_rules: Vec<RuleRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default = "default_schema_version")]
    schema_version: u8,
}

impl BookDocument {
    fn from_book(book: &Book) -> Self {
        Self {
            user_id: book.user_id,
            categories: book.categories.clone(),
            payment_methods: book.payment_methods.clone(),
            expenses: book.expenses.clone(),
            incomes: book.incomes.clone(),
            budgets: book.budgets.clone(),
            recurring_rules: book
                .recurring_rules
                .iter()
                .map(RuleRecord::from_rule)
                .collect(),
            created_at: book.created_at,
            updated_at: book.updated_at,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    fn into_book(self) -> BookLoadReport {
        let mut rules = Vec::with_capacity(self.recurring_rules.len());
        let mut warnings = Vec::new();
        for record in &self.recurring_rules {
            match record.decode() {
                Ok(rule) => rules.push(rule),
                Err(err) => warnings.push(format!("recurring rule {}: {err}", record.id)),
            }
        }
        let book = Book {
            user_id: self.user_id,
            categories: self.categories,
            payment_methods: self.payment_methods,
            expenses: self.expenses,
            incomes: self.incomes,
            budgets: self.budgets,
            recurring_rules: rules,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        BookLoadReport { book, warnings }
    }
}

/// Persisted rule layout; enum-valued fields are stored as plain strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleRecord {
    id: Uuid,
    user_id: Uuid,
    amount: f64,
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    frequency: String,
    start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payment_method_id: Option<Uuid>,
    #[serde(default)]
    next_occurrence_date: Option<NaiveDate>,
}

impl RuleRecord {
    fn from_rule(rule: &RecurringRule) -> Self {
        Self {
            id: rule.id,
            user_id: rule.user_id,
            amount: rule.amount,
            kind: rule.kind.as_str().to_string(),
            description: rule.description.clone(),
            frequency: rule.frequency.as_str().to_string(),
            start_date: rule.start_date,
            end_date: rule.end_date,
            category_id: rule.category_id,
            payment_method_id: rule.payment_method_id,
            next_occurrence_date: rule.next_occurrence,
        }
    }

    fn decode(&self) -> Result<RecurringRule> {
        Ok(RecurringRule {
            id: self.id,
            user_id: self.user_id,
            amount: self.amount,
            kind: self.kind.parse()?,
            description: self.description.clone(),
            frequency: self.frequency.parse()?,
            start_date: self.start_date,
            end_date: self.end_date,
            category_id: self.category_id,
            payment_method_id: self.payment_method_id,
            next_occurrence: self.next_occurrence_date,
        })
    }
}

fn default_schema_version() -> u8 {
    CURRENT_SCHEMA_VERSION
}

fn read_document(path: &Path) -> Result<BookDocument> {
    let data = fs::read_to_string(path)?;
    let document: BookDocument = serde_json::from_str(&data)?;
    if document.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(TrackerError::Storage(format!(
            "book schema v{} is newer than supported v{}",
            document.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(document)
}

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryKind, Frequency};
    use serde_json::Value;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(Some(temp.path().to_path_buf())).expect("json storage");
        (storage, temp)
    }

    fn sample_rule(user_id: Uuid) -> RecurringRule {
        RecurringRule {
            id: Uuid::new_v4(),
            user_id,
            amount: 9.99,
            kind: EntryKind::Expense,
            description: Some("Music".into()),
            frequency: Frequency::Monthly,
            start_date: date(2024, 1, 10),
            end_date: None,
            category_id: None,
            payment_method_id: None,
            next_occurrence: Some(date(2024, 1, 10)),
        }
    }

    fn sample_book() -> Book {
        let mut book = Book::new(Uuid::new_v4());
        book.add_category(Category::new(
            Some(book.user_id),
            "Subscriptions",
            EntryKind::Expense,
        ));
        book.add_rule(sample_rule(book.user_id));
        book
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir();
        let book = sample_book();
        storage.save_book(&book).expect("save book");

        let report = storage.load_book(book.user_id).expect("load book");
        assert!(report.warnings.is_empty());
        assert_eq!(report.book, book);
    }

    #[test]
    fn missing_book_is_an_error() {
        let (storage, _guard) = storage_with_temp_dir();
        let unknown = Uuid::new_v4();
        let err = storage.load_book(unknown).expect_err("must not load");
        assert!(matches!(err, TrackerError::BookNotFound(id) if id == unknown));
    }

    #[test]
    fn finds_due_rules_across_books() {
        let (storage, _guard) = storage_with_temp_dir();
        let mut first = Book::new(Uuid::new_v4());
        first.add_rule(sample_rule(first.user_id));
        let mut second = Book::new(Uuid::new_v4());
        let mut future = sample_rule(second.user_id);
        future.start_date = date(2030, 1, 1);
        future.next_occurrence = Some(date(2030, 1, 1));
        second.add_rule(future);
        storage.save_book(&first).unwrap();
        storage.save_book(&second).unwrap();

        let due = storage.find_due_rules(date(2024, 2, 1)).expect("query due");
        assert_eq!(due.len(), 1);
        match &due[0] {
            DueRule::Ready(rule) => assert_eq!(rule.user_id, first.user_id),
            other => panic!("expected ready rule, got {other:?}"),
        }
    }

    #[test]
    fn commit_occurrence_appends_entry_and_advances_rule() {
        let (storage, _guard) = storage_with_temp_dir();
        let book = sample_book();
        let rule = book.recurring_rules[0].clone();
        storage.save_book(&book).unwrap();

        let entry = rule.materialize(date(2024, 1, 10));
        let advanced = rule.advance_schedule();
        storage
            .commit_occurrence(&entry, &advanced)
            .expect("commit occurrence");

        let report = storage.load_book(book.user_id).unwrap();
        assert_eq!(report.book.expenses.len(), 1);
        assert_eq!(report.book.expenses[0].date, date(2024, 1, 10));
        assert_eq!(
            report.book.recurring_rules[0].next_occurrence,
            Some(date(2024, 2, 10))
        );
    }

    #[test]
    fn commit_for_unknown_rule_changes_nothing() {
        let (storage, _guard) = storage_with_temp_dir();
        let book = sample_book();
        storage.save_book(&book).unwrap();

        let stray = sample_rule(book.user_id);
        let entry = stray.materialize(date(2024, 1, 10));
        let err = storage
            .commit_occurrence(&entry, &stray.advance_schedule())
            .expect_err("unknown rule must fail");
        assert!(matches!(err, TrackerError::RuleNotFound(_)));

        let report = storage.load_book(book.user_id).unwrap();
        assert!(report.book.expenses.is_empty());
    }

    #[test]
    fn end_schedule_clears_next_occurrence_only() {
        let (storage, _guard) = storage_with_temp_dir();
        let book = sample_book();
        let rule_id = book.recurring_rules[0].id;
        storage.save_book(&book).unwrap();

        storage.end_schedule(book.user_id, rule_id).expect("end");
        let report = storage.load_book(book.user_id).unwrap();
        let stored = &report.book.recurring_rules[0];
        assert_eq!(stored.next_occurrence, None);
        assert_eq!(stored.start_date, date(2024, 1, 10));
    }

    fn corrupt_frequency(storage: &JsonStorage, user_id: Uuid) {
        let path = storage.book_path(user_id);
        let mut value: Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        value["recurring_rules"][0]["frequency"] = Value::String("biweekly".into());
        fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    #[test]
    fn unknown_frequency_surfaces_as_invalid_due_rule() {
        let (storage, _guard) = storage_with_temp_dir();
        let book = sample_book();
        let rule_id = book.recurring_rules[0].id;
        storage.save_book(&book).unwrap();
        corrupt_frequency(&storage, book.user_id);

        let due = storage.find_due_rules(date(2024, 2, 1)).unwrap();
        assert_eq!(due.len(), 1);
        match &due[0] {
            DueRule::Invalid(invalid) => {
                assert_eq!(invalid.id, rule_id);
                assert!(invalid.reason.contains("biweekly"));
            }
            other => panic!("expected invalid rule, got {other:?}"),
        }

        // Termination still works on the undecodable record.
        storage.end_schedule(book.user_id, rule_id).expect("end");
        assert!(storage.find_due_rules(date(2024, 2, 1)).unwrap().is_empty());
    }

    #[test]
    fn unknown_frequency_becomes_load_warning() {
        let (storage, _guard) = storage_with_temp_dir();
        let book = sample_book();
        storage.save_book(&book).unwrap();
        corrupt_frequency(&storage, book.user_id);

        let report = storage.load_book(book.user_id).unwrap();
        assert!(report.book.recurring_rules.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("biweekly"));
    }

    #[test]
    fn rejects_future_schema_versions() {
        let (storage, _guard) = storage_with_temp_dir();
        let book = sample_book();
        storage.save_book(&book).unwrap();

        let path = storage.book_path(book.user_id);
        let mut value: Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        value["schema_version"] = Value::from(CURRENT_SCHEMA_VERSION + 1);
        fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();

        let err = storage
            .load_book(book.user_id)
            .expect_err("future schema must fail");
        assert!(matches!(err, TrackerError::Storage(ref message) if message.contains("newer")));
    }
}
