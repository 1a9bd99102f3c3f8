pub mod book;
pub mod budget;
pub mod category;
pub mod common;
pub mod entry;
pub mod frequency;
pub mod rule;

pub use book::Book;
pub use budget::Budget;
pub use category::{Category, PaymentMethod};
pub use common::{DateWindow, EntryKind, Identifiable};
pub use entry::{Expense, Income, LedgerEntry};
pub use frequency::Frequency;
pub use rule::RecurringRule;
