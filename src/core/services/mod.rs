pub mod recurring_service;
pub mod summary_service;

pub use recurring_service::{RecurringService, RuleDraft};
pub use summary_service::SummaryService;
