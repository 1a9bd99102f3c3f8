//! Occurrence scheduling and the materialization job.

pub mod job;
pub mod occurrence;

pub use job::{MaterializationJob, RuleFailure, RunOutcome, RunReport};
pub use occurrence::next_occurrence;
