#![doc(test(attr(deny(warnings))))]

//! Fintrack Core provides the ledger, recurring-schedule, and reporting
//! primitives behind a personal finance tracker.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod schedule;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Fintrack Core tracing initialized.");
    });
}
