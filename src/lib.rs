#![doc(test(attr(deny(warnings))))]

//! Spendlog keeps a personal income/expense ledger, searches it, and derives
//! monthly and yearly spending analytics from it.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Spendlog tracing initialized.");
    });
}
