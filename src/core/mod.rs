//! Ledger orchestration, analytics, and the services built on top of them.

pub mod analytics;
pub mod ledger_manager;
pub mod search;
pub mod services;
pub mod utils;
pub mod validation;

pub use analytics::{compute_analytics, AnalyticsReport, TopCategory};
pub use ledger_manager::LedgerManager;
pub use search::SearchQuery;
pub use validation::TransactionDraft;
