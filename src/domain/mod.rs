//! Ledger domain models and persistence-friendly types.

pub mod common;
pub mod ledger;
pub mod transaction;

pub use common::{balance_of, Amounted};
pub use ledger::Ledger;
pub use transaction::{parse_date, Transaction, TransactionKind, DATE_FORMAT};
