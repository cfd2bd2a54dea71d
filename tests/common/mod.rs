#![allow(dead_code)]

use std::sync::Mutex;

use chrono::NaiveDate;
use spendlog::{core::LedgerManager, domain::Transaction, storage::JsonStorage};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Mutex<Vec<TempDir>> = Mutex::new(Vec::new());

/// Creates a manager backed by its own temporary data directory.
pub fn setup_manager() -> (LedgerManager, std::path::PathBuf) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let storage = JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage");
    let manager = LedgerManager::open(Box::new(storage), "transactions").expect("open ledger");
    (manager, base)
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
}

pub fn expense(raw_date: &str, category: &str, amount: f64) -> Transaction {
    Transaction::expense(format!("{category} purchase"), amount, category, date(raw_date))
}

pub fn income(raw_date: &str, amount: f64) -> Transaction {
    Transaction::income("Paycheck", amount, "salary", date(raw_date))
}
