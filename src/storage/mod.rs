pub mod json_backend;

use crate::{domain::Ledger, errors::LedgerError};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over persistence backends capable of storing ledgers and snapshots.
pub trait StorageBackend: Send + Sync {
    /// Writes the full ledger under `name`. A following `load` of the same name
    /// must observe exactly this state.
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()>;
    /// Reads the ledger stored under `name`; a name never saved yields an empty ledger.
    fn load(&self, name: &str) -> Result<Ledger>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<String>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger>;
}

pub use json_backend::JsonStorage;
