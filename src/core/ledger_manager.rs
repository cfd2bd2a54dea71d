use crate::domain::{Ledger, Transaction};
use crate::errors::LedgerError;
use crate::storage::StorageBackend;

/// Facade that coordinates the in-memory ledger with its persisted copy.
///
/// Every mutation is applied to a snapshot, written through the storage
/// backend, and only then becomes the current ledger. A failed write or an
/// invalid position leaves the current ledger exactly as it was.
pub struct LedgerManager {
    current: Ledger,
    name: String,
    storage: Box<dyn StorageBackend>,
}

impl LedgerManager {
    /// Loads the ledger stored under `name`, or starts empty when none exists.
    pub fn open(storage: Box<dyn StorageBackend>, name: &str) -> Result<Self, LedgerError> {
        let current = storage.load(name)?;
        tracing::info!(ledger = name, transactions = current.len(), "ledger opened");
        Ok(Self {
            current,
            name: name.to_string(),
            storage,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.current
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a transaction and persists the result, returning its position.
    pub fn append(&mut self, transaction: Transaction) -> Result<usize, LedgerError> {
        let mut snapshot = self.current.clone();
        let position = snapshot.append(transaction);
        self.commit(snapshot)?;
        tracing::info!(position, "transaction added");
        Ok(position)
    }

    /// Removes the transaction at `position` and persists the result.
    pub fn remove_at(&mut self, position: usize) -> Result<Transaction, LedgerError> {
        let mut snapshot = self.current.clone();
        let removed = snapshot.remove_at(position)?;
        self.commit(snapshot)?;
        tracing::info!(position, "transaction removed");
        Ok(removed)
    }

    /// Discards in-memory state and re-reads the persisted ledger.
    pub fn reload(&mut self) -> Result<&Ledger, LedgerError> {
        self.current = self.storage.load(&self.name)?;
        Ok(&self.current)
    }

    pub fn backup(&self, note: Option<&str>) -> Result<String, LedgerError> {
        let backup = self.storage.backup(&self.current, &self.name, note)?;
        tracing::info!(backup = %backup, "backup created");
        Ok(backup)
    }

    pub fn list_backups(&self) -> Result<Vec<String>, LedgerError> {
        self.storage.list_backups(&self.name)
    }

    pub fn restore(&mut self, backup_name: &str) -> Result<&Ledger, LedgerError> {
        self.current = self.storage.restore(&self.name, backup_name)?;
        Ok(&self.current)
    }

    fn commit(&mut self, snapshot: Ledger) -> Result<(), LedgerError> {
        self.storage.save(&snapshot, &self.name)?;
        self.current = snapshot;
        Ok(())
    }
}
