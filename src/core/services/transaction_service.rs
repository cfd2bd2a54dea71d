//! Business logic helpers for managing transactions.

use crate::core::ledger_manager::LedgerManager;
use crate::core::search::SearchQuery;
use crate::core::services::ServiceResult;
use crate::core::validation::TransactionDraft;
use crate::domain::Transaction;

/// Validated add/remove/list helpers over a managed ledger.
pub struct TransactionService;

impl TransactionService {
    /// Validates the draft, appends it and returns its position.
    pub fn add(manager: &mut LedgerManager, draft: &TransactionDraft) -> ServiceResult<usize> {
        let transaction = draft.validate().map_err(|err| {
            tracing::warn!(%err, "rejected transaction input");
            err
        })?;
        Ok(manager.append(transaction)?)
    }

    /// Removes the transaction at `position`, returning the removed instance.
    pub fn remove(manager: &mut LedgerManager, position: usize) -> ServiceResult<Transaction> {
        Ok(manager.remove_at(position)?)
    }

    /// Every transaction with its current position.
    pub fn list(manager: &LedgerManager) -> Vec<(usize, &Transaction)> {
        manager.ledger().entries().collect()
    }

    /// Transactions matching `query`, positioned within the full ledger.
    pub fn search<'a>(
        manager: &'a LedgerManager,
        query: &SearchQuery,
    ) -> Vec<(usize, &'a Transaction)> {
        query.apply(manager.ledger())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::ServiceError;
    use crate::errors::{LedgerError, ValidationError};
    use crate::storage::JsonStorage;
    use tempfile::TempDir;

    fn manager() -> (LedgerManager, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = JsonStorage::new(Some(temp.path().to_path_buf()), None).unwrap();
        let manager = LedgerManager::open(Box::new(store), "txn").unwrap();
        (manager, temp)
    }

    #[test]
    fn add_rejects_invalid_drafts_without_touching_ledger() {
        let (mut manager, _guard) = manager();
        let draft = TransactionDraft::new("", "10", "expense", "food", "2024-01-01");
        let err = TransactionService::add(&mut manager, &draft).expect_err("empty description");
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::EmptyDescription)
        ));
        assert!(manager.ledger().is_empty());
    }

    #[test]
    fn add_then_search_then_remove() {
        let (mut manager, _guard) = manager();
        let drafts = [
            TransactionDraft::new("Salary", "2500", "income", "work", "2024-01-31"),
            TransactionDraft::new("Pizza", "18", "expense", "food", "2024-02-02"),
            TransactionDraft::new("Groceries", "64.2", "expense", "Food", "2024-02-05"),
        ];
        for draft in &drafts {
            TransactionService::add(&mut manager, draft).unwrap();
        }
        let hits = TransactionService::search(&manager, &SearchQuery::new("food"));
        let positions: Vec<_> = hits.iter().map(|(position, _)| *position).collect();
        assert_eq!(positions, [1, 2]);

        let removed = TransactionService::remove(&mut manager, positions[0]).unwrap();
        assert_eq!(removed.description, "Pizza");
        let listed: Vec<_> = TransactionService::list(&manager)
            .into_iter()
            .map(|(position, txn)| (position, txn.description.clone()))
            .collect();
        assert_eq!(
            listed,
            [(0, "Salary".to_string()), (1, "Groceries".to_string())]
        );
    }

    #[test]
    fn remove_out_of_range_reports_index_error() {
        let (mut manager, _guard) = manager();
        let err = TransactionService::remove(&mut manager, 0).expect_err("empty ledger");
        assert!(matches!(
            err,
            ServiceError::Ledger(LedgerError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }
}
