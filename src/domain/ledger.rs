use serde::{Deserialize, Serialize};

use crate::domain::common::balance_of;
use crate::domain::transaction::Transaction;
use crate::errors::LedgerError;

/// Ordered collection of every recorded transaction.
///
/// Position in the sequence is the only identity a transaction has. Removing an
/// entry shifts every later position down by one, so positions must not be
/// cached across mutations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    /// Adds a transaction to the end of the ledger and returns its position.
    pub fn append(&mut self, transaction: Transaction) -> usize {
        self.transactions.push(transaction);
        self.transactions.len() - 1
    }

    /// Removes the transaction at `position`, leaving the ledger untouched when
    /// the position is out of range.
    pub fn remove_at(&mut self, position: usize) -> Result<Transaction, LedgerError> {
        if position >= self.transactions.len() {
            return Err(LedgerError::IndexOutOfRange {
                index: position,
                len: self.transactions.len(),
            });
        }
        Ok(self.transactions.remove(position))
    }

    /// Returns the matching transactions in ledger order.
    pub fn filter<P>(&self, mut predicate: P) -> Vec<&Transaction>
    where
        P: FnMut(&Transaction) -> bool,
    {
        self.transactions
            .iter()
            .filter(|txn| predicate(txn))
            .collect()
    }

    /// Like [`Ledger::filter`] but keeps each transaction's ledger position.
    pub fn filter_entries<P>(&self, mut predicate: P) -> Vec<(usize, &Transaction)>
    where
        P: FnMut(&Transaction) -> bool,
    {
        self.entries().filter(|(_, txn)| predicate(txn)).collect()
    }

    /// Income minus expenses across the whole ledger.
    pub fn balance(&self) -> f64 {
        balance_of(&self.transactions)
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, &Transaction)> {
        self.transactions.iter().enumerate()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, position: usize) -> Option<&Transaction> {
        self.transactions.get(position)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
