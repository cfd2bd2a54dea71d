//! Substring search over ledger transactions.

use crate::domain::{Ledger, Transaction};

/// Free-text query matched against description, category and date.
///
/// Description and category comparisons ignore case; the date is compared
/// against its raw `YYYY-MM-DD` text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    lowered: String,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        let raw = query.into();
        let lowered = raw.to_lowercase();
        Self { raw, lowered }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// An empty query matches every transaction.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        txn.description.to_lowercase().contains(&self.lowered)
            || txn.category.to_lowercase().contains(&self.lowered)
            || txn.date_text().contains(&self.raw)
    }

    /// Matching transactions with their positions in the full ledger.
    pub fn apply<'a>(&self, ledger: &'a Ledger) -> Vec<(usize, &'a Transaction)> {
        let hits = ledger.filter_entries(|txn| self.matches(txn));
        tracing::debug!(query = %self.raw, hits = hits.len(), "search applied");
        hits
    }
}
