use crate::core::analytics::{compute_analytics, AnalyticsReport};
use crate::core::search::SearchQuery;
use crate::domain::{balance_of, Ledger};

/// Derived figures the rendering layer shows next to the transaction list.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub balance: f64,
    /// Balance over the visible transactions when a search is active.
    pub filtered_balance: Option<f64>,
    pub visible: usize,
    pub total: usize,
    pub analytics: AnalyticsReport,
}

pub struct SummaryService;

impl SummaryService {
    pub fn balance(ledger: &Ledger) -> f64 {
        ledger.balance()
    }

    pub fn analytics(ledger: &Ledger) -> AnalyticsReport {
        compute_analytics(ledger.transactions())
    }

    /// Recomputes balance and analytics for the ledger, narrowed to `query`
    /// when one is active.
    pub fn summarize(ledger: &Ledger, query: Option<&SearchQuery>) -> LedgerSummary {
        let balance = ledger.balance();
        match query.filter(|query| !query.is_empty()) {
            Some(query) => {
                let visible = ledger.filter(|txn| query.matches(txn));
                LedgerSummary {
                    balance,
                    filtered_balance: Some(balance_of(visible.iter().copied())),
                    visible: visible.len(),
                    total: ledger.len(),
                    analytics: compute_analytics(visible.iter().copied()),
                }
            }
            None => LedgerSummary {
                balance,
                filtered_balance: None,
                visible: ledger.len(),
                total: ledger.len(),
                analytics: compute_analytics(ledger.transactions()),
            },
        }
    }
}
