//! Expense analytics derived from a sequence of transactions.
//!
//! Everything here is recomputed from scratch on every call. Only expense
//! transactions contribute; income only ever affects the balance.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::domain::Transaction;

/// Highest-spending category within one period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopCategory {
    pub category: String,
    pub amount: f64,
}

/// Structured analytics output handed to the rendering layer.
///
/// When `has_data` is false no numeric field is populated and the caller is
/// expected to show a placeholder instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsReport {
    pub has_data: bool,
    pub average_monthly_expenditure: Option<f64>,
    pub total_expense: Option<f64>,
    pub monthly_totals: BTreeMap<String, f64>,
    pub yearly_totals: BTreeMap<String, f64>,
    pub top_category_by_month: BTreeMap<String, TopCategory>,
    pub top_category_by_year: BTreeMap<String, TopCategory>,
}

impl AnalyticsReport {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Running totals that remember the order in which keys were first seen.
#[derive(Debug)]
struct OrderedTotals<K> {
    order: Vec<K>,
    totals: HashMap<K, f64>,
}

impl<K> OrderedTotals<K>
where
    K: Clone + Eq + Hash,
{
    fn new() -> Self {
        Self {
            order: Vec::new(),
            totals: HashMap::new(),
        }
    }

    fn add(&mut self, key: K, amount: f64) {
        match self.totals.get_mut(&key) {
            Some(total) => *total += amount,
            None => {
                self.order.push(key.clone());
                self.totals.insert(key, amount);
            }
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn iter(&self) -> impl Iterator<Item = (&K, f64)> + '_ {
        self.order
            .iter()
            .map(move |key| (key, self.totals.get(key).copied().unwrap_or_default()))
    }

    fn sum(&self) -> f64 {
        self.iter().map(|(_, total)| total).sum()
    }
}

impl OrderedTotals<String> {
    fn into_sorted(self) -> BTreeMap<String, f64> {
        self.totals.into_iter().collect()
    }
}

/// Picks the leading category per period in first-seen order.
///
/// The first category seen for a period leads unconditionally; a later one only
/// takes over with a strictly larger total, so ties keep the earlier category.
fn top_categories(totals: &OrderedTotals<(String, String)>) -> BTreeMap<String, TopCategory> {
    let mut leaders: BTreeMap<String, TopCategory> = BTreeMap::new();
    for ((period, category), amount) in totals.iter() {
        match leaders.get_mut(period) {
            Some(leader) if amount > leader.amount => {
                leader.category = category.clone();
                leader.amount = amount;
            }
            Some(_) => {}
            None => {
                leaders.insert(
                    period.clone(),
                    TopCategory {
                        category: category.clone(),
                        amount,
                    },
                );
            }
        }
    }
    leaders
}

/// Builds the analytics report for the given transactions.
pub fn compute_analytics<'a, I>(transactions: I) -> AnalyticsReport
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let expenses: Vec<&Transaction> = transactions
        .into_iter()
        .filter(|txn| txn.is_expense())
        .collect();
    if expenses.is_empty() {
        tracing::debug!("no expense transactions, analytics report is empty");
        return AnalyticsReport::empty();
    }

    let mut monthly = OrderedTotals::new();
    let mut yearly = OrderedTotals::new();
    let mut by_month_category = OrderedTotals::new();
    for txn in &expenses {
        let month = txn.month_key();
        monthly.add(month.clone(), txn.amount);
        yearly.add(txn.year_key(), txn.amount);
        by_month_category.add((month, txn.category.clone()), txn.amount);
    }

    // Yearly leaders are accumulated per (year, category), not from monthly leaders.
    let mut by_year_category = OrderedTotals::new();
    for txn in &expenses {
        by_year_category.add((txn.year_key(), txn.category.clone()), txn.amount);
    }

    let total_expense = monthly.sum();
    let average = total_expense / monthly.len() as f64;
    tracing::debug!(
        expenses = expenses.len(),
        months = monthly.len(),
        years = yearly.len(),
        "computed expense analytics"
    );

    AnalyticsReport {
        has_data: true,
        average_monthly_expenditure: Some(average),
        total_expense: Some(total_expense),
        top_category_by_month: top_categories(&by_month_category),
        top_category_by_year: top_categories(&by_year_category),
        monthly_totals: monthly.into_sorted(),
        yearly_totals: yearly.into_sorted(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn expense(raw_date: &str, category: &str, amount: f64) -> Transaction {
        Transaction::expense(format!("{category} spend"), amount, category, date(raw_date))
    }

    fn reference_expenses() -> Vec<Transaction> {
        vec![
            expense("2024-01-05", "food", 100.0),
            expense("2024-01-20", "food", 50.0),
            expense("2024-02-01", "rent", 500.0),
        ]
    }

    #[test]
    fn empty_input_has_no_data() {
        let report = compute_analytics(&Vec::<Transaction>::new());
        assert!(!report.has_data);
        assert_eq!(report.average_monthly_expenditure, None);
        assert!(report.top_category_by_month.is_empty());
    }

    #[test]
    fn income_only_input_has_no_data() {
        let income = vec![Transaction::income(
            "Salary",
            3000.0,
            "work",
            date("2024-01-01"),
        )];
        let report = compute_analytics(&income);
        assert_eq!(report, AnalyticsReport::empty());
    }

    #[test]
    fn reference_dataset_totals_and_leaders() {
        let report = compute_analytics(&reference_expenses());
        assert!(report.has_data);
        assert_eq!(report.monthly_totals.get("2024-01"), Some(&150.0));
        assert_eq!(report.monthly_totals.get("2024-02"), Some(&500.0));
        assert_eq!(report.yearly_totals.get("2024"), Some(&650.0));
        assert_eq!(report.average_monthly_expenditure, Some(325.0));
        assert_eq!(
            report.top_category_by_month.get("2024-01"),
            Some(&TopCategory {
                category: "food".into(),
                amount: 150.0
            })
        );
        assert_eq!(
            report.top_category_by_month.get("2024-02"),
            Some(&TopCategory {
                category: "rent".into(),
                amount: 500.0
            })
        );
        assert_eq!(
            report.top_category_by_year.get("2024"),
            Some(&TopCategory {
                category: "rent".into(),
                amount: 500.0
            })
        );
    }

    #[test]
    fn income_is_excluded_from_analytics() {
        let mut transactions = reference_expenses();
        transactions.push(Transaction::income(
            "Bonus",
            9000.0,
            "work",
            date("2024-01-15"),
        ));
        let report = compute_analytics(&transactions);
        assert_eq!(report.monthly_totals.get("2024-01"), Some(&150.0));
        assert_eq!(report.total_expense, Some(650.0));
    }

    #[test]
    fn single_month_average_equals_month_total() {
        let transactions = vec![
            expense("2023-07-02", "food", 20.0),
            expense("2023-07-30", "fuel", 45.5),
        ];
        let report = compute_analytics(&transactions);
        assert_eq!(report.average_monthly_expenditure, Some(65.5));
    }

    #[test]
    fn ties_keep_first_seen_category() {
        let transactions = vec![
            expense("2024-03-01", "books", 40.0),
            expense("2024-03-02", "games", 40.0),
        ];
        let report = compute_analytics(&transactions);
        assert_eq!(report.top_category_by_month["2024-03"].category, "books");
        assert_eq!(report.top_category_by_year["2024"].category, "books");

        let swapped = vec![transactions[1].clone(), transactions[0].clone()];
        let report = compute_analytics(&swapped);
        assert_eq!(report.top_category_by_month["2024-03"].category, "games");
    }

    #[test]
    fn later_category_needs_strictly_larger_total() {
        let transactions = vec![
            expense("2024-03-01", "books", 40.0),
            expense("2024-03-02", "games", 30.0),
            expense("2024-03-03", "games", 10.5),
        ];
        let report = compute_analytics(&transactions);
        assert_eq!(
            report.top_category_by_month["2024-03"],
            TopCategory {
                category: "games".into(),
                amount: 40.5
            }
        );
    }

    #[test]
    fn categories_with_hyphens_stay_intact() {
        let transactions = vec![expense("2024-04-10", "eating-out", 25.0)];
        let report = compute_analytics(&transactions);
        assert_eq!(report.top_category_by_month["2024-04"].category, "eating-out");
        assert_eq!(report.top_category_by_year["2024"].category, "eating-out");
    }

    #[test]
    fn yearly_leaders_span_months() {
        let transactions = vec![
            expense("2023-12-31", "gifts", 300.0),
            expense("2024-01-01", "gifts", 100.0),
            expense("2024-01-10", "food", 120.0),
            expense("2024-02-10", "gifts", 50.0),
        ];
        let report = compute_analytics(&transactions);
        assert_eq!(report.top_category_by_year["2023"].category, "gifts");
        assert_eq!(
            report.top_category_by_year["2024"],
            TopCategory {
                category: "gifts".into(),
                amount: 150.0
            }
        );
        assert_eq!(report.top_category_by_month["2024-01"].category, "food");
    }

    #[test]
    fn repeated_runs_are_identical() {
        let transactions = reference_expenses();
        assert_eq!(
            compute_analytics(&transactions),
            compute_analytics(&transactions)
        );
    }
}
