//! Text rendering for transactions, balances and analytics.
//!
//! Rounding happens here and nowhere else; the engine hands over raw numbers.

use crate::config::Config;
use crate::core::analytics::{AnalyticsReport, TopCategory};
use crate::core::services::LedgerSummary;
use crate::domain::Transaction;

pub const NO_ANALYTICS_PLACEHOLDER: &str = "No data for analytics";

pub fn format_amount(value: f64, config: &Config) -> String {
    let places = usize::from(config.decimal_places);
    let magnitude = format!("{:.*}", places, value.abs());
    // Values that round to zero never get a sign.
    let is_zero = magnitude.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{}{}", config.currency_symbol, magnitude)
    } else {
        format!("{}{}", config.currency_symbol, magnitude)
    }
}

pub fn transaction_row(position: usize, txn: &Transaction, config: &Config) -> String {
    format!(
        "[{}] {} - {} - {} [{}] ({})",
        position,
        txn.date_text(),
        txn.description,
        format_amount(txn.amount, config),
        txn.category,
        txn.kind
    )
}

pub fn balance_lines(summary: &LedgerSummary, config: &Config) -> Vec<String> {
    let mut lines = vec![format!("Balance: {}", format_amount(summary.balance, config))];
    if let Some(filtered) = summary.filtered_balance {
        lines.push(format!(
            "Filtered balance ({} of {} transactions): {}",
            summary.visible,
            summary.total,
            format_amount(filtered, config)
        ));
    }
    lines
}

pub fn analytics_lines(report: &AnalyticsReport, config: &Config) -> Vec<String> {
    let Some(average) = report.average_monthly_expenditure.filter(|_| report.has_data) else {
        return vec![NO_ANALYTICS_PLACEHOLDER.to_string()];
    };
    let mut lines = vec![format!(
        "Average Monthly Expenditure: {}",
        format_amount(average, config)
    )];
    lines.push("Most Spent Category Each Month:".to_string());
    lines.extend(leader_lines(report.top_category_by_month.iter(), config));
    lines.push("Most Spent Category Each Year:".to_string());
    lines.extend(leader_lines(report.top_category_by_year.iter(), config));
    lines
}

fn leader_lines<'a>(
    leaders: impl Iterator<Item = (&'a String, &'a TopCategory)> + 'a,
    config: &'a Config,
) -> impl Iterator<Item = String> + 'a {
    leaders.map(move |(period, leader)| {
        format!(
            "  {}: {} ({})",
            period,
            leader.category,
            format_amount(leader.amount, config)
        )
    })
}
