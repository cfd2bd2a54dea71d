use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::Amounted;
use crate::errors::ValidationError;

/// Calendar format used for dates in storage and search.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
const MONTH_KEY_FORMAT: &str = "%Y-%m";
const YEAR_KEY_FORMAT: &str = "%Y";

/// A single recorded income or expense event.
///
/// Transactions are never edited in place: the ledger only appends or removes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
}

impl Transaction {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            kind,
            category: category.into(),
            date,
        }
    }

    pub fn income(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self::new(description, amount, TransactionKind::Income, category, date)
    }

    pub fn expense(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self::new(description, amount, TransactionKind::Expense, category, date)
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Date rendered as `YYYY-MM-DD`.
    pub fn date_text(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// `YYYY-MM` period key.
    pub fn month_key(&self) -> String {
        self.date.format(MONTH_KEY_FORMAT).to_string()
    }

    /// `YYYY` period key.
    pub fn year_key(&self) -> String {
        self.date.format(YEAR_KEY_FORMAT).to_string()
    }
}

impl Amounted for Transaction {
    fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// Direction of a transaction's effect on the balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// Parses a `YYYY-MM-DD` string into a calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingDate);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

mod date_format {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_keys_are_date_prefixes() {
        let txn = Transaction::expense("Lunch", 12.5, "food", date(2024, 3, 7));
        assert_eq!(txn.date_text(), "2024-03-07");
        assert_eq!(txn.month_key(), "2024-03");
        assert_eq!(txn.year_key(), "2024");
        assert!(txn.date_text().starts_with(&txn.month_key()));
    }

    #[test]
    fn signed_amount_follows_kind() {
        let pay = Transaction::income("Salary", 1000.0, "work", date(2024, 1, 1));
        let rent = Transaction::expense("Rent", 400.0, "home", date(2024, 1, 2));
        assert_eq!(pay.signed_amount(), 1000.0);
        assert_eq!(rent.signed_amount(), -400.0);
    }

    #[test]
    fn serializes_with_plain_field_names() {
        let txn = Transaction::expense("Bus", 2.0, "travel", date(2024, 5, 1));
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["description"], "Bus");
        assert_eq!(json["kind"], "expense");
        assert_eq!(json["category"], "travel");
        assert_eq!(json["date"], "2024-05-01");
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Income".parse::<TransactionKind>(), Ok(TransactionKind::Income));
        assert_eq!(" EXPENSE ".parse::<TransactionKind>(), Ok(TransactionKind::Expense));
        assert!(matches!(
            "transfer".parse::<TransactionKind>(),
            Err(ValidationError::UnknownKind(_))
        ));
    }

    #[test]
    fn parse_date_rejects_blank_and_malformed_input() {
        assert_eq!(parse_date(""), Err(ValidationError::MissingDate));
        assert!(matches!(
            parse_date("05/01/2024"),
            Err(ValidationError::InvalidDate(_))
        ));
        assert_eq!(parse_date("2024-05-01"), Ok(date(2024, 5, 1)));
    }
}
