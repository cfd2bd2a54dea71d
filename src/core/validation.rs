//! Turns raw user input into well-formed transactions.
//!
//! The ledger itself never validates; callers run drafts through here first.

use crate::domain::{parse_date, Transaction, TransactionKind};
use crate::errors::ValidationError;

/// Category assigned when the user leaves the field blank.
pub const DEFAULT_CATEGORY: &str = "General";

/// Unvalidated transaction fields as collected from a form or command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionDraft {
    pub description: String,
    pub amount: String,
    pub kind: String,
    pub category: String,
    pub date: String,
}

impl TransactionDraft {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        kind: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            kind: kind.into(),
            category: category.into(),
            date: date.into(),
        }
    }

    pub fn validate(&self) -> Result<Transaction, ValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        let amount = parse_amount(&self.amount)?;
        let kind: TransactionKind = self.kind.parse()?;
        let date = parse_date(&self.date)?;
        let category = match self.category.trim() {
            "" => DEFAULT_CATEGORY,
            value => value,
        };
        Ok(Transaction::new(description, amount, kind, category, date))
    }
}

fn parse_amount(raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidAmount(trimmed.to_string()))?;
    if !amount.is_finite() {
        return Err(ValidationError::InvalidAmount(trimmed.to_string()));
    }
    if amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> TransactionDraft {
        TransactionDraft::new("Groceries", "42.50", "expense", "food", "2024-06-01")
    }

    #[test]
    fn valid_draft_becomes_transaction() {
        let txn = draft().validate().expect("valid draft");
        assert_eq!(txn.description, "Groceries");
        assert_eq!(txn.amount, 42.5);
        assert_eq!(txn.kind, TransactionKind::Expense);
        assert_eq!(txn.category, "food");
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn blank_description_is_rejected() {
        let mut input = draft();
        input.description = "   ".into();
        assert_eq!(input.validate(), Err(ValidationError::EmptyDescription));
    }

    #[test]
    fn amount_must_be_a_positive_number() {
        let mut input = draft();
        input.amount = "abc".into();
        assert_eq!(
            input.validate(),
            Err(ValidationError::InvalidAmount("abc".into()))
        );
        input.amount = "0".into();
        assert_eq!(input.validate(), Err(ValidationError::NonPositiveAmount(0.0)));
        input.amount = "-5".into();
        assert_eq!(
            input.validate(),
            Err(ValidationError::NonPositiveAmount(-5.0))
        );
        input.amount = "NaN".into();
        assert!(matches!(
            input.validate(),
            Err(ValidationError::InvalidAmount(_))
        ));
    }

    #[test]
    fn date_is_required() {
        let mut input = draft();
        input.date = String::new();
        assert_eq!(input.validate(), Err(ValidationError::MissingDate));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let mut input = draft();
        input.kind = "refund".into();
        assert_eq!(
            input.validate(),
            Err(ValidationError::UnknownKind("refund".into()))
        );
    }

    #[test]
    fn blank_category_falls_back_to_default() {
        let mut input = draft();
        input.category = " ".into();
        assert_eq!(input.validate().unwrap().category, DEFAULT_CATEGORY);
    }
}
