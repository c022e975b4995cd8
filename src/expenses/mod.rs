// Expense Tracker - append-only ledger in SQLite, mirrored to a JSON backup

pub mod backup;
pub mod category;
pub mod ledger;

pub use backup::{read_backup, write_backup, BackupRow};
pub use category::{Category, CategoryTotals};
pub use ledger::ExpenseLedger;

use chrono::NaiveDate;

use crate::error::LedgerError;

/// A stored expense. Immutable once inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub category: Category,
    pub date: NaiveDate,
}

/// An expense that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub name: String,
    pub amount: f64,
    pub category: Category,
    pub date: NaiveDate,
}

impl NewExpense {
    pub fn new(name: impl Into<String>, amount: f64, category: Category, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            amount,
            category,
            date,
        }
    }
}

/// Parse user-entered amount text; must be a finite number >= 0
pub fn parse_amount(text: &str) -> Result<f64, LedgerError> {
    let invalid = || LedgerError::InvalidAmount(text.to_string());

    let amount: f64 = text.trim().parse().map_err(|_| invalid())?;
    check_amount(amount).map_err(|_| invalid())
}

pub(crate) fn check_amount(amount: f64) -> Result<f64, LedgerError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(LedgerError::InvalidAmount(amount.to_string()));
    }
    // normalise -0.0
    Ok(amount + 0.0)
}
