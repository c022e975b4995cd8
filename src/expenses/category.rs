// 🏷️ Expense categories - a closed set, plus per-category totals

use rusqlite::types::{ToSql, ToSqlOutput};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transportation,
    Utilities,
    Entertainment,
    Others,
}

impl Category {
    /// Display order used for totals and charts
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transportation,
        Category::Utilities,
        Category::Entertainment,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transportation => "Transportation",
            Category::Utilities => "Utilities",
            Category::Entertainment => "Entertainment",
            Category::Others => "Others",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == trimmed)
            .ok_or_else(|| LedgerError::InvalidCategory(s.to_string()))
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

// ============================================================================
// CATEGORY TOTALS
// ============================================================================

/// Sum of amounts per category; every category is present
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryTotals {
    totals: [f64; 5],
}

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: Category, amount: f64) {
        self.totals[category.index()] += amount;
    }

    pub fn get(&self, category: Category) -> f64 {
        self.totals[category.index()]
    }

    /// Sum of the five category totals
    pub fn grand_total(&self) -> f64 {
        self.totals.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.iter().all(|t| *t == 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}
