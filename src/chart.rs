// 📊 Chart data for the expense dashboard
//
// Turns category totals into pie slices and the one-line totals summary.
// Drawing is left to the caller.

use crate::expenses::{Category, CategoryTotals};

/// Message shown in place of a chart when nothing has been spent
pub const EMPTY_CHART_MESSAGE: &str = "No expenses to show.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub category: Category,
    pub amount: f64,
    /// Share of the grand total, 0-100
    pub percent: f64,
}

impl PieSlice {
    /// e.g. `Food 63.6%`
    pub fn label(&self) -> String {
        format!("{} {:.1}%", self.category, self.percent)
    }
}

/// Slices for categories with a positive total, in category order
pub fn pie_slices(totals: &CategoryTotals) -> Vec<PieSlice> {
    let grand_total = totals.grand_total();
    if grand_total <= 0.0 {
        return Vec::new();
    }

    totals
        .iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|(category, amount)| PieSlice {
            category,
            amount,
            percent: amount / grand_total * 100.0,
        })
        .collect()
}

/// `Total Expenses: ₹5.50 | Food: ₹3.50, Transportation: ₹2.00, ...`
pub fn summary_line(totals: &CategoryTotals, currency: &str) -> String {
    let per_category: Vec<String> = totals
        .iter()
        .map(|(category, amount)| format!("{}: {}{:.2}", category, currency, amount))
        .collect();

    format!(
        "Total Expenses: {}{:.2} | {}",
        currency,
        totals.grand_total(),
        per_category.join(", ")
    )
}
