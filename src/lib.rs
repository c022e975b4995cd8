// Tally Book - Core Library
// Contact book and expense ledger, used by the CLI, the dashboard and tests

pub mod chart;
pub mod config;
pub mod contacts;
pub mod error;
pub mod expenses;
pub mod storage;

// Re-export commonly used types
pub use chart::{pie_slices, summary_line, PieSlice, EMPTY_CHART_MESSAGE};
pub use config::Config;
pub use contacts::{load_contacts, save_contacts, Contact, ContactBook, ContactStore};
pub use error::{ContactError, LedgerError, StorageFault};
pub use expenses::{
    parse_amount, Category, CategoryTotals, ExpenseLedger, ExpenseRecord, NewExpense,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
