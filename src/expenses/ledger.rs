use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::backup::{read_backup, write_backup};
use super::category::{Category, CategoryTotals};
use super::{check_amount, parse_amount, ExpenseRecord, NewExpense};
use crate::error::{LedgerError, StorageFault};

/// Expense table plus its backup file.
///
/// Owns the single connection used for the whole process. Create it once at
/// startup with [`ExpenseLedger::open`] and pass it to whatever needs it.
#[derive(Debug)]
pub struct ExpenseLedger {
    conn: Connection,
    backup_path: PathBuf,
}

impl ExpenseLedger {
    /// Open the database file, ensure the schema and reconcile with the backup
    pub fn open(db_path: &Path, backup_path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| LedgerError::StorageWrite {
                    path: parent.to_path_buf(),
                    source: StorageFault::Io(e),
                })?;
            }
        }

        let conn = Connection::open(db_path)?;
        Self::with_connection(conn, backup_path)
    }

    /// Same as [`open`](Self::open) for an already opened connection
    pub fn with_connection(
        conn: Connection,
        backup_path: impl Into<PathBuf>,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self {
            conn,
            backup_path: backup_path.into(),
        };

        ledger.init_schema()?;
        let restored = ledger.restore_from_backup()?;
        info!(
            "Expense ledger ready ({} records, {} restored from backup)",
            ledger.count()?,
            restored
        );

        Ok(ledger)
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Create the expenses table if it does not exist
    pub fn init_schema(&self) -> Result<(), LedgerError> {
        // Enable WAL mode for crash recovery (in-memory databases report "memory")
        let mode: String =
            self.conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("Expense database journal mode: {}", mode);

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                amount REAL,
                category TEXT,
                date TEXT
            )",
            [],
        )?;

        Ok(())
    }

    /// Insert backup rows whose id is not in the table yet.
    ///
    /// A missing backup restores nothing. Existing rows are never touched.
    /// Returns the number of rows inserted.
    pub fn restore_from_backup(&mut self) -> Result<usize, LedgerError> {
        let Some(records) = read_backup(&self.backup_path)? else {
            debug!("No expense backup at {:?}", self.backup_path);
            return Ok(0);
        };

        let tx = self.conn.transaction()?;
        let mut restored = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO expenses (id, name, amount, category, date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for record in &records {
                restored += stmt.execute(params![
                    record.id,
                    record.name,
                    record.amount,
                    record.category,
                    record.date,
                ])?;
            }
        }
        tx.commit()?;

        if restored > 0 {
            info!(
                "Restored {} of {} backup rows from {:?}",
                restored,
                records.len(),
                self.backup_path
            );
        }

        Ok(restored)
    }

    /// Validate user-entered text and insert. Returns the new id.
    pub fn add_expense(
        &mut self,
        name: &str,
        amount: &str,
        category: &str,
        date: NaiveDate,
    ) -> Result<i64, LedgerError> {
        let amount = parse_amount(amount)?;
        let category: Category = category.parse()?;

        self.insert(NewExpense::new(name, amount, category, date))
    }

    /// Insert a row and rewrite the backup.
    ///
    /// Both happen inside one SQLite transaction: if the backup cannot be
    /// written the row is rolled back.
    pub fn insert(&mut self, expense: NewExpense) -> Result<i64, LedgerError> {
        let amount = check_amount(expense.amount)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO expenses (name, amount, category, date) VALUES (?1, ?2, ?3, ?4)",
            params![expense.name, amount, expense.category, expense.date],
        )?;
        let id = tx.last_insert_rowid();

        let records = query_all(&tx)?;
        write_backup(&self.backup_path, &records)?;
        tx.commit()?;

        info!(
            "Recorded expense #{} ({}, {:.2})",
            id, expense.category, amount
        );
        Ok(id)
    }

    /// Every record, in id order
    pub fn list_all(&self) -> Result<Vec<ExpenseRecord>, LedgerError> {
        query_all(&self.conn)
    }

    pub fn count(&self) -> Result<i64, LedgerError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Totals per category (zero for empty ones) and the grand total
    pub fn aggregate_by_category(&self) -> Result<CategoryTotals, LedgerError> {
        let mut stmt = self.conn.prepare(
            "SELECT category, SUM(amount)
             FROM expenses
             GROUP BY category",
        )?;

        let sums = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut totals = CategoryTotals::new();
        for (category, sum) in sums {
            totals.add(stored_category(category.as_deref()), sum.unwrap_or(0.0));
        }

        Ok(totals)
    }
}

fn query_all(conn: &Connection) -> Result<Vec<ExpenseRecord>, LedgerError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, amount, category, date
         FROM expenses
         ORDER BY id",
    )?;

    let records = stmt
        .query_map([], |row| {
            Ok(ExpenseRecord {
                id: row.get(0)?,
                name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                amount: row.get(2)?,
                category: stored_category(row.get::<_, Option<String>>(3)?.as_deref()),
                date: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

/// Rows written outside the ledger may carry any text; unknown ones count as Others
fn stored_category(text: Option<&str>) -> Category {
    match text.map(str::parse::<Category>) {
        Some(Ok(category)) => category,
        _ => {
            warn!("Unknown stored category {:?}, counting it as Others", text);
            Category::Others
        }
    }
}
