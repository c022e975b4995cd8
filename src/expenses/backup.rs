// 💾 Expense backup - full JSON dump of the expenses table
//
// Format: [[id, name, amount, category, date], ...]
// The file is a snapshot derived from the table. It is rewritten after every
// insert and only read back once, at startup, to refill a missing database.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::category::Category;
use super::ExpenseRecord;
use crate::error::{LedgerError, StorageFault};
use crate::storage::{read_optional, write_atomic};

/// One table row as a positional JSON array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRow(pub i64, pub String, pub f64, pub Category, pub NaiveDate);

impl From<&ExpenseRecord> for BackupRow {
    fn from(record: &ExpenseRecord) -> Self {
        BackupRow(
            record.id,
            record.name.clone(),
            record.amount,
            record.category,
            record.date,
        )
    }
}

impl From<BackupRow> for ExpenseRecord {
    fn from(row: BackupRow) -> Self {
        let BackupRow(id, name, amount, category, date) = row;
        ExpenseRecord {
            id,
            name,
            amount,
            category,
            date,
        }
    }
}

/// Read the backup; `None` if the file does not exist
pub fn read_backup(path: &Path) -> Result<Option<Vec<ExpenseRecord>>, LedgerError> {
    let read_error = |source: StorageFault| LedgerError::StorageRead {
        path: path.to_path_buf(),
        source,
    };

    let Some(content) = read_optional(path).map_err(|e| read_error(e.into()))? else {
        return Ok(None);
    };

    let rows: Vec<BackupRow> =
        serde_json::from_str(&content).map_err(|e| read_error(e.into()))?;

    if let Some(bad) = rows.iter().find(|r| !(r.2.is_finite() && r.2 >= 0.0)) {
        return Err(read_error(StorageFault::Malformed(format!(
            "row {} has invalid amount {}",
            bad.0, bad.2
        ))));
    }

    Ok(Some(rows.into_iter().map(ExpenseRecord::from).collect()))
}

/// Overwrite the backup with every record
pub fn write_backup(path: &Path, records: &[ExpenseRecord]) -> Result<(), LedgerError> {
    let write_error = |source: StorageFault| LedgerError::StorageWrite {
        path: path.to_path_buf(),
        source,
    };

    let rows: Vec<BackupRow> = records.iter().map(BackupRow::from).collect();
    let json = serde_json::to_vec(&rows).map_err(|e| write_error(e.into()))?;
    write_atomic(path, &json).map_err(|e| write_error(e.into()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(id: i64, name: &str, amount: f64, category: Category) -> ExpenseRecord {
        ExpenseRecord {
            id,
            name: name.to_string(),
            amount,
            category,
            date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        }
    }

    #[test]
    fn test_backup_row_layout() {
        let json = serde_json::to_string(&BackupRow::from(&record(
            7,
            "Coffee",
            3.5,
            Category::Food,
        )))
        .unwrap();
        assert_eq!(json, r#"[7,"Coffee",3.5,"Food","2024-03-09"]"#);
    }

    #[test]
    fn test_missing_backup_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_backup(&dir.path().join("expenses_backup.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses_backup.json");
        let records = vec![
            record(1, "Coffee", 3.5, Category::Food),
            record(2, "Bus", 2.0, Category::Transportation),
        ];

        write_backup(&path, &records).unwrap();
        assert_eq!(read_backup(&path).unwrap().unwrap(), records);
    }

    #[test]
    fn test_malformed_backup_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses_backup.json");

        for bad in [
            "{}",
            r#"[[1,"Chips",2.0,"Snacks","2024-03-09"]]"#,
            r#"[[1,"Refund",-5.0,"Food","2024-03-09"]]"#,
            r#"[[1,"Coffee",3.5,"Food","09/03/2024"]]"#,
        ] {
            fs::write(&path, bad).unwrap();
            assert!(
                matches!(read_backup(&path), Err(LedgerError::StorageRead { .. })),
                "expected read error for {}",
                bad
            );
        }
    }
}
