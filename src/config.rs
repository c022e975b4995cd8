// Runtime configuration: where the data files live and how money is shown

use std::env;
use std::path::{Path, PathBuf};

pub const DATA_DIR_VAR: &str = "TALLY_DATA_DIR";
pub const CURRENCY_VAR: &str = "TALLY_CURRENCY";

pub const CONTACTS_FILE: &str = "contacts.json";
pub const EXPENSE_DB_FILE: &str = "expenses.db";
pub const EXPENSE_BACKUP_FILE: &str = "expenses_backup.json";
pub const DEFAULT_CURRENCY: &str = "₹";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `TALLY_DATA_DIR` / `TALLY_CURRENCY`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(currency) = lookup(CURRENCY_VAR) {
            config.currency = currency;
        }

        config
    }

    pub fn contacts_path(&self) -> PathBuf {
        self.data_dir.join(CONTACTS_FILE)
    }

    pub fn expense_db_path(&self) -> PathBuf {
        self.data_dir.join(EXPENSE_DB_FILE)
    }

    pub fn expense_backup_path(&self) -> PathBuf {
        self.data_dir.join(EXPENSE_BACKUP_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_working_directory() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.contacts_path(), PathBuf::from("./contacts.json"));
        assert_eq!(config.expense_db_path(), PathBuf::from("./expenses.db"));
        assert_eq!(config.currency, "₹");
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_lookup(|key| match key {
            DATA_DIR_VAR => Some("/tmp/tally".to_string()),
            CURRENCY_VAR => Some("$".to_string()),
            _ => None,
        });

        assert_eq!(
            config.expense_backup_path(),
            PathBuf::from("/tmp/tally/expenses_backup.json")
        );
        assert_eq!(config.currency, "$");
    }

    #[test]
    fn test_blank_data_dir_ignored() {
        let config = Config::from_lookup(|key| (key == DATA_DIR_VAR).then(|| " ".to_string()));
        assert_eq!(config.data_dir(), Path::new("."));
    }
}
