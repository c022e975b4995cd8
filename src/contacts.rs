// 📇 Contact Book - name → phone numbers, persisted as one JSON object
//
// File format:
//   { "Ana": ["555-0101", "555-0199"], "Bruno": ["555-0142"] }
//
// The book keeps insertion order (file order after a load). Number lookup
// walks that order; name search returns names sorted.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ContactError, StorageFault};
use crate::storage::{read_optional, to_json_pretty, write_atomic};

// ============================================================================
// CONTACT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    /// Never empty
    pub numbers: Vec<String>,
}

impl Contact {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Contact {
            name: name.into(),
            numbers: vec![number.into()],
        }
    }

    pub fn has_number(&self, number: &str) -> bool {
        self.numbers.iter().any(|n| n == number)
    }
}

// ============================================================================
// CONTACT BOOK (the persisted mapping)
// ============================================================================

/// Ordered mapping of contact name to numbers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactBook {
    contacts: Vec<Contact>,
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Contact> {
        self.contacts.iter_mut().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Contacts in native (insertion) order
    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }

    /// Case-insensitive substring match, names in lexicographic order
    pub fn search_by_name(&self, query: &str) -> Vec<&str> {
        let needle = query.to_lowercase();
        let mut names: Vec<&str> = self
            .contacts
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .map(|c| c.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// First contact, in native order, holding exactly this number
    pub fn search_by_number(&self, number: &str) -> Option<&str> {
        self.contacts
            .iter()
            .find(|c| c.has_number(number))
            .map(|c| c.name.as_str())
    }

    pub fn add_contact(&mut self, name: &str, number: &str) -> Result<(), ContactError> {
        require_filled(name, "name")?;
        require_filled(number, "number")?;

        if self.contains(name) {
            return Err(ContactError::DuplicateName(name.to_string()));
        }

        self.contacts.push(Contact::new(name, number));
        Ok(())
    }

    pub fn append_number(&mut self, name: &str, number: &str) -> Result<(), ContactError> {
        require_filled(number, "number")?;

        let contact = self
            .get_mut(name)
            .ok_or_else(|| ContactError::NameNotFound(name.to_string()))?;

        if contact.has_number(number) {
            return Err(ContactError::DuplicateNumber {
                name: name.to_string(),
                number: number.to_string(),
            });
        }

        contact.numbers.push(number.to_string());
        Ok(())
    }
}

fn require_filled(value: &str, field: &'static str) -> Result<(), ContactError> {
    if value.trim().is_empty() {
        return Err(ContactError::Blank(field));
    }
    Ok(())
}

impl Serialize for ContactBook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.contacts.len()))?;
        for contact in &self.contacts {
            map.serialize_entry(&contact.name, &contact.numbers)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ContactBook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ContactBookVisitor)
    }
}

struct ContactBookVisitor;

impl<'de> Visitor<'de> for ContactBookVisitor {
    type Value = ContactBook;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping contact names to arrays of numbers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ContactBook, A::Error> {
        let mut book = ContactBook::new();

        while let Some((name, numbers)) = access.next_entry::<String, Vec<String>>()? {
            if book.contains(&name) {
                return Err(de::Error::custom(format!("duplicate contact '{}'", name)));
            }
            if numbers.is_empty() {
                return Err(de::Error::custom(format!("contact '{}' has no numbers", name)));
            }
            book.contacts.push(Contact { name, numbers });
        }

        Ok(book)
    }
}

// ============================================================================
// PERSISTENCE
// ============================================================================

/// Load the book; a missing or empty file is an empty book
pub fn load_contacts(path: &Path) -> Result<ContactBook, ContactError> {
    let read_error = |source: StorageFault| ContactError::StorageRead {
        path: path.to_path_buf(),
        source,
    };

    let content = match read_optional(path).map_err(|e| read_error(e.into()))? {
        Some(content) if !content.trim().is_empty() => content,
        _ => {
            debug!("No contacts at {:?}, starting empty", path);
            return Ok(ContactBook::new());
        }
    };

    let book: ContactBook =
        serde_json::from_str(&content).map_err(|e| read_error(e.into()))?;
    debug!("Loaded {} contacts from {:?}", book.len(), path);
    Ok(book)
}

/// Overwrite the file with the full book
pub fn save_contacts(path: &Path, book: &ContactBook) -> Result<(), ContactError> {
    let write_error = |source: StorageFault| ContactError::StorageWrite {
        path: path.to_path_buf(),
        source,
    };

    let bytes = to_json_pretty(book).map_err(write_error)?;
    write_atomic(path, &bytes).map_err(|e| write_error(e.into()))?;
    debug!("Saved {} contacts to {:?}", book.len(), path);
    Ok(())
}

// ============================================================================
// CONTACT STORE (book + its file)
// ============================================================================

/// Contact book bound to its file; every mutation is saved before it returns
#[derive(Debug)]
pub struct ContactStore {
    path: PathBuf,
    book: ContactBook,
}

impl ContactStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ContactError> {
        let path = path.into();
        let book = load_contacts(&path)?;
        info!("Contact store opened at {:?} ({} contacts)", path, book.len());
        Ok(Self { path, book })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn book(&self) -> &ContactBook {
        &self.book
    }

    pub fn len(&self) -> usize {
        self.book.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }

    pub fn numbers(&self, name: &str) -> Option<&[String]> {
        self.book.get(name).map(|c| c.numbers.as_slice())
    }

    pub fn search_by_name(&self, query: &str) -> Vec<&str> {
        self.book.search_by_name(query)
    }

    pub fn search_by_number(&self, number: &str) -> Option<&str> {
        self.book.search_by_number(number)
    }

    pub fn add_contact(&mut self, name: &str, number: &str) -> Result<(), ContactError> {
        self.commit(|book| book.add_contact(name, number))?;
        info!("Added contact '{}'", name);
        Ok(())
    }

    pub fn append_number(&mut self, name: &str, number: &str) -> Result<(), ContactError> {
        self.commit(|book| book.append_number(name, number))?;
        info!("Appended a number to '{}'", name);
        Ok(())
    }

    /// Apply a change to a copy, save it, then swap it in
    fn commit<F>(&mut self, change: F) -> Result<(), ContactError>
    where
        F: FnOnce(&mut ContactBook) -> Result<(), ContactError>,
    {
        let mut next = self.book.clone();
        change(&mut next)?;
        save_contacts(&self.path, &next)?;
        self.book = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_store() -> (ContactStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = ContactStore::open(temp_dir.path().join("contacts.json")).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (store, _temp_dir) = setup_store();
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_every_mutation_round_trips_through_load() {
        let (mut store, _temp_dir) = setup_store();

        store.add_contact("Bruno", "555-0142").unwrap();
        assert_eq!(&load_contacts(store.path()).unwrap(), store.book());

        store.add_contact("ana", "555-0101").unwrap();
        assert_eq!(&load_contacts(store.path()).unwrap(), store.book());

        store.append_number("Bruno", "555-0199").unwrap();
        let reloaded = load_contacts(store.path()).unwrap();
        assert_eq!(&reloaded, store.book());
        assert_eq!(
            reloaded.get("Bruno").unwrap().numbers,
            vec!["555-0142".to_string(), "555-0199".to_string()]
        );

        // insertion order survives the file
        let names: Vec<_> = reloaded.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bruno", "ana"]);
    }

    #[test]
    fn test_duplicate_name_leaves_store_unchanged() {
        let (mut store, _temp_dir) = setup_store();
        store.add_contact("Ana", "555-0101").unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let err = store.add_contact("Ana", "555-0999").unwrap_err();
        assert!(matches!(err, ContactError::DuplicateName(ref n) if n == "Ana"));

        assert_eq!(store.numbers("Ana").unwrap(), ["555-0101".to_string()]);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);

        // uniqueness is case-sensitive
        store.add_contact("ana", "555-0999").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_append_number_errors() {
        let (mut store, _temp_dir) = setup_store();
        store.add_contact("Ana", "555-0101").unwrap();

        let err = store.append_number("Nobody", "555-0000").unwrap_err();
        assert!(matches!(err, ContactError::NameNotFound(_)));

        let err = store.append_number("Ana", "555-0101").unwrap_err();
        assert!(matches!(err, ContactError::DuplicateNumber { .. }));

        assert_eq!(store.numbers("Ana").unwrap().len(), 1);
    }

    #[test]
    fn test_blank_input_rejected() {
        let (mut store, _temp_dir) = setup_store();
        assert!(matches!(
            store.add_contact("  ", "555").unwrap_err(),
            ContactError::Blank("name")
        ));
        assert!(matches!(
            store.add_contact("Ana", "").unwrap_err(),
            ContactError::Blank("number")
        ));
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_search_by_name() {
        let mut book = ContactBook::new();
        book.add_contact("zoe", "1").unwrap();
        book.add_contact("Marta", "2").unwrap();
        book.add_contact("Amar", "3").unwrap();
        book.add_contact("Bob", "4").unwrap();

        assert_eq!(book.search_by_name(""), vec!["Amar", "Bob", "Marta", "zoe"]);
        assert_eq!(book.search_by_name("MAR"), vec!["Amar", "Marta"]);
        assert!(book.search_by_name("xyz").is_empty());
    }

    #[test]
    fn test_search_by_number_uses_insertion_order() {
        let mut book = ContactBook::new();
        book.add_contact("Zed", "555").unwrap();
        book.add_contact("Abe", "777").unwrap();
        book.append_number("Abe", "555").unwrap();

        assert_eq!(book.search_by_number("555"), Some("Zed"));
        assert_eq!(book.search_by_number("777"), Some("Abe"));
        assert_eq!(book.search_by_number("55"), None);
    }

    #[test]
    fn test_file_format_is_indented_object() {
        let (mut store, _temp_dir) = setup_store();
        store.add_contact("Ana", "555-0101").unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "{\n    \"Ana\": [\n        \"555-0101\"\n    ]\n}");
    }

    #[test]
    fn test_malformed_files_fail_to_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.json");

        for bad in [
            "not json",
            "[\"Ana\"]",
            "{\"Ana\": \"555\"}",
            "{\"Ana\": []}",
            "{\"Ana\": [\"1\"], \"Ana\": [\"2\"]}",
        ] {
            fs::write(&path, bad).unwrap();
            let err = load_contacts(&path).unwrap_err();
            assert!(
                matches!(err, ContactError::StorageRead { .. }),
                "expected read error for {}",
                bad
            );
        }

        fs::write(&path, "").unwrap();
        assert!(load_contacts(&path).unwrap().is_empty());
    }

    #[test]
    fn test_failed_save_keeps_memory_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        // a directory where the file should be makes the rename fail
        let path = temp_dir.path().join("contacts.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let mut store = ContactStore {
            path: path.clone(),
            book: ContactBook::new(),
        };

        let err = store.add_contact("Ana", "555").unwrap_err();
        assert!(matches!(err, ContactError::StorageWrite { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_save_keeps_previous_file() {
        let (mut store, _temp_dir) = setup_store();
        store.add_contact("Ana", "555-0101").unwrap();
        let before = fs::read(store.path()).unwrap();

        // a directory at the temp path blocks the write before the rename
        let temp_path = store.path().with_extension("tmp");
        fs::create_dir(&temp_path).unwrap();

        let err = store.add_contact("Bruno", "555-0142").unwrap_err();
        assert!(matches!(err, ContactError::StorageWrite { .. }));
        let err = store.append_number("Ana", "555-0199").unwrap_err();
        assert!(matches!(err, ContactError::StorageWrite { .. }));

        assert_eq!(fs::read(store.path()).unwrap(), before);
        assert_eq!(store.len(), 1);
        assert_eq!(store.numbers("Ana").unwrap(), ["555-0101".to_string()]);
        assert_eq!(&load_contacts(store.path()).unwrap(), store.book());
    }
}
