//! `ExpenseStore` owns the ordered collection of expenses and is the only writer of the persisted
//! blob.
//!
//! Every mutation is followed by a write of the whole collection to the `BlobStore`. A failed
//! write does not undo the mutation: the in-memory collection stays authoritative for the session
//! and the caller receives `Persistence::NotSaved` so it can warn the user.

mod blob;

pub(crate) use blob::is_valid_key;
pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};

use crate::error::{Error, ErrorType, IntoResult, Res};
use crate::model::Expense;
use crate::Result;
use anyhow::{anyhow, Context};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

/// The key under which the collection is stored unless configured otherwise.
pub const DEFAULT_KEY: &str = "expenses";

/// The outcome of writing the collection after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Persistence {
    Saved,
    /// The change is held in memory only.
    NotSaved { reason: String },
}

impl Persistence {
    pub fn is_saved(&self) -> bool {
        matches!(self, Persistence::Saved)
    }
}

/// The sole owner of the expense collection.
pub struct ExpenseStore {
    key: String,
    blob_store: Box<dyn BlobStore + Send>,
    expenses: Vec<Expense>,
}

impl std::fmt::Debug for ExpenseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpenseStore")
            .field("key", &self.key)
            .field("expenses", &self.expenses)
            .finish_non_exhaustive()
    }
}

impl ExpenseStore {
    /// Loads the collection stored under `key`.
    ///
    /// This never fails: a missing value, an unreadable store or a value that does not parse all
    /// result in an empty collection (the latter two with a warning). Records saved without an id,
    /// or with an id an earlier record already has, are given a new one and the collection is
    /// written back so that the ids stay stable.
    pub fn load(blob_store: impl BlobStore + Send + 'static, key: impl Into<String>) -> Self {
        Self::load_boxed(Box::new(blob_store), key)
    }

    /// Same as `load` for a blob store that is already boxed.
    pub fn load_boxed(blob_store: Box<dyn BlobStore + Send>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (expenses, assigned) = match blob_store.read(&key) {
            Ok(Some(json)) => match parse_collection(&json) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Ignoring unreadable expenses under '{key}': {e:#}");
                    (Vec::new(), 0)
                }
            },
            Ok(None) => {
                debug!("No expenses stored under '{key}', starting empty");
                (Vec::new(), 0)
            }
            Err(e) => {
                warn!("Unable to read expenses under '{key}', starting empty: {e:#}");
                (Vec::new(), 0)
            }
        };

        let mut store = Self {
            key,
            blob_store,
            expenses,
        };
        debug!("Loaded {} expenses", store.expenses.len());
        if assigned > 0 {
            debug!("Assigned ids to {assigned} expenses");
            if let Persistence::NotSaved { reason } = store.save() {
                warn!("The ids assigned to {assigned} expenses will change next time: {reason}");
            }
        }
        store
    }

    /// The key the collection is persisted under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// A read-only view of the collection in order.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// An owned copy of the collection. Changing it has no effect on the store.
    pub fn all(&self) -> Vec<Expense> {
        self.expenses.clone()
    }

    pub fn get(&self, index: usize) -> Option<&Expense> {
        self.expenses.get(index)
    }

    /// The current position of the expense with `id`.
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.expenses.iter().position(|e| e.id == id)
    }

    /// Finds the position of an expense given its full id or a unique prefix of it.
    pub fn resolve(&self, needle: &str) -> Result<usize> {
        let needle = needle.trim().to_ascii_lowercase().replace('-', "");
        if needle.is_empty() {
            return Err(Error::new(
                ErrorType::Validation,
                anyhow!("An expense id is required"),
            ));
        }
        let matches: Vec<usize> = self
            .expenses
            .iter()
            .enumerate()
            .filter(|(_, e)| e.id.simple().to_string().starts_with(&needle))
            .map(|(ix, _)| ix)
            .collect();
        match matches.as_slice() {
            [ix] => Ok(*ix),
            [] => Err(Error::new(
                ErrorType::NotFound,
                anyhow!("Expense not found: '{needle}'"),
            )),
            _ => Err(Error::new(
                ErrorType::Validation,
                anyhow!(
                    "'{needle}' matches {} expenses, use more characters of the id",
                    matches.len()
                ),
            )),
        }
    }

    /// Appends `expense` to the end of the collection. If its id is already taken it is given a
    /// new one, so the appended expense is always found with `expenses().last()`.
    pub fn add(&mut self, expense: Expense) -> Persistence {
        let expense = if self.position(expense.id).is_some() {
            let id = Uuid::new_v4();
            debug!("Expense id {} is taken, using {id}", expense.id);
            expense.with_id(id)
        } else {
            expense
        };
        debug!("Adding expense {}", expense.id);
        self.expenses.push(expense);
        self.save()
    }

    /// Replaces the expense at `index`. The replacement takes over the id of the expense it
    /// replaces.
    ///
    /// # Errors
    /// - `ErrorType::OutOfBounds` if `index` is not in the collection. Nothing is changed.
    pub fn update_at(&mut self, index: usize, expense: Expense) -> Result<Persistence> {
        let len = self.expenses.len();
        let slot = self
            .expenses
            .get_mut(index)
            .ok_or_else(|| out_of_bounds(index, len))?;
        let id = slot.id;
        *slot = expense.with_id(id);
        debug!("Updated expense {id} at position {index}");
        Ok(self.save())
    }

    /// Replaces the expense with `id`.
    ///
    /// # Errors
    /// - `ErrorType::NotFound` if there is no expense with `id`.
    pub fn update(&mut self, id: Uuid, expense: Expense) -> Result<Persistence> {
        let index = self.position(id).ok_or_else(|| not_found(id))?;
        self.update_at(index, expense)
    }

    /// Removes the expense at `index`, shifting every later expense down by one position.
    ///
    /// # Errors
    /// - `ErrorType::OutOfBounds` if `index` is not in the collection. Nothing is changed.
    pub fn delete_at(&mut self, index: usize) -> Result<(Expense, Persistence)> {
        if index >= self.expenses.len() {
            return Err(out_of_bounds(index, self.expenses.len()));
        }
        let removed = self.expenses.remove(index);
        debug!("Deleted expense {} from position {index}", removed.id);
        Ok((removed, self.save()))
    }

    /// Removes the expense with `id`.
    ///
    /// # Errors
    /// - `ErrorType::NotFound` if there is no expense with `id`.
    pub fn delete(&mut self, id: Uuid) -> Result<(Expense, Persistence)> {
        let index = self.position(id).ok_or_else(|| not_found(id))?;
        self.delete_at(index)
    }

    /// Writes the whole collection to the blob store.
    pub fn persist(&mut self) -> Result<()> {
        self.write_collection().pub_result(ErrorType::Storage)
    }

    /// Consumes the store, returning the blob store it was writing to.
    pub fn into_blob_store(self) -> Box<dyn BlobStore + Send> {
        self.blob_store
    }

    /// Persists after a mutation, downgrading a failure to a warning.
    fn save(&mut self) -> Persistence {
        match self.write_collection() {
            Ok(()) => Persistence::Saved,
            Err(e) => {
                let reason = format!("{e:#}");
                warn!("Changes are kept in memory but could not be saved: {reason}");
                Persistence::NotSaved { reason }
            }
        }
    }

    fn write_collection(&mut self) -> Res<()> {
        let json =
            serde_json::to_string(&self.expenses).context("Unable to serialize expenses")?;
        self.blob_store
            .write(&self.key, &json)
            .with_context(|| format!("Unable to write expenses under '{}'", self.key))
    }
}

/// Parses a stored collection, returning it with the number of records that were given an id
/// because they had none or repeated an earlier record's id.
fn parse_collection(json: &str) -> Res<(Vec<Expense>, usize)> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).context("Stored expenses are not a JSON array")?;
    let missing_ids = values
        .iter()
        .filter(|v| v.get("id").map_or(true, |id| id.is_null()))
        .count();
    let mut expenses: Vec<Expense> = serde_json::from_value(serde_json::Value::Array(values))
        .context("Stored expenses do not have the expected shape")?;

    let mut seen = HashSet::new();
    let mut repeated_ids = 0;
    for e in expenses.iter_mut() {
        if !seen.insert(e.id) {
            e.id = Uuid::new_v4();
            seen.insert(e.id);
            repeated_ids += 1;
        }
    }
    Ok((expenses, missing_ids + repeated_ids))
}

fn out_of_bounds(index: usize, len: usize) -> Error {
    Error::new(
        ErrorType::OutOfBounds,
        anyhow!("No expense at position {index}, the collection has {len}"),
    )
}

fn not_found(id: Uuid) -> Error {
    Error::new(ErrorType::NotFound, anyhow!("Expense not found: {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Amount;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn expense(amount: &str, category: &str, date: &str, notes: &str) -> Expense {
        Expense::new(Amount::from_str(amount).unwrap(), category, date, notes)
    }

    fn store_with(expenses: Vec<Expense>) -> ExpenseStore {
        let mut store = ExpenseStore::load(MemoryBlobStore::new(), DEFAULT_KEY);
        for e in expenses {
            assert!(store.add(e).is_saved());
        }
        store
    }

    fn three() -> ExpenseStore {
        store_with(vec![
            expense("10", "A", "2024-01-01", ""),
            expense("20", "B", "2024-01-02", ""),
            expense("5", "A", "2024-01-03", ""),
        ])
    }

    #[test]
    fn test_load_missing_is_empty() {
        let store = ExpenseStore::load(MemoryBlobStore::new(), DEFAULT_KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let blob = MemoryBlobStore::with_value(DEFAULT_KEY, "{not json");
        let store = ExpenseStore::load(blob, DEFAULT_KEY);
        assert!(store.is_empty());

        let blob = MemoryBlobStore::with_value(DEFAULT_KEY, r#"{"amount": 1}"#);
        let store = ExpenseStore::load(blob, DEFAULT_KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let original = three();
        let expected = original.all();
        let reloaded = ExpenseStore::load_boxed(original.into_blob_store(), DEFAULT_KEY);
        assert_eq!(reloaded.all(), expected);
    }

    #[test]
    fn test_round_trip_file_backed() {
        let dir = TempDir::new().unwrap();
        let blob = FileBlobStore::new(dir.path()).unwrap();
        let mut store = ExpenseStore::load(blob.clone(), DEFAULT_KEY);
        store.add(expense("12.75", "Food", "2024-03-05", "lunch \"special\""));
        store.add(expense("3", "Travel", "2024-03-06", ""));
        let expected = store.all();

        let reloaded = ExpenseStore::load(blob, DEFAULT_KEY);
        assert_eq!(reloaded.all(), expected);
    }

    #[test]
    fn test_legacy_ids_are_assigned_and_persisted() {
        let json = r#"[{"amount":100,"category":"Food","date":"2024-03-05","notes":""}]"#;
        let store = ExpenseStore::load(MemoryBlobStore::with_value(DEFAULT_KEY, json), DEFAULT_KEY);
        let id = store.expenses()[0].id();
        let reloaded = ExpenseStore::load_boxed(store.into_blob_store(), DEFAULT_KEY);
        assert_eq!(reloaded.expenses()[0].id(), id);
    }

    #[test]
    fn test_legacy_ids_load_when_write_back_fails() {
        let json = r#"[{"amount":100,"category":"Food","date":"2024-03-05","notes":""}]"#;
        let mut blob = MemoryBlobStore::with_value(DEFAULT_KEY, json);
        blob.set_fail_writes(true);
        let store = ExpenseStore::load(blob, DEFAULT_KEY);
        assert_eq!(store.len(), 1);
        assert!(!store.expenses()[0].id().is_nil());

        let blob = store.into_blob_store();
        assert_eq!(blob.read(DEFAULT_KEY).unwrap().as_deref(), Some(json));
    }

    #[test]
    fn test_add_appends() {
        let mut store = three();
        let e = expense("1", "C", "2024-02-01", "");
        let id = e.id();
        store.add(e);
        assert_eq!(store.len(), 4);
        assert_eq!(store.position(id), Some(3));
    }

    #[test]
    fn test_add_allows_equal_values_with_distinct_ids() {
        let mut store = three();
        let first = store.expenses()[0].clone();
        store.add(first.clone());
        assert_eq!(store.len(), 4);

        let copy = store.expenses().last().unwrap().clone();
        assert_ne!(copy.id(), first.id());
        assert_eq!(copy.amount(), first.amount());
        assert_eq!(copy.category(), first.category());
        assert_eq!(store.resolve(&first.id().to_string()).unwrap(), 0);
        assert_eq!(store.resolve(&copy.id().to_string()).unwrap(), 3);
    }

    #[test]
    fn test_repeated_ids_are_replaced_on_load() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"[{{"id":"{id}","amount":1,"category":"A","date":"2024-01-01"}},
                {{"id":"{id}","amount":1,"category":"A","date":"2024-01-01"}}]"#
        );
        let store = ExpenseStore::load(MemoryBlobStore::with_value(DEFAULT_KEY, json), DEFAULT_KEY);
        assert_eq!(store.len(), 2);
        assert_eq!(store.expenses()[0].id(), id);
        let second = store.expenses()[1].id();
        assert_ne!(second, id);

        let reloaded = ExpenseStore::load_boxed(store.into_blob_store(), DEFAULT_KEY);
        assert_eq!(reloaded.expenses()[1].id(), second);
    }

    #[test]
    fn test_precise_amounts_round_trip() {
        let mut store = ExpenseStore::load(MemoryBlobStore::new(), DEFAULT_KEY);
        for amount in ["0.1234567890123456789", "10000000000000000001", "19.99"] {
            let e = crate::form::ExpenseForm::new(amount, "Food", "2024-03-05", "")
                .validate()
                .unwrap();
            assert!(store.add(e).is_saved());
        }
        let expected = store.all();
        let reloaded = ExpenseStore::load_boxed(store.into_blob_store(), DEFAULT_KEY);
        assert_eq!(reloaded.all(), expected);
        assert_eq!(
            reloaded.expenses()[0].amount().to_string(),
            "0.1234567890123456789"
        );
        assert_eq!(
            reloaded.expenses()[1].amount().to_string(),
            "10000000000000000001"
        );
    }

    #[test]
    fn test_update_at_keeps_id() {
        let mut store = three();
        let id = store.expenses()[1].id();
        store
            .update_at(1, expense("25", "B", "2024-01-02", "fixed"))
            .unwrap();
        let updated = store.get(1).unwrap();
        assert_eq!(updated.id(), id);
        assert_eq!(updated.amount(), Amount::from_str("25").unwrap());
        assert_eq!(updated.notes(), "fixed");
    }

    #[test]
    fn test_update_at_out_of_bounds() {
        let mut store = three();
        let before = store.all();
        let err = store
            .update_at(5, expense("1", "X", "2024-01-01", ""))
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::OutOfBounds);
        assert_eq!(store.all(), before);
    }

    #[test]
    fn test_delete_at_shifts() {
        let mut store = three();
        let third = store.expenses()[2].id();
        let (removed, persistence) = store.delete_at(0).unwrap();
        assert!(persistence.is_saved());
        assert_eq!(removed.category(), "A");
        assert_eq!(store.len(), 2);
        assert_eq!(store.position(third), Some(1));
    }

    #[test]
    fn test_delete_at_out_of_bounds() {
        let mut store = three();
        let err = store.delete_at(3).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::OutOfBounds);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_delete_then_readd_does_not_restore_position() {
        let mut store = three();
        let (removed, _) = store.delete_at(0).unwrap();
        let copy = Expense::new(
            removed.amount(),
            removed.category(),
            removed.date(),
            removed.notes(),
        );
        let id = copy.id();
        store.add(copy);
        assert_eq!(store.position(id), Some(2));
        assert_ne!(id, removed.id());
    }

    #[test]
    fn test_update_and_delete_by_id() {
        let mut store = three();
        let id = store.expenses()[2].id();
        store
            .update(id, expense("7", "A", "2024-01-03", ""))
            .unwrap();
        assert_eq!(store.get(2).unwrap().amount(), Amount::from_str("7").unwrap());

        let (removed, _) = store.delete(id).unwrap();
        assert_eq!(removed.id(), id);
        let err = store.delete(id).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
    }

    #[test]
    fn test_resolve() {
        let store = three();
        let id = store.expenses()[1].id();
        assert_eq!(store.resolve(&id.to_string()).unwrap(), 1);
        assert_eq!(store.resolve(&id.simple().to_string()[..8]).unwrap(), 1);
        assert_eq!(
            store.resolve("zzzz").unwrap_err().error_type(),
            ErrorType::NotFound
        );
        assert_eq!(
            store.resolve(" ").unwrap_err().error_type(),
            ErrorType::Validation
        );
    }

    #[test]
    fn test_entry_count_tracks_all() {
        let mut store = three();
        store.add(expense("1", "C", "2024-02-01", ""));
        store.delete_at(1).unwrap();
        store
            .update_at(0, expense("2", "D", "2024-02-02", ""))
            .unwrap();
        assert_eq!(store.len(), store.all().len());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_all_is_a_copy() {
        let store = three();
        let mut copy = store.all();
        copy.clear();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let mut blob = MemoryBlobStore::new();
        blob.set_fail_writes(true);
        let mut store = ExpenseStore::load(blob, DEFAULT_KEY);
        let persistence = store.add(expense("1", "C", "2024-02-01", ""));
        assert!(!persistence.is_saved());
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.persist().unwrap_err().error_type(),
            ErrorType::Storage
        );
    }
}
