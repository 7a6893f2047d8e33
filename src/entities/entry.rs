// 🧾 Entry - a single amount change recorded against an account
//
// Adding an entry never touches accounts.balance.
// account_id is not checked by the repository; the schema's REFERENCES
// clause only bites when the store runs with foreign keys enabled.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::{timestamp_column, Pagination};
use crate::error::{LedgerError, LedgerResult};

const ENTRY_COLUMNS: &str = "id, account_id, amount, created_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,

    /// Signed delta in minor units
    pub amount: i64,

    pub created_at: DateTime<Utc>,
}

impl Entry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Entry {
            id: row.get(0)?,
            account_id: row.get(1)?,
            amount: row.get(2)?,
            created_at: timestamp_column(row, 3)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddEntryParams {
    pub account_id: i64,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateEntryParams {
    pub id: i64,
    pub amount: i64,
}

pub struct EntryRepository<'c> {
    conn: &'c Connection,
}

impl<'c> EntryRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn add_entry(&self, arg: &AddEntryParams) -> LedgerResult<Entry> {
        let entry = self.conn.query_row(
            &format!(
                "INSERT INTO entries (account_id, amount) VALUES (?1, ?2)
                 RETURNING {ENTRY_COLUMNS}"
            ),
            params![arg.account_id, arg.amount],
            Entry::from_row,
        )?;

        debug!(entry_id = entry.id, account_id = entry.account_id, "entry added");
        Ok(entry)
    }

    pub fn get_entry(&self, id: i64) -> LedgerResult<Entry> {
        self.conn
            .query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1 LIMIT 1"),
                [id],
                Entry::from_row,
            )
            .optional()?
            .ok_or_else(|| LedgerError::not_found("entry", id))
    }

    /// Every entry of `account_id` in insertion order; empty when there are none
    pub fn get_entries(&self, account_id: i64) -> LedgerResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE account_id = ?1 ORDER BY id"
        ))?;

        let entries = stmt
            .query_map([account_id], Entry::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Replace the amount and return the updated row; `NotFound` for an unknown id
    pub fn update_entry(&self, arg: &UpdateEntryParams) -> LedgerResult<Entry> {
        let entry = self
            .conn
            .query_row(
                &format!("UPDATE entries SET amount = ?2 WHERE id = ?1 RETURNING {ENTRY_COLUMNS}"),
                params![arg.id, arg.amount],
                Entry::from_row,
            )
            .optional()?
            .ok_or_else(|| LedgerError::not_found("entry", arg.id))?;

        debug!(entry_id = entry.id, amount = entry.amount, "entry updated");
        Ok(entry)
    }

    pub fn delete_entry(&self, id: i64) -> LedgerResult<()> {
        let affected = self.conn.execute("DELETE FROM entries WHERE id = ?1", [id])?;

        debug!(entry_id = id, affected, "entry deleted");
        Ok(())
    }

    pub fn list_entries(&self, page: Pagination) -> LedgerResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;

        let entries = stmt
            .query_map(params![page.limit, page.offset], Entry::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::fixtures::{create_random_account, create_random_entry, test_store};
    use crate::random::RandomGenerator;

    #[test]
    fn test_add_entry() {
        let store = test_store();
        let mut rng = RandomGenerator::new();

        let entry = create_random_entry(&store, &mut rng);

        assert!((11..=20).contains(&entry.account_id));
    }

    #[test]
    fn test_add_entry_does_not_touch_balance() {
        let store = test_store();
        let mut rng = RandomGenerator::new();
        let account = create_random_account(&store, &mut rng);

        store
            .entries()
            .add_entry(&AddEntryParams { account_id: account.id, amount: -75 })
            .unwrap();

        let reloaded = store.accounts().get_account(account.id).unwrap();
        assert_eq!(reloaded.balance, account.balance);
    }

    #[test]
    fn test_get_entries() {
        let store = test_store();
        let mut rng = RandomGenerator::new();
        let arg = AddEntryParams {
            account_id: 11,
            amount: rng.random_int(1, 1000),
        };

        store.entries().add_entry(&arg).unwrap();
        store.entries().add_entry(&arg).unwrap();
        // noise on another account
        store
            .entries()
            .add_entry(&AddEntryParams { account_id: 12, amount: 5 })
            .unwrap();

        let entries = store.entries().get_entries(arg.account_id).unwrap();

        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert_eq!(entry.account_id, arg.account_id);
            assert_eq!(entry.amount, arg.amount);
            assert!(entry.created_at.timestamp() > 0);
        }
        assert!(entries[0].id < entries[1].id);
    }

    #[test]
    fn test_get_entries_without_rows_is_empty() {
        let store = test_store();

        let entries = store.entries().get_entries(77).unwrap();

        assert!(entries.is_empty());
    }

    #[test]
    fn test_get_entry() {
        let store = test_store();
        let mut rng = RandomGenerator::new();
        let entry = create_random_entry(&store, &mut rng);

        assert_eq!(store.entries().get_entry(entry.id).unwrap(), entry);
        assert!(store.entries().get_entry(entry.id + 1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_entry() {
        let store = test_store();
        let mut rng = RandomGenerator::new();
        let entry = create_random_entry(&store, &mut rng);

        let arg = UpdateEntryParams {
            id: entry.id,
            amount: rng.random_money(),
        };
        let entry1 = store.entries().update_entry(&arg).unwrap();

        assert_eq!(entry1.id, entry.id);
        assert_eq!(entry1.account_id, entry.account_id);
        assert_eq!(entry1.amount, arg.amount);
        assert_eq!(entry1.created_at, entry.created_at);
    }

    #[test]
    fn test_update_missing_entry_is_not_found() {
        let store = test_store();

        let err = store
            .entries()
            .update_entry(&UpdateEntryParams { id: 12345, amount: 1 })
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "entry with id 12345 not found");
    }

    #[test]
    fn test_delete_entry() {
        let store = test_store();
        let mut rng = RandomGenerator::new();
        let entry = create_random_entry(&store, &mut rng);

        store.entries().delete_entry(entry.id).unwrap();

        assert!(store.entries().get_entry(entry.id).unwrap_err().is_not_found());
        assert!(store
            .entries()
            .get_entries(entry.account_id)
            .unwrap()
            .iter()
            .all(|e| e.id != entry.id));

        // second delete matches nothing and stays silent
        store.entries().delete_entry(entry.id).unwrap();
    }

    #[test]
    fn test_list_entries() {
        let store = test_store();
        let mut rng = RandomGenerator::new();
        for _ in 0..10 {
            create_random_entry(&store, &mut rng);
        }

        let entries = store.entries().list_entries(Pagination::new(5, 0)).unwrap();

        assert_eq!(entries.len(), 5);
        for entry in &entries {
            assert!(entry.id > 0);
            assert!(entry.account_id > 0);
            assert!(entry.created_at.timestamp() > 0);
        }

        let past_end = store.entries().list_entries(Pagination::new(5, 10)).unwrap();
        assert!(past_end.is_empty());
    }

    #[test]
    fn test_add_entry_for_missing_account_with_foreign_keys() {
        let store = Store::open_in_memory_with_foreign_keys().unwrap();

        let err = store
            .entries()
            .add_entry(&AddEntryParams { account_id: 11, amount: 10 })
            .unwrap_err();

        assert!(err.is_constraint_violation(), "unexpected error: {err}");
    }
}
