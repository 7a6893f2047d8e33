use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::entities::{AccountRepository, EntryRepository, TransferRepository};
use crate::error::LedgerResult;

/// Currency codes accepted by the accounts table CHECK constraint
pub const CURRENCIES: [&str; 6] = ["USD", "EUR", "GBP", "RUB", "JPY", "CNY"];

/// Server-assigned creation time: UTC, RFC 3339, millisecond precision
const CREATED_AT_DEFAULT: &str = "(strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))";

/// Page window for the list operations.
/// Unsigned on purpose: SQLite treats a negative LIMIT as "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Pagination {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { limit: 10, offset: 0 }
    }
}

/// Row counts per table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub accounts: i64,
    pub entries: i64,
    pub transfers: i64,
}

pub fn setup_database(conn: &Connection) -> LedgerResult<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Accounts
    // ==========================================================================
    let currency_list = CURRENCIES
        .iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(", ");

    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                balance INTEGER NOT NULL,
                currency TEXT NOT NULL CHECK (currency IN ({currency_list})),
                created_at TEXT NOT NULL DEFAULT {CREATED_AT_DEFAULT}
            )"
        ),
        [],
    )?;

    // ==========================================================================
    // Entries (one balance-affecting event per row)
    // ==========================================================================
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES accounts(id),
                amount INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT {CREATED_AT_DEFAULT}
            )"
        ),
        [],
    )?;

    // ==========================================================================
    // Transfers (recorded movement between two accounts)
    // ==========================================================================
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS transfers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                from_account_id INTEGER NOT NULL REFERENCES accounts(id),
                to_account_id INTEGER NOT NULL REFERENCES accounts(id),
                amount INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT {CREATED_AT_DEFAULT}
            )"
        ),
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_entries_account ON entries(account_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transfers_from_to ON transfers(from_account_id, to_account_id)",
        [],
    )?;

    Ok(())
}

/// Read a `created_at` column written by `CREATED_AT_DEFAULT`
pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Owns the SQLite connection; repositories borrow it per call.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database described by `config` and bootstrap the schema
    pub fn open(config: &StoreConfig) -> LedgerResult<Self> {
        let conn = Connection::open(&config.path)?;
        conn.busy_timeout(config.busy_timeout)?;
        let store = Self::from_connection(conn, config.foreign_keys)?;
        info!(
            path = %config.path.display(),
            foreign_keys = config.foreign_keys,
            "store opened"
        );
        Ok(store)
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> LedgerResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, false)
    }

    pub fn open_in_memory_with_foreign_keys() -> LedgerResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, true)
    }

    fn from_connection(conn: Connection, foreign_keys: bool) -> LedgerResult<Self> {
        conn.pragma_update(None, "foreign_keys", foreign_keys)?;
        setup_database(&conn)?;
        debug!(foreign_keys, "schema ready");
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn accounts(&self) -> AccountRepository<'_> {
        AccountRepository::new(&self.conn)
    }

    pub fn entries(&self) -> EntryRepository<'_> {
        EntryRepository::new(&self.conn)
    }

    pub fn transfers(&self) -> TransferRepository<'_> {
        TransferRepository::new(&self.conn)
    }

    pub fn stats(&self) -> LedgerResult<StoreStats> {
        Ok(StoreStats {
            accounts: count_rows(&self.conn, "accounts")?,
            entries: count_rows(&self.conn, "entries")?,
            transfers: count_rows(&self.conn, "transfers")?,
        })
    }
}

fn count_rows(conn: &Connection, table: &str) -> LedgerResult<i64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        setup_database(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(tables, vec!["accounts", "entries", "transfers"]);
    }

    #[test]
    fn test_indexes_created() {
        let store = Store::open_in_memory().unwrap();

        let indexes: Vec<String> = store
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(indexes, vec!["idx_entries_account", "idx_transfers_from_to"]);
    }

    #[test]
    fn test_created_at_default_is_rfc3339() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.connection();

        conn.execute(
            "INSERT INTO accounts (owner, balance, currency) VALUES ('alice', 10, 'USD')",
            [],
        )
        .unwrap();

        let created_at = conn
            .query_row("SELECT created_at FROM accounts", [], |row| timestamp_column(row, 0))
            .unwrap();

        let age = Utc::now() - created_at;
        assert!(age.num_seconds().abs() < 5, "created_at should be close to now");
    }

    #[test]
    fn test_malformed_timestamp_is_a_conversion_error() {
        let conn = Connection::open_in_memory().unwrap();

        let err = conn
            .query_row("SELECT 'yesterday'", [], |row| timestamp_column(row, 0))
            .unwrap_err();

        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(0, Type::Text, _)));
    }

    #[test]
    fn test_stats_counts_every_table() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(
            store.stats().unwrap(),
            StoreStats { accounts: 0, entries: 0, transfers: 0 }
        );

        store
            .connection()
            .execute("INSERT INTO entries (account_id, amount) VALUES (1, 5)", [])
            .unwrap();

        assert_eq!(store.stats().unwrap().entries, 1);
    }

    #[test]
    fn test_open_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("bank.db"));

        {
            let store = Store::open(&config).unwrap();
            store
                .connection()
                .execute(
                    "INSERT INTO accounts (owner, balance, currency) VALUES ('bob', 1, 'EUR')",
                    [],
                )
                .unwrap();
        }

        let reopened = Store::open(&config).unwrap();
        assert_eq!(reopened.stats().unwrap().accounts, 1);
    }

    #[test]
    fn test_open_with_foreign_keys_enforces_references() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("bank.db")).with_foreign_keys(true);
        let store = Store::open(&config).unwrap();

        let err = store
            .connection()
            .execute("INSERT INTO transfers (from_account_id, to_account_id, amount) VALUES (1, 2, 3)", [])
            .map_err(crate::error::LedgerError::from)
            .unwrap_err();

        assert!(err.is_constraint_violation(), "unexpected error: {err}");
    }

    #[test]
    fn test_open_missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("missing").join("bank.db"));

        let err = Store::open(&config).err().unwrap();
        assert!(err.is_unavailable(), "unexpected error: {err}");
    }
}
