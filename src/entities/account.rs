// 💳 Account - ledger holder with owner, balance and currency
//
// id and created_at are assigned by the store and never change.
// balance is the only column an update touches.
// Zero rows affected by update/delete is not an error for accounts.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::{timestamp_column, Pagination};
use crate::error::{LedgerError, LedgerResult};

const ACCOUNT_COLUMNS: &str = "id, owner, balance, currency, created_at";

// ============================================================================
// ACCOUNT ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub owner: String,

    /// Minor currency units (cents, kopecks, ...)
    pub balance: i64,

    /// One of `db::CURRENCIES`
    pub currency: String,

    pub created_at: DateTime<Utc>,
}

impl Account {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Account {
            id: row.get(0)?,
            owner: row.get(1)?,
            balance: row.get(2)?,
            currency: row.get(3)?,
            created_at: timestamp_column(row, 4)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountParams {
    pub owner: String,
    pub balance: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateAccountParams {
    pub id: i64,
    pub balance: i64,
}

// ============================================================================
// ACCOUNT REPOSITORY
// ============================================================================

pub struct AccountRepository<'c> {
    conn: &'c Connection,
}

impl<'c> AccountRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert a new account; fails with `ConstraintViolation` for an unsupported currency
    pub fn create_account(&self, arg: &CreateAccountParams) -> LedgerResult<Account> {
        let account = self.conn.query_row(
            &format!(
                "INSERT INTO accounts (owner, balance, currency) VALUES (?1, ?2, ?3)
                 RETURNING {ACCOUNT_COLUMNS}"
            ),
            params![arg.owner, arg.balance, arg.currency],
            Account::from_row,
        )?;

        debug!(account_id = account.id, currency = %account.currency, "account created");
        Ok(account)
    }

    pub fn get_account(&self, id: i64) -> LedgerResult<Account> {
        self.conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1 LIMIT 1"),
                [id],
                Account::from_row,
            )
            .optional()?
            .ok_or_else(|| LedgerError::not_found("account", id))
    }

    /// Replace the balance. An unknown id is silently ignored.
    pub fn update_account(&self, arg: &UpdateAccountParams) -> LedgerResult<()> {
        let affected = self.conn.execute(
            "UPDATE accounts SET balance = ?2 WHERE id = ?1",
            params![arg.id, arg.balance],
        )?;

        debug!(account_id = arg.id, affected, "account balance updated");
        Ok(())
    }

    /// Hard delete. An unknown id is silently ignored.
    pub fn delete_account(&self, id: i64) -> LedgerResult<()> {
        let affected = self.conn.execute("DELETE FROM accounts WHERE id = ?1", [id])?;

        debug!(account_id = id, affected, "account deleted");
        Ok(())
    }

    /// Accounts ordered by id; fewer than `limit` rows once the table is exhausted
    pub fn list_accounts(&self, page: Pagination) -> LedgerResult<Vec<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;

        let accounts = stmt
            .query_map(params![page.limit, page.offset], Account::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(accounts)
    }
}
