// 🔁 Transfer - recorded movement of an amount between two accounts
//
// Only the transfer row is written. Debiting/crediting the two accounts
// belongs to whoever orchestrates the transfer, not to this repository.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::{timestamp_column, Pagination};
use crate::error::{LedgerError, LedgerResult};

const TRANSFER_COLUMNS: &str = "id, from_account_id, to_account_id, amount, created_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl Transfer {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Transfer {
            id: row.get(0)?,
            from_account_id: row.get(1)?,
            to_account_id: row.get(2)?,
            amount: row.get(3)?,
            created_at: timestamp_column(row, 4)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddTransferEntryParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Both endpoints must match; this is not "every transfer touching an account"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GetTransfersParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransfersParams {
    pub id: i64,
    pub amount: i64,
}

pub struct TransferRepository<'c> {
    conn: &'c Connection,
}

impl<'c> TransferRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn add_transfer_entry(&self, arg: &AddTransferEntryParams) -> LedgerResult<Transfer> {
        let transfer = self.conn.query_row(
            &format!(
                "INSERT INTO transfers (from_account_id, to_account_id, amount) VALUES (?1, ?2, ?3)
                 RETURNING {TRANSFER_COLUMNS}"
            ),
            params![arg.from_account_id, arg.to_account_id, arg.amount],
            Transfer::from_row,
        )?;

        debug!(
            transfer_id = transfer.id,
            from = transfer.from_account_id,
            to = transfer.to_account_id,
            "transfer recorded"
        );
        Ok(transfer)
    }

    pub fn get_transfer(&self, id: i64) -> LedgerResult<Transfer> {
        self.conn
            .query_row(
                &format!("SELECT {TRANSFER_COLUMNS} FROM transfers WHERE id = ?1 LIMIT 1"),
                [id],
                Transfer::from_row,
            )
            .optional()?
            .ok_or_else(|| LedgerError::not_found("transfer", id))
    }

    pub fn get_transfers(&self, arg: &GetTransfersParams) -> LedgerResult<Vec<Transfer>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers
             WHERE from_account_id = ?1 AND to_account_id = ?2
             ORDER BY id"
        ))?;

        let transfers = stmt
            .query_map(params![arg.from_account_id, arg.to_account_id], Transfer::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(transfers)
    }

    /// Replace the amount and return the updated row; `NotFound` for an unknown id
    pub fn update_transfers(&self, arg: &UpdateTransfersParams) -> LedgerResult<Transfer> {
        let transfer = self
            .conn
            .query_row(
                &format!(
                    "UPDATE transfers SET amount = ?2 WHERE id = ?1 RETURNING {TRANSFER_COLUMNS}"
                ),
                params![arg.id, arg.amount],
                Transfer::from_row,
            )
            .optional()?
            .ok_or_else(|| LedgerError::not_found("transfer", arg.id))?;

        debug!(transfer_id = transfer.id, amount = transfer.amount, "transfer updated");
        Ok(transfer)
    }

    /// Hard delete. An unknown id is silently ignored.
    pub fn delete_transfer(&self, id: i64) -> LedgerResult<()> {
        let affected = self.conn.execute("DELETE FROM transfers WHERE id = ?1", [id])?;

        debug!(transfer_id = id, affected, "transfer deleted");
        Ok(())
    }

    pub fn list_transfers(&self, page: Pagination) -> LedgerResult<Vec<Transfer>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfers ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;

        let transfers = stmt
            .query_map(params![page.limit, page.offset], Transfer::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(transfers)
    }
}
