// simplebank - Core Library
// Ledger data access (accounts, entries, transfers) for the CLI, the API server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod logging;
pub mod random;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use config::{ConfigError, StoreConfig};
pub use db::{setup_database, Pagination, Store, StoreStats, CURRENCIES};
pub use entities::{
    Account, AccountRepository, AddEntryParams, AddTransferEntryParams, CreateAccountParams,
    Entry, EntryRepository, GetTransfersParams, Transfer, TransferRepository,
    UpdateAccountParams, UpdateEntryParams, UpdateTransfersParams,
};
pub use error::{LedgerError, LedgerResult};
pub use random::RandomGenerator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
