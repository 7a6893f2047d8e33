// Ledger entities and their repositories
//
// Each module holds the row type, the parameter structs for its statements,
// and a repository borrowing the store connection. Repositories keep no
// state of their own: every call is one SQL statement against the store.

pub mod account;
pub mod entry;
pub mod transfer;

pub use account::{Account, AccountRepository, CreateAccountParams, UpdateAccountParams};
pub use entry::{AddEntryParams, Entry, EntryRepository, UpdateEntryParams};
pub use transfer::{
    AddTransferEntryParams, GetTransfersParams, Transfer, TransferRepository,
    UpdateTransfersParams,
};
