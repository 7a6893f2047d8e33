// Shared test fixtures: fresh stores and random rows checked on the way in

use crate::db::Store;
use crate::entities::{
    Account, AddEntryParams, AddTransferEntryParams, CreateAccountParams, Entry, Transfer,
};
use crate::random::RandomGenerator;

pub fn test_store() -> Store {
    Store::open_in_memory().unwrap()
}

pub fn create_random_account(store: &Store, rng: &mut RandomGenerator) -> Account {
    let arg = CreateAccountParams {
        owner: rng.random_owner(),
        balance: rng.random_money(),
        currency: rng.random_currency().to_string(),
    };

    let account = store.accounts().create_account(&arg).unwrap();

    assert_eq!(account.owner, arg.owner);
    assert_eq!(account.balance, arg.balance);
    assert_eq!(account.currency, arg.currency);
    assert!(account.id > 0);
    assert!(account.created_at.timestamp() > 0);
    account
}

pub fn create_random_entry(store: &Store, rng: &mut RandomGenerator) -> Entry {
    let arg = AddEntryParams {
        account_id: rng.random_account_id(),
        amount: rng.random_money(),
    };

    let entry = store.entries().add_entry(&arg).unwrap();

    assert_eq!(entry.account_id, arg.account_id);
    assert_eq!(entry.amount, arg.amount);
    assert!(entry.id > 0);
    assert!(entry.created_at.timestamp() > 0);
    entry
}

pub fn create_random_transfer(store: &Store, rng: &mut RandomGenerator) -> Transfer {
    let arg = AddTransferEntryParams {
        from_account_id: rng.random_account_id(),
        to_account_id: rng.random_account_id(),
        amount: rng.random_money(),
    };

    let transfer = store.transfers().add_transfer_entry(&arg).unwrap();

    assert_eq!(transfer.from_account_id, arg.from_account_id);
    assert_eq!(transfer.to_account_id, arg.to_account_id);
    assert_eq!(transfer.amount, arg.amount);
    assert!(transfer.id > 0);
    assert!(transfer.created_at.timestamp() > 0);
    transfer
}
