use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::env;
use tracing::info;

use simplebank::{
    logging, CreateAccountParams, GetTransfersParams, Pagination, RandomGenerator, Store,
    StoreConfig,
};

const USAGE: &str = "Usage: simplebank <command>

Commands:
  init                         create the schema
  seed [count]                 create random accounts (default 20)
  stats                        row count per table
  accounts [limit] [offset]    list accounts (default 10 0)
  account <id>                 show one account
  entries <account_id>         entries recorded for an account
  transfers <from> <to>        transfers between two accounts

Environment:
  SIMPLEBANK_DB_PATH, SIMPLEBANK_FOREIGN_KEYS, SIMPLEBANK_BUSY_TIMEOUT_MS, RUST_LOG";

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = StoreConfig::from_env().context("Failed to read store configuration")?;
    let store = Store::open(&config)
        .with_context(|| format!("Failed to open database at {}", config.path.display()))?;

    match command.as_str() {
        "init" => {
            println!("✓ Database ready at {}", config.path.display());
        }
        "seed" => {
            let count = arg_or(&args, 1, 20u32)?;
            run_seed(&store, count)?;
        }
        "stats" => print_json(&store.stats()?)?,
        "accounts" => {
            let page = Pagination::new(arg_or(&args, 1, 10u32)?, arg_or(&args, 2, 0u32)?);
            print_json(&store.accounts().list_accounts(page)?)?;
        }
        "account" => {
            let id: i64 = required_arg(&args, 1, "id")?;
            print_json(&store.accounts().get_account(id)?)?;
        }
        "entries" => {
            let account_id: i64 = required_arg(&args, 1, "account_id")?;
            print_json(&store.entries().get_entries(account_id)?)?;
        }
        "transfers" => {
            let arg = GetTransfersParams {
                from_account_id: required_arg(&args, 1, "from")?,
                to_account_id: required_arg(&args, 2, "to")?,
            };
            print_json(&store.transfers().get_transfers(&arg)?)?;
        }
        other => bail!("Unknown command: {other}\n\n{USAGE}"),
    }

    Ok(())
}

fn run_seed(store: &Store, count: u32) -> Result<()> {
    let mut rng = RandomGenerator::new();

    for _ in 0..count {
        let account = store.accounts().create_account(&CreateAccountParams {
            owner: rng.random_owner(),
            balance: rng.random_money(),
            currency: rng.random_currency().to_string(),
        })?;
        info!(account_id = account.id, "seeded account");
    }

    println!("✓ Seeded {} accounts", count);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn arg_or<T>(args: &[String], idx: usize, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match args.get(idx) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid argument {idx}: {raw:?}")),
        None => Ok(default),
    }
}

fn required_arg<T>(args: &[String], idx: usize, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = args
        .get(idx)
        .with_context(|| format!("Missing <{name}>\n\n{USAGE}"))?;
    raw.parse()
        .with_context(|| format!("Invalid <{name}>: {raw:?}"))
}
