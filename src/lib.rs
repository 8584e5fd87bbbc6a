pub mod cli;
pub mod core;
pub mod providers;
pub mod store;
pub mod sync;

use crate::core::config::AppConfig;
use crate::core::currency::Currency;
use crate::core::model::{DepositKind, MaturityAction};
use crate::providers::{QuoteProvider, ScriptQuoteProvider};
use crate::store::disk::DiskStorage;
use crate::store::StateStore;
use crate::sync::SyncAdapter;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Application-level commands, decoupled from the clap surface in `main`.
pub enum AppCommand {
    Overview,
    Update(UpdateAction),
    Deposits(DepositAction),
    History,
    Goal { target: Option<i64> },
    Import { file: PathBuf },
    Sync(SyncAction),
}

pub enum UpdateAction {
    SetBalance {
        account_id: String,
        amount: f64,
    },
    SetQuantity {
        account_id: String,
        quantity: f64,
    },
    SetPrice {
        account_id: String,
        price: f64,
    },
    Refresh,
    AddCash {
        name: String,
        balance: f64,
        currency: Currency,
    },
    AddStock {
        name: String,
        symbol: String,
        quantity: f64,
        price: Option<f64>,
        currency: Option<Currency>,
    },
    Remove {
        account_id: String,
    },
}

pub enum DepositAction {
    List,
    Add {
        bank: String,
        principal: f64,
        currency: Currency,
        rate: f64,
        months: u32,
        kind: DepositKind,
        action: Option<MaturityAction>,
        auto_roll: bool,
    },
    Remove {
        deposit_id: String,
    },
    Rollover {
        deposit_id: String,
        interest: Option<f64>,
        rate: Option<f64>,
        months: u32,
    },
    Settle {
        deposit_id: String,
        target_account_id: String,
        interest: Option<f64>,
    },
}

pub enum SyncAction {
    Push,
    Pull,
    Listen,
    Status,
}

impl AppCommand {
    /// Whether the command commits a local change that should be pushed out.
    fn mutates(&self) -> bool {
        !matches!(
            self,
            AppCommand::Overview
                | AppCommand::History
                | AppCommand::Goal { target: None }
                | AppCommand::Deposits(DepositAction::List)
                | AppCommand::Sync(_)
        )
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Net worth tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = config.resolve_data_path()?;
    let storage = DiskStorage::open(&data_path)?;
    let mut store = StateStore::open(Box::new(storage));

    let quotes = config
        .quotes
        .as_ref()
        .map(|q| ScriptQuoteProvider::new(&q.base_url));
    let adapter = SyncAdapter::from_config(&config)?;

    let push_after = command.mutates();
    dispatch(command, &config, &mut store, quotes.as_ref(), adapter.as_ref()).await?;
    if push_after {
        cli::sync::propagate_change(adapter.as_ref(), store.state()).await;
    }
    Ok(())
}

async fn dispatch(
    command: AppCommand,
    config: &AppConfig,
    store: &mut StateStore,
    quotes: Option<&ScriptQuoteProvider>,
    adapter: Option<&SyncAdapter>,
) -> Result<()> {
    let quote_provider = quotes.map(|q| q as &(dyn QuoteProvider + Send + Sync));

    match command {
        AppCommand::Overview => {
            cli::overview::run(store.state());
            Ok(())
        }
        AppCommand::Update(action) => match action {
            UpdateAction::SetBalance { account_id, amount } => {
                cli::update::set_balance(store, &account_id, amount)
            }
            UpdateAction::SetQuantity {
                account_id,
                quantity,
            } => cli::update::set_quantity(store, &account_id, quantity),
            UpdateAction::SetPrice { account_id, price } => {
                cli::update::set_price(store, &account_id, price)
            }
            UpdateAction::Refresh => {
                let provider = quote_provider
                    .context("Refreshing prices needs a quotes section in the config")?;
                cli::update::refresh(store, provider).await
            }
            UpdateAction::AddCash {
                name,
                balance,
                currency,
            } => cli::update::add_cash(store, &name, balance, currency),
            UpdateAction::AddStock {
                name,
                symbol,
                quantity,
                price,
                currency,
            } => {
                cli::update::add_stock(store, &name, &symbol, quantity, price, currency, quote_provider)
                    .await
            }
            UpdateAction::Remove { account_id } => cli::update::remove(store, &account_id),
        },
        AppCommand::Deposits(action) => match action {
            DepositAction::List => {
                cli::deposits::list(store.state());
                Ok(())
            }
            DepositAction::Add {
                bank,
                principal,
                currency,
                rate,
                months,
                kind,
                action,
                auto_roll,
            } => cli::deposits::add(
                store, &bank, principal, currency, rate, months, kind, action, auto_roll,
            ),
            DepositAction::Remove { deposit_id } => cli::deposits::remove(store, &deposit_id),
            DepositAction::Rollover {
                deposit_id,
                interest,
                rate,
                months,
            } => cli::deposits::rollover(store, &deposit_id, interest, rate, months),
            DepositAction::Settle {
                deposit_id,
                target_account_id,
                interest,
            } => cli::deposits::settle(store, &deposit_id, &target_account_id, interest),
        },
        AppCommand::History => {
            cli::history::run(store.state());
            Ok(())
        }
        AppCommand::Goal { target: None } => {
            cli::goal::show(store.state());
            Ok(())
        }
        AppCommand::Goal {
            target: Some(target),
        } => cli::goal::set(store, target),
        AppCommand::Import { file } => cli::import::run(store, &file, quote_provider).await,
        AppCommand::Sync(action) => {
            let adapter =
                adapter.context("Sync is not configured; add a sync section to the config file")?;
            match action {
                SyncAction::Push => {
                    cli::sync::push(adapter, store.state()).await;
                    Ok(())
                }
                SyncAction::Pull => cli::sync::pull(store, adapter).await,
                SyncAction::Listen => cli::sync::listen(store, adapter).await,
                SyncAction::Status => cli::sync::status(config, adapter, store.state()).await,
            }
        }
    }
}
