use super::ui;
use crate::core::currency::{self, Currency};
use crate::core::model::{new_id, Account, AccountKind};
use crate::providers::{refresh_prices, QuoteProvider};
use crate::store::StateStore;
use anyhow::{Context, Result};
use std::collections::BTreeSet;

pub fn set_balance(store: &mut StateStore, account_id: &str, amount: f64) -> Result<()> {
    let state = store.set_account_balance(account_id, amount)?;
    println!("Set {account_id} to {}", ui::format_amount(amount));
    super::print_committed_total(state);
    Ok(())
}

pub fn set_quantity(store: &mut StateStore, account_id: &str, quantity: f64) -> Result<()> {
    let state = store.set_stock_quantity(account_id, quantity)?;
    println!("Set {account_id} to {quantity} units");
    super::print_committed_total(state);
    Ok(())
}

pub fn set_price(store: &mut StateStore, account_id: &str, price: f64) -> Result<()> {
    let state = store.set_stock_price(account_id, price)?;
    println!("Set {account_id} price to {}", ui::format_amount(price));
    super::print_committed_total(state);
    Ok(())
}

/// Re-quotes every stock holding and commits the refreshed balances.
/// Symbols that fail to quote keep their stored price.
pub async fn refresh(
    store: &mut StateStore,
    provider: &(dyn QuoteProvider + Send + Sync),
) -> Result<()> {
    let mut accounts = store.state().accounts.clone();
    let symbols: BTreeSet<String> = accounts
        .iter()
        .filter(|a| a.kind == AccountKind::Stock)
        .filter_map(|a| a.symbol.clone())
        .collect();
    if symbols.is_empty() {
        println!("No stock holdings to refresh.");
        return Ok(());
    }

    let pb = ui::new_progress_bar(symbols.len() as u64, false);
    let updated = refresh_prices(&mut accounts, provider, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    let state = store.update_accounts(accounts)?;
    println!("Refreshed {updated} of {} symbol(s).", symbols.len());
    super::print_committed_total(state);
    Ok(())
}

pub fn add_cash(
    store: &mut StateStore,
    name: &str,
    balance: f64,
    currency: Currency,
) -> Result<()> {
    let account = Account::cash(&new_id(), name, currency, balance);
    let id = account.id.clone();
    let state = store.add_account(account)?;
    println!("Added cash account {id} ({name}, {currency})");
    super::print_committed_total(state);
    Ok(())
}

/// Adds a stock holding. The currency is inferred from the symbol's listing
/// suffix unless given, and a missing price is quoted on the spot.
pub async fn add_stock(
    store: &mut StateStore,
    name: &str,
    symbol: &str,
    quantity: f64,
    price: Option<f64>,
    currency: Option<Currency>,
    provider: Option<&(dyn QuoteProvider + Send + Sync)>,
) -> Result<()> {
    let currency = currency.unwrap_or_else(|| currency::infer_from_symbol(symbol));
    let price = match price {
        Some(price) => price,
        None => {
            let provider = provider.context(
                "No price given and no quote source configured; pass --price or add a quotes section to the config",
            )?;
            provider.fetch_price(symbol).await?
        }
    };

    let account = Account::stock(&new_id(), name, symbol, quantity, price, currency);
    let id = account.id.clone();
    let state = store.add_account(account)?;
    println!(
        "Added stock account {id} ({symbol} @ {}, {currency})",
        ui::format_amount(price)
    );
    super::print_committed_total(state);
    Ok(())
}

pub fn remove(store: &mut StateStore, account_id: &str) -> Result<()> {
    let state = store.remove_account(account_id)?;
    println!("Removed account {account_id}");
    super::print_committed_total(state);
    Ok(())
}
