pub mod quote;

pub use quote::{QuoteProvider, ScriptQuoteProvider};

use crate::core::model::{Account, AccountKind};
use anyhow::Result;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Refreshes every stock position's price from the provider, re-deriving
/// its balance. Symbols are fetched concurrently and deduplicated first;
/// a symbol the provider cannot price keeps its prior value. Returns the
/// number of accounts updated. Progress is reported through
/// `update_callback`, once per distinct symbol.
pub async fn refresh_prices(
    accounts: &mut [Account],
    provider: &(dyn QuoteProvider + Send + Sync),
    update_callback: &(dyn Fn()),
) -> usize {
    let symbols: BTreeSet<String> = accounts
        .iter()
        .filter(|a| a.kind == AccountKind::Stock)
        .filter_map(|a| a.symbol.clone())
        .collect();

    let quote_futures = symbols.iter().map(|symbol| async move {
        let result = provider.fetch_price(symbol).await;
        update_callback();
        (symbol.clone(), result)
    });
    let quotes: HashMap<String, Result<f64>> =
        join_all(quote_futures).await.into_iter().collect();

    let mut updated = 0;
    for account in accounts.iter_mut().filter(|a| a.kind == AccountKind::Stock) {
        let Some(symbol) = &account.symbol else {
            continue;
        };
        match quotes.get(symbol) {
            Some(Ok(price)) => {
                account.set_price(*price);
                updated += 1;
            }
            Some(Err(e)) => {
                warn!("Keeping prior price for {symbol}: {e:#}");
            }
            None => {}
        }
    }
    updated
}
