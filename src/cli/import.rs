use super::ui;
use crate::core::scan::{ScanCategory, ScannedAsset};
use crate::providers::QuoteProvider;
use crate::store::StateStore;
use anyhow::{Context, Result};
use comfy_table::Cell;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::warn;

/// Imports accounts from a scanned-statement JSON file. Stock rows the scan
/// could not price are quoted before being committed, when a quote source is
/// configured.
pub async fn run(
    store: &mut StateStore,
    file: &Path,
    provider: Option<&(dyn QuoteProvider + Send + Sync)>,
) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let mut assets: Vec<ScannedAsset> = serde_json::from_str(&raw)
        .with_context(|| format!("{} does not hold scanned assets", file.display()))?;
    if assets.is_empty() {
        println!("Nothing to import.");
        return Ok(());
    }

    if let Some(provider) = provider {
        enrich_prices(&mut assets, provider).await;
    }

    display_preview(&assets);
    let (imported, state) = store.import_scanned(assets)?;
    println!("Imported {imported} account(s).");
    super::print_committed_total(state);
    Ok(())
}

/// Quotes the stock rows that arrived without a price. A failed quote leaves
/// the row at zero rather than sinking the batch.
async fn enrich_prices(assets: &mut [ScannedAsset], provider: &(dyn QuoteProvider + Send + Sync)) {
    let symbols: BTreeSet<String> = assets
        .iter()
        .filter(|a| a.category == ScanCategory::Stock && a.price.is_none())
        .filter_map(|a| a.symbol.as_deref())
        .map(|s| s.trim().to_uppercase())
        .collect();
    if symbols.is_empty() {
        return;
    }

    let pb = ui::new_progress_bar(symbols.len() as u64, false);
    let fetches = symbols.iter().map(|symbol| {
        let pb = pb.clone();
        async move {
            let result = provider.fetch_price(symbol).await;
            pb.inc(1);
            (symbol.clone(), result)
        }
    });
    let prices: HashMap<String, Result<f64>> = join_all(fetches).await.into_iter().collect();
    pb.finish_and_clear();

    for asset in assets.iter_mut() {
        if asset.category != ScanCategory::Stock || asset.price.is_some() {
            continue;
        }
        let Some(symbol) = asset.symbol.as_deref().map(|s| s.trim().to_uppercase()) else {
            continue;
        };
        match prices.get(&symbol) {
            Some(Ok(price)) => asset.price = Some(*price),
            Some(Err(e)) => warn!("No quote for scanned symbol {symbol}: {e:#}"),
            None => {}
        }
    }
}

fn display_preview(assets: &[ScannedAsset]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Name"),
        ui::header_cell("Symbol"),
        ui::header_cell("Amount"),
        ui::header_cell("Ccy"),
        ui::header_cell("Price"),
    ]);
    for asset in assets {
        let category = match asset.category {
            ScanCategory::Cash => "Cash",
            ScanCategory::Stock => "Stock",
        };
        let symbol_cell = match asset.symbol.as_deref() {
            Some(symbol) => Cell::new(symbol),
            None => ui::na_cell(false),
        };
        let price_cell = match asset.price {
            Some(price) => ui::amount_cell(price),
            None => ui::na_cell(false),
        };
        table.add_row(vec![
            Cell::new(category),
            Cell::new(asset.display_name()),
            symbol_cell,
            ui::amount_cell(asset.amount),
            Cell::new(asset.currency.as_deref().unwrap_or("HKD")),
            price_cell,
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStorage;
    use async_trait::async_trait;
    use std::io::Write;

    struct OnePrice(f64);

    #[async_trait]
    impl QuoteProvider for OnePrice {
        async fn fetch_price(&self, _symbol: &str) -> Result<f64> {
            Ok(self.0)
        }
    }

    fn scan_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn empty_store() -> StateStore {
        let mut store = StateStore::open(Box::new(MemoryStorage::new()));
        store.update_accounts(Vec::new()).unwrap();
        store.update_deposits(Vec::new()).unwrap();
        store
    }

    #[tokio::test]
    async fn test_import_reads_and_commits_scanned_accounts() {
        let file = scan_file(
            r#"[
                {"category": "CASH", "institution": "BOC HK", "amount": 12000, "currency": "HKD"},
                {"category": "STOCK", "institution": "Futu", "symbol": "9988.HK", "amount": 50, "currency": "HKD", "price": 80}
            ]"#,
        );
        let mut store = empty_store();
        run(&mut store, file.path(), None).await.unwrap();

        let state = store.state();
        assert_eq!(state.accounts.len(), 2);
        assert_eq!(state.accounts[0].balance, 12_000.0);
        assert_eq!(state.accounts[1].balance, 4_000.0);
    }

    #[tokio::test]
    async fn test_import_quotes_unpriced_stock_rows() {
        let file = scan_file(
            r#"[{"category": "STOCK", "institution": "Futu", "symbol": "0700.HK", "amount": 10, "currency": "HKD"}]"#,
        );
        let mut store = empty_store();
        let provider = OnePrice(400.0);
        run(&mut store, file.path(), Some(&provider)).await.unwrap();

        let account = &store.state().accounts[0];
        assert_eq!(account.last_price, Some(400.0));
        assert_eq!(account.balance, 4_000.0);
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_files() {
        let file = scan_file("{not json");
        let mut store = empty_store();
        let err = run(&mut store, file.path(), None).await.unwrap_err();
        assert!(err.to_string().contains("does not hold scanned assets"));
        assert!(store.state().accounts.is_empty());
    }
}
