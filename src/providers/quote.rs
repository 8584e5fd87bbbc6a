use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Latest trade price for `symbol`, in its listing currency. An error
    /// means "no update available", never a reason to abort a batch.
    async fn fetch_price(&self, symbol: &str) -> Result<f64>;
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    price: f64,
}

/// Quote lookup against a script-hosted endpoint answering
/// `GET {base_url}/quote?symbol=SYM` with `{"price": <number>}`. Usable
/// prices are memoized per symbol, so one command hits the endpoint at
/// most once per distinct symbol.
pub struct ScriptQuoteProvider {
    base_url: String,
    client: reqwest::Client,
    memo: Mutex<HashMap<String, f64>>,
}

impl ScriptQuoteProvider {
    pub fn new(base_url: &str) -> Self {
        ScriptQuoteProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            memo: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl QuoteProvider for ScriptQuoteProvider {
    #[instrument(name = "QuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_price(&self, symbol: &str) -> Result<f64> {
        if let Some(price) = self.memo.lock().await.get(symbol) {
            debug!("Quote cache hit for {symbol}");
            return Ok(*price);
        }

        let url = format!("{}/quote?symbol={}", self.base_url, symbol);
        debug!("Requesting quote from {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {e} for symbol: {symbol}"))?
            .error_for_status()
            .map_err(|e| anyhow!("HTTP error: {e} for symbol: {symbol}"))?;

        let quote: QuoteResponse = response
            .json()
            .await
            .with_context(|| format!("Malformed quote for symbol: {symbol}"))?;
        if !(quote.price > 0.0 && quote.price.is_finite()) {
            return Err(anyhow!("No usable price for symbol: {symbol}"));
        }

        self.memo
            .lock()
            .await
            .insert(symbol.to_string(), quote.price);
        Ok(quote.price)
    }
}
