//! Currency codes and conversion into the base reporting currency.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Currencies the tracker understands. Everything is valued against a fixed
/// rate table; rates are constants, not market data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Hkd,
    Aud,
    Usd,
}

/// All aggregation happens in Hong Kong dollars.
pub const BASE_CURRENCY: Currency = Currency::Hkd;

impl Currency {
    /// Units of the base currency per one unit of `self`.
    pub fn rate_to_base(self) -> f64 {
        match self {
            Currency::Hkd => 1.0,
            Currency::Aud => 5.1,
            Currency::Usd => 7.8,
        }
    }

    /// Parses a currency code, treating anything unknown as the base
    /// currency. Used at ingestion boundaries where a bad code must not
    /// sink the whole batch.
    pub fn parse_lossy(code: &str) -> Currency {
        Currency::from_str(code).unwrap_or(BASE_CURRENCY)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Currency::Hkd => "HKD",
            Currency::Aud => "AUD",
            Currency::Usd => "USD",
        };
        write!(f, "{code}")
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HKD" => Ok(Currency::Hkd),
            "AUD" => Ok(Currency::Aud),
            "USD" => Ok(Currency::Usd),
            other => bail!("Unsupported currency: {other}"),
        }
    }
}

/// Converts an amount into the base currency. No rounding; callers that
/// aggregate must round the final sum only.
pub fn to_base(amount: f64, currency: Currency) -> f64 {
    amount * currency.rate_to_base()
}

/// Guesses a listing currency from a ticker's exchange suffix: `.AX` is
/// ASX (AUD), `.HK` or a bare numeric code is HKEX (HKD), anything else is
/// assumed to trade in USD.
pub fn infer_from_symbol(symbol: &str) -> Currency {
    let upper = symbol.trim().to_uppercase();
    if upper.ends_with(".AX") {
        Currency::Aud
    } else if upper.ends_with(".HK") || upper.chars().all(|c| c.is_ascii_digit()) {
        Currency::Hkd
    } else {
        Currency::Usd
    }
}
