//! Statement-scan ingestion: candidate assets produced by an external
//! extraction step, normalized into accounts.

use crate::core::currency::Currency;
use crate::core::model::{self, Account};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanCategory {
    Cash,
    Stock,
}

/// One asset row from a scanned statement. For stock rows `amount` is a
/// share quantity; for cash rows it is a balance. Fields other than the
/// category are lenient so one sloppy row cannot sink the batch.
#[derive(Debug, Clone, Deserialize)]
pub struct ScannedAsset {
    pub category: ScanCategory,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ScannedAsset {
    /// Account name for the row: the institution when the scan produced a
    /// usable one, otherwise a category placeholder.
    pub fn display_name(&self) -> String {
        if !self.institution.is_empty() && self.institution != "Unknown" {
            return self.institution.clone();
        }
        match self.category {
            ScanCategory::Stock => "Stocks".to_string(),
            ScanCategory::Cash => "Deposit".to_string(),
        }
    }

    /// Converts the candidate into a fresh account with a new id.
    pub fn into_account(self) -> Account {
        let currency = self
            .currency
            .as_deref()
            .map(Currency::parse_lossy)
            .unwrap_or(Currency::Hkd);
        let name = self.display_name();
        let id = model::new_id();
        match self.category {
            ScanCategory::Cash => Account::cash(&id, &name, currency, self.amount),
            ScanCategory::Stock => {
                let symbol = self
                    .symbol
                    .map(|s| s.trim().to_uppercase())
                    .unwrap_or_default();
                Account::stock(
                    &id,
                    &name,
                    &symbol,
                    self.amount,
                    self.price.unwrap_or(0.0),
                    currency,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::AccountKind;

    #[test]
    fn test_cash_row_becomes_cash_account() {
        let json = r#"{"category": "CASH", "institution": "BOC HK", "amount": 12000, "currency": "HKD"}"#;
        let asset: ScannedAsset = serde_json::from_str(json).unwrap();
        let account = asset.into_account();
        assert_eq!(account.kind, AccountKind::Cash);
        assert_eq!(account.name, "BOC HK");
        assert_eq!(account.balance, 12_000.0);
        assert_eq!(account.currency, Currency::Hkd);
        assert!(account.symbol.is_none());
    }

    #[test]
    fn test_stock_row_derives_balance_from_quantity_and_price() {
        let json = r#"{"category": "STOCK", "institution": "Futu", "symbol": "9988.hk", "amount": 50, "currency": "HKD", "price": 80}"#;
        let asset: ScannedAsset = serde_json::from_str(json).unwrap();
        let account = asset.into_account();
        assert_eq!(account.kind, AccountKind::Stock);
        assert_eq!(account.symbol.as_deref(), Some("9988.HK"));
        assert_eq!(account.quantity, Some(50.0));
        assert_eq!(account.last_price, Some(80.0));
        assert_eq!(account.balance, 4000.0);
    }

    #[test]
    fn test_stock_row_without_price_starts_at_zero() {
        let json = r#"{"category": "STOCK", "symbol": "AAPL", "amount": 10, "currency": "USD"}"#;
        let asset: ScannedAsset = serde_json::from_str(json).unwrap();
        let account = asset.into_account();
        assert_eq!(account.balance, 0.0);
        assert_eq!(account.last_price, Some(0.0));
    }

    #[test]
    fn test_name_falls_back_by_category() {
        let stock = ScannedAsset {
            category: ScanCategory::Stock,
            institution: "Unknown".to_string(),
            symbol: Some("IVV".to_string()),
            amount: 1.0,
            currency: None,
            price: None,
        };
        assert_eq!(stock.into_account().name, "Stocks");

        let cash = ScannedAsset {
            category: ScanCategory::Cash,
            institution: String::new(),
            symbol: None,
            amount: 500.0,
            currency: None,
            price: None,
        };
        assert_eq!(cash.into_account().name, "Deposit");
    }

    #[test]
    fn test_unknown_currency_defaults_to_base() {
        let json = r#"{"category": "CASH", "institution": "X", "amount": 1, "currency": "JPY"}"#;
        let asset: ScannedAsset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.into_account().currency, Currency::Hkd);
    }
}
