use crate::core::currency::Currency;
use crate::core::model::{AppState, DepositKind};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

/// One row of the spreadsheet backup. Accounts flatten to `CASH` rows
/// keyed by institution; fixed deposits to `FD` rows keyed by bank name.
/// Savings deposits never appear; their principal already sits in one of
/// the account rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category")]
pub enum BackupAsset {
    #[serde(rename = "CASH")]
    Cash {
        institution: String,
        amount: f64,
        currency: Currency,
    },
    #[serde(rename = "FD")]
    Deposit {
        symbol: String,
        amount: f64,
        currency: Currency,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupPayload {
    user_id: String,
    assets: Vec<BackupAsset>,
}

pub fn flatten_assets(state: &AppState) -> Vec<BackupAsset> {
    let accounts = state.accounts.iter().map(|account| BackupAsset::Cash {
        institution: account.name.clone(),
        amount: account.balance,
        currency: account.currency,
    });
    let deposits = state
        .deposits
        .iter()
        .filter(|deposit| deposit.kind != DepositKind::Savings)
        .map(|deposit| BackupAsset::Deposit {
            symbol: deposit.bank_name.clone(),
            amount: deposit.principal,
            currency: deposit.currency,
        });
    accounts.chain(deposits).collect()
}

/// Secondary backup endpoint, POSTed after every remote push. Strictly
/// best-effort: the caller folds a failure into the offline indicator and
/// moves on.
#[derive(Debug)]
pub struct BackupWebhook {
    client: Client,
    url: String,
}

impl BackupWebhook {
    pub fn new(url: &str) -> Self {
        BackupWebhook {
            client: Client::new(),
            url: url.to_string(),
        }
    }

    #[instrument(name = "BackupPost", skip(self, state))]
    pub async fn post(&self, access_code: &str, state: &AppState) -> Result<()> {
        let payload = BackupPayload {
            user_id: access_code.to_string(),
            assets: flatten_assets(state),
        };
        debug!("Posting {} asset rows to {}", payload.assets.len(), self.url);
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .context("Failed to reach the backup webhook")?;
        response
            .error_for_status()
            .context("Backup webhook rejected the payload")?;
        Ok(())
    }
}
