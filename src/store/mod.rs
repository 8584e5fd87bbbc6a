pub mod disk;
pub mod memory;

use crate::core::history::{period_key, upsert_current_period};
use crate::core::model::{Account, AccountKind, AppState, Deposit};
use crate::core::scan::ScannedAsset;
use crate::core::valuation::compute_total;
use anyhow::{bail, Result};
use chrono::Utc;
use tracing::{debug, warn};

/// Persistence backend for the snapshot. One record in, one record out;
/// `load` returns `Ok(None)` both when nothing was ever saved and when the
/// stored bytes no longer decode, reserving `Err` for the storage engine
/// itself failing.
pub trait StateStorage: Send + Sync {
    fn load(&self) -> Result<Option<AppState>>;
    fn save(&self, state: &AppState) -> Result<()>;
}

/// Exclusive owner of the [`AppState`]. Every mutation goes through one of
/// the operations below, each of which recomputes the running total, upserts
/// the current history period, stamps `last_modified` and persists before
/// returning the committed snapshot.
pub struct StateStore {
    state: AppState,
    storage: Box<dyn StateStorage>,
}

impl StateStore {
    /// Loads the persisted snapshot, falling back to the seed state (which
    /// is then persisted) when nothing readable is stored.
    pub fn open(storage: Box<dyn StateStorage>) -> Self {
        let state = match storage.load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                debug!("No stored snapshot, starting from the seed state");
                let seed = AppState::seed();
                if let Err(e) = storage.save(&seed) {
                    warn!("Failed to persist seed state: {e:#}");
                }
                seed
            }
            Err(e) => {
                warn!("Could not load stored snapshot, starting from the seed state: {e:#}");
                let seed = AppState::seed();
                if let Err(err) = storage.save(&seed) {
                    warn!("Failed to persist seed state: {err:#}");
                }
                seed
            }
        };
        StateStore { state, storage }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Replaces the account list wholesale.
    pub fn update_accounts(&mut self, accounts: Vec<Account>) -> Result<&AppState> {
        self.state.accounts = accounts;
        self.commit()
    }

    /// Replaces the deposit list wholesale.
    pub fn update_deposits(&mut self, deposits: Vec<Deposit>) -> Result<&AppState> {
        self.state.deposits = deposits;
        self.commit()
    }

    /// Terminates a deposit and credits its payout to a liquid account in a
    /// single transition. Rejects without touching the state when either id
    /// fails to resolve or the target's balance is derived rather than held.
    pub fn settle_deposit(
        &mut self,
        deposit_id: &str,
        target_account_id: &str,
        credit_amount: f64,
    ) -> Result<&AppState> {
        let deposit_pos = self
            .state
            .deposits
            .iter()
            .position(|d| d.id == deposit_id);
        let Some(deposit_pos) = deposit_pos else {
            bail!("No deposit with id '{deposit_id}'");
        };
        let target = self
            .state
            .accounts
            .iter_mut()
            .find(|a| a.id == target_account_id);
        let Some(target) = target else {
            bail!("No account with id '{target_account_id}' to credit");
        };
        if target.kind == AccountKind::Stock {
            bail!(
                "Account '{}' holds stock; settle into a cash account instead",
                target.name
            );
        }

        target.balance += credit_amount;
        self.state.deposits.remove(deposit_pos);
        self.commit()
    }

    /// Replaces the wealth goal. The goal is a display threshold, not an
    /// asset, so history and valuation stay as they are.
    pub fn update_goal(&mut self, new_goal: i64) -> Result<&AppState> {
        self.state.wealth_goal = new_goal;
        self.state.last_modified = Some(Utc::now());
        self.persist();
        Ok(&self.state)
    }

    /// Sets the held balance of a cash or crypto account. Stock balances are
    /// derived from quantity and price and cannot be written directly.
    pub fn set_account_balance(&mut self, account_id: &str, amount: f64) -> Result<&AppState> {
        let account = self.account_mut(account_id)?;
        if account.kind == AccountKind::Stock {
            bail!(
                "Account '{}' is a stock position; set its quantity or price instead",
                account.name
            );
        }
        account.balance = amount;
        self.commit()
    }

    pub fn set_stock_quantity(&mut self, account_id: &str, quantity: f64) -> Result<&AppState> {
        let account = self.stock_account_mut(account_id)?;
        account.set_quantity(quantity);
        self.commit()
    }

    pub fn set_stock_price(&mut self, account_id: &str, price: f64) -> Result<&AppState> {
        let account = self.stock_account_mut(account_id)?;
        account.set_price(price);
        self.commit()
    }

    pub fn add_account(&mut self, account: Account) -> Result<&AppState> {
        self.state.accounts.push(account);
        self.commit()
    }

    pub fn remove_account(&mut self, account_id: &str) -> Result<&AppState> {
        let before = self.state.accounts.len();
        self.state.accounts.retain(|a| a.id != account_id);
        if self.state.accounts.len() == before {
            bail!("No account with id '{account_id}'");
        }
        self.commit()
    }

    pub fn add_deposit(&mut self, deposit: Deposit) -> Result<&AppState> {
        self.state.deposits.push(deposit);
        self.commit()
    }

    pub fn remove_deposit(&mut self, deposit_id: &str) -> Result<&AppState> {
        let before = self.state.deposits.len();
        self.state.deposits.retain(|d| d.id != deposit_id);
        if self.state.deposits.len() == before {
            bail!("No deposit with id '{deposit_id}'");
        }
        self.commit()
    }

    /// Extends a deposit's term in place, optionally folding earned interest
    /// into the principal and resetting the rate.
    pub fn rollover_deposit(
        &mut self,
        deposit_id: &str,
        interest: f64,
        new_rate: Option<f64>,
        months: u32,
    ) -> Result<&AppState> {
        let today = Utc::now().date_naive();
        let deposit = self
            .state
            .deposits
            .iter_mut()
            .find(|d| d.id == deposit_id);
        let Some(deposit) = deposit else {
            bail!("No deposit with id '{deposit_id}'");
        };
        deposit.roll_over(interest, new_rate, months, today);
        self.commit()
    }

    /// Appends accounts converted from an external scan. Returns how many
    /// were imported alongside the committed state.
    pub fn import_scanned(&mut self, assets: Vec<ScannedAsset>) -> Result<(usize, &AppState)> {
        let imported = assets.len();
        self.state
            .accounts
            .extend(assets.into_iter().map(ScannedAsset::into_account));
        let state = self.commit()?;
        Ok((imported, state))
    }

    /// Installs a snapshot accepted from the remote. The inbound record is
    /// adopted exactly as received, with no recompute and no fresh timestamp,
    /// otherwise this device would claim the remote's edits as its own and
    /// push them back.
    pub fn replace_from_remote(&mut self, state: AppState) -> Result<&AppState> {
        self.state = state;
        self.persist();
        Ok(&self.state)
    }

    fn account_mut(&mut self, account_id: &str) -> Result<&mut Account> {
        match self.state.accounts.iter_mut().find(|a| a.id == account_id) {
            Some(account) => Ok(account),
            None => bail!("No account with id '{account_id}'"),
        }
    }

    fn stock_account_mut(&mut self, account_id: &str) -> Result<&mut Account> {
        let account = self.account_mut(account_id)?;
        if account.kind != AccountKind::Stock {
            bail!("Account '{}' is not a stock position", account.name);
        }
        Ok(account)
    }

    /// The commit path every mutation funnels through: revalue, fold the
    /// total into the current history period, stamp, persist.
    fn commit(&mut self) -> Result<&AppState> {
        let total = compute_total(&self.state.accounts, &self.state.deposits);
        let period = period_key(Utc::now().date_naive());
        upsert_current_period(&mut self.state.history, &period, total);
        self.state.last_modified = Some(Utc::now());
        self.persist();
        Ok(&self.state)
    }

    /// A failed write loses durability, not the session: the in-memory
    /// state stays committed and the next save gets another chance.
    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.state) {
            warn!("Failed to persist snapshot: {e:#}");
        }
    }
}
