//! Domain types: accounts, deposits and the snapshot that aggregates them.

use crate::core::currency::Currency;
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Cash,
    Stock,
    Crypto,
}

impl Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AccountKind::Cash => "Cash",
            AccountKind::Stock => "Stock",
            AccountKind::Crypto => "Crypto",
        };
        write!(f, "{label}")
    }
}

/// Whether a deposit's principal sits outside the tracked accounts (Fixed)
/// or is already counted inside one of them (Savings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DepositKind {
    #[default]
    Fixed,
    Savings,
}

impl Display for DepositKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DepositKind::Fixed => "Fixed",
            DepositKind::Savings => "Savings",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for DepositKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(DepositKind::Fixed),
            "savings" => Ok(DepositKind::Savings),
            other => anyhow::bail!("Unknown deposit kind '{other}' (expected fixed or savings)"),
        }
    }
}

/// Advisory plan for a deposit reaching maturity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaturityAction {
    Renew,
    TransferOut,
}

impl Display for MaturityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MaturityAction::Renew => "Renew",
            MaturityAction::TransferOut => "Transfer out",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for MaturityAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "renew" => Ok(MaturityAction::Renew),
            "transfer" | "transfer-out" => Ok(MaturityAction::TransferOut),
            other => anyhow::bail!("Unknown maturity action '{other}' (expected renew or transfer)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub kind: AccountKind,
    pub currency: Currency,
    /// Value in `currency` units. Literal for Cash and Crypto; for Stock it
    /// always equals `quantity * last_price` rounded to a whole unit and is
    /// never set directly.
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
}

impl Account {
    pub fn cash(id: &str, name: &str, currency: Currency, balance: f64) -> Self {
        Account {
            id: id.to_string(),
            name: name.to_string(),
            kind: AccountKind::Cash,
            currency,
            balance,
            symbol: None,
            quantity: None,
            last_price: None,
        }
    }

    pub fn stock(
        id: &str,
        name: &str,
        symbol: &str,
        quantity: f64,
        last_price: f64,
        currency: Currency,
    ) -> Self {
        let mut account = Account {
            id: id.to_string(),
            name: name.to_string(),
            kind: AccountKind::Stock,
            currency,
            balance: 0.0,
            symbol: Some(symbol.to_string()),
            quantity: Some(quantity),
            last_price: Some(last_price),
        };
        account.refresh_balance();
        account
    }

    /// Re-derives `balance` from quantity and price. No-op for non-stock
    /// accounts.
    pub fn refresh_balance(&mut self) {
        if self.kind == AccountKind::Stock {
            let quantity = self.quantity.unwrap_or(0.0);
            let price = self.last_price.unwrap_or(0.0);
            self.balance = (quantity * price).round();
        }
    }

    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = Some(quantity);
        self.refresh_balance();
    }

    pub fn set_price(&mut self, price: f64) {
        self.last_price = Some(price);
        self.refresh_balance();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: String,
    pub bank_name: String,
    pub principal: f64,
    pub currency: Currency,
    /// Annual rate in percent, simple-interest basis.
    #[serde(default)]
    pub interest_rate: f64,
    pub maturity_date: NaiveDate,
    #[serde(default)]
    pub kind: DepositKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_on_maturity: Option<MaturityAction>,
    #[serde(default)]
    pub auto_roll: bool,
}

impl Deposit {
    pub fn days_to_maturity(&self, today: NaiveDate) -> i64 {
        (self.maturity_date - today).num_days()
    }

    pub fn is_matured(&self, today: NaiveDate) -> bool {
        self.days_to_maturity(today) <= 0
    }

    /// Simple interest over a whole number of months, rounded to a whole
    /// unit of the deposit's currency.
    pub fn estimated_interest(&self, months: u32) -> f64 {
        (self.principal * self.interest_rate / 100.0 * f64::from(months) / 12.0).round()
    }

    /// Day-precise simple interest from `from` to maturity, rounded to a
    /// whole unit. Zero once maturity has passed.
    pub fn term_interest(&self, from: NaiveDate) -> f64 {
        let days = self.days_to_maturity(from);
        if days <= 0 {
            return 0.0;
        }
        (self.principal * self.interest_rate / 100.0 * days as f64 / 365.0).round()
    }

    /// Amount credited to the receiving account on settlement. Savings
    /// principal already sits in a tracked account, so only interest moves;
    /// Fixed principal comes back in full.
    pub fn payout(&self, interest: f64) -> f64 {
        match self.kind {
            DepositKind::Fixed => self.principal + interest,
            DepositKind::Savings => interest,
        }
    }

    /// Extends the term: folds `interest` into the principal (zero when the
    /// holder opts out of compounding), optionally resets the rate, and
    /// pushes maturity `months` out from `today`.
    pub fn roll_over(&mut self, interest: f64, new_rate: Option<f64>, months: u32, today: NaiveDate) {
        self.principal += interest;
        if let Some(rate) = new_rate {
            self.interest_rate = rate;
        }
        self.maturity_date = today
            .checked_add_months(Months::new(months))
            .unwrap_or(self.maturity_date);
    }
}

/// One "as of end of period" net-worth snapshot. `period` is a year-month
/// key like "2024-03"; `total_base` is whole units of the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub period: String,
    pub total_base: i64,
}

/// The aggregate root. Owned by the state store; the sync reconciler may
/// replace it wholesale but never mutates it field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub accounts: Vec<Account>,
    pub deposits: Vec<Deposit>,
    pub history: Vec<HistoryEntry>,
    #[serde(default = "default_wealth_goal")]
    pub wealth_goal: i64,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
}

fn default_wealth_goal() -> i64 {
    2_000_000
}

impl AppState {
    /// Starter snapshot used when nothing readable is stored locally.
    pub fn seed() -> Self {
        let today = Utc::now().date_naive();
        AppState {
            accounts: vec![
                Account::cash("1", "HSBC HK", Currency::Hkd, 150_000.0),
                Account::cash("2", "CommBank AU", Currency::Aud, 5_000.0),
                Account::stock(
                    "3",
                    "Interactive Brokers",
                    "0700.HK",
                    100.0,
                    450.0,
                    Currency::Hkd,
                ),
            ],
            deposits: vec![
                Deposit {
                    id: "101".to_string(),
                    bank_name: "Standard Chartered".to_string(),
                    principal: 100_000.0,
                    currency: Currency::Hkd,
                    interest_rate: 4.1,
                    maturity_date: today + Duration::days(5),
                    kind: DepositKind::Fixed,
                    action_on_maturity: Some(MaturityAction::Renew),
                    auto_roll: true,
                },
                Deposit {
                    id: "102".to_string(),
                    bank_name: "Virtual Bank (Mox)".to_string(),
                    principal: 50_000.0,
                    currency: Currency::Hkd,
                    interest_rate: 3.8,
                    maturity_date: today + Duration::days(25),
                    kind: DepositKind::Fixed,
                    action_on_maturity: Some(MaturityAction::TransferOut),
                    auto_roll: false,
                },
            ],
            history: vec![
                HistoryEntry { period: "2023-05".to_string(), total_base: 180_000 },
                HistoryEntry { period: "2023-06".to_string(), total_base: 185_000 },
                HistoryEntry { period: "2023-07".to_string(), total_base: 182_000 },
                HistoryEntry { period: "2023-08".to_string(), total_base: 195_000 },
                HistoryEntry { period: "2023-09".to_string(), total_base: 210_000 },
                HistoryEntry { period: "2023-10".to_string(), total_base: 215_000 },
            ],
            wealth_goal: default_wealth_goal(),
            last_modified: None,
        }
    }

    pub fn find_account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn find_deposit(&self, id: &str) -> Option<&Deposit> {
        self.deposits.iter().find(|d| d.id == id)
    }

    /// Deposits maturing within `within_days` of `today`, already-matured
    /// ones included, soonest first.
    pub fn deposits_due(&self, today: NaiveDate, within_days: i64) -> Vec<&Deposit> {
        let mut due: Vec<&Deposit> = self
            .deposits
            .iter()
            .filter(|d| d.days_to_maturity(today) <= within_days)
            .collect();
        due.sort_by_key(|d| d.maturity_date);
        due
    }

    /// Structural equality over user data. The modification timestamp is
    /// bookkeeping, not content: a remote echo of a snapshot this device
    /// pushed carries the same data under a different clock reading.
    pub fn content_eq(&self, other: &AppState) -> bool {
        self.accounts == other.accounts
            && self.deposits == other.deposits
            && self.history == other.history
            && self.wealth_goal == other.wealth_goal
    }
}

static ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// Process-unique identifier for newly created accounts and deposits.
pub fn new_id() -> String {
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{seq}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_deposit(principal: f64, rate: f64) -> Deposit {
        Deposit {
            id: "d1".to_string(),
            bank_name: "Test Bank".to_string(),
            principal,
            currency: Currency::Hkd,
            interest_rate: rate,
            maturity_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            kind: DepositKind::Fixed,
            action_on_maturity: None,
            auto_roll: false,
        }
    }

    #[test]
    fn test_stock_balance_is_derived_and_rounded() {
        let account = Account::stock("3", "IB", "0700.HK", 100.0, 450.0, Currency::Hkd);
        assert_eq!(account.balance, 45_000.0);

        let mut account = Account::stock("3", "IB", "0700.HK", 3.0, 33.333, Currency::Hkd);
        assert_eq!(account.balance, 100.0);
        account.set_quantity(10.0);
        assert_eq!(account.balance, 333.0);
        account.set_price(40.0);
        assert_eq!(account.balance, 400.0);
    }

    #[test]
    fn test_refresh_balance_leaves_cash_untouched() {
        let mut account = Account::cash("1", "HSBC", Currency::Hkd, 1234.5);
        account.refresh_balance();
        assert_eq!(account.balance, 1234.5);
    }

    #[test]
    fn test_estimated_interest_is_simple_and_rounded() {
        let deposit = fixed_deposit(100_000.0, 4.1);
        // 100000 * 4.1% * 3/12
        assert_eq!(deposit.estimated_interest(3), 1025.0);
        assert_eq!(deposit.estimated_interest(12), 4100.0);
    }

    #[test]
    fn test_term_interest_is_day_precise() {
        let mut deposit = fixed_deposit(10_000.0, 3.65);
        deposit.maturity_date = NaiveDate::from_ymd_opt(2024, 4, 11).unwrap();
        let from = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        // 10000 * 3.65% * 30/365 = 30
        assert_eq!(deposit.term_interest(from), 30.0);

        // Matured deposits accrue nothing further.
        let late = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(deposit.term_interest(late), 0.0);
    }

    #[test]
    fn test_payout_depends_on_deposit_kind() {
        let mut deposit = fixed_deposit(5000.0, 2.0);
        assert_eq!(deposit.payout(200.0), 5200.0);
        deposit.kind = DepositKind::Savings;
        assert_eq!(deposit.payout(10.0), 10.0);
    }

    #[test]
    fn test_roll_over_compounds_and_extends() {
        let mut deposit = fixed_deposit(10_000.0, 4.0);
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        deposit.roll_over(100.0, Some(4.5), 3, today);
        assert_eq!(deposit.principal, 10_100.0);
        assert_eq!(deposit.interest_rate, 4.5);
        assert_eq!(
            deposit.maturity_date,
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        );

        // Opting out of compounding keeps the principal.
        deposit.roll_over(0.0, None, 6, today);
        assert_eq!(deposit.principal, 10_100.0);
        assert_eq!(deposit.interest_rate, 4.5);
    }

    #[test]
    fn test_days_to_maturity_and_due_filter() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut soon = fixed_deposit(1000.0, 3.0);
        soon.maturity_date = today + Duration::days(5);
        let mut far = fixed_deposit(1000.0, 3.0);
        far.id = "d2".to_string();
        far.maturity_date = today + Duration::days(90);
        let mut past = fixed_deposit(1000.0, 3.0);
        past.id = "d3".to_string();
        past.maturity_date = today - Duration::days(2);

        assert_eq!(soon.days_to_maturity(today), 5);
        assert!(!soon.is_matured(today));
        assert!(past.is_matured(today));

        let state = AppState {
            deposits: vec![soon, far, past],
            accounts: vec![],
            history: vec![],
            wealth_goal: 0,
            last_modified: None,
        };
        // Soonest first, so the already-matured deposit leads.
        let due: Vec<&str> = state
            .deposits_due(today, 30)
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(due, vec!["d3", "d1"]);
    }

    #[test]
    fn test_content_eq_ignores_last_modified() {
        let mut a = AppState::seed();
        let mut b = a.clone();
        a.last_modified = Some(Utc::now());
        b.last_modified = Some(Utc::now() + Duration::hours(1));
        assert!(a.content_eq(&b));

        b.wealth_goal += 1;
        assert!(!a.content_eq(&b));
    }

    #[test]
    fn test_snapshot_deserializes_with_legacy_defaults() {
        // Older snapshots carry no kind, goal or timestamp.
        let json = r#"{
            "accounts": [],
            "deposits": [{
                "id": "9",
                "bank_name": "Legacy",
                "principal": 1000.0,
                "currency": "HKD",
                "maturity_date": "2024-05-01"
            }],
            "history": []
        }"#;
        let state: AppState = serde_json::from_str(json).unwrap();
        assert_eq!(state.wealth_goal, 2_000_000);
        assert!(state.last_modified.is_none());
        assert_eq!(state.deposits[0].kind, DepositKind::Fixed);
        assert_eq!(state.deposits[0].interest_rate, 0.0);
        assert!(!state.deposits[0].auto_roll);
    }

    #[test]
    fn test_new_ids_are_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
    }
}
