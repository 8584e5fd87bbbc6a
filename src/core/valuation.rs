//! Net-worth valuation over accounts and deposits.

use crate::core::currency::to_base;
use crate::core::model::{Account, AccountKind, Deposit, DepositKind};

/// Per-bucket totals in base currency units, unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Breakdown {
    pub cash: f64,
    pub stock: f64,
    pub crypto: f64,
    pub deposits: f64,
}

impl Breakdown {
    /// Grand total rounded to a whole base-currency unit. Rounding happens
    /// here and nowhere upstream, so many small conversions cannot each
    /// shave or add a unit.
    pub fn total(&self) -> i64 {
        (self.cash + self.stock + self.crypto + self.deposits).round() as i64
    }
}

/// Values every account and every Fixed-kind deposit in the base currency.
///
/// Savings-kind deposits are skipped: their principal is already inside one
/// of the accounts, and summing it again would double-count.
pub fn compute_breakdown(accounts: &[Account], deposits: &[Deposit]) -> Breakdown {
    let mut breakdown = Breakdown::default();
    for account in accounts {
        let value = to_base(account.balance, account.currency);
        match account.kind {
            AccountKind::Cash => breakdown.cash += value,
            AccountKind::Stock => breakdown.stock += value,
            AccountKind::Crypto => breakdown.crypto += value,
        }
    }
    for deposit in deposits {
        if deposit.kind == DepositKind::Savings {
            continue;
        }
        breakdown.deposits += to_base(deposit.principal, deposit.currency);
    }
    breakdown
}

/// Total net worth in whole base-currency units.
pub fn compute_total(accounts: &[Account], deposits: &[Deposit]) -> i64 {
    compute_breakdown(accounts, deposits).total()
}
