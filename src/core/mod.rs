//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod history;
pub mod log;
pub mod model;
pub mod scan;
pub mod valuation;

// Re-export main types for cleaner imports
pub use currency::{BASE_CURRENCY, Currency, to_base};
pub use model::{
    Account, AccountKind, AppState, Deposit, DepositKind, HistoryEntry, MaturityAction,
};
pub use valuation::{Breakdown, compute_breakdown, compute_total};
