use super::ui;
use crate::core::currency::Currency;
use crate::core::model::{new_id, AppState, Deposit, DepositKind, MaturityAction};
use crate::store::StateStore;
use anyhow::{Context, Result};
use chrono::{Months, NaiveDate, Utc};
use comfy_table::Cell;

/// Standard term assumed when the earned interest is not given explicitly.
const DEFAULT_TERM_MONTHS: u32 = 3;

pub fn list(state: &AppState) {
    if state.deposits.is_empty() {
        println!("No deposits.");
        return;
    }
    let today = Utc::now().date_naive();
    let mut deposits: Vec<&Deposit> = state.deposits.iter().collect();
    deposits.sort_by_key(|d| d.maturity_date);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Bank"),
        ui::header_cell("Kind"),
        ui::header_cell("Ccy"),
        ui::header_cell("Principal"),
        ui::header_cell("Rate"),
        ui::header_cell("Matures"),
        ui::header_cell("Days"),
        ui::header_cell("Plan"),
    ]);
    for deposit in deposits {
        let plan_cell = match deposit.action_on_maturity {
            Some(action) if deposit.auto_roll => Cell::new(format!("{action} (auto)")),
            Some(action) => Cell::new(action.to_string()),
            None if deposit.auto_roll => Cell::new("Renew (auto)"),
            None => ui::na_cell(false),
        };
        table.add_row(vec![
            Cell::new(&deposit.id),
            Cell::new(&deposit.bank_name),
            Cell::new(deposit.kind.to_string()),
            Cell::new(deposit.currency.to_string()),
            ui::amount_cell(deposit.principal),
            Cell::new(format!("{:.2}%", deposit.interest_rate)),
            Cell::new(deposit.maturity_date.to_string()),
            Cell::new(deposit.days_to_maturity(today).to_string()),
            plan_cell,
        ]);
    }
    println!("{table}");
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    store: &mut StateStore,
    bank: &str,
    principal: f64,
    currency: Currency,
    rate: f64,
    months: u32,
    kind: DepositKind,
    action: Option<MaturityAction>,
    auto_roll: bool,
) -> Result<()> {
    let today = Utc::now().date_naive();
    let maturity_date = maturity_after(today, months)?;
    let deposit = Deposit {
        id: new_id(),
        bank_name: bank.to_string(),
        principal,
        currency,
        interest_rate: rate,
        maturity_date,
        kind,
        action_on_maturity: action,
        auto_roll,
    };
    let id = deposit.id.clone();
    let projected = deposit.term_interest(today);

    let state = store.add_deposit(deposit)?;
    println!(
        "Added deposit {id} ({bank}, {} {currency} @ {rate:.2}%)",
        ui::format_amount(principal)
    );
    println!(
        "Matures {maturity_date}; projected interest {}",
        ui::format_amount(projected)
    );
    super::print_committed_total(state);
    Ok(())
}

pub fn remove(store: &mut StateStore, deposit_id: &str) -> Result<()> {
    let state = store.remove_deposit(deposit_id)?;
    println!("Removed deposit {deposit_id}");
    super::print_committed_total(state);
    Ok(())
}

/// Renews a deposit for another term. When the bank's interest figure is not
/// given, the standard-term estimate stands in.
pub fn rollover(
    store: &mut StateStore,
    deposit_id: &str,
    interest: Option<f64>,
    rate: Option<f64>,
    months: u32,
) -> Result<()> {
    let deposit = store
        .state()
        .find_deposit(deposit_id)
        .with_context(|| format!("No deposit with id '{deposit_id}'"))?;
    let interest = interest.unwrap_or_else(|| deposit.estimated_interest(DEFAULT_TERM_MONTHS));
    let bank = deposit.bank_name.clone();

    let state = store.rollover_deposit(deposit_id, interest, rate, months)?;
    let renewed = state
        .find_deposit(deposit_id)
        .with_context(|| format!("No deposit with id '{deposit_id}'"))?;
    println!(
        "Rolled {bank} over: +{} interest, principal now {}, matures {}",
        ui::format_amount(interest),
        ui::format_amount(renewed.principal),
        renewed.maturity_date
    );
    super::print_committed_total(state);
    Ok(())
}

/// Closes a deposit out, crediting its payout to a cash account. Fixed
/// deposits pay principal plus interest; Savings pay interest only since the
/// principal already sits in a tracked account.
pub fn settle(
    store: &mut StateStore,
    deposit_id: &str,
    target_account_id: &str,
    interest: Option<f64>,
) -> Result<()> {
    let deposit = store
        .state()
        .find_deposit(deposit_id)
        .with_context(|| format!("No deposit with id '{deposit_id}'"))?;
    let interest = interest.unwrap_or_else(|| deposit.estimated_interest(DEFAULT_TERM_MONTHS));
    let credit = deposit.payout(interest);
    let bank = deposit.bank_name.clone();

    let state = store.settle_deposit(deposit_id, target_account_id, credit)?;
    println!(
        "Settled {bank}: credited {} to {target_account_id}",
        ui::format_amount(credit)
    );
    super::print_committed_total(state);
    Ok(())
}

fn maturity_after(today: NaiveDate, months: u32) -> Result<NaiveDate> {
    today
        .checked_add_months(Months::new(months))
        .with_context(|| format!("Cannot compute a maturity date {months} months from {today}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Account;
    use crate::store::memory::MemoryStorage;

    fn store_with(accounts: Vec<Account>, deposits: Vec<Deposit>) -> StateStore {
        let mut store = StateStore::open(Box::new(MemoryStorage::new()));
        store.update_accounts(accounts).unwrap();
        store.update_deposits(deposits).unwrap();
        store
    }

    fn fixed_deposit(principal: f64, rate: f64) -> Deposit {
        Deposit {
            id: "d1".to_string(),
            bank_name: "SC".to_string(),
            principal,
            currency: Currency::Hkd,
            interest_rate: rate,
            maturity_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            kind: DepositKind::Fixed,
            action_on_maturity: None,
            auto_roll: false,
        }
    }

    #[test]
    fn test_add_sets_maturity_months_ahead() {
        let mut store = store_with(Vec::new(), Vec::new());
        add(
            &mut store,
            "SC",
            50_000.0,
            Currency::Hkd,
            4.0,
            6,
            DepositKind::Fixed,
            Some(MaturityAction::Renew),
            false,
        )
        .unwrap();

        let today = Utc::now().date_naive();
        let deposit = &store.state().deposits[0];
        assert_eq!(
            deposit.maturity_date,
            today.checked_add_months(Months::new(6)).unwrap()
        );
        assert_eq!(deposit.action_on_maturity, Some(MaturityAction::Renew));
    }

    #[test]
    fn test_rollover_defaults_to_standard_term_estimate() {
        let mut store = store_with(Vec::new(), vec![fixed_deposit(10_000.0, 4.0)]);
        rollover(&mut store, "d1", None, None, 3).unwrap();

        // 10000 * 4% * 3/12 = 100 capitalized.
        assert_eq!(store.state().deposits[0].principal, 10_100.0);
    }

    #[test]
    fn test_settle_credits_payout_and_drops_deposit() {
        let accounts = vec![Account::cash("a1", "HSBC", Currency::Hkd, 1_000.0)];
        let mut store = store_with(accounts, vec![fixed_deposit(5_000.0, 4.0)]);
        settle(&mut store, "d1", "a1", Some(200.0)).unwrap();

        let state = store.state();
        assert!(state.deposits.is_empty());
        assert_eq!(state.find_account("a1").unwrap().balance, 6_200.0);
    }

    #[test]
    fn test_settle_savings_credits_interest_only() {
        let accounts = vec![Account::cash("a1", "HSBC", Currency::Hkd, 1_000.0)];
        let mut deposit = fixed_deposit(5_000.0, 4.0);
        deposit.kind = DepositKind::Savings;
        let mut store = store_with(accounts, vec![deposit]);
        settle(&mut store, "d1", "a1", Some(10.0)).unwrap();

        assert_eq!(store.state().find_account("a1").unwrap().balance, 1_010.0);
    }

    #[test]
    fn test_settle_unknown_deposit_is_rejected() {
        let mut store = store_with(Vec::new(), Vec::new());
        let err = settle(&mut store, "ghost", "a1", None).unwrap_err();
        assert!(err.to_string().contains("No deposit with id 'ghost'"));
    }
}
