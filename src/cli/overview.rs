use super::ui;
use crate::core::currency::BASE_CURRENCY;
use crate::core::model::{AppState, Deposit};
use crate::core::valuation::compute_breakdown;
use chrono::{NaiveDate, Utc};
use comfy_table::Cell;

const REMINDER_WINDOW_DAYS: i64 = 30;
const CRITICAL_WINDOW_DAYS: i64 = 7;

pub fn run(state: &AppState) {
    let today = Utc::now().date_naive();

    println!("{}", ui::style_text("Accounts", ui::StyleType::Title));
    display_accounts(state);

    if !state.deposits.is_empty() {
        println!("\n{}", ui::style_text("Deposits", ui::StyleType::Title));
        display_deposits(state, today);
    }

    display_totals(state);
    display_reminders(state, today);
}

fn display_accounts(state: &AppState) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Name"),
        ui::header_cell("Kind"),
        ui::header_cell("Ccy"),
        ui::header_cell("Symbol"),
        ui::header_cell("Balance"),
    ]);
    for account in &state.accounts {
        let symbol_cell = match &account.symbol {
            Some(symbol) => Cell::new(symbol),
            None => ui::na_cell(false),
        };
        table.add_row(vec![
            Cell::new(&account.id),
            Cell::new(&account.name),
            Cell::new(account.kind.to_string()),
            Cell::new(account.currency.to_string()),
            symbol_cell,
            ui::amount_cell(account.balance),
        ]);
    }
    println!("{table}");
}

fn display_deposits(state: &AppState, today: NaiveDate) {
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
    ]);
    for deposit in &state.deposits {
        table.add_row(vec![
            Cell::new(&deposit.id),
            Cell::new(&deposit.bank_name),
            Cell::new(deposit.kind.to_string()),
            Cell::new(deposit.currency.to_string()),
            ui::amount_cell(deposit.principal),
            Cell::new(format!("{:.2}%", deposit.interest_rate)),
            Cell::new(deposit.maturity_date.to_string()),
            Cell::new(deposit.days_to_maturity(today).to_string()),
        ]);
    }
    println!("{table}");
}

fn display_totals(state: &AppState) {
    let breakdown = compute_breakdown(&state.accounts, &state.deposits);
    let total = breakdown.total();

    ui::print_separator();
    println!(
        "{}",
        ui::style_text(
            &format!(
                "Cash {}  |  Stocks {}  |  Crypto {}  |  Deposits {}",
                ui::format_amount(breakdown.cash),
                ui::format_amount(breakdown.stock),
                ui::format_amount(breakdown.crypto),
                ui::format_amount(breakdown.deposits),
            ),
            ui::StyleType::Subtle,
        )
    );
    println!(
        "{} {}",
        ui::style_text("Net worth:", ui::StyleType::TotalLabel),
        ui::style_text(
            &format!("{} {BASE_CURRENCY}", ui::format_base(total)),
            ui::StyleType::TotalValue,
        ),
    );
    if state.wealth_goal > 0 {
        let progress = total as f64 / state.wealth_goal as f64 * 100.0;
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "Goal: {} {BASE_CURRENCY} ({progress:.1}%)",
                    ui::format_base(state.wealth_goal)
                ),
                ui::StyleType::Subtle,
            )
        );
    }
}

fn display_reminders(state: &AppState, today: NaiveDate) {
    let due = state.deposits_due(today, REMINDER_WINDOW_DAYS);
    if due.is_empty() {
        return;
    }

    println!();
    for deposit in due {
        println!("{}", reminder_line(deposit, today));
    }
}

fn reminder_line(deposit: &Deposit, today: NaiveDate) -> String {
    let days = deposit.days_to_maturity(today);
    let plan = match deposit.action_on_maturity {
        Some(action) => format!(" (plan: {action})"),
        None => String::new(),
    };
    if days <= 0 {
        let text = format!(
            "! {} {} matured {} day(s) ago, settle or roll it over{plan}",
            deposit.bank_name,
            ui::format_amount(deposit.principal),
            -days,
        );
        ui::style_text(&text, ui::StyleType::Error)
    } else if days <= CRITICAL_WINDOW_DAYS {
        let text = format!(
            "! {} {} matures in {days} day(s){plan}",
            deposit.bank_name,
            ui::format_amount(deposit.principal),
        );
        ui::style_text(&text, ui::StyleType::Warning)
    } else {
        let text = format!(
            "  {} {} matures in {days} days{plan}",
            deposit.bank_name,
            ui::format_amount(deposit.principal),
        );
        ui::style_text(&text, ui::StyleType::Subtle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::Currency;
    use crate::core::model::{DepositKind, MaturityAction};
    use chrono::Duration;

    fn deposit_due_in(days: i64, today: NaiveDate) -> Deposit {
        Deposit {
            id: "d1".to_string(),
            bank_name: "SC".to_string(),
            principal: 100_000.0,
            currency: Currency::Hkd,
            interest_rate: 4.1,
            maturity_date: today + Duration::days(days),
            kind: DepositKind::Fixed,
            action_on_maturity: Some(MaturityAction::Renew),
            auto_roll: false,
        }
    }

    #[test]
    fn test_reminder_line_flags_matured_deposits() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let line = reminder_line(&deposit_due_in(-3, today), today);
        assert!(line.contains("matured 3 day(s) ago"));
        assert!(line.contains("plan: Renew"));
    }

    #[test]
    fn test_reminder_line_counts_down() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let critical = reminder_line(&deposit_due_in(5, today), today);
        assert!(critical.contains("matures in 5 day(s)"));

        let relaxed = reminder_line(&deposit_due_in(20, today), today);
        assert!(relaxed.contains("matures in 20 days"));
    }
}
