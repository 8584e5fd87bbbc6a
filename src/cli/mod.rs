pub mod deposits;
pub mod goal;
pub mod history;
pub mod import;
pub mod overview;
pub mod setup;
pub mod sync;
pub mod ui;
pub mod update;

use crate::core::currency::BASE_CURRENCY;
use crate::core::model::AppState;
use crate::core::valuation::compute_total;

/// One-line net worth readout printed after every committed change.
pub(crate) fn print_committed_total(state: &AppState) {
    let total = compute_total(&state.accounts, &state.deposits);
    println!(
        "{} {}",
        ui::style_text("Net worth:", ui::StyleType::TotalLabel),
        ui::style_text(
            &format!("{} {BASE_CURRENCY}", ui::format_base(total)),
            ui::StyleType::TotalValue,
        ),
    );
}
