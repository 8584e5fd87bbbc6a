use super::ui;
use crate::core::currency::BASE_CURRENCY;
use crate::core::model::AppState;
use comfy_table::Cell;

/// Prints the month-by-month net worth ledger with period-over-period deltas.
pub fn run(state: &AppState) {
    if state.history.is_empty() {
        println!("No history yet. Run any update to record the current period.");
        return;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Period"),
        ui::header_cell(&format!("Total ({BASE_CURRENCY})")),
        ui::header_cell("Change"),
    ]);

    let mut previous: Option<i64> = None;
    for entry in &state.history {
        let change_cell = match previous {
            Some(prior) => ui::delta_cell(entry.total_base - prior),
            None => ui::na_cell(false),
        };
        table.add_row(vec![
            Cell::new(&entry.period),
            Cell::new(ui::format_base(entry.total_base))
                .set_alignment(comfy_table::CellAlignment::Right),
            change_cell,
        ]);
        previous = Some(entry.total_base);
    }
    println!("{table}");
}
