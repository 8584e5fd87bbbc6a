use super::ui;
use crate::core::currency::BASE_CURRENCY;
use crate::core::model::AppState;
use crate::core::valuation::compute_total;
use crate::store::StateStore;
use anyhow::{bail, Result};

pub fn show(state: &AppState) {
    let total = compute_total(&state.accounts, &state.deposits);
    println!(
        "{} {}",
        ui::style_text("Wealth goal:", ui::StyleType::TotalLabel),
        ui::style_text(
            &format!("{} {BASE_CURRENCY}", ui::format_base(state.wealth_goal)),
            ui::StyleType::TotalValue,
        ),
    );
    if state.wealth_goal > 0 {
        let progress = total as f64 / state.wealth_goal as f64 * 100.0;
        let remaining = state.wealth_goal - total;
        if remaining > 0 {
            println!(
                "Current net worth {} ({progress:.1}%), {} to go",
                ui::format_base(total),
                ui::format_base(remaining)
            );
        } else {
            println!(
                "{}",
                ui::style_text(
                    &format!("Reached: current net worth {} ({progress:.1}%)", ui::format_base(total)),
                    ui::StyleType::TotalValue,
                )
            );
        }
    }
}

pub fn set(store: &mut StateStore, target: i64) -> Result<()> {
    if target <= 0 {
        bail!("The wealth goal must be a positive amount, got {target}");
    }
    let state = store.update_goal(target)?;
    println!("Wealth goal set to {} {BASE_CURRENCY}", ui::format_base(target));
    show(state);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStorage;

    #[test]
    fn test_set_rejects_non_positive_targets() {
        let mut store = StateStore::open(Box::new(MemoryStorage::new()));
        let err = set(&mut store, 0).unwrap_err();
        assert!(err.to_string().contains("must be a positive amount"));
    }

    #[test]
    fn test_set_updates_goal_without_touching_history() {
        let mut store = StateStore::open(Box::new(MemoryStorage::new()));
        let periods_before = store.state().history.len();
        set(&mut store, 3_000_000).unwrap();

        assert_eq!(store.state().wealth_goal, 3_000_000);
        assert_eq!(store.state().history.len(), periods_before);
    }
}
