//! Month-keyed ledger of valuation snapshots.

use crate::core::model::HistoryEntry;
use chrono::{Datelike, NaiveDate};

/// Year-month key for a date, e.g. "2024-03".
pub fn period_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Replaces the entry for `period` in place, or appends one when the period
/// has no entry yet. Existing entries keep their position; repeated calls
/// within one period overwrite rather than accumulate.
pub fn upsert_current_period(history: &mut Vec<HistoryEntry>, period: &str, total_base: i64) {
    if let Some(entry) = history.iter_mut().find(|e| e.period == period) {
        entry.total_base = total_base;
    } else {
        history.push(HistoryEntry {
            period: period.to_string(),
            total_base,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(period: &str, total_base: i64) -> HistoryEntry {
        HistoryEntry {
            period: period.to_string(),
            total_base,
        }
    }

    #[test]
    fn test_period_key_zero_pads_the_month() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(period_key(date), "2024-03");
        let date = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
        assert_eq!(period_key(date), "2024-11");
    }

    #[test]
    fn test_upsert_appends_for_a_new_period() {
        let mut history = vec![entry("2024-01", 100)];
        upsert_current_period(&mut history, "2024-02", 200);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].period, "2024-02");
        assert_eq!(history[1].total_base, 200);
    }

    #[test]
    fn test_upsert_overwrites_within_the_same_period() {
        let mut history = vec![entry("2024-01", 100)];
        upsert_current_period(&mut history, "2024-02", 200);
        let len_after_first = history.len();
        upsert_current_period(&mut history, "2024-02", 350);
        assert_eq!(history.len(), len_after_first);
        assert_eq!(history[1].total_base, 350);
    }

    #[test]
    fn test_upsert_preserves_entry_position() {
        let mut history = vec![entry("2024-01", 100), entry("2024-02", 200), entry("2024-03", 300)];
        upsert_current_period(&mut history, "2024-02", 250);
        let periods: Vec<&str> = history.iter().map(|e| e.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(history[1].total_base, 250);
    }

    #[test]
    fn test_upsert_into_empty_history() {
        let mut history = Vec::new();
        upsert_current_period(&mut history, "2024-06", 42);
        assert_eq!(history, vec![entry("2024-06", 42)]);
    }
}
