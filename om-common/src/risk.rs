//! Per-state fraud risk profile
//!
//! Combines the state flag counts with the merged watchlist. Every state
//! that appears in the spending summary, the flag counts or the watchlist
//! gets a row; states are ranked by flagged provider count.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::percent_of;
use crate::watchlist::{Source, WatchlistEntry};
use crate::Dataset;

const UNKNOWN_STATE: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateRisk {
    pub state: String,
    /// Flagged providers, from the flag counts when the state is listed there
    pub flagged_count: u32,
    /// Watchlist providers with at least one statistical flag
    pub stat_flags: u32,
    /// Watchlist providers flagged by the ML model alone
    pub ml_flags: u32,
    /// Total billed by the state's watchlist providers
    pub flagged_spending: f64,
    /// All Medicaid spending in the state
    pub state_spending: f64,
    /// Flagged spending as a percent of state spending
    pub flagged_share: f64,
}

fn row<'a>(rows: &'a mut BTreeMap<String, StateRisk>, state: &str) -> Option<&'a mut StateRisk> {
    if state.is_empty() || state == UNKNOWN_STATE {
        return None;
    }
    Some(rows.entry(state.to_string()).or_insert_with(|| StateRisk {
        state: state.to_string(),
        ..Default::default()
    }))
}

/// Risk rows for every known state, most flagged first (ties by code)
pub fn state_risk_table(ds: &Dataset, watchlist: &[WatchlistEntry]) -> Vec<StateRisk> {
    let mut rows: BTreeMap<String, StateRisk> = BTreeMap::new();

    for s in &ds.states {
        if let Some(r) = row(&mut rows, &s.state) {
            r.state_spending = s.total_payments;
        }
    }
    for entry in watchlist {
        if let Some(r) = row(&mut rows, &entry.state) {
            if entry.flag_count > 0 {
                r.stat_flags += 1;
            } else if entry.source == Source::Ml {
                r.ml_flags += 1;
            }
            r.flagged_spending += entry.total_paid;
        }
    }
    for f in &ds.state_flags {
        if let Some(r) = row(&mut rows, &f.state) {
            r.flagged_count = f.total;
        }
    }

    let mut table: Vec<StateRisk> = rows
        .into_values()
        .map(|mut r| {
            if r.flagged_count == 0 {
                r.flagged_count = r.stat_flags + r.ml_flags;
            }
            r.flagged_share = percent_of(r.flagged_spending, r.state_spending);
            r
        })
        .collect();
    table.sort_by(|a, b| b.flagged_count.cmp(&a.flagged_count).then_with(|| a.state.cmp(&b.state)));
    table
}

/// Mean flagged count over the table, 0 for an empty table
pub fn average_flagged(table: &[StateRisk]) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    table.iter().map(|r| r.flagged_count as f64).sum::<f64>() / table.len() as f64
}

/// Row and 1-based rank for a state code, case-insensitive
pub fn find_state<'a>(table: &'a [StateRisk], code: &str) -> Option<(usize, &'a StateRisk)> {
    table
        .iter()
        .enumerate()
        .find(|(_, r)| r.state.eq_ignore_ascii_case(code))
        .map(|(i, r)| (i + 1, r))
}
