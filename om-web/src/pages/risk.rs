//! Per-state fraud risk profile

use axum::extract::{Path, State};
use axum::response::Html;
use serde::Serialize;

use om_common::dataset::is_valid_state_code;
use om_common::reference::state_name;
use om_common::risk::{average_flagged, find_state, state_risk_table, StateRisk};
use om_common::watchlist::WatchlistEntry;

use super::PageResult;
use crate::AppState;

const FLAGGED_LIMIT: usize = 10;

#[derive(Serialize)]
struct RiskPage<'a> {
    title: String,
    code: String,
    name: String,
    risk: StateRisk,
    rank: usize,
    ranked_states: usize,
    average_flagged: f64,
    above_average: bool,
    flagged: Vec<&'a WatchlistEntry>,
    flagged_total: usize,
}

/// GET /risk/:state
pub async fn state_risk(State(state): State<AppState>, Path(code): Path<String>) -> PageResult {
    if !is_valid_state_code(&code) {
        return Err(state.not_found());
    }
    let code = code.to_ascii_uppercase();

    let table = state_risk_table(&state.data, &state.watchlist);
    let Some((rank, risk)) = find_state(&table, &code) else {
        return Err(state.not_found());
    };
    let average = average_flagged(&table);

    let in_state: Vec<&WatchlistEntry> = state.watchlist.iter().filter(|e| e.state == code).collect();

    let name = state_name(&code);
    let page = RiskPage {
        title: format!("{} Medicaid Fraud Risk", name),
        rank,
        ranked_states: table.len(),
        average_flagged: average,
        above_average: f64::from(risk.flagged_count) > average,
        risk: risk.clone(),
        flagged_total: in_state.len(),
        flagged: in_state.into_iter().take(FLAGGED_LIMIT).collect(),
        name,
        code,
    };

    Ok(Html(state.render("risk.html", &page)?))
}
