//! State table and state detail

use axum::extract::{Path, State};
use axum::response::Html;
use serde::Serialize;

use om_common::aggregate::{bar_percent, percent_of};
use om_common::dataset::is_valid_state_code;
use om_common::models::{StateFlagCount, StateProcedure, StateProvider, StateSummary, StateSummaryTotals, YearlyTrend};
use om_common::reference::state_name;
use om_common::watchlist::WatchlistEntry;

use super::PageResult;
use crate::AppState;

const FLAGGED_LIMIT: usize = 10;

#[derive(Serialize)]
struct StateRow<'a> {
    #[serde(flatten)]
    summary: &'a StateSummary,
    name: String,
    share: f64,
    bar: f64,
    flags: u32,
    per_provider: f64,
}

#[derive(Serialize)]
struct StateListPage<'a> {
    title: &'static str,
    total_spending: f64,
    rows: Vec<StateRow<'a>>,
    /// States ordered by flag count, most flagged first
    most_flagged: Vec<&'a StateFlagCount>,
}

/// GET /states
pub async fn state_list(State(state): State<AppState>) -> PageResult {
    let ds = &state.data;
    let states: Vec<&StateSummary> = ds.states.iter().filter(|s| !s.is_unknown()).collect();
    let total_spending: f64 = states.iter().map(|s| s.total_payments).sum();
    let max = states.iter().map(|s| s.total_payments).fold(0.0, f64::max);

    let rows = states
        .iter()
        .map(|s| StateRow {
            summary: s,
            name: state_name(&s.state),
            share: percent_of(s.total_payments, total_spending),
            bar: bar_percent(s.total_payments, max),
            flags: ds.state_flag_count(&s.state),
            per_provider: if s.provider_count > 0.0 { s.total_payments / s.provider_count } else { 0.0 },
        })
        .collect();

    let mut most_flagged: Vec<&StateFlagCount> = ds
        .state_flags
        .iter()
        .filter(|f| f.state != "Unknown" && f.total > 0)
        .collect();
    most_flagged.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.state.cmp(&b.state)));

    let page = StateListPage {
        title: "Medicaid Spending by State",
        total_spending,
        rows,
        most_flagged,
    };

    Ok(Html(state.render("states.html", &page)?))
}

#[derive(Serialize)]
struct YearRow<'a> {
    #[serde(flatten)]
    trend: &'a YearlyTrend,
    bar: f64,
}

#[derive(Serialize)]
struct StatePage<'a> {
    title: String,
    code: String,
    name: String,
    summary: StateSummaryTotals,
    national_share: f64,
    /// Position among states by spending, 1-based
    rank: Option<usize>,
    flag_count: u32,
    providers: &'a [StateProvider],
    procedures: &'a [StateProcedure],
    years: Vec<YearRow<'a>>,
    flagged: Vec<&'a WatchlistEntry>,
    flagged_total: usize,
}

/// GET /states/:code
pub async fn state_detail(State(state): State<AppState>, Path(code): Path<String>) -> PageResult {
    if !is_valid_state_code(&code) {
        return Err(state.not_found());
    }
    let code = code.to_ascii_uppercase();
    let ds = &state.data;

    let detail = ds.state_detail(&code);
    let entry = ds.state_summary(&code);
    let summary = match (detail.as_ref().and_then(|d| d.summary.clone()), entry) {
        (Some(totals), _) => totals,
        (None, Some(entry)) => StateSummaryTotals::from(entry),
        (None, None) if detail.is_some() => StateSummaryTotals::default(),
        (None, None) => return Err(state.not_found()),
    };

    let known: Vec<&StateSummary> = ds.states.iter().filter(|s| !s.is_unknown()).collect();
    let national: f64 = known.iter().map(|s| s.total_payments).sum();
    let rank = known.iter().position(|s| s.state == code).map(|i| i + 1);

    let (providers, procedures, trends) = match &detail {
        Some(d) => (d.top_providers.as_slice(), d.top_procedures.as_slice(), d.yearly_trends.as_slice()),
        None => (&[][..], &[][..], &[][..]),
    };
    let max_year = trends.iter().map(|t| t.payments).fold(0.0, f64::max);
    let years = trends
        .iter()
        .map(|trend| YearRow { trend, bar: bar_percent(trend.payments, max_year) })
        .collect();

    let in_state: Vec<&WatchlistEntry> = state.watchlist.iter().filter(|e| e.state == code).collect();

    let name = state_name(&code);
    let page = StatePage {
        title: format!("{} Medicaid Spending", name),
        national_share: percent_of(summary.total_payments, national),
        summary,
        rank,
        flag_count: ds.state_flag_count(&code),
        providers,
        procedures,
        years,
        flagged_total: in_state.len(),
        flagged: in_state.into_iter().take(FLAGGED_LIMIT).collect(),
        name,
        code,
    };

    Ok(Html(state.render("state.html", &page)?))
}
