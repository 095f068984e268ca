//! Homepage: headline numbers, most flagged providers, top states and the
//! yearly spending trend

use axum::extract::State;
use axum::response::Html;
use serde::Serialize;

use om_common::aggregate::bar_percent;
use om_common::articles::{Article, ARTICLES};
use om_common::models::{SiteStats, StateSummary, TopProvider, YearlyTrend};
use om_common::watchlist::WatchlistEntry;

use super::PageResult;
use crate::AppState;

const TOP_LIMIT: usize = 5;
const LATEST_ARTICLES: usize = 4;

#[derive(Serialize)]
struct YearBar<'a> {
    #[serde(flatten)]
    year: &'a YearlyTrend,
    bar: f64,
}

#[derive(Serialize)]
struct HomePage<'a> {
    title: &'static str,
    stats: &'a SiteStats,
    watchlist_count: usize,
    flagged_spending: f64,
    matched_exclusions: usize,
    most_flagged: Vec<&'a WatchlistEntry>,
    top_providers: &'a [TopProvider],
    top_states: Vec<&'a StateSummary>,
    years: Vec<YearBar<'a>>,
    /// Latest year minus first year
    growth: f64,
    /// Latest year over the year before, in percent
    yoy: Option<f64>,
    latest: Vec<&'static Article>,
}

/// GET /
pub async fn home(State(state): State<AppState>) -> PageResult {
    let ds = &state.data;

    let mut most_flagged: Vec<&WatchlistEntry> =
        state.watchlist.iter().filter(|e| e.flag_count > 0).collect();
    most_flagged.sort_by(|a, b| {
        b.flag_count
            .cmp(&a.flag_count)
            .then_with(|| b.total_paid.total_cmp(&a.total_paid))
    });
    most_flagged.truncate(TOP_LIMIT);

    let max_year = ds.yearly.iter().map(|y| y.payments).fold(0.0, f64::max);
    let years = ds
        .yearly
        .iter()
        .map(|y| YearBar { year: y, bar: bar_percent(y.payments, max_year) })
        .collect();

    let growth = match (ds.yearly.first(), ds.yearly.last()) {
        (Some(first), Some(last)) => last.payments - first.payments,
        _ => 0.0,
    };
    let yoy = match ds.yearly.as_slice() {
        [.., prev, last] if prev.payments > 0.0 => {
            Some((last.payments - prev.payments) / prev.payments * 100.0)
        }
        _ => None,
    };

    let page = HomePage {
        title: "Follow the Money",
        stats: &ds.stats,
        watchlist_count: state.watchlist.len(),
        flagged_spending: state.watchlist.iter().map(|e| e.total_paid).sum(),
        matched_exclusions: ds.leie_matched.len(),
        most_flagged,
        top_providers: &ds.top_providers[..ds.top_providers.len().min(TOP_LIMIT)],
        top_states: ds.states.iter().filter(|s| !s.is_unknown()).take(TOP_LIMIT).collect(),
        years,
        growth,
        yoy,
        latest: ARTICLES.iter().rev().take(LATEST_ARTICLES).collect(),
    };

    Ok(Html(state.render("home.html", &page)?))
}
