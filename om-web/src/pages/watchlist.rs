//! Unified risk watchlist

use axum::extract::{Query, State};
use axum::response::Html;
use serde::Serialize;
use serde_json::Value;

use om_common::aggregate::{group_count, FlagBuckets, GroupCount};
use om_common::watchlist::{
    flag_counts, flag_detail_summary, Source, TierCounts, WatchlistEntry, WatchlistQuery, WatchlistTab,
};

use super::{param, PageResult, Pager};
use crate::pagination::{calculate_pagination, SMALL_PAGE};
use crate::AppState;

#[derive(Serialize)]
struct Row<'a> {
    #[serde(flatten)]
    entry: &'a WatchlistEntry,
    /// Evidence line for the first flag that has one
    evidence: String,
}

impl<'a> Row<'a> {
    fn new(entry: &'a WatchlistEntry) -> Self {
        let evidence = entry
            .flags
            .iter()
            .map(|f| flag_detail_summary(f, entry.flag_details.get(f).unwrap_or(&Value::Null)))
            .find(|s| !s.is_empty())
            .unwrap_or_default();
        Self { entry, evidence }
    }
}

/// Summary of the entries on the selected tab
#[derive(Serialize)]
struct TabSummary {
    count: usize,
    spending: f64,
    average: f64,
    top_state: Option<GroupCount>,
}

#[derive(Serialize)]
struct TabCounts {
    all: usize,
    stat: usize,
    ml: usize,
}

#[derive(Serialize)]
struct WatchlistPage<'a> {
    title: &'static str,
    tab: &'static str,
    tabs: TabCounts,
    tiers: TierCounts,
    buckets: FlagBuckets,
    total_spending: f64,
    summary: TabSummary,
    flag_options: Vec<GroupCount>,
    state_options: Vec<String>,
    filters: &'a WatchlistQuery,
    rows: Vec<Row<'a>>,
    pager: Pager,
}

fn tab_name(tab: WatchlistTab) -> &'static str {
    match tab {
        WatchlistTab::All => "all",
        WatchlistTab::Stat => "stat",
        WatchlistTab::Ml => "ml",
    }
}

/// GET /watchlist?tab=&risk=&flag=&state=&q=&sort=&page=
pub async fn watchlist(State(state): State<AppState>, Query(query): Query<WatchlistQuery>) -> PageResult {
    let entries = state.watchlist.as_slice();
    let tab_entries = query.tab_entries(entries);

    let spending: f64 = tab_entries.iter().map(|e| e.total_paid).sum();
    let summary = TabSummary {
        count: tab_entries.len(),
        spending,
        average: if tab_entries.is_empty() { 0.0 } else { spending / tab_entries.len() as f64 },
        top_state: group_count(tab_entries.iter().filter(|e| !e.state.is_empty()), |e| e.state.clone())
            .into_iter()
            .next(),
    };

    let mut state_options: Vec<String> = entries
        .iter()
        .filter(|e| !e.state.is_empty())
        .map(|e| e.state.clone())
        .collect();
    state_options.sort();
    state_options.dedup();

    let filtered = query.apply(entries);
    let p = calculate_pagination(filtered.len(), query.page.unwrap_or(1), SMALL_PAGE);
    let sort = param(&query.sort);
    let pager = Pager::new(
        &p,
        "/watchlist",
        &[
            ("tab", param(&query.tab)),
            ("risk", param(&query.risk)),
            ("flag", param(&query.flag)),
            ("state", param(&query.state)),
            ("q", param(&query.q)),
            ("sort", sort),
        ],
    );

    let page = WatchlistPage {
        title: "Risk Watchlist",
        tab: tab_name(query.tab()),
        tabs: TabCounts {
            all: entries.len(),
            stat: entries.iter().filter(|e| e.flag_count > 0).count(),
            ml: entries.iter().filter(|e| e.source == Source::Ml).count(),
        },
        tiers: TierCounts::of(entries),
        buckets: FlagBuckets::from_counts(entries.iter().map(|e| e.flag_count)),
        total_spending: entries.iter().map(|e| e.total_paid).sum(),
        summary,
        flag_options: flag_counts(tab_entries.iter().copied()),
        state_options,
        filters: &query,
        rows: p.slice(&filtered).iter().map(Row::new).collect(),
        pager,
    };

    Ok(Html(state.render("watchlist.html", &page)?))
}
