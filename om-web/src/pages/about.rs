//! Methodology page

use axum::extract::State;
use axum::response::Html;
use serde::Serialize;

use om_common::models::SiteStats;

use super::PageResult;
use crate::AppState;

#[derive(Serialize)]
struct AboutPage<'a> {
    title: &'static str,
    stats: &'a SiteStats,
    smart_count: usize,
    legacy_count: usize,
    ml_count: usize,
    excluded_count: usize,
}

/// GET /about
pub async fn about(State(state): State<AppState>) -> PageResult {
    let ds = &state.data;
    let page = AboutPage {
        title: "About & Methodology",
        stats: &ds.stats,
        smart_count: ds.smart_watchlist.len(),
        legacy_count: ds.legacy_watchlist.len(),
        ml_count: ds.ml_scores.all().count(),
        excluded_count: ds.leie_index.len(),
    };
    Ok(Html(state.render("about.html", &page)?))
}
