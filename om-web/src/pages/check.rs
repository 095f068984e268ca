//! "Is my provider flagged?" search

use axum::extract::{Query, State};
use axum::response::Html;
use serde::{Deserialize, Serialize};

use om_common::search::{check_provider, CheckResult, MIN_QUERY_LEN};

use super::{param, PageResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CheckQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
struct CheckPage<'a> {
    title: &'static str,
    q: &'a str,
    /// A query was submitted and is long enough to search
    searched: bool,
    min_len: usize,
    flagged: Vec<&'a CheckResult>,
    clean: Vec<&'a CheckResult>,
}

/// GET /check?q=
pub async fn check(State(state): State<AppState>, Query(query): Query<CheckQuery>) -> PageResult {
    let q = param(&query.q).unwrap_or("");
    let results = check_provider(&state.data, q);
    let (flagged, clean) = results.iter().partition(|r| r.flagged);

    let page = CheckPage {
        title: "Is My Provider Flagged?",
        q,
        searched: q.chars().count() >= MIN_QUERY_LEN,
        min_len: MIN_QUERY_LEN,
        flagged,
        clean,
    };

    Ok(Html(state.render("check.html", &page)?))
}
