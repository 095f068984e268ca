//! Provider name / NPI lookup

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};

use om_common::models::SmartEntry;
use om_common::search::{lookup_providers, recently_flagged, LookupMatch, LookupOutcome};

use super::param;
use crate::error::PageError;
use crate::AppState;

const RECENT_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
struct LookupPage<'a> {
    title: &'static str,
    q: &'a str,
    searched: bool,
    matches: Vec<LookupMatch>,
    recent: Vec<&'a SmartEntry>,
}

/// GET /lookup?q=
///
/// An exact 10-digit NPI redirects straight to the provider profile.
pub async fn lookup(State(state): State<AppState>, Query(query): Query<LookupQuery>) -> Result<Response, PageError> {
    let q = param(&query.q).unwrap_or("");
    let matches = match lookup_providers(&state.data, q) {
        LookupOutcome::Npi(npi) => return Ok(Redirect::to(&format!("/providers/{}", npi)).into_response()),
        LookupOutcome::Matches(matches) => matches,
        LookupOutcome::Empty => Vec::new(),
    };

    let page = LookupPage {
        title: "Provider Lookup",
        q,
        searched: !q.is_empty(),
        matches,
        recent: recently_flagged(&state.data, RECENT_LIMIT),
    };

    Ok(Html(state.render("lookup.html", &page)?).into_response())
}
