//! Global search used by the header search box

use axum::extract::{Query, State};
use axum::http::Uri;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use om_common::search::{self, SearchResult};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/search?q=
///
/// Queries shorter than two characters return an empty list.
pub async fn global_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<SearchResult>> {
    let results = search::global_search(&state.data, &query.q);
    debug!("search {:?}: {} results", query.q, results.len());
    Json(results)
}

/// Any other path under `/api/`
pub async fn unknown_endpoint(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No API endpoint at {}", uri.path()))
}
