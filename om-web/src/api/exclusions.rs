//! OIG exclusion lookup by NPI

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use om_common::models::ExcludedNpi;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ExclusionLookup {
    pub found: bool,
    pub npi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<ExcludedNpi>,
}

/// GET /api/exclusions/:npi
pub async fn exclusion_lookup(
    State(state): State<AppState>,
    Path(npi): Path<String>,
) -> Result<Json<ExclusionLookup>, ApiError> {
    let npi = npi.trim();
    if npi.is_empty() || !npi.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::BadRequest(format!("NPI must be numeric, got {:?}", npi)));
    }

    let entry = state.data.excluded_npi(npi).cloned();
    Ok(Json(ExclusionLookup {
        found: entry.is_some(),
        npi: npi.to_string(),
        entry,
    }))
}
