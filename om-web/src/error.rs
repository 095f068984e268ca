//! Handler error types
//!
//! Page handlers fail with [`PageError`] (HTML), API handlers with
//! [`ApiError`] (JSON `{"error": {code, message}}`).

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

const INTERNAL_ERROR_PAGE: &str = "<!DOCTYPE html><html><head><title>Server Error | OpenMedicaid</title>\
<link rel=\"stylesheet\" href=\"/static/site.css\"></head><body><main class=\"container center\">\
<p class=\"big-code\">500</p><h1>Something went wrong</h1><p><a href=\"/\">Back to the homepage</a></p>\
</main></body></html>";

#[derive(Debug, Error)]
pub enum PageError {
    /// Unknown route parameter; carries the rendered 404 page
    #[error("page not found")]
    NotFound(String),

    #[error("template error: {0}")]
    Render(#[from] tera::Error),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::NotFound(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
            PageError::Render(e) => {
                error!("Template render failed: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Html(INTERNAL_ERROR_PAGE)).into_response()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));
        (self.status(), body).into_response()
    }
}
