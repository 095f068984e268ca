//! Embedded stylesheet

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

const SITE_CSS: &str = include_str!("../../static/site.css");

/// GET /static/site.css
pub async fn serve_site_css() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        SITE_CSS,
    )
        .into_response()
}
