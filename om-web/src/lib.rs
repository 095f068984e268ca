//! om-web library - OpenMedicaid site server
//!
//! Serves the pre-computed Medicaid billing dataset as HTML pages, an RSS
//! feed, a sitemap, a small JSON API and raw dataset downloads.

use std::sync::Arc;

use axum::Router;
use chrono::NaiveDate;
use om_common::config::SiteConfig;
use om_common::watchlist::{merge_watchlist, WatchlistEntry};
use om_common::Dataset;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod feed;
pub mod pages;
pub mod pagination;
pub mod render;
pub mod sitemap;

use error::PageError;
use render::Renderer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Fixtures loaded at startup (read-only)
    pub data: Arc<Dataset>,
    /// Merged watchlist, computed once from `data`
    pub watchlist: Arc<Vec<WatchlistEntry>>,
    pub renderer: Arc<Renderer>,
    pub config: Arc<SiteConfig>,
    /// Server start date, used as the sitemap `lastmod`
    pub started: NaiveDate,
}

impl AppState {
    /// Create new application state
    pub fn new(data: Dataset, config: SiteConfig) -> Result<Self, tera::Error> {
        let watchlist = merge_watchlist(&data);
        Ok(Self {
            data: Arc::new(data),
            watchlist: Arc::new(watchlist),
            renderer: Arc::new(Renderer::new(&config.site_url)?),
            config: Arc::new(config),
            started: chrono::Utc::now().date_naive(),
        })
    }

    /// Render a page template
    pub fn render<T: serde::Serialize>(&self, template: &str, page: &T) -> Result<String, PageError> {
        Ok(self.renderer.render(template, page)?)
    }

    /// The 404 page as an error, ready to be returned from a handler
    pub fn not_found(&self) -> PageError {
        match self.renderer.render("not_found.html", &serde_json::json!({ "title": "Page Not Found" })) {
            Ok(body) => PageError::NotFound(body),
            Err(e) => PageError::Render(e),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let pages = Router::new()
        .route("/", get(pages::home::home))
        .route("/watchlist", get(pages::watchlist::watchlist))
        .route("/providers", get(pages::providers::provider_list))
        .route("/providers/:npi", get(pages::providers::provider_detail))
        .route("/procedures", get(pages::procedures::procedure_list))
        .route("/procedures/:code", get(pages::procedures::procedure_detail))
        .route("/states", get(pages::states::state_list))
        .route("/states/:code", get(pages::states::state_detail))
        .route("/exclusions", get(pages::exclusions::exclusions))
        .route("/exclusions/matched", get(pages::exclusions::matched))
        .route("/check", get(pages::check::check))
        .route("/lookup", get(pages::lookup::lookup))
        .route("/timeline", get(pages::timeline::timeline))
        .route("/trends", get(pages::trends::trends))
        .route("/risk/:state", get(pages::risk::state_risk))
        .route("/compare", get(pages::compare::compare))
        .route("/ml-analysis", get(pages::ml_analysis::ml_analysis))
        .route("/specialties", get(pages::specialties::specialty_list))
        .route("/specialties/:slug", get(pages::specialties::specialty_detail))
        .route("/hotspots", get(pages::hotspots::hotspot_list))
        .route("/hotspots/:slug", get(pages::hotspots::hotspot_detail))
        .route("/insights", get(pages::insights::insight_list))
        .route("/insights/:slug", get(pages::insights::insight_detail))
        .route("/downloads", get(pages::downloads::downloads))
        .route("/about", get(pages::about::about));

    let feeds = Router::new()
        .route("/feed.xml", get(feed::rss_feed))
        .route("/sitemap.xml", get(sitemap::sitemap));

    let api = Router::new()
        .route("/api/search", get(api::global_search))
        .route("/api/exclusions/:npi", get(api::exclusion_lookup))
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/*rest", get(api::unknown_endpoint))
        .route("/static/site.css", get(api::serve_site_css))
        .merge(api::health_routes());

    // Raw fixture downloads straight from the data directory
    let downloads = ServeDir::new(state.data.dir());

    Router::new()
        .merge(pages)
        .merge(feeds)
        .merge(api)
        .nest_service("/data", downloads)
        .fallback(pages::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
