//! Integration tests for the om-web router
//!
//! Every request runs against the fixture data directory under
//! `tests/fixtures/data`, through the same router the binary serves.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use om_common::articles::ARTICLES;
use om_common::config::{SiteConfig, TomlConfig};
use om_common::Dataset;
use om_web::{build_router, AppState};
use serde_json::Value;
use std::path::Path;
use tower::util::ServiceExt; // for `oneshot` method

const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/data");

/// Test helper: Create app over the fixture data directory
fn setup_app() -> axum::Router {
    let data = Dataset::load(DATA_DIR).expect("Fixtures should load");
    let config = SiteConfig::resolve(
        Some(Path::new(DATA_DIR)),
        Some("https://example.org"),
        None,
        None,
        &TomlConfig::default(),
    );
    let state = AppState::new(data, config).expect("Templates should compile");
    build_router(state)
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn get(uri: &str) -> Response {
    setup_app().oneshot(test_request("GET", uri)).await.unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// =============================================================================
// JSON API
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let response = get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "om-web");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let response = get("/api/buildinfo").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["version"].is_string());
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_search_finds_provider_by_name() {
    let response = get("/api/search?q=tempus").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let results = body.as_array().expect("Search returns an array");
    assert!(!results.is_empty());
    assert_eq!(results[0]["kind"], "provider");
    assert_eq!(results[0]["href"], "/providers/1376609297");
}

#[tokio::test]
async fn test_search_finds_state_by_name() {
    let body = extract_json(get("/api/search?q=arizona").await.into_body()).await;
    let hrefs: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["href"].as_str())
        .collect();
    assert!(hrefs.contains(&"/states/AZ"));
}

#[tokio::test]
async fn test_search_short_query_returns_empty_list() {
    let response = get("/api/search?q=x").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_search_without_query_returns_empty_list() {
    let body = extract_json(get("/api/search").await.into_body()).await;
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_exclusion_lookup_found() {
    let response = get("/api/exclusions/1578902233").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["found"], true);
    assert_eq!(body["npi"], "1578902233");
    assert_eq!(body["entry"]["state"], "AZ");
    assert_eq!(body["entry"]["reason"], "1128b4");
}

#[tokio::test]
async fn test_exclusion_lookup_not_found() {
    let body = extract_json(get("/api/exclusions/1376609297").await.into_body()).await;
    assert_eq!(body["found"], false);
    assert!(body.get("entry").is_none());
}

#[tokio::test]
async fn test_exclusion_lookup_rejects_non_numeric_npi() {
    let response = get("/api/exclusions/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_unknown_api_path_is_json_404() {
    let response = get("/api/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "not_found");
    assert!(body["error"]["message"].as_str().unwrap().contains("/api/nope"));
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_every_page_renders() {
    let pages = [
        "/",
        "/watchlist",
        "/watchlist?tab=stat",
        "/watchlist?tab=ml",
        "/watchlist?risk=critical&sort=flags",
        "/providers",
        "/providers?q=brooklyn&state=NY&sort=claims",
        "/providers/1376609297",
        "/providers/1699703827",
        "/procedures",
        "/procedures?q=T10&page=1",
        "/procedures/T1019",
        "/procedures/T2016",
        "/states",
        "/states/NY",
        "/states/ma",
        "/exclusions",
        "/exclusions?npi=1578902233",
        "/exclusions?npi=1111111111&q=smith",
        "/exclusions/matched",
        "/check",
        "/check?q=b",
        "/check?q=brooklyn",
        "/lookup",
        "/lookup?q=tempus",
        "/timeline",
        "/timeline?sort=spending",
        "/timeline?sort=first",
        "/specialties",
        "/specialties?q=home",
        "/specialties/home-health",
        "/specialties/supports-brokerage",
        "/hotspots",
        "/hotspots/brooklyn-ny",
        "/hotspots/stoughton-ma",
        "/hotspots/brooklyn",
        "/insights",
        "/insights/covid-vaccines",
        "/downloads",
        "/about",
        "/ml-analysis",
        "/trends",
        "/risk/NY",
        "/risk/ny",
        "/risk/AZ",
        "/compare",
        "/compare?npi=1376609297&npi=1982757688",
        "/compare?npi=1376609297,1699703827&q=tempus",
        "/compare?npi=abc",
        "/compare?q=care",
    ];

    for uri in pages {
        let response = get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
        assert!(content_type(&response).starts_with("text/html"), "GET {}", uri);
    }
}

#[tokio::test]
async fn test_unknown_entities_render_404_page() {
    let missing = [
        "/providers/12345",
        "/providers/9999999999",
        "/procedures/ZZZZZ",
        "/procedures/not%20a%20code",
        "/states/ZZ",
        "/states/Texas",
        "/risk/ZZ",
        "/risk/Texas",
        "/specialties/unknown-thing",
        "/specialties/Bad_Slug",
        "/hotspots/atlantis",
        "/insights/not-an-article",
        "/no/such/page",
    ];

    for uri in missing {
        let response = get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {}", uri);
        let body = extract_text(response.into_body()).await;
        assert!(body.contains("Page Not Found"), "GET {}", uri);
    }
}

#[tokio::test]
async fn test_provider_profile_without_detail_file() {
    // Listed in the top providers only
    let response = get("/providers/1982757688").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_text(response.into_body()).await;
    assert!(body.contains("1982757688"));
}

#[tokio::test]
async fn test_page_title_and_canonical_link() {
    let body = extract_text(get("/watchlist").await.into_body()).await;
    assert!(body.contains("<h1>Risk Watchlist</h1>"));
    assert!(body.contains("https://example.org/watchlist"));
}

#[tokio::test]
async fn test_lookup_exact_npi_redirects_to_profile() {
    let response = get("/lookup?q=1376609297").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/providers/1376609297"
    );
}

#[tokio::test]
async fn test_check_lists_flagged_before_clean() {
    let body = extract_text(get("/check?q=brooklyn").await.into_body()).await;

    let flagged = body.find("/providers/1205938121").expect("flagged match listed");
    let clean = body.find("/providers/1831102945").expect("clean match listed");
    assert!(flagged < clean);
    assert!(body.contains("Flagged (1)"));
    assert!(body.contains("Not Flagged (1)"));
}

#[tokio::test]
async fn test_watchlist_ml_tab_lists_only_ml_entries() {
    let body = extract_text(get("/watchlist?tab=ml").await.into_body()).await;
    assert!(body.contains("/providers/1669284400"));
    assert!(!body.contains("/providers/1205938121"));
}

#[tokio::test]
async fn test_states_page_hides_unknown_row() {
    let body = extract_text(get("/states").await.into_body()).await;
    assert!(body.contains("/states/NY"));
    assert!(!body.contains("/states/Unknown"));
}

#[tokio::test]
async fn test_malformed_page_param_falls_back_to_first_page() {
    let pages = [
        "/providers?page=abc",
        "/watchlist?page=",
        "/watchlist?tab=ml&page=1.5",
        "/procedures?page=-1",
        "/exclusions?page=2x",
    ];

    for uri in pages {
        let response = get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
        assert!(content_type(&response).starts_with("text/html"), "GET {}", uri);
    }
}

#[tokio::test]
async fn test_hotspot_links_carry_state() {
    let body = extract_text(get("/hotspots").await.into_body()).await;
    assert!(body.contains("/hotspots/brooklyn-ny"));
    assert!(body.contains("/hotspots/stoughton-ma"));
}

#[tokio::test]
async fn test_ml_analysis_shows_model_metrics() {
    let body = extract_text(get("/ml-analysis").await.into_body()).await;
    assert!(body.contains("<h1>ML Methodology</h1>"));
    assert!(body.contains("0.7762"));
    assert!(body.contains("594K"));
    assert!(body.contains("Top 1%"));
    // highest score first
    let top = body.find("/providers/1699703827").expect("top scored provider listed");
    let next = body.find("/providers/1558392011").expect("second provider listed");
    assert!(top < next);
}

#[tokio::test]
async fn test_trends_lists_every_year() {
    let body = extract_text(get("/trends").await.into_body()).await;
    for year in ["2018", "2019", "2020"] {
        assert!(body.contains(year), "year {}", year);
    }
    // 120B to 140B
    assert!(body.contains("16.7%"));
    assert!(body.contains("https://example.org/trends"));
}

#[tokio::test]
async fn test_state_risk_ranks_most_flagged_first() {
    let body = extract_text(get("/risk/ny").await.into_body()).await;
    assert!(body.contains("New York Medicaid Fraud Risk"));
    assert!(body.contains("#1</strong>"));
    assert!(body.contains("https://example.org/risk/NY"));

    let body = extract_text(get("/risk/AZ").await.into_body()).await;
    assert!(body.contains("#3</strong>"));
}

#[tokio::test]
async fn test_compare_shows_selected_providers() {
    let body = extract_text(get("/compare?npi=1376609297&npi=1982757688").await.into_body()).await;
    assert!(body.contains("TEMPUS UNLIMITED"));
    assert!(body.contains("FREEDOM CARE LLC"));
    // monthly detail of the first provider
    assert!(body.contains("2024 Spending"));
    // removing one keeps the other
    assert!(body.contains(r#"href="/compare?npi=1982757688""#));
    assert!(body.contains(r#"href="/compare?npi=1376609297""#));
}

#[tokio::test]
async fn test_compare_search_offers_add_links() {
    let body = extract_text(get("/compare?npi=1376609297&q=freedom").await.into_body()).await;
    assert!(body.contains(r#"href="/compare?npi=1376609297&npi=1982757688""#));
}

#[tokio::test]
async fn test_compare_reports_unknown_npi() {
    let response = get("/compare?npi=5555555555").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_text(response.into_body()).await;
    assert!(body.contains("No data for NPI 5555555555"));
}

// =============================================================================
// Feed, sitemap and assets
// =============================================================================

#[tokio::test]
async fn test_rss_feed() {
    let response = get("/feed.xml").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("application/xml"));

    let body = extract_text(response.into_body()).await;
    assert!(body.starts_with("<?xml"));
    assert_eq!(body.matches("<item>").count(), ARTICLES.len());
    assert!(body.contains("<link>https://example.org/insights/covid-vaccines</link>"));
}

#[tokio::test]
async fn test_sitemap() {
    let response = get("/sitemap.xml").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("application/xml"));

    let body = extract_text(response.into_body()).await;
    assert!(body.contains("<loc>https://example.org</loc>"));
    assert!(body.contains("<loc>https://example.org/providers/1376609297</loc>"));
    assert!(body.contains("<loc>https://example.org/states/AZ</loc>"));
    assert!(body.contains("<loc>https://example.org/trends</loc>"));
    assert!(body.contains("<loc>https://example.org/procedures/T1019</loc>"));
    assert!(!body.contains("/states/Unknown"));
}

#[tokio::test]
async fn test_stylesheet_served() {
    let response = get("/static/site.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("text/css"));
}

#[tokio::test]
async fn test_raw_fixture_download() {
    let response = get("/data/stats.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["minMonth"], "2018-01");
}

#[tokio::test]
async fn test_missing_download_is_404() {
    let response = get("/data/nothing-here.json").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
