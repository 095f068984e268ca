//! XML sitemap

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use chrono::NaiveDate;

use om_common::articles::ARTICLES;
use om_common::Dataset;

use crate::feed::{xml_escape, XML_CONTENT_TYPE};
use crate::AppState;

/// Procedures beyond this rank are left to on-site search
pub const PROCEDURE_LIMIT: usize = 500;

/// Top-level pages with their change frequency and priority
const CORE_PAGES: &[(&str, &str, f32)] = &[
    ("", "weekly", 1.0),
    ("/watchlist", "weekly", 0.9),
    ("/providers", "weekly", 0.9),
    ("/insights", "weekly", 0.9),
    ("/states", "monthly", 0.8),
    ("/procedures", "monthly", 0.8),
    ("/exclusions", "monthly", 0.8),
    ("/exclusions/matched", "monthly", 0.7),
    ("/specialties", "monthly", 0.7),
    ("/hotspots", "monthly", 0.7),
    ("/timeline", "monthly", 0.7),
    ("/trends", "monthly", 0.7),
    ("/ml-analysis", "monthly", 0.6),
    ("/compare", "monthly", 0.5),
    ("/check", "monthly", 0.7),
    ("/downloads", "monthly", 0.7),
    ("/about", "monthly", 0.6),
];

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub path: String,
    pub changefreq: &'static str,
    pub priority: f32,
}

impl SitemapEntry {
    fn new(path: String, changefreq: &'static str, priority: f32) -> Self {
        Self { path, changefreq, priority }
    }
}

/// Every URL path listed in the sitemap, in output order
pub fn sitemap_entries(ds: &Dataset) -> Vec<SitemapEntry> {
    let mut entries: Vec<SitemapEntry> = CORE_PAGES
        .iter()
        .map(|(path, freq, priority)| SitemapEntry::new(path.to_string(), freq, *priority))
        .collect();

    entries.extend(
        ARTICLES
            .iter()
            .map(|a| SitemapEntry::new(format!("/insights/{}", a.slug), "monthly", 0.8)),
    );
    entries.extend(
        ds.provider_detail_npis()
            .into_iter()
            .map(|npi| SitemapEntry::new(format!("/providers/{}", npi), "monthly", 0.5)),
    );
    entries.extend(
        ds.states
            .iter()
            .filter(|s| !s.is_unknown())
            .map(|s| SitemapEntry::new(format!("/states/{}", s.state), "monthly", 0.6)),
    );
    entries.extend(
        ds.procedures
            .iter()
            .take(PROCEDURE_LIMIT)
            .map(|p| SitemapEntry::new(format!("/procedures/{}", p.code), "monthly", 0.4)),
    );
    entries
}

pub fn render_sitemap(site_url: &str, lastmod: NaiveDate, entries: &[SitemapEntry]) -> String {
    let lastmod = lastmod.format("%Y-%m-%d").to_string();
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    for entry in entries {
        out.push_str("  <url>\n");
        out.push_str(&format!("    <loc>{}</loc>\n", xml_escape(&format!("{}{}", site_url, entry.path))));
        out.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        out.push_str(&format!("    <changefreq>{}</changefreq>\n", entry.changefreq));
        out.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        out.push_str("  </url>\n");
    }
    out.push_str("</urlset>\n");
    out
}

/// GET /sitemap.xml
pub async fn sitemap(State(state): State<AppState>) -> impl IntoResponse {
    let entries = sitemap_entries(&state.data);
    (
        [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
        render_sitemap(&state.config.site_url, state.started, &entries),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use om_common::models::{ProcedureSummary, StateSummary};

    #[test]
    fn test_entries_skip_unknown_state_and_cap_procedures() {
        let mut ds = Dataset::default();
        ds.states = ["CA", "Unknown"]
            .iter()
            .map(|s| StateSummary { state: s.to_string(), ..Default::default() })
            .collect();
        ds.procedures = (0..PROCEDURE_LIMIT + 20)
            .map(|i| ProcedureSummary { code: format!("T{:04}", i), ..Default::default() })
            .collect();

        let entries = sitemap_entries(&ds);
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"/states/CA"));
        assert!(!paths.contains(&"/states/Unknown"));
        assert_eq!(paths.iter().filter(|p| p.starts_with("/procedures/")).count(), PROCEDURE_LIMIT);
        assert_eq!(entries[0].priority, 1.0);
    }

    #[test]
    fn test_render_uses_lastmod_and_site_url() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 19).unwrap();
        let xml = render_sitemap(
            "https://example.org",
            date,
            &[SitemapEntry::new("/about".to_string(), "monthly", 0.6)],
        );
        assert!(xml.contains("<loc>https://example.org/about</loc>"));
        assert!(xml.contains("<lastmod>2026-02-19</lastmod>"));
        assert!(xml.contains("<priority>0.6</priority>"));
    }
}
