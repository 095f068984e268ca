//! City fraud hotspots

use axum::extract::{Path, State};
use axum::response::Html;
use serde::Serialize;

use om_common::aggregate::bar_percent;
use om_common::models::CityHotspot;
use om_common::watchlist::WatchlistEntry;

use super::PageResult;
use crate::AppState;

/// Cities whose average flagged spend per provider exceeds this are called out
const LARGE_SCHEME_PER_PROVIDER: f64 = 100_000_000.0;
const CITY_PROVIDER_LIMIT: usize = 20;

/// Hotspots ordered by flagged provider count, ties by spending
fn ranked(hotspots: &[CityHotspot]) -> Vec<&CityHotspot> {
    let mut v: Vec<&CityHotspot> = hotspots.iter().collect();
    v.sort_by(|a, b| {
        b.flagged_count
            .cmp(&a.flagged_count)
            .then_with(|| b.flagged_spending.total_cmp(&a.flagged_spending))
    });
    v
}

/// Mean flagged count rounded to the nearest whole provider, and mean spending
fn averages(hotspots: &[CityHotspot]) -> (u32, f64) {
    if hotspots.is_empty() {
        return (0, 0.0);
    }
    let n = hotspots.len() as f64;
    let flagged: u32 = hotspots.iter().map(|c| c.flagged_count).sum();
    let spending: f64 = hotspots.iter().map(|c| c.flagged_spending).sum();
    ((flagged as f64 / n).round() as u32, spending / n)
}

/// 1-based position of `city` in the ranking, matched by identity so
/// same-named cities keep their own rank
fn rank_of(hotspots: &[CityHotspot], city: &CityHotspot) -> usize {
    ranked(hotspots)
        .iter()
        .position(|c| std::ptr::eq(*c, city))
        .map_or(0, |i| i + 1)
}

fn per_provider(city: &CityHotspot) -> f64 {
    if city.flagged_count > 0 {
        city.flagged_spending / city.flagged_count as f64
    } else {
        0.0
    }
}

#[derive(Serialize)]
struct HotspotRow<'a> {
    rank: usize,
    slug: String,
    #[serde(flatten)]
    city: &'a CityHotspot,
    per_provider: f64,
    bar: f64,
}

#[derive(Serialize)]
struct HotspotListPage<'a> {
    title: &'static str,
    total_flagged: u32,
    total_spending: f64,
    rows: Vec<HotspotRow<'a>>,
}

/// GET /hotspots
pub async fn hotspot_list(State(state): State<AppState>) -> PageResult {
    let hotspots = &state.data.hotspots;
    let max = hotspots.iter().map(|c| c.flagged_count).max().unwrap_or(0) as f64;

    let rows = ranked(hotspots)
        .into_iter()
        .enumerate()
        .map(|(i, city)| HotspotRow {
            rank: i + 1,
            slug: city.slug(),
            per_provider: per_provider(city),
            bar: bar_percent(city.flagged_count as f64, max),
            city,
        })
        .collect();

    let page = HotspotListPage {
        title: "Medicaid Fraud Hotspots",
        total_flagged: hotspots.iter().map(|c| c.flagged_count).sum(),
        total_spending: hotspots.iter().map(|c| c.flagged_spending).sum(),
        rows,
    };

    Ok(Html(state.render("hotspots.html", &page)?))
}

#[derive(Serialize)]
struct HotspotPage<'a> {
    title: String,
    slug: String,
    city: &'a CityHotspot,
    rank: usize,
    total_cities: usize,
    per_provider: f64,
    avg_flagged: u32,
    avg_spending: f64,
    above_avg_flagged: bool,
    above_avg_spending: bool,
    large_scheme: bool,
    providers: Vec<&'a WatchlistEntry>,
}

/// GET /hotspots/:slug
pub async fn hotspot_detail(State(state): State<AppState>, Path(slug): Path<String>) -> PageResult {
    let ds = &state.data;
    let Some(city) = ds.hotspot_by_slug(&slug) else {
        return Err(state.not_found());
    };

    let rank = rank_of(&ds.hotspots, city);
    let (avg_flagged, avg_spending) = averages(&ds.hotspots);
    let per_provider = per_provider(city);

    let providers = state
        .watchlist
        .iter()
        .filter(|e| e.city.eq_ignore_ascii_case(&city.city) && (city.state.is_empty() || e.state == city.state))
        .take(CITY_PROVIDER_LIMIT)
        .collect();

    let page = HotspotPage {
        title: format!("{} Medicaid Fraud Hotspot", city.city),
        slug: city.slug(),
        city,
        rank,
        total_cities: ds.hotspots.len(),
        per_provider,
        avg_flagged,
        avg_spending,
        above_avg_flagged: city.flagged_count > avg_flagged,
        above_avg_spending: city.flagged_spending > avg_spending,
        large_scheme: per_provider > LARGE_SCHEME_PER_PROVIDER,
        providers,
    };

    Ok(Html(state.render("hotspot.html", &page)?))
}
