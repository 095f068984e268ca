//! National spending trend by year

use axum::extract::State;
use axum::response::Html;
use serde::Serialize;

use om_common::models::YearlyTrend;
use om_common::trends::{peak_year, total_growth, year_over_year, YearGrowth};

use super::PageResult;
use crate::AppState;

#[derive(Serialize)]
struct TrendsPage<'a> {
    title: &'static str,
    total_spending: f64,
    first: Option<&'a YearlyTrend>,
    last: Option<&'a YearlyTrend>,
    peak: Option<&'a YearlyTrend>,
    /// Year with the most billing providers
    peak_providers: Option<&'a YearlyTrend>,
    total_growth: Option<f64>,
    years: Vec<YearGrowth<'a>>,
}

/// GET /trends
pub async fn trends(State(state): State<AppState>) -> PageResult {
    let yearly = &state.data.yearly;

    let page = TrendsPage {
        title: "Spending Trends",
        total_spending: yearly.iter().map(|y| y.payments).sum(),
        first: yearly.first(),
        last: yearly.last(),
        peak: peak_year(yearly),
        peak_providers: yearly.iter().max_by(|a, b| a.providers.total_cmp(&b.providers)),
        total_growth: total_growth(yearly),
        years: year_over_year(yearly),
    };

    Ok(Html(state.render("trends.html", &page)?))
}
