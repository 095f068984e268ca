//! Activity timeline of flagged providers

use axum::extract::{Query, State};
use axum::response::Html;
use serde::{Deserialize, Serialize};

use om_common::models::ProviderTimeline;
use om_common::search::{sort_timelines, year_ticks, TimelineBar, TimelineSort};

use super::PageResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    pub sort: Option<String>,
}

#[derive(Serialize)]
struct TimelineRow<'a> {
    #[serde(flatten)]
    timeline: &'a ProviderTimeline,
    bar: TimelineBar,
}

#[derive(Serialize)]
struct Tick {
    year: i32,
    left: f64,
}

#[derive(Serialize)]
struct TimelinePage<'a> {
    title: &'static str,
    sort: &'static str,
    total: usize,
    ticks: Vec<Tick>,
    rows: Vec<TimelineRow<'a>>,
}

/// GET /timeline?sort=flags|spending|first
pub async fn timeline(State(state): State<AppState>, Query(query): Query<TimelineQuery>) -> PageResult {
    let sort = TimelineSort::parse(query.sort.as_deref());
    let timelines = &state.data.timelines;

    // Rows with unparseable months have no bar to draw
    let rows = sort_timelines(timelines, sort)
        .into_iter()
        .filter_map(|timeline| TimelineBar::of(timeline).map(|bar| TimelineRow { timeline, bar }))
        .collect();

    let page = TimelinePage {
        title: "Flagged Provider Timeline",
        sort: sort.as_str(),
        total: timelines.len(),
        ticks: year_ticks().into_iter().map(|(year, left)| Tick { year, left }).collect(),
        rows,
    };

    Ok(Html(state.render("timeline.html", &page)?))
}
