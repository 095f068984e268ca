//! OIG exclusion (LEIE) statistics, NPI lookup and matched providers

use axum::extract::{Query, State};
use axum::response::Html;
use serde::Serialize;

use om_common::aggregate::{bar_percent, group_count, shares, Share};
use om_common::models::{ExcludedNpi, MatchedExclusion, RecentExclusion};
use om_common::search::ExclusionQuery;

use super::{param, PageResult, Pager};
use crate::pagination::{calculate_pagination, SMALL_PAGE};
use crate::AppState;

const STATE_LIMIT: usize = 20;
const TYPE_LIMIT: usize = 10;
const SPECIALTY_LIMIT: usize = 15;
const MATCHED_SPECIALTY_LIMIT: usize = 10;

/// Exclusion type descriptions longer than this are shortened for the chart
const TYPE_DESC_MAX: usize = 30;
const TYPE_DESC_KEEP: usize = 28;

#[derive(Serialize)]
struct CountBar<'a> {
    key: &'a str,
    label: String,
    count: u64,
    bar: f64,
}

fn count_bars<'a>(counts: impl Iterator<Item = (&'a str, String, u64)>) -> Vec<CountBar<'a>> {
    let rows: Vec<(&str, String, u64)> = counts.collect();
    let max = rows.iter().map(|r| r.2).max().unwrap_or(0) as f64;
    rows.into_iter()
        .map(|(key, label, count)| CountBar { key, label, count, bar: bar_percent(count as f64, max) })
        .collect()
}

fn short_desc(desc: &str) -> String {
    if desc.chars().count() > TYPE_DESC_MAX {
        let head: String = desc.chars().take(TYPE_DESC_KEEP).collect();
        format!("{}...", head)
    } else {
        desc.to_string()
    }
}

/// Result of the `?npi=` lookup
#[derive(Serialize)]
struct NpiCheck<'a> {
    npi: String,
    entry: Option<&'a ExcludedNpi>,
}

#[derive(Serialize)]
struct ExclusionsPage<'a> {
    title: &'static str,
    total_excluded: u64,
    indexed_npis: usize,
    matched_count: usize,
    by_state: Vec<CountBar<'a>>,
    by_type: Vec<CountBar<'a>>,
    by_year: Vec<CountBar<'a>>,
    by_specialty: Vec<CountBar<'a>>,
    npi_check: Option<NpiCheck<'a>>,
    filters: &'a ExclusionQuery,
    recent: &'a [&'a RecentExclusion],
    pager: Pager,
}

/// GET /exclusions?npi=&q=&page=
pub async fn exclusions(State(state): State<AppState>, Query(query): Query<ExclusionQuery>) -> PageResult {
    let ds = &state.data;
    let leie = &ds.leie;

    let by_state = count_bars(
        leie.by_state
            .iter()
            .take(STATE_LIMIT)
            .map(|c| (c.key.as_str(), c.key.clone(), c.count)),
    );
    let by_type = count_bars(
        leie.by_type
            .iter()
            .take(TYPE_LIMIT)
            .map(|t| (t.code.as_str(), short_desc(&t.desc), t.count)),
    );
    let by_year = count_bars(leie.by_year.iter().map(|c| (c.key.as_str(), c.key.clone(), c.count)));
    let by_specialty = count_bars(
        leie.by_specialty
            .iter()
            .filter(|c| !c.key.is_empty())
            .take(SPECIALTY_LIMIT)
            .map(|c| (c.key.as_str(), c.key.clone(), c.count)),
    );

    let npi_check = param(&query.npi).map(|npi| NpiCheck {
        npi: npi.to_string(),
        entry: ds.excluded_npi(npi),
    });

    let filtered = query.filter_recent(&ds.leie_recent);
    let p = calculate_pagination(filtered.len(), query.page.unwrap_or(1), SMALL_PAGE);
    let pager = Pager::new(&p, "/exclusions", &[("q", param(&query.q))]);

    let page = ExclusionsPage {
        title: "OIG Exclusion Database",
        total_excluded: leie.by_state.iter().map(|c| c.count).sum(),
        indexed_npis: ds.leie_index.len(),
        matched_count: ds.leie_matched.len(),
        by_state,
        by_type,
        by_year,
        by_specialty,
        npi_check,
        filters: &query,
        recent: p.slice(&filtered),
        pager,
    };

    Ok(Html(state.render("exclusions.html", &page)?))
}

#[derive(Serialize)]
struct ReasonShare {
    #[serde(flatten)]
    share: Share,
    desc: String,
}

#[derive(Serialize)]
struct MatchedRow<'a> {
    #[serde(flatten)]
    entry: &'a MatchedExclusion,
    display_name: String,
}

#[derive(Serialize)]
struct MatchedPage<'a> {
    title: &'static str,
    total: usize,
    by_state: Vec<Share>,
    by_reason: Vec<ReasonShare>,
    by_specialty: Vec<Share>,
    rows: Vec<MatchedRow<'a>>,
}

/// GET /exclusions/matched
pub async fn matched(State(state): State<AppState>) -> PageResult {
    let matched = &state.data.leie_matched;

    let by_state = shares(&group_count(matched.iter(), |m| m.state.clone()));
    let by_reason = shares(&group_count(matched.iter(), |m| m.excl_type.clone()))
        .into_iter()
        .map(|share| {
            let desc = matched
                .iter()
                .find(|m| m.excl_type == share.key)
                .map(|m| m.excl_type_desc.clone())
                .unwrap_or_default();
            ReasonShare { share, desc }
        })
        .collect();
    let mut by_specialty = shares(&group_count(matched.iter(), |m| {
        if m.specialty.is_empty() {
            "Unknown".to_string()
        } else {
            m.specialty.clone()
        }
    }));
    by_specialty.truncate(MATCHED_SPECIALTY_LIMIT);

    let page = MatchedPage {
        title: "Excluded Providers in Medicaid Billing Data",
        total: matched.len(),
        by_state,
        by_reason,
        by_specialty,
        rows: matched
            .iter()
            .map(|entry| MatchedRow { entry, display_name: entry.display_name() })
            .collect(),
    };

    Ok(Html(state.render("matched.html", &page)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_desc() {
        assert_eq!(short_desc("Patient abuse"), "Patient abuse");
        let long = "Conviction for health care fraud (mandatory)";
        let short = short_desc(long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), TYPE_DESC_KEEP + 3);
    }

    #[test]
    fn test_count_bars_scale_to_max() {
        let bars = count_bars(vec![("CA", "CA".to_string(), 50), ("NY", "NY".to_string(), 25)].into_iter());
        assert_eq!(bars[0].bar, 100.0);
        assert_eq!(bars[1].bar, 50.0);
    }
}
