//! Side-by-side comparison of up to three providers
//!
//! The selection lives in the query string as repeated `npi` parameters
//! (comma lists are accepted too), so every add/remove link is a plain GET.

use axum::extract::{RawQuery, State};
use axum::response::Html;
use serde::Serialize;

use om_common::aggregate::bar_percent;
use om_common::compare::{compare_candidates, compared_provider, selected_npis, ComparedProvider, COMPARE_YEARS, MAX_COMPARED};
use om_common::models::TopProvider;

use super::PageResult;
use crate::AppState;

/// `/compare?npi=a&npi=b`, plus `q` when given
fn compare_href(npis: &[&str], q: Option<&str>) -> String {
    let mut qs = url::form_urlencoded::Serializer::new(String::new());
    for npi in npis {
        qs.append_pair("npi", npi);
    }
    if let Some(q) = q {
        qs.append_pair("q", q);
    }
    let qs = qs.finish();
    if qs.is_empty() {
        "/compare".to_string()
    } else {
        format!("/compare?{}", qs)
    }
}

#[derive(Serialize)]
struct Column {
    #[serde(flatten)]
    provider: ComparedProvider,
    remove_href: String,
    spending_bar: f64,
}

#[derive(Serialize)]
struct Candidate<'a> {
    #[serde(flatten)]
    provider: &'a TopProvider,
    add_href: String,
}

/// One row of the comparison table, a value per column
#[derive(Serialize)]
struct MetricRow {
    label: String,
    kind: &'static str,
    values: Vec<Option<f64>>,
}

fn metric(label: &str, kind: &'static str, columns: &[Column], f: impl Fn(&ComparedProvider) -> Option<f64>) -> MetricRow {
    MetricRow {
        label: label.to_string(),
        kind,
        values: columns.iter().map(|c| f(&c.provider)).collect(),
    }
}

fn metric_rows(columns: &[Column]) -> Vec<MetricRow> {
    let mut rows = vec![
        metric("Total Paid", "money", columns, |p| Some(p.total_paid)),
        metric("Total Claims", "number", columns, |p| Some(p.total_claims)),
        metric("Beneficiaries", "number", columns, |p| Some(p.total_benes)),
        metric("Cost per Claim", "cpc", columns, |p| p.cost_per_claim),
        metric("Claims per Beneficiary", "ratio", columns, |p| p.claims_per_bene),
        metric("Statistical Flags", "count", columns, |p| Some(f64::from(p.flag_count))),
        metric("ML Score", "score", columns, |p| p.ml_score),
    ];
    for year in COMPARE_YEARS {
        let row = metric(&format!("{} Spending", year), "money", columns, |p| p.yearly.get(year).copied());
        if row.values.iter().any(Option::is_some) {
            rows.push(row);
        }
    }
    rows
}

#[derive(Serialize)]
struct ComparePage<'a> {
    title: &'static str,
    columns: Vec<Column>,
    rows: Vec<MetricRow>,
    /// Requested NPIs with no data
    missing: Vec<String>,
    q: String,
    candidates: Vec<Candidate<'a>>,
    can_add: bool,
    max_compared: usize,
}

/// GET /compare
pub async fn compare(State(state): State<AppState>, RawQuery(raw): RawQuery) -> PageResult {
    let ds = &state.data;
    let raw = raw.unwrap_or_default();

    let mut npi_values: Vec<String> = Vec::new();
    let mut q = String::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            "npi" => npi_values.push(value.into_owned()),
            "q" => q = value.trim().to_string(),
            _ => {}
        }
    }

    let selected = selected_npis(npi_values.iter().map(String::as_str));
    let mut providers: Vec<ComparedProvider> = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    for npi in &selected {
        match compared_provider(ds, npi) {
            Some(p) => providers.push(p),
            None => missing.push(npi.clone()),
        }
    }

    let shown: Vec<&str> = providers.iter().map(|p| p.npi.as_str()).collect();
    let max_paid = providers.iter().map(|p| p.total_paid).fold(0.0, f64::max);
    let columns: Vec<Column> = providers
        .iter()
        .map(|p| {
            let rest: Vec<&str> = shown.iter().copied().filter(|n| *n != p.npi).collect();
            Column {
                remove_href: compare_href(&rest, None),
                spending_bar: bar_percent(p.total_paid, max_paid),
                provider: p.clone(),
            }
        })
        .collect();

    let can_add = shown.len() < MAX_COMPARED;
    let candidates = if can_add {
        compare_candidates(ds, &q)
            .into_iter()
            .filter(|c| !shown.contains(&c.npi.as_str()))
            .map(|c| {
                let mut next = shown.clone();
                next.push(&c.npi);
                Candidate { add_href: compare_href(&next, None), provider: c }
            })
            .collect()
    } else {
        Vec::new()
    };

    let page = ComparePage {
        title: "Compare Providers",
        rows: metric_rows(&columns),
        columns,
        missing,
        q,
        candidates,
        can_add,
        max_compared: MAX_COMPARED,
    };

    Ok(Html(state.render("compare.html", &page)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_href() {
        assert_eq!(compare_href(&[], None), "/compare");
        assert_eq!(compare_href(&["1376609297", "1982757688"], None), "/compare?npi=1376609297&npi=1982757688");
        assert_eq!(compare_href(&["1376609297"], Some("home care")), "/compare?npi=1376609297&q=home+care");
    }

    #[test]
    fn test_yearly_rows_only_when_present() {
        let mut p = compared("1111111111");
        p.yearly.insert("2021".to_string(), 500.0);
        let columns = vec![
            Column { provider: p, remove_href: String::new(), spending_bar: 100.0 },
            Column { provider: compared("2222222222"), remove_href: String::new(), spending_bar: 0.0 },
        ];
        let rows = metric_rows(&columns);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert!(labels.contains(&"2021 Spending"));
        assert!(!labels.contains(&"2020 Spending"));

        let year = rows.iter().find(|r| r.label == "2021 Spending").map(|r| r.values.clone());
        assert_eq!(year, Some(vec![Some(500.0), None]));
    }

    fn compared(npi: &str) -> ComparedProvider {
        ComparedProvider {
            npi: npi.to_string(),
            name: String::new(),
            specialty: String::new(),
            city: String::new(),
            state: String::new(),
            total_paid: 0.0,
            total_claims: 0.0,
            total_benes: 0.0,
            cost_per_claim: None,
            claims_per_bene: None,
            flag_count: 0,
            ml_score: None,
            yearly: Default::default(),
        }
    }
}
