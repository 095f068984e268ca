//! Procedure list and procedure detail

use axum::extract::{Path, Query, State};
use axum::response::Html;
use serde::Serialize;

use om_common::aggregate::{bar_percent, percent_of};
use om_common::dataset::is_valid_hcpcs;
use om_common::models::procedures::tier_label;
use om_common::models::{CodeBenchmark, ProcedureProvider, ProcedureSummary};
use om_common::reference::{hcpcs_label, procedure_context};
use om_common::search::ProcedureQuery;

use super::{param, PageResult, Pager};
use crate::pagination::{calculate_pagination, LARGE_PAGE};
use crate::AppState;

const TOP_PROVIDER_LIMIT: usize = 20;
const RELATED_LIMIT: usize = 5;
/// Codes whose numeric parts differ by at most this much count as related
const RELATED_DISTANCE: i64 = 10;

#[derive(Serialize)]
struct ListRow<'a> {
    #[serde(flatten)]
    procedure: &'a ProcedureSummary,
    cpc: f64,
    share: f64,
}

#[derive(Serialize)]
struct ProcedureListPage<'a> {
    title: &'static str,
    total_count: usize,
    total_spending: f64,
    filters: &'a ProcedureQuery,
    rows: Vec<ListRow<'a>>,
    pager: Pager,
}

/// GET /procedures?q=&sort=&page=
pub async fn procedure_list(State(state): State<AppState>, Query(query): Query<ProcedureQuery>) -> PageResult {
    let ds = &state.data;
    let total_spending = ds.procedures_total_paid();

    let filtered = query.apply(&ds.procedures);
    let p = calculate_pagination(filtered.len(), query.page.unwrap_or(1), LARGE_PAGE);
    let rows = p
        .slice(&filtered)
        .iter()
        .map(|procedure| ListRow {
            procedure,
            cpc: procedure.cost_per_claim(),
            share: percent_of(procedure.total_paid, total_spending),
        })
        .collect();
    let pager = Pager::new(&p, "/procedures", &[("q", param(&query.q)), ("sort", param(&query.sort))]);

    let page = ProcedureListPage {
        title: "Medicaid Procedures",
        total_count: ds.procedures.len(),
        total_spending,
        filters: &query,
        rows,
        pager,
    };

    Ok(Html(state.render("procedures.html", &page)?))
}

#[derive(Serialize)]
struct PercentileBar {
    label: &'static str,
    value: Option<f64>,
    bar: f64,
    median: bool,
}

#[derive(Serialize)]
struct ProviderRow<'a> {
    #[serde(flatten)]
    provider: &'a ProcedureProvider,
    tier_label: &'static str,
    cpc: Option<f64>,
}

#[derive(Serialize)]
struct ProcedurePage<'a> {
    title: String,
    code: String,
    procedure: &'a ProcedureSummary,
    avg_per_claim: f64,
    share: f64,
    rank: usize,
    total_codes: usize,
    benchmark: Option<&'a CodeBenchmark>,
    percentiles: Vec<PercentileBar>,
    context: Option<&'static str>,
    providers: Vec<ProviderRow<'a>>,
    related: Vec<&'a ProcedureSummary>,
}

/// Letter prefix and numeric part of an HCPCS code (`T1019` -> `("T", 1019)`)
fn split_code(code: &str) -> (String, Option<i64>) {
    let prefix: String = code.chars().filter(|c| !c.is_ascii_digit()).collect();
    let digits: String = code.chars().filter(char::is_ascii_digit).collect();
    (prefix, digits.parse().ok())
}

fn related_codes<'a>(all: &'a [ProcedureSummary], code: &str) -> Vec<&'a ProcedureSummary> {
    let (prefix, num) = split_code(code);
    let Some(num) = num else {
        return Vec::new();
    };
    all.iter()
        .filter(|p| p.code != code)
        .filter(|p| {
            let (p_prefix, p_num) = split_code(&p.code);
            p_prefix == prefix && p_num.is_some_and(|n| (n - num).abs() <= RELATED_DISTANCE)
        })
        .take(RELATED_LIMIT)
        .collect()
}

/// GET /procedures/:code
pub async fn procedure_detail(State(state): State<AppState>, Path(code): Path<String>) -> PageResult {
    let ds = &state.data;
    if !is_valid_hcpcs(&code) {
        return Err(state.not_found());
    }
    let Some(procedure) = ds.procedure(&code) else {
        return Err(state.not_found());
    };
    // Canonical casing from the fixture
    let code = procedure.code.clone();

    let benchmark = ds.benchmark(&code);
    let percentiles: Vec<PercentileBar> = benchmark
        .map(|b| {
            let max = b.scale_max();
            b.percentiles()
                .into_iter()
                .map(|(label, value)| PercentileBar {
                    label,
                    value,
                    bar: value.map(|v| bar_percent(v, max)).unwrap_or(0.0),
                    median: label == "Median",
                })
                .collect()
        })
        .unwrap_or_default();

    let detail = ds.procedure_detail(&code);
    let providers = detail
        .as_ref()
        .map(|d| d.top_providers.as_slice())
        .unwrap_or(&[])
        .iter()
        .take(TOP_PROVIDER_LIMIT)
        .map(|provider| ProviderRow {
            provider,
            tier_label: tier_label(&provider.tier),
            cpc: (provider.total_claims > 0.0).then(|| provider.total_paid / provider.total_claims),
        })
        .collect();

    let page = ProcedurePage {
        title: hcpcs_label(&code),
        procedure,
        avg_per_claim: procedure.cost_per_claim(),
        share: percent_of(procedure.total_paid, ds.procedures_total_paid()),
        rank: ds.procedures.iter().position(|p| p.code == code).map_or(0, |i| i + 1),
        total_codes: ds.procedures.len(),
        benchmark,
        percentiles,
        context: procedure_context(&code),
        providers,
        related: related_codes(&ds.procedures, &code),
        code,
    };

    Ok(Html(state.render("procedure.html", &page)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(code: &str) -> ProcedureSummary {
        ProcedureSummary {
            code: code.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_split_code() {
        assert_eq!(split_code("T1019"), ("T".to_string(), Some(1019)));
        assert_eq!(split_code("99213"), (String::new(), Some(99213)));
        assert_eq!(split_code("ABC"), ("ABC".to_string(), None));
    }

    #[test]
    fn test_related_codes_same_prefix_nearby() {
        let all = vec![summary("T1019"), summary("T1015"), summary("T2016"), summary("S1019"), summary("T1029")];
        let related: Vec<&str> = related_codes(&all, "T1019").iter().map(|p| p.code.as_str()).collect();
        assert_eq!(related, vec!["T1015", "T1029"]);
    }
}
