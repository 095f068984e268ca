//! Provider list and provider profile

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::response::Html;
use serde::Serialize;
use serde_json::Value;

use om_common::aggregate::{bar_percent, percent_of};
use om_common::dataset::is_valid_npi;
use om_common::models::{ExcludedNpi, MonthlyPoint, ProviderProcedure, TopProvider};
use om_common::reference::{flag_info, parse_flags};
use om_common::search::ProviderQuery;
use om_common::watchlist::{flag_explanation, unified_tier, UnifiedTier};
use om_common::Dataset;

use super::{param, PageResult, Pager};
use crate::pagination::{calculate_pagination, LARGE_PAGE};
use crate::AppState;

/// Months shown in the profile trend chart
const TREND_MONTHS: usize = 36;
const PEER_LIMIT: usize = 5;

/// Combined tier from the smart watchlist flag count and the ML score
fn provider_tier(ds: &Dataset, npi: &str) -> Option<UnifiedTier> {
    let flags = ds.smart_entry(npi).map(|e| e.effective_flag_count());
    let ml = ds.ml_entry(npi).map(|e| e.ml_score);
    if flags.is_none() && ml.is_none() {
        return None;
    }
    Some(unified_tier(flags.unwrap_or(0), ml))
}

// ============================================================================
// GET /providers
// ============================================================================

#[derive(Serialize)]
struct ListRow<'a> {
    rank: usize,
    #[serde(flatten)]
    provider: &'a TopProvider,
    tier: Option<UnifiedTier>,
}

#[derive(Serialize)]
struct ProviderListPage<'a> {
    title: &'static str,
    total_count: usize,
    total_spending: f64,
    flagged_count: usize,
    state_options: Vec<&'a str>,
    filters: &'a ProviderQuery,
    rows: Vec<ListRow<'a>>,
    pager: Pager,
}

/// GET /providers?q=&state=&flag=&sort=&page=
pub async fn provider_list(State(state): State<AppState>, Query(query): Query<ProviderQuery>) -> PageResult {
    let ds = &state.data;
    let providers = &ds.top_providers;

    let mut state_options: Vec<&str> = providers
        .iter()
        .map(|p| p.state.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    state_options.sort_unstable();
    state_options.dedup();

    let filtered = query.apply(providers);
    let p = calculate_pagination(filtered.len(), query.page.unwrap_or(1), LARGE_PAGE);
    let rows = p
        .slice(&filtered)
        .iter()
        .enumerate()
        .map(|(i, provider)| ListRow {
            rank: p.offset + i + 1,
            provider,
            tier: provider_tier(ds, &provider.npi),
        })
        .collect();

    let pager = Pager::new(
        &p,
        "/providers",
        &[
            ("q", param(&query.q)),
            ("state", param(&query.state)),
            ("flag", param(&query.flag)),
            ("sort", param(&query.sort)),
        ],
    );

    let page = ProviderListPage {
        title: "Top Medicaid Providers",
        total_count: providers.len(),
        total_spending: providers.iter().map(|p| p.total_paid).sum(),
        flagged_count: providers.iter().filter(|p| !p.flags.is_empty()).count(),
        state_options,
        filters: &query,
        rows,
        pager,
    };

    Ok(Html(state.render("providers.html", &page)?))
}

// ============================================================================
// GET /providers/:npi
// ============================================================================

#[derive(Serialize)]
struct FlagView {
    key: String,
    label: String,
    tone: &'static str,
    description: String,
    explanation: String,
}

#[derive(Serialize)]
struct MonthBar<'a> {
    #[serde(flatten)]
    point: &'a MonthlyPoint,
    bar: f64,
}

#[derive(Serialize)]
struct ProcedureRow<'a> {
    #[serde(flatten)]
    procedure: &'a ProviderProcedure,
    share: f64,
    cpc: Option<f64>,
    ratio: Option<f64>,
}

#[derive(Serialize)]
struct ProviderPage<'a> {
    title: String,
    npi: String,
    name: String,
    specialty: String,
    city: String,
    state: String,
    total_paid: f64,
    total_claims: f64,
    total_benes: f64,
    avg_per_claim: f64,
    claims_per_bene: f64,
    growth_rate: Option<f64>,
    /// Position in the top-provider list, 1-based
    rank: Option<usize>,
    national_providers: f64,
    /// Detail file missing: profile assembled from list entries only
    limited: bool,
    flag_count: usize,
    flags: Vec<FlagView>,
    tier: Option<UnifiedTier>,
    ml_score: Option<f64>,
    exclusion: Option<&'a ExcludedNpi>,
    monthly: Vec<MonthBar<'a>>,
    procedures: Vec<ProcedureRow<'a>>,
    peers: Vec<&'a TopProvider>,
}

fn first_nonempty(candidates: &[Option<&str>]) -> String {
    candidates
        .iter()
        .flatten()
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn first_positive(candidates: &[Option<f64>]) -> f64 {
    candidates.iter().flatten().copied().find(|v| *v > 0.0).unwrap_or(0.0)
}

/// GET /providers/:npi
pub async fn provider_detail(State(state): State<AppState>, Path(npi): Path<String>) -> PageResult {
    if !is_valid_npi(&npi) {
        return Err(state.not_found());
    }
    let ds = &state.data;

    let detail = ds.provider_detail(&npi);
    let smart = ds.smart_entry(&npi);
    let legacy = ds.legacy_entry(&npi);
    let top = ds.top_provider(&npi);

    if detail.is_none() && smart.is_none() && top.is_none() {
        return Err(state.not_found());
    }
    let d = detail.as_ref();

    let name = first_nonempty(&[
        d.map(|d| d.name.as_str()),
        smart.map(|s| s.name.as_str()),
        top.map(|p| p.name.as_str()),
    ]);
    let name = if name.is_empty() { format!("Provider {}", npi) } else { name };
    let total_paid = first_positive(&[
        d.map(|d| d.total_paid),
        smart.map(|s| s.total_paid),
        top.map(|p| p.total_paid),
    ]);
    let total_claims = first_positive(&[d.map(|d| d.total_claims), top.map(|p| p.total_claims)]);
    let total_benes = first_positive(&[d.map(|d| d.total_benes), top.map(|p| p.total_benes)]);

    // Union of every source, first occurrence wins
    let listed: Vec<String> = match d {
        Some(d) if !d.flags.is_empty() => d.flags.clone(),
        _ => top.map(|p| p.flags.clone()).unwrap_or_default(),
    };
    let all_flags = parse_flags(
        &[
            smart.map(|s| s.flags.clone()).unwrap_or_default(),
            legacy.map(|l| l.flags.clone()).unwrap_or_default(),
            listed,
        ]
        .concat(),
    );

    let mut details: BTreeMap<String, Value> = BTreeMap::new();
    if let Some(s) = smart {
        details.extend(s.flag_details.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    if let Some(l) = legacy {
        for (k, v) in &l.flag_details {
            details.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }

    let flags = all_flags
        .iter()
        .map(|flag| {
            let info = flag_info(flag);
            FlagView {
                key: flag.clone(),
                label: info.label,
                tone: info.tone,
                description: info.description,
                explanation: flag_explanation(flag, details.get(flag).unwrap_or(&Value::Null)),
            }
        })
        .collect::<Vec<_>>();

    let monthly_src = d.map(|d| d.monthly.as_slice()).unwrap_or(&[]);
    let recent = &monthly_src[monthly_src.len().saturating_sub(TREND_MONTHS)..];
    let max_month = recent.iter().map(|m| m.payments).fold(0.0, f64::max);
    let monthly = recent
        .iter()
        .map(|point| MonthBar { point, bar: bar_percent(point.payments, max_month) })
        .collect();

    let procedures = d
        .map(|d| d.procedures.as_slice())
        .unwrap_or(&[])
        .iter()
        .map(|procedure| ProcedureRow {
            procedure,
            share: percent_of(procedure.payments, total_paid),
            cpc: procedure.cost_per_claim(),
            ratio: procedure.ratio_to_median(),
        })
        .collect();

    let provider_state = first_nonempty(&[
        d.map(|d| d.state.as_str()),
        smart.map(|s| s.state.as_str()),
        top.map(|p| p.state.as_str()),
    ]);
    let peers = if provider_state.is_empty() {
        Vec::new()
    } else {
        ds.top_providers
            .iter()
            .filter(|p| p.state == provider_state && p.npi != npi)
            .take(PEER_LIMIT)
            .collect()
    };

    let ml_score = ds.ml_entry(&npi).map(|e| e.ml_score);
    let tier = (!flags.is_empty() || ml_score.is_some()).then(|| unified_tier(flags.len() as u32, ml_score));

    let page = ProviderPage {
        title: name.clone(),
        specialty: first_nonempty(&[
            d.map(|d| d.specialty.as_str()),
            smart.map(|s| s.specialty.as_str()),
            top.map(|p| p.specialty.as_str()),
        ]),
        city: first_nonempty(&[
            d.map(|d| d.city.as_str()),
            smart.map(|s| s.city.as_str()),
            top.map(|p| p.city.as_str()),
        ]),
        state: provider_state,
        name,
        total_paid,
        total_claims,
        total_benes,
        avg_per_claim: if total_claims > 0.0 { total_paid / total_claims } else { 0.0 },
        claims_per_bene: if total_benes > 0.0 { total_claims / total_benes } else { 0.0 },
        growth_rate: d.and_then(|d| d.growth_rate).filter(|g| *g != 0.0),
        rank: ds.top_providers.iter().position(|p| p.npi == npi).map(|i| i + 1),
        national_providers: ds.stats.providers,
        limited: detail.is_none(),
        flag_count: flags.len(),
        flags,
        tier,
        ml_score,
        exclusion: ds.excluded_npi(&npi),
        monthly,
        procedures,
        peers,
        npi,
    };

    Ok(Html(state.render("provider.html", &page)?))
}
