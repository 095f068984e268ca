//! Specialty index and specialty detail

use axum::extract::{Path, Query, State};
use axum::response::Html;
use serde::Serialize;

use om_common::aggregate::percent_of;
use om_common::dataset::is_valid_slug;
use om_common::models::{Specialty, SpecialtyProvider};
use om_common::search::SpecialtyQuery;

use super::PageResult;
use crate::AppState;

#[derive(Serialize)]
struct SpecialtyRow<'a> {
    #[serde(flatten)]
    specialty: &'a Specialty,
    share: f64,
    per_provider: f64,
}

#[derive(Serialize)]
struct SpecialtyListPage<'a> {
    title: &'static str,
    total_count: usize,
    total_spending: f64,
    filters: &'a SpecialtyQuery,
    rows: Vec<SpecialtyRow<'a>>,
}

fn per_provider(total_paid: f64, providers: f64) -> f64 {
    if providers > 0.0 {
        total_paid / providers
    } else {
        0.0
    }
}

/// GET /specialties?q=&sort=
pub async fn specialty_list(State(state): State<AppState>, Query(query): Query<SpecialtyQuery>) -> PageResult {
    let specialties = &state.data.specialties;
    let total_spending: f64 = specialties.iter().map(|s| s.total_paid).sum();

    let rows = query
        .apply(specialties)
        .into_iter()
        .map(|specialty| SpecialtyRow {
            share: percent_of(specialty.total_paid, total_spending),
            per_provider: per_provider(specialty.total_paid, specialty.provider_count),
            specialty,
        })
        .collect();

    let page = SpecialtyListPage {
        title: "Medicaid Spending by Specialty",
        total_count: specialties.len(),
        total_spending,
        filters: &query,
        rows,
    };

    Ok(Html(state.render("specialties.html", &page)?))
}

#[derive(Serialize)]
struct SpecialtyPage {
    title: String,
    slug: String,
    name: String,
    provider_count: f64,
    total_paid: f64,
    avg_paid: f64,
    providers: Vec<SpecialtyProvider>,
}

/// GET /specialties/:slug
///
/// Renders from the detail file when present, otherwise from the index entry.
pub async fn specialty_detail(State(state): State<AppState>, Path(slug): Path<String>) -> PageResult {
    if !is_valid_slug(&slug) {
        return Err(state.not_found());
    }
    let ds = &state.data;
    let detail = ds.specialty_detail(&slug);
    let entry = ds.specialty(&slug);
    if detail.is_none() && entry.is_none() {
        return Err(state.not_found());
    }

    let pick_name = |d: Option<&str>, e: Option<&str>| {
        d.into_iter().chain(e).find(|s| !s.is_empty()).map(str::to_string)
    };
    let name = pick_name(detail.as_ref().map(|d| d.name.as_str()), entry.map(|e| e.name.as_str()))
        .unwrap_or_else(|| slug.clone());
    let pick = |d: Option<f64>, e: Option<f64>| d.into_iter().chain(e).find(|v| *v > 0.0).unwrap_or(0.0);
    let provider_count = pick(detail.as_ref().map(|d| d.provider_count), entry.map(|e| e.provider_count));
    let total_paid = pick(detail.as_ref().map(|d| d.total_paid), entry.map(|e| e.total_paid));

    // Detail file rows, else the index entry's top providers
    let providers = match detail {
        Some(d) if !d.providers.is_empty() => d.providers,
        _ => entry.map(|e| e.top_providers.clone()).unwrap_or_default(),
    };

    let page = SpecialtyPage {
        title: format!("{} Providers", name),
        avg_paid: per_provider(total_paid, provider_count),
        slug,
        name,
        provider_count,
        total_paid,
        providers,
    };

    Ok(Html(state.render("specialty.html", &page)?))
}
