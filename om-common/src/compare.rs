//! Side-by-side provider comparison

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dataset::is_valid_npi;
use crate::models::TopProvider;
use crate::search::MIN_QUERY_LEN;
use crate::Dataset;

/// Providers shown side by side
pub const MAX_COMPARED: usize = 3;
/// Search suggestions offered when adding a provider
pub const CANDIDATE_LIMIT: usize = 8;
/// Years of the per-year spending rows
pub const COMPARE_YEARS: [&str; 7] = ["2018", "2019", "2020", "2021", "2022", "2023", "2024"];

/// One compared provider, from its detail file or the top-provider index
#[derive(Debug, Clone, Serialize)]
pub struct ComparedProvider {
    pub npi: String,
    pub name: String,
    pub specialty: String,
    pub city: String,
    pub state: String,
    pub total_paid: f64,
    pub total_claims: f64,
    pub total_benes: f64,
    pub cost_per_claim: Option<f64>,
    pub claims_per_bene: Option<f64>,
    pub flag_count: u32,
    pub ml_score: Option<f64>,
    /// Payments per calendar year, summed from the monthly series
    pub yearly: BTreeMap<String, f64>,
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    (den > 0.0).then(|| num / den)
}

/// Load one provider for comparison; `None` when it is in neither source
pub fn compared_provider(ds: &Dataset, npi: &str) -> Option<ComparedProvider> {
    let top = ds.top_provider(npi);
    let flag_count = top
        .map(|t| t.flag_count.max(t.flags.len() as u32))
        .unwrap_or(0);
    let ml_score = ds.ml_entry(npi).map(|m| m.ml_score);

    if let Some(detail) = ds.provider_detail(npi) {
        let mut yearly: BTreeMap<String, f64> = BTreeMap::new();
        for point in &detail.monthly {
            if let Some(year) = point.month.get(..4) {
                *yearly.entry(year.to_string()).or_insert(0.0) += point.payments;
            }
        }
        let name = if detail.name.is_empty() {
            top.map(|t| t.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Provider {}", npi))
        } else {
            detail.name
        };
        return Some(ComparedProvider {
            npi: npi.to_string(),
            name,
            specialty: detail.specialty,
            city: detail.city,
            state: detail.state,
            total_paid: detail.total_paid,
            total_claims: detail.total_claims,
            total_benes: detail.total_benes,
            cost_per_claim: ratio(detail.total_paid, detail.total_claims),
            claims_per_bene: ratio(detail.total_claims, detail.total_benes),
            flag_count,
            ml_score,
            yearly,
        });
    }

    top.map(|t| ComparedProvider {
        npi: t.npi.clone(),
        name: if t.name.is_empty() { format!("Provider {}", npi) } else { t.name.clone() },
        specialty: t.specialty.clone(),
        city: t.city.clone(),
        state: t.state.clone(),
        total_paid: t.total_paid,
        total_claims: t.total_claims,
        total_benes: t.total_benes,
        cost_per_claim: ratio(t.total_paid, t.total_claims),
        claims_per_bene: ratio(t.total_claims, t.total_benes),
        flag_count,
        ml_score,
        yearly: BTreeMap::new(),
    })
}

/// Valid, distinct NPIs in request order, at most [`MAX_COMPARED`].
/// Each value may itself be a comma-separated list.
pub fn selected_npis<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut npis: Vec<String> = Vec::new();
    for npi in values.into_iter().flat_map(|v| v.split(',')).map(str::trim) {
        if npis.len() == MAX_COMPARED {
            break;
        }
        if is_valid_npi(npi) && !npis.iter().any(|n| n == npi) {
            npis.push(npi.to_string());
        }
    }
    npis
}

/// Top providers whose name contains the query or whose NPI equals it
pub fn compare_candidates<'a>(ds: &'a Dataset, query: &str) -> Vec<&'a TopProvider> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }
    let q = query.to_lowercase();
    ds.top_providers
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&q) || p.npi == query)
        .take(CANDIDATE_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_npis_dedup_and_cap() {
        assert_eq!(selected_npis(["1", "2,3", "1"]), vec!["1", "2", "3"]);
        assert_eq!(selected_npis(["1,1,2", " 2 ", "x", "4", "5"]), vec!["1", "2", "4"]);
        assert!(selected_npis(["../etc", ""]).is_empty());
    }

    #[test]
    fn test_candidates_need_two_chars() {
        let mut ds = Dataset::default();
        ds.top_providers = vec![
            TopProvider { npi: "1111111111".to_string(), name: "Acme Care".to_string(), ..Default::default() },
            TopProvider { npi: "2222222222".to_string(), name: "Best Care".to_string(), ..Default::default() },
        ];

        assert!(compare_candidates(&ds, "c").is_empty());
        assert_eq!(compare_candidates(&ds, "care").len(), 2);
        let by_npi = compare_candidates(&ds, "2222222222");
        assert_eq!(by_npi.len(), 1);
        assert_eq!(by_npi[0].name, "Best Care");
    }
}
