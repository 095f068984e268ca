//! Headline statistics and the specialty index

use serde::{Deserialize, Serialize};

use super::{nullable, string_or_number};

/// `stats.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
    #[serde(default, deserialize_with = "nullable")]
    pub records: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_paid: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub providers: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub procedures: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub min_month: String,
    #[serde(default, deserialize_with = "nullable")]
    pub max_month: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_claims: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_benes: f64,
}

/// Provider row in a specialty document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyProvider {
    #[serde(deserialize_with = "string_or_number")]
    pub npi: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_paid: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_claims: f64,
    #[serde(default, alias = "totalBenes", deserialize_with = "nullable")]
    pub total_beneficiaries: f64,
}

/// Entry of `specialties.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialty {
    pub slug: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub provider_count: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_paid: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub top_providers: Vec<SpecialtyProvider>,
}

/// `specialties/<slug>.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyDetail {
    #[serde(default, deserialize_with = "nullable")]
    pub slug: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub provider_count: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_paid: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub providers: Vec<SpecialtyProvider>,
}
