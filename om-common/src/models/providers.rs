//! Provider documents: the top-provider index, per-NPI detail files and
//! the activity timeline of flagged providers

use serde::{Deserialize, Serialize};

use super::{flag_list, nullable, string_or_number};

/// Entry of `top-providers-1000.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProvider {
    #[serde(deserialize_with = "string_or_number")]
    pub npi: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub specialty: String,
    #[serde(default, deserialize_with = "nullable")]
    pub city: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_paid: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_claims: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_benes: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub proc_count: f64,
    #[serde(default, deserialize_with = "flag_list")]
    pub flags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub flag_count: u32,
}

/// One month of billing in a provider detail file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: String,
    #[serde(default, deserialize_with = "nullable")]
    pub payments: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub claims: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub benes: f64,
}

/// Procedure billed by a provider, with the national benchmark when known
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProcedure {
    pub code: String,
    #[serde(default, alias = "paid", deserialize_with = "nullable")]
    pub payments: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub claims: f64,
    #[serde(default)]
    pub national_median_cpc: Option<f64>,
    #[serde(default)]
    pub provider_cpc: Option<f64>,
    #[serde(default)]
    pub cpc_ratio: Option<f64>,
    /// `Top 1%`, `Top 10%`, ... or empty
    #[serde(default, deserialize_with = "nullable")]
    pub decile: String,
}

impl ProviderProcedure {
    /// Provider cost per claim, computed when the file does not carry it
    pub fn cost_per_claim(&self) -> Option<f64> {
        self.provider_cpc
            .or_else(|| (self.claims > 0.0).then(|| self.payments / self.claims))
    }

    /// Ratio to the national median cost per claim
    pub fn ratio_to_median(&self) -> Option<f64> {
        if let Some(r) = self.cpc_ratio {
            return Some(r);
        }
        match (self.cost_per_claim(), self.national_median_cpc) {
            (Some(cpc), Some(median)) if median > 0.0 => Some(cpc / median),
            _ => None,
        }
    }
}

/// `providers/<npi>.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDetail {
    #[serde(deserialize_with = "string_or_number")]
    pub npi: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub specialty: String,
    #[serde(default, deserialize_with = "nullable")]
    pub city: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_paid: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_claims: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_benes: f64,
    #[serde(default)]
    pub growth_rate: Option<f64>,
    #[serde(default, deserialize_with = "flag_list")]
    pub flags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub monthly: Vec<MonthlyPoint>,
    /// Older detail files call this `topProcedures`
    #[serde(default, alias = "topProcedures", deserialize_with = "nullable")]
    pub procedures: Vec<ProviderProcedure>,
}

/// Entry of `provider-timelines.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderTimeline {
    #[serde(deserialize_with = "string_or_number")]
    pub npi: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    pub first_month: String,
    pub last_month: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_paid: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub flag_count: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub peak_month: String,
    #[serde(default, deserialize_with = "nullable")]
    pub peak_amount: f64,
}
