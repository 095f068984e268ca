//! Procedure documents

use serde::{Deserialize, Serialize};

use super::{nullable, string_or_number};

/// Entry of `all-procedures.json` / `top-procedures.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureSummary {
    pub code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_paid: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_claims: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub provider_count: f64,
}

impl ProcedureSummary {
    pub fn cost_per_claim(&self) -> f64 {
        if self.total_claims > 0.0 {
            self.total_paid / self.total_claims
        } else {
            0.0
        }
    }
}

/// National cost-per-claim distribution for one code (`code-benchmarks.json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeBenchmark {
    #[serde(default, deserialize_with = "nullable")]
    pub provider_count: f64,
    #[serde(default)]
    pub avg_cost_per_claim: Option<f64>,
    #[serde(default)]
    pub median_cost_per_claim: Option<f64>,
    #[serde(default)]
    pub p10: Option<f64>,
    #[serde(default)]
    pub p25: Option<f64>,
    #[serde(default)]
    pub p75: Option<f64>,
    #[serde(default)]
    pub p90: Option<f64>,
    #[serde(default)]
    pub p95: Option<f64>,
    #[serde(default)]
    pub p99: Option<f64>,
}

impl CodeBenchmark {
    /// Percentile ladder as `(label, value)` pairs, lowest first
    pub fn percentiles(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("p10", self.p10),
            ("p25", self.p25),
            ("Median", self.median_cost_per_claim),
            ("p75", self.p75),
            ("p90", self.p90),
            ("p95", self.p95),
            ("p99", self.p99),
        ]
    }

    /// Scale for the distribution bars: the highest populated upper percentile
    pub fn scale_max(&self) -> f64 {
        self.p99
            .or(self.p95)
            .or(self.p90)
            .or(self.median_cost_per_claim)
            .unwrap_or(1.0)
    }
}

/// Provider row in a procedure detail file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureProvider {
    #[serde(deserialize_with = "string_or_number")]
    pub npi: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, alias = "payments", deserialize_with = "nullable")]
    pub total_paid: f64,
    #[serde(default, alias = "claims", deserialize_with = "nullable")]
    pub total_claims: f64,
    /// Percentile tier against the national benchmark (`p99`, `p90`, ...)
    #[serde(default, deserialize_with = "nullable")]
    pub tier: String,
    #[serde(default)]
    pub vs_median: Option<f64>,
}

/// `procedures/<code>.json` or `code-providers/<code>.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureDetail {
    #[serde(default, alias = "providers", deserialize_with = "nullable")]
    pub top_providers: Vec<ProcedureProvider>,
}

/// Display label for a code-provider tier
pub fn tier_label(tier: &str) -> &'static str {
    match tier {
        "p99" => "Top 1%",
        "p90" => "Top 10%",
        "p75" => "Above 75th",
        "above_median" => "Above Median",
        "below_median" => "Below Median",
        _ => "",
    }
}
