//! Watchlist documents: the code-specific ("smart") watchlist, the legacy
//! watchlist and the ML similarity scores

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{flag_list, nullable, string_or_number};

/// Entry of `smart-watchlist.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartEntry {
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
    pub flag_count: u32,
    #[serde(default, deserialize_with = "flag_list")]
    pub flags: Vec<String>,
    /// Per-flag evidence keyed by flag name
    #[serde(default, deserialize_with = "nullable")]
    pub flag_details: BTreeMap<String, Value>,
}

impl SmartEntry {
    /// Flag count, falling back to the length of the flag list
    pub fn effective_flag_count(&self) -> u32 {
        if self.flag_count > 0 {
            self.flag_count
        } else {
            self.flags.len() as u32
        }
    }
}

/// Entry of `expanded-watchlist.json` (nine legacy tests)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyEntry {
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
    #[serde(default, rename = "totalPaid", deserialize_with = "nullable")]
    pub total_paid: f64,
    #[serde(default, rename = "totalClaims", deserialize_with = "nullable")]
    pub total_claims: f64,
    #[serde(default, deserialize_with = "flag_list")]
    pub flags: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub flag_count: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub flag_details: BTreeMap<String, Value>,
}

impl LegacyEntry {
    pub fn effective_flag_count(&self) -> u32 {
        if self.flag_count > 0 {
            self.flag_count
        } else {
            self.flags.len() as u32
        }
    }
}

/// One scored provider in `ml-scores.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub npi: String,
    #[serde(default, alias = "score", deserialize_with = "nullable")]
    pub ml_score: f64,
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
}

/// Score percentiles over every scored provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreDistribution {
    #[serde(default)]
    pub p50: Option<f64>,
    #[serde(default)]
    pub p90: Option<f64>,
    #[serde(default)]
    pub p95: Option<f64>,
    #[serde(default)]
    pub p99: Option<f64>,
    #[serde(default)]
    pub p999: Option<f64>,
}

impl ScoreDistribution {
    /// `(label, value, who it describes)` in ascending percentile order
    pub fn rows(&self) -> [(&'static str, Option<f64>, &'static str); 5] {
        [
            ("Median (p50)", self.p50, "Typical provider"),
            ("p90", self.p90, "Top 10%"),
            ("p95", self.p95, "Top 5%"),
            ("p99", self.p99, "Top 1%"),
            ("p99.9", self.p999, "Top 0.1%"),
        ]
    }
}

/// `ml-scores.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlScores {
    #[serde(default, deserialize_with = "nullable")]
    pub model_type: String,
    /// Cross-validated area under the ROC curve
    #[serde(default)]
    pub model_auc: Option<f64>,
    /// Providers the model scored, not just the ones listed here
    #[serde(default, deserialize_with = "nullable")]
    pub total_providers: f64,
    /// Feature column names, most important first
    #[serde(default, deserialize_with = "nullable")]
    pub features_used: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub score_distribution: ScoreDistribution,
    #[serde(default, deserialize_with = "nullable")]
    pub top_providers: Vec<MlEntry>,
    #[serde(default, deserialize_with = "nullable")]
    pub small_provider_flags: Vec<MlEntry>,
}

impl MlScores {
    /// Large providers first, then the small-provider flags
    pub fn all(&self) -> impl Iterator<Item = &MlEntry> {
        self.top_providers.iter().chain(self.small_provider_flags.iter())
    }
}
