//! State, yearly and city documents

use serde::{Deserialize, Serialize};

use super::{nullable, string_or_number};
use crate::format::city_slug;

/// Entry of `states-summary.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSummary {
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total_payments: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_claims: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_benes: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub provider_count: f64,
}

impl StateSummary {
    /// Rows that do not correspond to a real state
    pub fn is_unknown(&self) -> bool {
        self.state.eq_ignore_ascii_case("unknown")
    }
}

/// Provider row inside `states/<code>.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateProvider {
    #[serde(deserialize_with = "string_or_number")]
    pub npi: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub city: String,
    #[serde(default, deserialize_with = "nullable")]
    pub specialty: String,
    #[serde(default, alias = "totalPaid", deserialize_with = "nullable")]
    pub total_payments: f64,
    #[serde(default, alias = "totalClaims", deserialize_with = "nullable")]
    pub total_claims: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateProcedure {
    pub code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub payments: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub claims: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub provider_count: f64,
}

/// Entry of `yearly-trends.json`, also used inside state detail files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YearlyTrend {
    #[serde(deserialize_with = "string_or_number")]
    pub year: String,
    #[serde(default, alias = "total_payments", deserialize_with = "nullable")]
    pub payments: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub claims: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub providers: f64,
}

/// `states/<code>.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDetail {
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default)]
    pub summary: Option<StateSummaryTotals>,
    #[serde(default, deserialize_with = "nullable")]
    pub top_providers: Vec<StateProvider>,
    #[serde(default, deserialize_with = "nullable")]
    pub top_procedures: Vec<StateProcedure>,
    #[serde(default, deserialize_with = "nullable")]
    pub yearly_trends: Vec<YearlyTrend>,
}

/// The `summary` block of a state detail file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSummaryTotals {
    #[serde(default, deserialize_with = "nullable")]
    pub total_payments: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_claims: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub total_benes: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub provider_count: f64,
}

impl From<&StateSummary> for StateSummaryTotals {
    fn from(s: &StateSummary) -> Self {
        Self {
            total_payments: s.total_payments,
            total_claims: s.total_claims,
            total_benes: s.total_benes,
            provider_count: s.provider_count,
        }
    }
}

/// Entry of `state-flag-counts.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFlagCount {
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub total: u32,
}

/// Entry of `city-fraud-hotspots.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityHotspot {
    pub city: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub flagged_count: u32,
    #[serde(default, deserialize_with = "nullable")]
    pub flagged_spending: f64,
}

impl CityHotspot {
    /// URL slug from city and state (`Springfield`, `IL` -> `springfield-il`)
    pub fn slug(&self) -> String {
        if self.state.is_empty() {
            city_slug(&self.city)
        } else {
            city_slug(&format!("{} {}", self.city, self.state))
        }
    }
}
