//! OIG exclusion list (LEIE) documents

use serde::{Deserialize, Serialize};

use super::{nullable, string_or_number};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeieCount {
    /// State, year or specialty depending on the breakdown
    #[serde(alias = "state", alias = "year", alias = "specialty", deserialize_with = "string_or_number")]
    pub key: String,
    #[serde(default, deserialize_with = "nullable")]
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeieTypeCount {
    #[serde(rename = "type")]
    pub code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub desc: String,
    #[serde(default, deserialize_with = "nullable")]
    pub count: u64,
}

/// `leie-data.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeieData {
    #[serde(default, deserialize_with = "nullable")]
    pub by_state: Vec<LeieCount>,
    #[serde(default, deserialize_with = "nullable")]
    pub by_type: Vec<LeieTypeCount>,
    #[serde(default, deserialize_with = "nullable")]
    pub by_year: Vec<LeieCount>,
    #[serde(default, deserialize_with = "nullable")]
    pub by_specialty: Vec<LeieCount>,
}

/// Value of `leie-npi-index.json`, keyed by NPI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludedNpi {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub spec: String,
    #[serde(default, deserialize_with = "nullable")]
    pub reason: String,
    #[serde(default, deserialize_with = "nullable")]
    pub date: String,
}

/// Entry of `leie-recent.json` (single-letter keys keep the download small)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentExclusion {
    #[serde(rename = "n", default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(rename = "s", default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(rename = "sp", default, deserialize_with = "nullable")]
    pub specialty: String,
    #[serde(default, deserialize_with = "nullable")]
    pub npi: String,
    #[serde(rename = "r", default, deserialize_with = "nullable")]
    pub reason: String,
    #[serde(rename = "d", default, deserialize_with = "nullable")]
    pub date: String,
}

/// Entry of `leie-matched.json`: excluded providers found in billing data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedExclusion {
    #[serde(default, deserialize_with = "nullable")]
    pub last_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub first_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub mid_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub bus_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub specialty: String,
    #[serde(default, deserialize_with = "nullable")]
    pub npi: String,
    #[serde(default, deserialize_with = "nullable")]
    pub city: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub excl_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub excl_type_desc: String,
    #[serde(default, deserialize_with = "nullable")]
    pub excl_date: String,
}

impl MatchedExclusion {
    /// Business name when present, otherwise `Last, First, Middle`, title-cased
    pub fn display_name(&self) -> String {
        if !self.bus_name.is_empty() {
            return crate::format::title_case(&self.bus_name);
        }
        let parts: Vec<&str> = [&self.last_name, &self.first_name, &self.mid_name]
            .into_iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        crate::format::title_case(&parts.join(", "))
    }
}
