//! Fixture models
//!
//! One type per JSON document produced by the upstream pipeline. Field
//! names follow the upstream files (mostly camelCase, snake_case for the
//! state documents). Anything that does not identify a record is optional
//! and tolerates `null`.

use serde::{Deserialize, Deserializer};

pub mod exclusions;
pub mod geography;
pub mod procedures;
pub mod providers;
pub mod site;
pub mod watchlist;

pub use exclusions::{ExcludedNpi, LeieCount, LeieData, LeieTypeCount, MatchedExclusion, RecentExclusion};
pub use geography::{
    CityHotspot, StateDetail, StateFlagCount, StateProcedure, StateProvider, StateSummary,
    StateSummaryTotals, YearlyTrend,
};
pub use procedures::{CodeBenchmark, ProcedureDetail, ProcedureProvider, ProcedureSummary};
pub use providers::{MonthlyPoint, ProviderDetail, ProviderProcedure, ProviderTimeline, TopProvider};
pub use site::{SiteStats, Specialty, SpecialtyDetail, SpecialtyProvider};
pub use watchlist::{LegacyEntry, MlEntry, MlScores, ScoreDistribution, SmartEntry};

/// Treat `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Identifiers arrive as strings from some generators and as integers from others.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(u64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(f)) => format!("{:.0}", f),
        None => String::new(),
    })
}

/// Flags arrive either as a list or as one pipe-separated string.
pub(crate) fn flag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Pipe(String),
        List(Vec<String>),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Pipe(s)) => crate::reference::parse_flags(&[s]),
        Some(Raw::List(items)) => crate::reference::parse_flags(&items),
        None => Vec::new(),
    })
}
