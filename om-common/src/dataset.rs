//! In-memory dataset
//!
//! The list and index fixtures are read once at startup into [`Dataset`].
//! Per-entity detail files (providers, states, procedures, specialties) are
//! large and numerous, so they stay on disk and are read on demand.
//!
//! Reads are best-effort: a missing fixture degrades to an empty default and
//! a missing detail file to `None`. Malformed list fixtures are an error,
//! since a page built from half a file would silently lie.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::format::city_slug;
use crate::models::*;
use crate::{Error, Result};

pub const STATS_FILE: &str = "stats.json";
pub const TOP_PROVIDERS_FILE: &str = "top-providers-1000.json";
pub const SMART_WATCHLIST_FILE: &str = "smart-watchlist.json";
pub const LEGACY_WATCHLIST_FILE: &str = "expanded-watchlist.json";
pub const ML_SCORES_FILE: &str = "ml-scores.json";
pub const ML_NAMES_FILE: &str = "ml-provider-names.json";
pub const ALL_PROCEDURES_FILE: &str = "all-procedures.json";
pub const TOP_PROCEDURES_FILE: &str = "top-procedures.json";
pub const BENCHMARKS_FILE: &str = "code-benchmarks.json";
pub const STATES_FILE: &str = "states-summary.json";
pub const STATE_FLAGS_FILE: &str = "state-flag-counts.json";
pub const YEARLY_FILE: &str = "yearly-trends.json";
pub const HOTSPOTS_FILE: &str = "city-fraud-hotspots.json";
pub const TIMELINES_FILE: &str = "provider-timelines.json";
pub const SPECIALTIES_FILE: &str = "specialties.json";
pub const LEIE_DATA_FILE: &str = "leie-data.json";
pub const LEIE_INDEX_FILE: &str = "leie-npi-index.json";
pub const LEIE_RECENT_FILE: &str = "leie-recent.json";
pub const LEIE_MATCHED_FILE: &str = "leie-matched.json";

/// NPI: 1-10 ASCII digits
pub fn is_valid_npi(s: &str) -> bool {
    !s.is_empty() && s.len() <= 10 && s.bytes().all(|b| b.is_ascii_digit())
}

/// State code: exactly two ASCII letters
pub fn is_valid_state_code(s: &str) -> bool {
    s.len() == 2 && s.bytes().all(|b| b.is_ascii_alphabetic())
}

/// HCPCS code: ASCII alphanumeric, at most 7 characters
pub fn is_valid_hcpcs(s: &str) -> bool {
    !s.is_empty() && s.len() <= 7 && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Slug: lowercase letters, digits and dashes
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 128
        && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Everything the pages read, loaded once and shared read-only
#[derive(Debug, Default)]
pub struct Dataset {
    dir: PathBuf,
    pub stats: SiteStats,
    pub top_providers: Vec<TopProvider>,
    pub smart_watchlist: Vec<SmartEntry>,
    pub legacy_watchlist: Vec<LegacyEntry>,
    pub ml_scores: MlScores,
    pub ml_names: HashMap<String, String>,
    pub procedures: Vec<ProcedureSummary>,
    pub top_procedures: Vec<ProcedureSummary>,
    pub benchmarks: HashMap<String, CodeBenchmark>,
    pub states: Vec<StateSummary>,
    pub state_flags: Vec<StateFlagCount>,
    pub yearly: Vec<YearlyTrend>,
    pub hotspots: Vec<CityHotspot>,
    pub timelines: Vec<ProviderTimeline>,
    pub specialties: Vec<Specialty>,
    pub leie: LeieData,
    pub leie_index: HashMap<String, ExcludedNpi>,
    pub leie_recent: Vec<RecentExclusion>,
    pub leie_matched: Vec<MatchedExclusion>,

    top_by_npi: HashMap<String, usize>,
    smart_by_npi: HashMap<String, usize>,
    legacy_by_npi: HashMap<String, usize>,
    ml_by_npi: HashMap<String, usize>,
}

impl Dataset {
    /// Load every list and index fixture under `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            warn!("Data directory {} does not exist, serving empty dataset", dir.display());
        }

        let mut ds = Dataset {
            stats: read_fixture(&dir, STATS_FILE)?,
            top_providers: read_fixture(&dir, TOP_PROVIDERS_FILE)?,
            smart_watchlist: read_fixture(&dir, SMART_WATCHLIST_FILE)?,
            legacy_watchlist: read_fixture(&dir, LEGACY_WATCHLIST_FILE)?,
            ml_scores: read_fixture(&dir, ML_SCORES_FILE)?,
            ml_names: read_fixture(&dir, ML_NAMES_FILE)?,
            procedures: read_fixture(&dir, ALL_PROCEDURES_FILE)?,
            top_procedures: read_fixture(&dir, TOP_PROCEDURES_FILE)?,
            benchmarks: read_fixture(&dir, BENCHMARKS_FILE)?,
            states: read_fixture(&dir, STATES_FILE)?,
            state_flags: read_fixture(&dir, STATE_FLAGS_FILE)?,
            yearly: read_fixture(&dir, YEARLY_FILE)?,
            hotspots: read_fixture(&dir, HOTSPOTS_FILE)?,
            timelines: read_fixture(&dir, TIMELINES_FILE)?,
            specialties: read_fixture(&dir, SPECIALTIES_FILE)?,
            leie: read_fixture(&dir, LEIE_DATA_FILE)?,
            leie_index: read_fixture(&dir, LEIE_INDEX_FILE)?,
            leie_recent: read_fixture(&dir, LEIE_RECENT_FILE)?,
            leie_matched: read_fixture(&dir, LEIE_MATCHED_FILE)?,
            dir,
            ..Default::default()
        };

        // Older pipelines emitted all procedures only as the top list
        if ds.procedures.is_empty() && !ds.top_procedures.is_empty() {
            ds.procedures = ds.top_procedures.clone();
        }

        ds.top_by_npi = index_by(&ds.top_providers, |p| &p.npi);
        ds.smart_by_npi = index_by(&ds.smart_watchlist, |e| &e.npi);
        ds.legacy_by_npi = index_by(&ds.legacy_watchlist, |e| &e.npi);
        ds.ml_by_npi = index_by(&ds.ml_scores.top_providers, |e| &e.npi);
        let offset = ds.ml_scores.top_providers.len();
        for (i, e) in ds.ml_scores.small_provider_flags.iter().enumerate() {
            ds.ml_by_npi.entry(e.npi.clone()).or_insert(offset + i);
        }

        info!(
            "Loaded dataset from {}: {} top providers, {} watchlist entries, {} procedures, {} states",
            ds.dir.display(),
            ds.top_providers.len(),
            ds.smart_watchlist.len(),
            ds.procedures.len(),
            ds.states.len()
        );

        Ok(ds)
    }

    /// Directory the dataset was loaded from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn top_provider(&self, npi: &str) -> Option<&TopProvider> {
        self.top_by_npi.get(npi).map(|&i| &self.top_providers[i])
    }

    pub fn smart_entry(&self, npi: &str) -> Option<&SmartEntry> {
        self.smart_by_npi.get(npi).map(|&i| &self.smart_watchlist[i])
    }

    pub fn legacy_entry(&self, npi: &str) -> Option<&LegacyEntry> {
        self.legacy_by_npi.get(npi).map(|&i| &self.legacy_watchlist[i])
    }

    pub fn ml_entry(&self, npi: &str) -> Option<&MlEntry> {
        let i = *self.ml_by_npi.get(npi)?;
        let top = &self.ml_scores.top_providers;
        if i < top.len() {
            Some(&top[i])
        } else {
            self.ml_scores.small_provider_flags.get(i - top.len())
        }
    }

    /// Display name for an ML-scored provider: its own name, then the name index
    pub fn ml_name<'a>(&'a self, entry: &'a MlEntry) -> Option<&'a str> {
        if !entry.name.is_empty() {
            return Some(&entry.name);
        }
        self.ml_names
            .get(&entry.npi)
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    pub fn procedure(&self, code: &str) -> Option<&ProcedureSummary> {
        self.procedures.iter().find(|p| p.code.eq_ignore_ascii_case(code))
    }

    pub fn benchmark(&self, code: &str) -> Option<&CodeBenchmark> {
        self.benchmarks
            .get(code)
            .or_else(|| self.benchmarks.get(&code.to_ascii_uppercase()))
    }

    pub fn state_summary(&self, code: &str) -> Option<&StateSummary> {
        self.states.iter().find(|s| s.state.eq_ignore_ascii_case(code))
    }

    /// Flagged-provider count for a state from the state flag counts
    pub fn state_flag_count(&self, code: &str) -> u32 {
        self.state_flags
            .iter()
            .find(|s| s.state.eq_ignore_ascii_case(code))
            .map(|s| s.total)
            .unwrap_or(0)
    }

    /// Hotspot by its city-state slug; a bare city slug resolves to the
    /// first city of that name
    pub fn hotspot_by_slug(&self, slug: &str) -> Option<&CityHotspot> {
        self.hotspots
            .iter()
            .find(|c| c.slug() == slug)
            .or_else(|| self.hotspots.iter().find(|c| city_slug(&c.city) == slug))
    }

    pub fn specialty(&self, slug: &str) -> Option<&Specialty> {
        self.specialties.iter().find(|s| s.slug == slug)
    }

    pub fn excluded_npi(&self, npi: &str) -> Option<&ExcludedNpi> {
        self.leie_index.get(npi)
    }

    /// Sum of `totalPaid` over all procedures, used for share-of-total figures
    pub fn procedures_total_paid(&self) -> f64 {
        self.procedures.iter().map(|p| p.total_paid).sum()
    }

    pub fn provider_detail(&self, npi: &str) -> Option<ProviderDetail> {
        if !is_valid_npi(npi) {
            return None;
        }
        read_detail(&self.dir.join("providers").join(format!("{}.json", npi)))
    }

    pub fn state_detail(&self, code: &str) -> Option<StateDetail> {
        if !is_valid_state_code(code) {
            return None;
        }
        read_detail(&self.dir.join("states").join(format!("{}.json", code.to_ascii_uppercase())))
    }

    /// Procedure provider list: `procedures/<code>.json`, else `code-providers/<code>.json`
    pub fn procedure_detail(&self, code: &str) -> Option<ProcedureDetail> {
        if !is_valid_hcpcs(code) {
            return None;
        }
        let file = format!("{}.json", code);
        read_detail(&self.dir.join("procedures").join(&file))
            .or_else(|| read_detail(&self.dir.join("code-providers").join(&file)))
    }

    pub fn specialty_detail(&self, slug: &str) -> Option<SpecialtyDetail> {
        if !is_valid_slug(slug) {
            return None;
        }
        read_detail(&self.dir.join("specialties").join(format!("{}.json", slug)))
    }

    /// NPIs with a detail file, sorted; the top-provider NPIs when the
    /// `providers/` directory is absent
    pub fn provider_detail_npis(&self) -> Vec<String> {
        let entries = match fs::read_dir(self.dir.join("providers")) {
            Ok(entries) => entries,
            Err(_) => return self.top_providers.iter().map(|p| p.npi.clone()).collect(),
        };

        let mut npis: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let stem = name.strip_suffix(".json")?;
                is_valid_npi(stem).then(|| stem.to_string())
            })
            .collect();
        npis.sort();
        npis
    }
}

fn index_by<T>(items: &[T], key: impl Fn(&T) -> &String) -> HashMap<String, usize> {
    let mut map = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        // first occurrence wins
        map.entry(key(item).clone()).or_insert(i);
    }
    map
}

/// Read a list/index fixture. Missing files yield the default value.
fn read_fixture<T>(dir: &Path, name: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let path = dir.join(name);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Fixture {} not found, using empty default", path.display());
            return Ok(T::default());
        }
        Err(e) => return Err(Error::Io(e)),
    };

    serde_json::from_slice(&bytes).map_err(|source| Error::Json { path, source })
}

/// Read a detail file. Any failure yields `None`.
fn read_detail<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Detail file {} unavailable: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Ignoring malformed detail file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(is_valid_npi("1234567890"));
        assert!(is_valid_npi("12345"));
        assert!(!is_valid_npi(""));
        assert!(!is_valid_npi("12345678901"));
        assert!(!is_valid_npi("../etc"));

        assert!(is_valid_state_code("CA"));
        assert!(is_valid_state_code("ny"));
        assert!(!is_valid_state_code("C1"));
        assert!(!is_valid_state_code("CAL"));

        assert!(is_valid_hcpcs("T1019"));
        assert!(is_valid_hcpcs("99213"));
        assert!(!is_valid_hcpcs("T10/19"));

        assert!(is_valid_slug("family-medicine"));
        assert!(!is_valid_slug("Family"));
        assert!(!is_valid_slug("a/../b"));
    }

    #[test]
    fn test_invalid_identifiers_never_read() {
        let ds = Dataset::default();
        assert!(ds.provider_detail("../secret").is_none());
        assert!(ds.state_detail("../x").is_none());
        assert!(ds.procedure_detail("..").is_none());
        assert!(ds.specialty_detail("../../etc").is_none());
    }

    #[test]
    fn test_hotspot_slugs_disambiguate_same_city_name() {
        let city = |name: &str, state: &str| CityHotspot {
            city: name.to_string(),
            state: state.to_string(),
            ..Default::default()
        };
        let ds = Dataset {
            hotspots: vec![city("Springfield", "IL"), city("Springfield", "MO")],
            ..Default::default()
        };

        assert_eq!(ds.hotspot_by_slug("springfield-il").unwrap().state, "IL");
        assert_eq!(ds.hotspot_by_slug("springfield-mo").unwrap().state, "MO");
        // bare city slug still resolves
        assert_eq!(ds.hotspot_by_slug("springfield").unwrap().state, "IL");
        assert!(ds.hotspot_by_slug("springfield-tx").is_none());
    }

    #[test]
    fn test_ml_name_prefers_entry_then_name_index() {
        let mut ds = Dataset::default();
        ds.ml_names.insert("1669284400".to_string(), "SUNSHINE TRANSPORT".to_string());
        ds.ml_names.insert("1558392011".to_string(), String::new());

        let named = MlEntry { npi: "1".to_string(), name: "OWN NAME".to_string(), ..Default::default() };
        let indexed = MlEntry { npi: "1669284400".to_string(), ..Default::default() };
        let blank = MlEntry { npi: "1558392011".to_string(), ..Default::default() };

        // the result borrows from both the dataset and the entry
        let names: Vec<Option<&str>> = [&named, &indexed, &blank].into_iter().map(|e| ds.ml_name(e)).collect();
        assert_eq!(names, vec![Some("OWN NAME"), Some("SUNSHINE TRANSPORT"), None]);
    }

    #[test]
    fn test_index_by_keeps_first_occurrence() {
        let items = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let idx = index_by(&items, |s| s);
        assert_eq!(idx.get("a"), Some(&0));
        assert_eq!(idx.get("b"), Some(&1));
    }
}
