//! Search, lookup and listing filters
//!
//! Everything here is a case-insensitive substring match over records
//! already loaded in the [`Dataset`]. Results are always drawn from the
//! fixtures; nothing is synthesized.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::format::format_money;
use crate::models::{ProcedureSummary, ProviderTimeline, RecentExclusion, SmartEntry, Specialty, TopProvider};
use crate::params::lenient_page;
use crate::reference::{hcpcs_description, state_name, COMMON_CODES};
use crate::Dataset;

/// Queries shorter than this return nothing
pub const MIN_QUERY_LEN: usize = 2;
pub const GLOBAL_SEARCH_LIMIT: usize = 8;
pub const CHECK_FLAGGED_LIMIT: usize = 10;
pub const CHECK_UNFLAGGED_LIMIT: usize = 5;
pub const LOOKUP_LIMIT: usize = 20;

fn normalize(query: &str) -> Option<String> {
    let q = query.trim().to_lowercase();
    (q.chars().count() >= MIN_QUERY_LEN).then_some(q)
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

// ============================================================================
// Global search
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Provider,
    State,
    Procedure,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub kind: SearchKind,
    pub name: String,
    pub href: String,
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stat: Option<String>,
}

/// Header search box: providers, then states, then common procedure codes.
pub fn global_search(ds: &Dataset, query: &str) -> Vec<SearchResult> {
    let q = match normalize(query) {
        Some(q) => q,
        None => return Vec::new(),
    };
    let mut results = Vec::new();

    for p in &ds.top_providers {
        if results.len() >= GLOBAL_SEARCH_LIMIT {
            break;
        }
        if contains_ci(&p.name, &q) || p.npi.contains(&q) || contains_ci(&p.city, &q) {
            let location = if p.city.is_empty() {
                String::new()
            } else {
                format!("\u{00b7} {}, {}", p.city, p.state)
            };
            results.push(SearchResult {
                kind: SearchKind::Provider,
                name: if p.name.is_empty() { format!("NPI: {}", p.npi) } else { p.name.clone() },
                href: format!("/providers/{}", p.npi),
                sub: format!("{} {}", p.specialty, location).trim().to_string(),
                stat: Some(format_money(p.total_paid)),
            });
        }
    }

    for s in ds.states.iter().filter(|s| !s.is_unknown()) {
        let full = state_name(&s.state);
        if full.to_lowercase().contains(&q) || s.state.to_lowercase() == q {
            results.push(SearchResult {
                kind: SearchKind::State,
                name: full,
                href: format!("/states/{}", s.state),
                sub: format!("{} top providers", s.provider_count),
                stat: Some(format_money(s.total_payments)),
            });
        }
    }

    for (code, desc) in COMMON_CODES {
        if code.to_lowercase().contains(&q) || desc.to_lowercase().contains(&q) {
            results.push(SearchResult {
                kind: SearchKind::Procedure,
                name: code.to_string(),
                href: format!("/procedures/{}", code),
                sub: desc.to_string(),
                stat: None,
            });
        }
    }

    results.truncate(GLOBAL_SEARCH_LIMIT);
    results
}

// ============================================================================
// "Is my provider flagged?"
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub npi: String,
    pub name: String,
    pub specialty: String,
    pub city: String,
    pub state: String,
    pub total_paid: f64,
    pub flags: Vec<String>,
    pub flag_count: u32,
    pub ml_score: Option<f64>,
    /// On a watchlist or scored by the ML model
    pub flagged: bool,
    /// Flagged only by the ML model
    pub ml_only: bool,
}

/// A query of 5-10 digits is treated as an NPI fragment
pub fn looks_like_npi(q: &str) -> bool {
    (5..=10).contains(&q.len()) && q.bytes().all(|b| b.is_ascii_digit())
}

fn flagged_candidates(ds: &Dataset) -> Vec<CheckResult> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    for w in ds.smart_watchlist.iter().filter(|w| !w.name.is_empty()) {
        if !seen.insert(&w.npi) {
            continue;
        }
        out.push(CheckResult {
            npi: w.npi.clone(),
            name: w.name.clone(),
            specialty: w.specialty.clone(),
            city: w.city.clone(),
            state: w.state.clone(),
            total_paid: w.total_paid,
            flags: w.flags.clone(),
            flag_count: w.effective_flag_count(),
            ml_score: ds.ml_entry(&w.npi).map(|m| m.ml_score),
            flagged: true,
            ml_only: false,
        });
    }

    for m in ds.ml_scores.all() {
        if !seen.insert(&m.npi) {
            continue;
        }
        out.push(CheckResult {
            npi: m.npi.clone(),
            name: ds.ml_name(m).unwrap_or_default().to_string(),
            specialty: m.specialty.clone(),
            city: m.city.clone(),
            state: m.state.clone(),
            total_paid: m.total_paid,
            flags: Vec::new(),
            flag_count: 0,
            ml_score: Some(m.ml_score),
            flagged: true,
            ml_only: true,
        });
    }

    out
}

/// Flagged matches first (name, NPI fragment or city), then unflagged top
/// providers matching on name or NPI fragment.
pub fn check_provider(ds: &Dataset, query: &str) -> Vec<CheckResult> {
    let q = match normalize(query) {
        Some(q) => q,
        None => return Vec::new(),
    };
    let is_npi = looks_like_npi(&q);

    let candidates = flagged_candidates(ds);
    let flagged_npis: HashSet<&str> = candidates.iter().map(|c| c.npi.as_str()).collect();

    let flagged = candidates
        .iter()
        .filter(|c| {
            (!c.name.is_empty() && contains_ci(&c.name, &q))
                || (is_npi && c.npi.contains(&q))
                || (!c.city.is_empty() && contains_ci(&c.city, &q))
        })
        .take(CHECK_FLAGGED_LIMIT)
        .cloned();

    let clean = ds
        .top_providers
        .iter()
        .filter(|p| !flagged_npis.contains(p.npi.as_str()))
        .filter(|p| contains_ci(&p.name, &q) || (is_npi && p.npi.contains(&q)))
        .take(CHECK_UNFLAGGED_LIMIT)
        .map(|p| CheckResult {
            npi: p.npi.clone(),
            name: p.name.clone(),
            specialty: p.specialty.clone(),
            city: p.city.clone(),
            state: p.state.clone(),
            total_paid: p.total_paid,
            flags: Vec::new(),
            flag_count: 0,
            ml_score: None,
            flagged: false,
            ml_only: false,
        });

    flagged.chain(clean).collect()
}

// ============================================================================
// Provider lookup
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LookupMatch {
    pub npi: String,
    pub name: String,
    pub city: String,
    pub state: String,
    pub total_paid: f64,
    pub flagged: bool,
}

#[derive(Debug, Clone)]
pub enum LookupOutcome {
    /// Nothing typed yet
    Empty,
    /// An exact 10-digit NPI: link straight to the profile
    Npi(String),
    Matches(Vec<LookupMatch>),
}

pub fn lookup_providers(ds: &Dataset, query: &str) -> LookupOutcome {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return LookupOutcome::Empty;
    }
    if trimmed.len() == 10 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return LookupOutcome::Npi(trimmed.to_string());
    }

    let q = trimmed.to_lowercase();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut all: Vec<LookupMatch> = Vec::new();

    for p in &ds.top_providers {
        if seen.insert(&p.npi) {
            all.push(LookupMatch {
                npi: p.npi.clone(),
                name: p.name.clone(),
                city: p.city.clone(),
                state: p.state.clone(),
                total_paid: p.total_paid,
                flagged: ds.smart_entry(&p.npi).is_some(),
            });
        }
    }
    for w in &ds.smart_watchlist {
        if seen.insert(&w.npi) {
            all.push(LookupMatch {
                npi: w.npi.clone(),
                name: w.name.clone(),
                city: w.city.clone(),
                state: w.state.clone(),
                total_paid: w.total_paid,
                flagged: true,
            });
        }
    }

    let mut matches: Vec<LookupMatch> = all.into_iter().filter(|m| contains_ci(&m.name, &q)).collect();
    matches.sort_by(|a, b| b.total_paid.total_cmp(&a.total_paid));
    matches.truncate(LOOKUP_LIMIT);
    LookupOutcome::Matches(matches)
}

/// Highest-spending smart watchlist entries, shown under the lookup box
pub fn recently_flagged(ds: &Dataset, limit: usize) -> Vec<&SmartEntry> {
    let mut entries: Vec<&SmartEntry> = ds.smart_watchlist.iter().collect();
    entries.sort_by(|a, b| b.total_paid.total_cmp(&a.total_paid));
    entries.truncate(limit);
    entries
}

// ============================================================================
// Listing filters
// ============================================================================

fn term(q: &Option<String>) -> Option<String> {
    q.as_deref().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty())
}

fn selected(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty() && *s != "all")
}

/// `/providers` query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderQuery {
    pub q: Option<String>,
    pub state: Option<String>,
    /// `flagged` or `clean`
    pub flag: Option<String>,
    /// `spending` (default), `name`, `claims` or `flags`
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<usize>,
}

impl ProviderQuery {
    pub fn apply<'a>(&self, providers: &'a [TopProvider]) -> Vec<&'a TopProvider> {
        let q = term(&self.q);
        let state = selected(&self.state);
        let flag = selected(&self.flag);

        let mut result: Vec<&TopProvider> = providers
            .iter()
            .filter(|p| {
                q.as_deref().map_or(true, |q| {
                    contains_ci(&p.name, q)
                        || p.npi.contains(q)
                        || contains_ci(&p.specialty, q)
                        || contains_ci(&p.city, q)
                })
            })
            .filter(|p| state.map_or(true, |s| p.state == s))
            .filter(|p| match flag {
                Some("flagged") => !p.flags.is_empty(),
                Some("clean") => p.flags.is_empty(),
                _ => true,
            })
            .collect();

        match self.sort.as_deref() {
            Some("name") => result.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
            Some("claims") => result.sort_by(|a, b| b.total_claims.total_cmp(&a.total_claims)),
            Some("flags") => result.sort_by(|a, b| b.flags.len().cmp(&a.flags.len())),
            // upstream order is already spending desc
            _ => {}
        }
        result
    }
}

/// `/procedures` query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcedureQuery {
    pub q: Option<String>,
    /// `spending` (default), `code`, `claims` or `cpc`
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<usize>,
}

impl ProcedureQuery {
    pub fn apply<'a>(&self, procedures: &'a [ProcedureSummary]) -> Vec<&'a ProcedureSummary> {
        let q = term(&self.q);
        let mut result: Vec<&ProcedureSummary> = procedures
            .iter()
            .filter(|p| {
                q.as_deref().map_or(true, |q| {
                    p.code.to_lowercase().contains(q) || contains_ci(hcpcs_description(&p.code), q)
                })
            })
            .collect();

        match self.sort.as_deref() {
            Some("code") => result.sort_by(|a, b| a.code.cmp(&b.code)),
            Some("claims") => result.sort_by(|a, b| b.total_claims.total_cmp(&a.total_claims)),
            Some("cpc") => result.sort_by(|a, b| b.cost_per_claim().total_cmp(&a.cost_per_claim())),
            _ => {}
        }
        result
    }
}

/// `/specialties` query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecialtyQuery {
    pub q: Option<String>,
    /// `spending` (default), `providers` or `name`
    pub sort: Option<String>,
}

impl SpecialtyQuery {
    pub fn apply<'a>(&self, specialties: &'a [Specialty]) -> Vec<&'a Specialty> {
        let q = term(&self.q);
        let mut result: Vec<&Specialty> = specialties
            .iter()
            .filter(|s| q.as_deref().map_or(true, |q| contains_ci(&s.name, q)))
            .collect();

        match self.sort.as_deref() {
            Some("name") => result.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
            Some("providers") => result.sort_by(|a, b| b.provider_count.total_cmp(&a.provider_count)),
            _ => result.sort_by(|a, b| b.total_paid.total_cmp(&a.total_paid)),
        }
        result
    }
}

/// `/exclusions` query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExclusionQuery {
    /// Search over the recent exclusions table
    pub q: Option<String>,
    /// NPI to check against the exclusion index
    pub npi: Option<String>,
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<usize>,
}

impl ExclusionQuery {
    pub fn filter_recent<'a>(&self, recent: &'a [RecentExclusion]) -> Vec<&'a RecentExclusion> {
        let q = term(&self.q);
        recent
            .iter()
            .filter(|r| {
                q.as_deref().map_or(true, |q| {
                    contains_ci(&r.name, q)
                        || contains_ci(&r.state, q)
                        || contains_ci(&r.specialty, q)
                        || r.npi.contains(q)
                })
            })
            .collect()
    }
}

// ============================================================================
// Timeline
// ============================================================================

pub const TIMELINE_FIRST_YEAR: i32 = 2018;
/// 2018-01 through 2024-12
pub const TIMELINE_MONTHS: i32 = 84;

/// Months since 2018-01 for a `YYYY-MM` string
///
/// ```
/// use om_common::search::month_index;
///
/// assert_eq!(month_index("2018-01"), Some(0));
/// assert_eq!(month_index("2024-12"), Some(83));
/// assert_eq!(month_index("garbage"), None);
/// ```
pub fn month_index(month: &str) -> Option<i32> {
    let (y, m) = month.trim().split_once('-')?;
    let y: i32 = y.parse().ok()?;
    let m: i32 = m.get(..2).unwrap_or(m).parse().ok()?;
    if !(1..=12).contains(&m) {
        return None;
    }
    Some((y - TIMELINE_FIRST_YEAR) * 12 + (m - 1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineSort {
    /// Flag count desc, then spending
    #[default]
    Flags,
    Spending,
    /// Earliest first month
    First,
}

impl TimelineSort {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("spending") => TimelineSort::Spending,
            Some("first") => TimelineSort::First,
            _ => TimelineSort::Flags,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineSort::Flags => "flags",
            TimelineSort::Spending => "spending",
            TimelineSort::First => "first",
        }
    }
}

pub fn sort_timelines(timelines: &[ProviderTimeline], sort: TimelineSort) -> Vec<&ProviderTimeline> {
    let mut v: Vec<&ProviderTimeline> = timelines.iter().collect();
    match sort {
        TimelineSort::First => v.sort_by(|a, b| a.first_month.cmp(&b.first_month)),
        TimelineSort::Spending => v.sort_by(|a, b| b.total_paid.total_cmp(&a.total_paid)),
        TimelineSort::Flags => v.sort_by(|a, b| {
            b.flag_count
                .cmp(&a.flag_count)
                .then_with(|| b.total_paid.total_cmp(&a.total_paid))
        }),
    }
    v
}

/// Horizontal geometry of one activity bar, in percent of the track
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineBar {
    pub left: f64,
    pub width: f64,
    /// Peak marker position within the bar, kept off the edges
    pub peak: f64,
}

impl TimelineBar {
    pub fn of(t: &ProviderTimeline) -> Option<Self> {
        let start = month_index(&t.first_month)?;
        let end = month_index(&t.last_month)?.max(start);
        let span = (end - start + 1) as f64;
        let peak = month_index(&t.peak_month).unwrap_or(start);
        let total = TIMELINE_MONTHS as f64;

        Some(Self {
            left: (start as f64 / total * 100.0).clamp(0.0, 100.0),
            width: (span / total * 100.0).max(0.5),
            peak: ((peak - start) as f64 / span * 100.0).clamp(5.0, 95.0),
        })
    }
}

/// Year gridline offsets across the timeline track
pub fn year_ticks() -> Vec<(i32, f64)> {
    (0..TIMELINE_MONTHS / 12)
        .map(|i| (TIMELINE_FIRST_YEAR + i, (i * 12) as f64 / TIMELINE_MONTHS as f64 * 100.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_npi() {
        assert!(looks_like_npi("12345"));
        assert!(looks_like_npi("1234567890"));
        assert!(!looks_like_npi("1234"));
        assert!(!looks_like_npi("12345678901"));
        assert!(!looks_like_npi("12a45"));
    }

    #[test]
    fn test_short_queries_return_nothing() {
        let ds = Dataset::default();
        assert!(global_search(&ds, "a").is_empty());
        assert!(check_provider(&ds, " b ").is_empty());
    }

    #[test]
    fn test_lookup_exact_npi() {
        let ds = Dataset::default();
        match lookup_providers(&ds, " 1234567890 ") {
            LookupOutcome::Npi(npi) => assert_eq!(npi, "1234567890"),
            other => panic!("expected NPI redirect, got {:?}", other),
        }
        assert!(matches!(lookup_providers(&ds, ""), LookupOutcome::Empty));
    }

    #[test]
    fn test_timeline_bar_geometry() {
        let t = ProviderTimeline {
            first_month: "2018-01".into(),
            last_month: "2018-12".into(),
            peak_month: "2018-12".into(),
            ..Default::default()
        };
        let bar = TimelineBar::of(&t).unwrap();
        assert_eq!(bar.left, 0.0);
        assert!((bar.width - 12.0 / 84.0 * 100.0).abs() < 1e-9);
        assert!(bar.peak <= 95.0);
    }

    #[test]
    fn test_year_ticks() {
        let ticks = year_ticks();
        assert_eq!(ticks.len(), 7);
        assert_eq!(ticks[0], (2018, 0.0));
        assert_eq!(ticks[6].0, 2024);
    }

    #[test]
    fn test_timeline_sort_parse() {
        assert_eq!(TimelineSort::parse(None), TimelineSort::Flags);
        assert_eq!(TimelineSort::parse(Some("first")), TimelineSort::First);
        assert_eq!(TimelineSort::parse(Some("bogus")), TimelineSort::Flags);
    }
}
