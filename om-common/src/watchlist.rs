//! Unified risk watchlist
//!
//! Merges the code-specific watchlist, the legacy watchlist and the ML
//! similarity scores into one list with a single risk tier per provider.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregate::{group_count, GroupCount};
use crate::format::{format_cpc, format_money};
use crate::params::lenient_page;
use crate::reference::hcpcs_description;
use crate::Dataset;

/// Risk tier combining statistical flag count and ML score.
/// Variants are declared in display order, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum UnifiedTier {
    Critical,
    High,
    Elevated,
    #[serde(rename = "ML Flag")]
    MlFlag,
    Low,
}

impl UnifiedTier {
    pub fn label(&self) -> &'static str {
        match self {
            UnifiedTier::Critical => "Critical",
            UnifiedTier::High => "High",
            UnifiedTier::Elevated => "Elevated",
            UnifiedTier::MlFlag => "ML Flag",
            UnifiedTier::Low => "Low",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            UnifiedTier::Critical => "tier-critical",
            UnifiedTier::High => "tier-high",
            UnifiedTier::Elevated => "tier-elevated",
            UnifiedTier::MlFlag => "tier-ml",
            UnifiedTier::Low => "tier-low",
        }
    }

    /// Parse the `risk=` query value
    pub fn from_filter(s: &str) -> Option<Self> {
        match s {
            "critical" => Some(UnifiedTier::Critical),
            "high" => Some(UnifiedTier::High),
            "elevated" => Some(UnifiedTier::Elevated),
            "ml" => Some(UnifiedTier::MlFlag),
            _ => None,
        }
    }
}

/// Tier for a flag count and an optional ML score (missing counts as 0).
///
/// # Examples
///
/// ```
/// use om_common::watchlist::{unified_tier, UnifiedTier};
///
/// assert_eq!(unified_tier(3, None), UnifiedTier::Critical);
/// assert_eq!(unified_tier(2, Some(0.75)), UnifiedTier::Critical);
/// assert_eq!(unified_tier(0, Some(0.55)), UnifiedTier::MlFlag);
/// ```
pub fn unified_tier(flag_count: u32, ml_score: Option<f64>) -> UnifiedTier {
    let ml = ml_score.unwrap_or(0.0);
    if flag_count >= 3 || (flag_count >= 2 && ml >= 0.7) {
        UnifiedTier::Critical
    } else if flag_count == 2 || (flag_count >= 1 && ml >= 0.7) || ml >= 0.8 {
        UnifiedTier::High
    } else if flag_count == 1 || ml >= 0.6 {
        UnifiedTier::Elevated
    } else if flag_count == 0 && ml >= 0.5 {
        UnifiedTier::MlFlag
    } else {
        UnifiedTier::Low
    }
}

/// Which list a merged entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Smart,
    Legacy,
    Ml,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchlistEntry {
    pub npi: String,
    pub name: String,
    pub specialty: String,
    pub city: String,
    pub state: String,
    pub total_paid: f64,
    pub total_claims: f64,
    pub flag_count: u32,
    pub flags: Vec<String>,
    pub flag_details: BTreeMap<String, Value>,
    pub source: Source,
    pub ml_score: Option<f64>,
    pub tier: UnifiedTier,
}

fn first_nonempty<'a>(candidates: impl IntoIterator<Item = &'a str>) -> String {
    candidates
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn first_positive(candidates: impl IntoIterator<Item = f64>) -> f64 {
    candidates.into_iter().find(|v| *v > 0.0).unwrap_or(0.0)
}

/// Merge the three sources, in tier order then spending desc.
///
/// Smart entries come first; legacy entries are added when not yet seen and
/// they carry a name or spending; ML-only providers need a score of 0.5.
pub fn merge_watchlist(ds: &Dataset) -> Vec<WatchlistEntry> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut result = Vec::new();
    let ml_score = |npi: &str| ds.ml_entry(npi).map(|m| m.ml_score);

    for w in &ds.smart_watchlist {
        seen.insert(&w.npi);
        let provider = ds.top_provider(&w.npi);
        let legacy = ds.legacy_entry(&w.npi);
        let score = ml_score(&w.npi);
        let flag_count = w.effective_flag_count();
        let name = first_nonempty([
            w.name.as_str(),
            provider.map_or("", |p| p.name.as_str()),
            legacy.map_or("", |l| l.name.as_str()),
        ]);
        result.push(WatchlistEntry {
            npi: w.npi.clone(),
            name: if name.is_empty() { format!("NPI: {}", w.npi) } else { name },
            specialty: first_nonempty([w.specialty.as_str(), provider.map_or("", |p| p.specialty.as_str())]),
            city: first_nonempty([w.city.as_str(), provider.map_or("", |p| p.city.as_str())]),
            state: first_nonempty([w.state.as_str(), provider.map_or("", |p| p.state.as_str())]),
            total_paid: first_positive([w.total_paid, provider.map_or(0.0, |p| p.total_paid)]),
            total_claims: provider.map_or(0.0, |p| p.total_claims),
            flag_count,
            flags: w.flags.clone(),
            flag_details: w.flag_details.clone(),
            source: Source::Smart,
            ml_score: score,
            tier: unified_tier(flag_count, score),
        });
    }

    for w in &ds.legacy_watchlist {
        if !seen.insert(&w.npi) {
            continue;
        }
        let provider = ds.top_provider(&w.npi);
        let name = first_nonempty([w.name.as_str(), provider.map_or("", |p| p.name.as_str())]);
        let provider_paid = provider.map_or(0.0, |p| p.total_paid);
        if name.is_empty() && w.total_paid <= 0.0 && provider_paid <= 0.0 {
            continue;
        }
        let score = ml_score(&w.npi);
        let flag_count = w.effective_flag_count();
        result.push(WatchlistEntry {
            npi: w.npi.clone(),
            name: if name.is_empty() { format!("NPI: {}", w.npi) } else { name },
            specialty: first_nonempty([w.specialty.as_str(), provider.map_or("", |p| p.specialty.as_str())]),
            city: first_nonempty([w.city.as_str(), provider.map_or("", |p| p.city.as_str())]),
            state: first_nonempty([w.state.as_str(), provider.map_or("", |p| p.state.as_str())]),
            total_paid: first_positive([w.total_paid, provider_paid]),
            total_claims: first_positive([w.total_claims, provider.map_or(0.0, |p| p.total_claims)]),
            flag_count,
            flags: w.flags.clone(),
            flag_details: w.flag_details.clone(),
            source: Source::Legacy,
            ml_score: score,
            tier: unified_tier(flag_count, score),
        });
    }

    for m in ds.ml_scores.all() {
        if m.ml_score < 0.5 || !seen.insert(&m.npi) {
            continue;
        }
        let provider = ds.top_provider(&m.npi);
        let name = first_nonempty([
            ds.ml_name(m).unwrap_or(""),
            provider.map_or("", |p| p.name.as_str()),
        ]);
        result.push(WatchlistEntry {
            npi: m.npi.clone(),
            name: if name.is_empty() { format!("NPI: {}", m.npi) } else { name },
            specialty: first_nonempty([m.specialty.as_str(), provider.map_or("", |p| p.specialty.as_str())]),
            city: first_nonempty([m.city.as_str(), provider.map_or("", |p| p.city.as_str())]),
            state: first_nonempty([m.state.as_str(), provider.map_or("", |p| p.state.as_str())]),
            total_paid: first_positive([m.total_paid, provider.map_or(0.0, |p| p.total_paid)]),
            total_claims: first_positive([m.total_claims, provider.map_or(0.0, |p| p.total_claims)]),
            flag_count: 0,
            flags: Vec::new(),
            flag_details: BTreeMap::new(),
            source: Source::Ml,
            ml_score: Some(m.ml_score),
            tier: UnifiedTier::MlFlag,
        });
    }

    sort_entries(&mut result, WatchlistSort::Risk);
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchlistTab {
    #[default]
    All,
    /// Entries with at least one statistical flag
    Stat,
    /// ML-only entries
    Ml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchlistSort {
    #[default]
    Risk,
    Flags,
    Spending,
    Name,
    Ml,
}

impl WatchlistSort {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "risk" => Some(Self::Risk),
            "flags" => Some(Self::Flags),
            "spending" => Some(Self::Spending),
            "name" => Some(Self::Name),
            "ml" => Some(Self::Ml),
            _ => None,
        }
    }
}

pub fn sort_entries(entries: &mut [WatchlistEntry], sort: WatchlistSort) {
    let by_paid = |a: &WatchlistEntry, b: &WatchlistEntry| b.total_paid.total_cmp(&a.total_paid);
    match sort {
        WatchlistSort::Risk => entries.sort_by(|a, b| a.tier.cmp(&b.tier).then_with(|| by_paid(a, b))),
        WatchlistSort::Flags => {
            entries.sort_by(|a, b| b.flag_count.cmp(&a.flag_count).then_with(|| by_paid(a, b)))
        }
        WatchlistSort::Spending => entries.sort_by(by_paid),
        WatchlistSort::Name => entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        WatchlistSort::Ml => entries.sort_by(|a, b| {
            b.ml_score.unwrap_or(-1.0).total_cmp(&a.ml_score.unwrap_or(-1.0))
        }),
    }
}

/// Watchlist filters as they arrive in the query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchlistQuery {
    pub tab: Option<String>,
    pub risk: Option<String>,
    pub flag: Option<String>,
    pub state: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<usize>,
}

fn active(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty() && *s != "all")
}

impl WatchlistQuery {
    pub fn tab(&self) -> WatchlistTab {
        match active(&self.tab) {
            Some("stat") => WatchlistTab::Stat,
            Some("ml") => WatchlistTab::Ml,
            _ => WatchlistTab::All,
        }
    }

    /// Requested sort; the ML tab defaults to score order
    pub fn sort(&self) -> WatchlistSort {
        self.sort
            .as_deref()
            .and_then(WatchlistSort::parse)
            .unwrap_or(if self.tab() == WatchlistTab::Ml {
                WatchlistSort::Ml
            } else {
                WatchlistSort::Risk
            })
    }

    /// Entries of the selected tab, before any other filter
    pub fn tab_entries<'a>(&self, entries: &'a [WatchlistEntry]) -> Vec<&'a WatchlistEntry> {
        entries
            .iter()
            .filter(|e| match self.tab() {
                WatchlistTab::All => true,
                WatchlistTab::Stat => e.flag_count > 0,
                WatchlistTab::Ml => e.source == Source::Ml,
            })
            .collect()
    }

    /// Filter and sort the merged list
    pub fn apply(&self, entries: &[WatchlistEntry]) -> Vec<WatchlistEntry> {
        let risk = active(&self.risk).and_then(UnifiedTier::from_filter);
        let flag = active(&self.flag);
        let state = active(&self.state);
        let q = self.q.as_deref().map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());

        let mut result: Vec<WatchlistEntry> = self
            .tab_entries(entries)
            .into_iter()
            .filter(|e| risk.map_or(true, |t| e.tier == t))
            .filter(|e| flag.map_or(true, |f| e.flags.iter().any(|x| x == f)))
            .filter(|e| state.map_or(true, |s| e.state == s))
            .filter(|e| {
                q.as_deref().map_or(true, |q| {
                    e.name.to_lowercase().contains(q)
                        || e.npi.contains(q)
                        || e.state.to_lowercase().contains(q)
                        || e.city.to_lowercase().contains(q)
                })
            })
            .cloned()
            .collect();

        sort_entries(&mut result, self.sort());
        result
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TierCounts {
    pub critical: usize,
    pub high: usize,
    pub elevated: usize,
    pub ml_flag: usize,
    pub low: usize,
}

impl TierCounts {
    pub fn of(entries: &[WatchlistEntry]) -> Self {
        let mut c = Self::default();
        for e in entries {
            match e.tier {
                UnifiedTier::Critical => c.critical += 1,
                UnifiedTier::High => c.high += 1,
                UnifiedTier::Elevated => c.elevated += 1,
                UnifiedTier::MlFlag => c.ml_flag += 1,
                UnifiedTier::Low => c.low += 1,
            }
        }
        c
    }
}

/// How often each flag occurs across entries, most common first
pub fn flag_counts<'a>(entries: impl IntoIterator<Item = &'a WatchlistEntry>) -> Vec<GroupCount> {
    group_count(entries.into_iter().flat_map(|e| e.flags.iter()), |f| f.to_string())
}

fn num(details: &Value, key: &str) -> Option<f64> {
    details.get(key).and_then(Value::as_f64)
}

fn text(details: &Value, key: &str) -> String {
    match details.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn fixed(v: Option<f64>, decimals: usize) -> String {
    v.map(|v| format!("{:.*}", decimals, v)).unwrap_or_default()
}

fn money(v: Option<f64>) -> String {
    format_money(v.unwrap_or(0.0))
}

fn first_month(details: &Value) -> String {
    let month = text(details, "firstMonth");
    if month.is_empty() {
        text(details, "firstYear")
    } else {
        month
    }
}

fn outlier_codes(details: &Value) -> Vec<(String, Option<f64>)> {
    details
        .get("topOutlierCodes")
        .and_then(Value::as_array)
        .map(|codes| codes.iter().map(|c| (text(c, "code"), num(c, "ratio"))).collect())
        .unwrap_or_default()
}

/// One-line evidence summary shown in the watchlist table.
/// Only the four code-specific tests carry structured evidence.
pub fn flag_detail_summary(flag: &str, details: &Value) -> String {
    if details.is_null() {
        return String::new();
    }
    match flag {
        "code_specific_outlier" => {
            let code = text(details, "code");
            let desc = match hcpcs_description(&code) {
                "" => String::new(),
                d => format!(" ({})", d),
            };
            format!(
                "{}{}: {}/claim vs {} median ({}\u{00d7})",
                code,
                desc,
                format_cpc(num(details, "providerCpc")),
                format_cpc(num(details, "nationalMedianCpc")),
                fixed(num(details, "ratio"), 1)
            )
        }
        "billing_swing" => format!(
            "{} ({}) \u{2192} {} ({}), {}% change",
            money(num(details, "fromPay")),
            text(details, "fromYear"),
            money(num(details, "toPay")),
            text(details, "toYear"),
            fixed(num(details, "pctChange"), 0)
        ),
        "massive_new_entrant" => format!(
            "First appeared {}, {} total, {}/mo",
            first_month(details),
            money(num(details, "totalPaid")),
            money(num(details, "avgMonthlyBilling"))
        ),
        "rate_outlier_multi_code" => {
            let codes = outlier_codes(details)
                .into_iter()
                .take(3)
                .map(|(code, ratio)| format!("{} ({}\u{00d7})", code, fixed(ratio, 1)))
                .collect::<Vec<_>>()
                .join(", ");
            let above = text(details, "codesAboveP90");
            if codes.is_empty() {
                format!("{} codes above p90", above)
            } else {
                format!("{} codes above p90: {}", above, codes)
            }
        }
        _ => String::new(),
    }
}

/// Full-sentence explanation of a flag for the provider profile
pub fn flag_explanation(flag: &str, details: &Value) -> String {
    if details.is_null() {
        return String::new();
    }
    match flag {
        "code_specific_outlier" => {
            let code = text(details, "code");
            let label = match hcpcs_description(&code) {
                "" => code,
                desc => format!("{} ({})", code, desc),
            };
            format!(
                "This provider bills {} per claim for {}, which is {}\u{00d7} the national median of {}.",
                format_cpc(num(details, "providerCpc")),
                label,
                fixed(num(details, "ratio"), 1),
                format_cpc(num(details, "nationalMedianCpc"))
            )
        }
        "billing_swing" => format!(
            "Billing changed from {} ({}) to {} ({}), a {}% swing with {} absolute change.",
            money(num(details, "fromPay")),
            text(details, "fromYear"),
            money(num(details, "toPay")),
            text(details, "toYear"),
            fixed(num(details, "pctChange"), 0),
            money(num(details, "absChange"))
        ),
        "massive_new_entrant" => format!(
            "First appeared in {} and has already billed {}, averaging {}/month across {} months.",
            first_month(details),
            money(num(details, "totalPaid")),
            money(num(details, "avgMonthlyBilling")),
            text(details, "monthsActive")
        ),
        "rate_outlier_multi_code" => {
            let count = num(details, "codesAboveP90").unwrap_or(0.0);
            let examples = outlier_codes(details)
                .into_iter()
                .take(2)
                .map(|(code, ratio)| format!("{} at {}\u{00d7} median", code, fixed(ratio, 1)))
                .collect::<Vec<_>>()
                .join(", ");
            if examples.is_empty() {
                format!("Billing above the 90th percentile for {} procedure codes.", count)
            } else {
                format!("Billing above the 90th percentile for {} procedure codes: {}.", count, examples)
            }
        }
        // legacy tests
        "outlier_spending" => num(details, "total_paid")
            .filter(|v| *v != 0.0)
            .map(|v| format!("Total spending of {} is significantly above median.", format_money(v)))
            .unwrap_or_default(),
        "unusual_cost_per_claim" | "unusual_cost" => num(details, "cost_per_claim")
            .filter(|v| *v != 0.0)
            .map(|v| format!("Average cost per claim of {} is much higher than peers.", format_cpc(Some(v))))
            .unwrap_or_default(),
        "explosive_growth" => num(details, "growth_pct")
            .filter(|v| *v != 0.0)
            .map(|v| {
                format!(
                    "Billing grew {:.0}% from {} to {}.",
                    v,
                    text(details, "from_year"),
                    text(details, "to_year")
                )
            })
            .unwrap_or_default(),
        "instant_high_volume" => num(details, "first_year_payments")
            .filter(|v| *v != 0.0)
            .map(|v| {
                format!(
                    "Billed {} in first year ({}).",
                    format_money(v),
                    text(details, "first_year")
                )
            })
            .unwrap_or_default(),
        "procedure_concentration" => {
            let code = text(details, "primary_code");
            if code.is_empty() {
                String::new()
            } else {
                format!(
                    "Bills primarily for code {} ({} unique codes).",
                    code,
                    text(details, "unique_codes")
                )
            }
        }
        "billing_consistency" => num(details, "cv")
            .map(|cv| format!("Monthly billing coefficient of variation: {:.4} (near-zero variation).", cv))
            .unwrap_or_default(),
        "beneficiary_stuffing" | "bene_stuffing" => num(details, "claims_per_bene")
            .filter(|v| *v != 0.0)
            .map(|v| format!("{:.1} claims per beneficiary.", v))
            .unwrap_or_default(),
        "extreme_beneficiary_stuffing" => num(details, "claims_per_bene")
            .filter(|v| *v != 0.0)
            .map(|v| format!("{:.1} claims per beneficiary, far exceeding normal patterns.", v))
            .unwrap_or_default(),
        "spending_spike" => num(details, "growth_pct")
            .filter(|v| *v != 0.0)
            .map(|v| format!("Month-over-month increase of {:.0}%.", v))
            .unwrap_or_default(),
        _ => String::new(),
    }
}
