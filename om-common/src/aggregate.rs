//! Light aggregation over loaded records: grouping, shares and bucket counts

use std::collections::HashMap;

use serde::Serialize;

/// Count of records sharing a key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
}

/// Category with its share of the total, in percent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub key: String,
    pub count: u64,
    pub percent: f64,
}

/// Count records by key in one pass, sorted by count desc then key asc.
///
/// # Examples
///
/// ```
/// use om_common::aggregate::group_count;
///
/// let states = ["CA", "NY", "CA"];
/// let counts = group_count(states.iter(), |s| s.to_string());
/// assert_eq!(counts[0].key, "CA");
/// assert_eq!(counts[0].count, 2);
/// ```
pub fn group_count<I, T, F>(records: I, key: F) -> Vec<GroupCount>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> String,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    for record in records {
        *counts.entry(key(&record)).or_insert(0) += 1;
    }

    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    groups
}

/// Percentage of the total for each group. A zero total yields zero shares.
pub fn shares(counts: &[GroupCount]) -> Vec<Share> {
    let total: u64 = counts.iter().map(|c| c.count).sum();
    counts
        .iter()
        .map(|c| Share {
            key: c.key.clone(),
            count: c.count,
            percent: percent_of(c.count as f64, total as f64),
        })
        .collect()
}

/// `part / total * 100`, or 0 when the total is not positive
pub fn percent_of(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

/// Bar width in percent relative to the largest value, clamped to 0-100
pub fn bar_percent(value: f64, max: f64) -> f64 {
    if max <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / max * 100.0).clamp(0.0, 100.0)
}

/// Watchlist entries bucketed by flag count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlagBuckets {
    /// Three or more flags
    pub critical: usize,
    pub high: usize,
    pub moderate: usize,
    pub unflagged: usize,
}

impl FlagBuckets {
    pub fn from_counts(counts: impl IntoIterator<Item = u32>) -> Self {
        let mut buckets = Self::default();
        for n in counts {
            match n {
                0 => buckets.unflagged += 1,
                1 => buckets.moderate += 1,
                2 => buckets.high += 1,
                _ => buckets.critical += 1,
            }
        }
        buckets
    }

    /// Entries carrying at least one flag
    pub fn flagged(&self) -> usize {
        self.critical + self.high + self.moderate
    }

    pub fn total(&self) -> usize {
        self.flagged() + self.unflagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_count_orders_by_count_then_key() {
        let recs = ["b", "a", "c", "a", "b", "d"];
        let groups = group_count(recs.iter(), |s| s.to_string());
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let recs = ["TX", "TX", "CA", "NY", "NY", "NY", "FL"];
        let groups = group_count(recs.iter(), |s| s.to_string());
        let total: f64 = shares(&groups).iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_shares_of_empty_total_are_zero() {
        let groups = vec![GroupCount { key: "x".into(), count: 0 }];
        assert_eq!(shares(&groups)[0].percent, 0.0);
        assert!(shares(&[]).is_empty());
    }

    #[test]
    fn test_bar_percent_clamps() {
        assert_eq!(bar_percent(50.0, 200.0), 25.0);
        assert_eq!(bar_percent(300.0, 200.0), 100.0);
        assert_eq!(bar_percent(1.0, 0.0), 0.0);
        assert_eq!(bar_percent(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn test_flag_buckets() {
        let b = FlagBuckets::from_counts([0, 1, 1, 2, 3, 5]);
        assert_eq!(b.critical, 2);
        assert_eq!(b.high, 1);
        assert_eq!(b.moderate, 2);
        assert_eq!(b.unflagged, 1);
        assert_eq!(b.total(), 6);
        assert_eq!(b.flagged(), 5);
    }
}
