//! Query string helpers shared by the listing filters

use serde::{Deserialize, Deserializer};

/// Page number from the query string; anything that is not a plain
/// non-negative integer reads as absent.
///
/// Use with `#[serde(default, deserialize_with = "lenient_page")]`.
pub fn lenient_page<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}
