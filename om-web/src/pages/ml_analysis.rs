//! ML model methodology: headline metrics, feature ranking, score
//! distribution and the highest-scoring providers

use axum::extract::State;
use axum::response::Html;
use serde::Serialize;

use om_common::models::MlEntry;
use om_common::reference::feature_label;

use super::PageResult;
use crate::AppState;

const TOP_SCORED_LIMIT: usize = 10;
/// Narrowest feature bar, in percent
const MIN_FEATURE_BAR: f64 = 15.0;

/// Text tone for a 0-1 similarity score
fn score_tone(score: f64) -> &'static str {
    if score >= 0.8 {
        "tone-red"
    } else if score >= 0.6 {
        "tone-orange"
    } else if score >= 0.3 {
        "tone-amber"
    } else {
        "tone-green"
    }
}

#[derive(Serialize)]
struct FeatureBar<'a> {
    label: &'a str,
    bar: f64,
}

/// Features are listed most important first; bars shrink linearly by rank
fn feature_bars(features: &[String]) -> Vec<FeatureBar<'_>> {
    let step = 100.0 / features.len().max(1) as f64;
    features
        .iter()
        .enumerate()
        .map(|(i, f)| FeatureBar {
            label: feature_label(f),
            bar: (100.0 - i as f64 * step).max(MIN_FEATURE_BAR),
        })
        .collect()
}

#[derive(Serialize)]
struct DistributionRow {
    label: &'static str,
    desc: &'static str,
    percent: f64,
    tone: &'static str,
}

#[derive(Serialize)]
struct ScoredRow<'a> {
    #[serde(flatten)]
    entry: &'a MlEntry,
    display_name: String,
    tone: &'static str,
}

#[derive(Serialize)]
struct MlAnalysisPage<'a> {
    title: &'static str,
    model_auc: Option<f64>,
    total_providers: f64,
    /// Providers listed in the scores file
    listed: usize,
    features: Vec<FeatureBar<'a>>,
    distribution: Vec<DistributionRow>,
    top_scored: Vec<ScoredRow<'a>>,
}

/// GET /ml-analysis
pub async fn ml_analysis(State(state): State<AppState>) -> PageResult {
    let ds = &state.data;
    let ml = &ds.ml_scores;

    let distribution = ml
        .score_distribution
        .rows()
        .into_iter()
        .filter_map(|(label, value, desc)| {
            value.map(|v| DistributionRow {
                label,
                desc,
                percent: v * 100.0,
                tone: score_tone(v),
            })
        })
        .collect();

    let mut scored: Vec<&MlEntry> = ml.all().collect();
    scored.sort_by(|a, b| b.ml_score.total_cmp(&a.ml_score));
    let top_scored = scored
        .into_iter()
        .take(TOP_SCORED_LIMIT)
        .map(|entry| ScoredRow {
            display_name: ds
                .ml_name(entry)
                .map(str::to_string)
                .or_else(|| ds.top_provider(&entry.npi).map(|t| t.name.clone()))
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Provider {}", entry.npi)),
            tone: score_tone(entry.ml_score),
            entry,
        })
        .collect();

    let page = MlAnalysisPage {
        title: "ML Methodology",
        model_auc: ml.model_auc,
        total_providers: ml.total_providers,
        listed: ml.top_providers.len() + ml.small_provider_flags.len(),
        features: feature_bars(&ml.features_used),
        distribution,
        top_scored,
    };

    Ok(Html(state.render("ml_analysis.html", &page)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_tone_bands() {
        assert_eq!(score_tone(0.85), "tone-red");
        assert_eq!(score_tone(0.6), "tone-orange");
        assert_eq!(score_tone(0.3), "tone-amber");
        assert_eq!(score_tone(0.02), "tone-green");
    }

    #[test]
    fn test_feature_bars_shrink_with_floor() {
        let features: Vec<String> = (0..10).map(|i| format!("f{}", i)).collect();
        let bars = feature_bars(&features);
        assert_eq!(bars[0].bar, 100.0);
        assert_eq!(bars[1].bar, 90.0);
        assert_eq!(bars[9].bar, MIN_FEATURE_BAR);
        assert!(feature_bars(&[]).is_empty());
    }
}
