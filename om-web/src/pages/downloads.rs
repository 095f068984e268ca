//! Dataset download catalog

use axum::extract::State;
use axum::response::Html;
use serde::Serialize;

use om_common::dataset::{
    ALL_PROCEDURES_FILE, BENCHMARKS_FILE, LEGACY_WATCHLIST_FILE, LEIE_MATCHED_FILE, ML_SCORES_FILE,
    SMART_WATCHLIST_FILE, STATES_FILE, TOP_PROVIDERS_FILE, YEARLY_FILE,
};

use super::PageResult;
use crate::AppState;

struct CatalogEntry {
    title: &'static str,
    description: &'static str,
    file: &'static str,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        title: "Risk Watchlist (Statistical)",
        description: "Providers flagged by code-specific fraud detection tests, with flag details, demographics and total spending.",
        file: SMART_WATCHLIST_FILE,
    },
    CatalogEntry {
        title: "Risk Watchlist (Legacy)",
        description: "Providers flagged by the legacy tests: outlier spending, explosive growth, beneficiary stuffing and billing consistency anomalies.",
        file: LEGACY_WATCHLIST_FILE,
    },
    CatalogEntry {
        title: "ML Fraud Scores",
        description: "Fraud similarity scores from a model trained on OIG-excluded providers.",
        file: ML_SCORES_FILE,
    },
    CatalogEntry {
        title: "Top 1,000 Providers",
        description: "The highest-spending Medicaid providers ranked by total payments.",
        file: TOP_PROVIDERS_FILE,
    },
    CatalogEntry {
        title: "State Summaries",
        description: "Total payments, claims, beneficiaries and provider counts per state.",
        file: STATES_FILE,
    },
    CatalogEntry {
        title: "Procedure Codes",
        description: "Every HCPCS code billed to Medicaid with payments, claims and provider counts.",
        file: ALL_PROCEDURES_FILE,
    },
    CatalogEntry {
        title: "Code Benchmarks",
        description: "National cost-per-claim benchmarks with percentile distributions (p10 through p99).",
        file: BENCHMARKS_FILE,
    },
    CatalogEntry {
        title: "Yearly Trends",
        description: "Annual Medicaid spending totals, claims and provider counts.",
        file: YEARLY_FILE,
    },
    CatalogEntry {
        title: "Excluded Providers Still Billing",
        description: "OIG-excluded individuals and entities matched to NPIs in the billing data.",
        file: LEIE_MATCHED_FILE,
    },
];

#[derive(Serialize)]
struct Download {
    title: &'static str,
    description: &'static str,
    file: &'static str,
    href: String,
    /// Human-readable size, absent when the file is missing from the data directory
    size: Option<String>,
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[derive(Serialize)]
struct DownloadsPage {
    title: &'static str,
    datasets: Vec<Download>,
}

/// GET /downloads
pub async fn downloads(State(state): State<AppState>) -> PageResult {
    let dir = state.data.dir();
    let datasets = CATALOG
        .iter()
        .map(|entry| Download {
            title: entry.title,
            description: entry.description,
            file: entry.file,
            href: format!("/data/{}", entry.file),
            size: std::fs::metadata(dir.join(entry.file)).ok().map(|m| format_size(m.len())),
        })
        .collect();

    let page = DownloadsPage {
        title: "Download the Data",
        datasets,
    };
    Ok(Html(state.render("downloads.html", &page)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(6 * 1024 + 100), "6 KB");
        assert_eq!(format_size(1024 * 1024 * 27 / 10), "2.7 MB");
    }
}
