//! Investigation articles
//!
//! The catalog drives the insights index, article pages, related links, the
//! RSS feed and the sitemap. Order is publication order on the index page.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Article {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Suggested follow-up reading, most relevant first
    #[serde(skip)]
    pub related: &'static [&'static str],
}

/// Related links shown under an article
pub const RELATED_LIMIT: usize = 3;

macro_rules! article {
    ($slug:expr, $title:expr, $desc:expr, [$($rel:expr),*]) => {
        Article { slug: $slug, title: $title, description: $desc, related: &[$($rel),*] }
    };
    ($slug:expr, $title:expr, $desc:expr) => {
        article!($slug, $title, $desc, [])
    };
}

pub static ARTICLES: &[Article] = &[
    article!(
        "covid-vaccines",
        "The $1.5 Billion COVID Vaccine Machine",
        "How COVID vaccine administration became one of Medicaid's largest spending categories overnight.",
        ["covid-testing", "pandemic-profiteers", "spending-growth"]
    ),
    article!(
        "covid-testing",
        "The $4.7 Billion COVID Testing Bonanza",
        "Tracking the surge in COVID testing billing across Medicaid providers nationwide.",
        ["covid-vaccines", "pandemic-profiteers", "fastest-growing"]
    ),
    article!(
        "pandemic-profiteers",
        "Who Made the Most Money During COVID?",
        "Identifying the providers who saw the biggest billing increases during the pandemic.",
        ["covid-vaccines", "covid-testing", "spending-growth"]
    ),
    article!(
        "most-expensive",
        "The 50 Most Expensive Medicaid Procedures",
        "A look at the costliest procedure codes driving Medicaid spending.",
        ["specialty-drugs", "specialty-breakdown", "fastest-growing"]
    ),
    article!(
        "fastest-growing",
        "The Fastest-Growing Medicaid Spending Categories",
        "Which procedure categories saw the steepest spending increases from 2018 to 2024."
    ),
    article!(
        "top-doctors",
        "Where Are the Doctors? Individual vs Organizational Billing",
        "How organizational billing entities dominate Medicaid spending over individual physicians."
    ),
    article!(
        "specialty-breakdown",
        "Specialty Spending Breakdown: Where $1 Trillion Goes",
        "Breaking down Medicaid spending by provider specialty across 617,000+ providers.",
        ["most-expensive", "top-doctors", "spending-growth"]
    ),
    article!(
        "arizona-problem",
        "The Arizona Problem: New Clinics, Massive Billing",
        "Why Arizona stands out for new provider entities billing millions immediately."
    ),
    article!(
        "ny-home-care",
        "The New York Home Care Machine",
        "New York's home care spending dwarfs every other state \u{2014} here's the data."
    ),
    article!(
        "specialty-drugs",
        "Medicaid's Most Expensive Drugs",
        "The specialty drugs costing Medicaid billions per year."
    ),
    article!(
        "most-patients",
        "Most Patients: Who Bills for the Most Beneficiaries",
        "Which providers serve \u{2014} or bill for \u{2014} the most Medicaid beneficiaries.",
        ["billing-networks", "self-billers", "ny-home-care"]
    ),
    article!(
        "impossible-volume",
        "Impossible Billing Volume: 50+ Claims Per Day",
        "Providers submitting humanly impossible numbers of daily claims.",
        ["benford-analysis", "round-numbers", "highest-confidence"]
    ),
    article!(
        "benford-analysis",
        "When the Numbers Don't Add Up: Benford's Law",
        "Applying Benford's Law to detect anomalous billing digit patterns.",
        ["round-numbers", "smooth-billers", "change-points"]
    ),
    article!(
        "change-points",
        "Billing Behavior Shifts: When Providers Suddenly Change",
        "Detecting abrupt changes in provider billing patterns over time."
    ),
    article!(
        "billing-similarity",
        "Copycat Billers: Nearly Identical Patterns",
        "Finding providers with suspiciously similar billing profiles.",
        ["billing-networks", "smooth-billers", "round-numbers"]
    ),
    article!(
        "highest-confidence",
        "Multi-Method Detection: Highest Confidence Flags",
        "Providers flagged by multiple independent detection methods simultaneously."
    ),
    article!(
        "geographic-hotspots",
        "Geographic Risk Hotspots",
        "Mapping the states and regions with the highest concentrations of flagged providers.",
        ["city-hotspots", "arizona-problem", "ny-home-care"]
    ),
    article!(
        "billing-networks",
        "The Middlemen: Who Bills on Behalf of Others?",
        "Examining billing intermediaries and organizational billing patterns."
    ),
    article!(
        "round-numbers",
        "Round Number Billing",
        "Providers whose billing amounts cluster suspiciously around round numbers.",
        ["smooth-billers", "benford-analysis", "self-billers"]
    ),
    article!(
        "self-billers",
        "Solo Operators: Providers Billing $5M+ Themselves",
        "Individual providers billing millions without organizational backing.",
        ["billing-networks", "round-numbers", "dual-billing"]
    ),
    article!(
        "spending-growth",
        "From $109B to $199B: How Spending Nearly Doubled",
        "Tracing Medicaid spending growth from 2018 to 2024.",
        ["fastest-growing", "pandemic-profiteers", "most-expensive"]
    ),
    article!(
        "city-hotspots",
        "America's Medicaid Fraud Capitals",
        "The cities with the highest density of statistically flagged providers.",
        ["geographic-hotspots", "arizona-problem", "ny-home-care"]
    ),
    article!(
        "smooth-billers",
        "Suspiciously Smooth Billers",
        "Providers with unnaturally consistent billing patterns that defy normal variation.",
        ["round-numbers", "benford-analysis", "billing-similarity"]
    ),
    article!(
        "dual-billing",
        "Dual Billing Patterns",
        "Investigating providers exhibiting dual billing pattern anomalies.",
        ["billing-networks", "self-billers", "billing-similarity"]
    ),
    article!(
        "minnesota-fraud-capital",
        "Minnesota: America's Medicaid Fraud Capital",
        "Minnesota has 4x its population share of fraud-heavy exclusions, the $250M Feeding Our Future scandal, and housing fraud so bad they shut the entire program down.",
        ["arizona-problem", "ny-home-care", "pandemic-profiteers", "spending-growth", "city-hotspots"]
    ),
    article!(
        "cares-inc-exposed",
        "Exposed: Cares Inc.",
        "Deep dive into a flagged provider with unusual billing patterns.",
        ["pandemic-profiteers", "city-hotspots", "highest-confidence"]
    ),
    article!(
        "chicago-exposed",
        "Exposed: City of Chicago",
        "How the City of Chicago went from $23M to $240M in Medicaid billing \u{2014} a 942% increase.",
        ["pandemic-profiteers", "city-hotspots", "cares-inc-exposed"]
    ),
    article!(
        "srh-chn-exposed",
        "Exposed: SRH CHN Lead Health Home",
        "The $239M health home with 4 independent fraud flags.",
        ["arizona-problem", "cares-inc-exposed", "chicago-exposed"]
    ),
];

pub fn find(slug: &str) -> Option<&'static Article> {
    ARTICLES.iter().find(|a| a.slug == slug)
}

/// Catalog articles to suggest after `article`, excluding itself
pub fn related(article: &Article) -> Vec<&'static Article> {
    article
        .related
        .iter()
        .filter(|slug| **slug != article.slug)
        .filter_map(|slug| find(slug))
        .take(RELATED_LIMIT)
        .collect()
}
