//! Display formatting for money, counts, dates and risk levels
//!
//! Every page formats numbers through these helpers so the same value
//! reads the same way everywhere on the site.

/// Format a dollar amount in compact form.
///
/// # Examples
///
/// ```
/// use om_common::format::format_money;
///
/// assert_eq!(format_money(1_234_567.0), "$1.2M");
/// assert_eq!(format_money(1_090_000_000_000.0), "$1.09T");
/// assert_eq!(format_money(45_678.0), "$46K");
/// assert_eq!(format_money(999.0), "$999");
/// ```
pub fn format_money(n: f64) -> String {
    if n >= 1e12 {
        format!("${:.2}T", n / 1e12)
    } else if n >= 1e9 {
        format!("${:.2}B", n / 1e9)
    } else if n >= 1e6 {
        format!("${:.1}M", n / 1e6)
    } else if n >= 1e3 {
        format!("${:.0}K", n / 1e3)
    } else {
        format!("${:.0}", n)
    }
}

/// Format a count in compact form (`227.1M`, `617K`, `950`).
pub fn format_number(n: f64) -> String {
    if n >= 1e9 {
        format!("{:.1}B", n / 1e9)
    } else if n >= 1e6 {
        format!("{:.1}M", n / 1e6)
    } else if n >= 1e3 {
        format!("{:.0}K", n / 1e3)
    } else if n.fract() == 0.0 {
        group_thousands(n, 0)
    } else {
        // Up to three fraction digits, trailing zeros dropped
        let s = group_thousands(n, 3);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Format a dollar amount with every digit (`$1,234,567`).
pub fn format_money_full(n: f64) -> String {
    format!("${}", group_thousands(n, 0))
}

/// Format a percentage with one decimal place.
pub fn format_percent(n: f64) -> String {
    format!("{:.1}%", n)
}

/// Format a cost per claim with cents; missing values render as an em dash.
pub fn format_cpc(n: Option<f64>) -> String {
    match n {
        Some(v) if !v.is_nan() => format!("${}", group_thousands(v, 2)),
        _ => "\u{2014}".to_string(),
    }
}

/// Convert an LEIE `YYYYMMDD` date into `MM/DD/YYYY`.
///
/// Values shorter than eight characters are returned unchanged.
///
/// ```
/// use om_common::format::format_excl_date;
///
/// assert_eq!(format_excl_date("20230115"), "01/15/2023");
/// assert_eq!(format_excl_date("2023"), "2023");
/// ```
pub fn format_excl_date(raw: &str) -> String {
    if raw.len() < 8 || !raw.is_ascii() {
        return raw.to_string();
    }
    format!("{}/{}/{}", &raw[4..6], &raw[6..8], &raw[0..4])
}

/// Title-case an upper-case registry name (`SMITH, JOHN A` -> `Smith, John A`).
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut boundary = true;
    for c in s.to_lowercase().chars() {
        if boundary && !c.is_whitespace() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        boundary = c.is_whitespace() || c == '-' || c == '/';
    }
    out
}

/// URL slug for a city name (`St. Louis` -> `st-louis`).
pub fn city_slug(city: &str) -> String {
    let mut slug = String::with_capacity(city.len());
    let mut in_gap = false;
    for c in city.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_gap = false;
        } else if !in_gap {
            slug.push('-');
            in_gap = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Shorten long provider names for dense rows.
pub fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        let head: String = name.chars().take(max).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// Risk level derived from the number of statistical flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Critical,
    High,
    Moderate,
    Low,
}

impl RiskLevel {
    pub fn from_flag_count(flag_count: u32) -> Self {
        match flag_count {
            0 => RiskLevel::Low,
            1 => RiskLevel::Moderate,
            2 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::High => "HIGH",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::Low => "LOW",
        }
    }

    /// CSS modifier used by the stylesheet (`risk-critical`, ...)
    pub fn css_class(self) -> &'static str {
        match self {
            RiskLevel::Critical => "risk-critical",
            RiskLevel::High => "risk-high",
            RiskLevel::Moderate => "risk-moderate",
            RiskLevel::Low => "risk-low",
        }
    }
}

/// CSS modifier for a benchmark decile label such as `Top 1%`.
pub fn decile_class(decile: &str) -> &'static str {
    match decile {
        "Top 1%" | "Top 5%" => "risk-critical",
        "Top 10%" => "risk-high",
        "Top 25%" => "risk-moderate",
        _ => "risk-ok",
    }
}

/// Render `n` with `decimals` fraction digits and comma thousands separators.
fn group_thousands(n: f64, decimals: usize) -> String {
    let raw = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let negative = n < 0.0 && raw.chars().any(|c| c != '0' && c != '.');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money_tiers() {
        assert_eq!(format_money(2_500_000_000_000.0), "$2.50T");
        assert_eq!(format_money(199_000_000_000.0), "$199.00B");
        assert_eq!(format_money(1_234_567.0), "$1.2M");
        assert_eq!(format_money(12_345.0), "$12K");
        assert_eq!(format_money(0.0), "$0");
    }

    #[test]
    fn test_format_money_is_stable() {
        let first = format_money(1_234_567.0);
        for _ in 0..10 {
            assert_eq!(format_money(1_234_567.0), first);
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(227_083_361.0), "227.1M");
        assert_eq!(format_number(617_503.0), "618K");
        assert_eq!(format_number(2_400_000_000.0), "2.4B");
        assert_eq!(format_number(950.0), "950");
        assert_eq!(format_number(12.5), "12.5");
    }

    #[test]
    fn test_format_money_full() {
        assert_eq!(format_money_full(1_234_567.4), "$1,234,567");
        assert_eq!(format_money_full(999.0), "$999");
        assert_eq!(format_money_full(1000.0), "$1,000");
    }

    #[test]
    fn test_format_cpc() {
        assert_eq!(format_cpc(Some(1611.5)), "$1,611.50");
        assert_eq!(format_cpc(Some(0.0)), "$0.00");
        assert_eq!(format_cpc(None), "\u{2014}");
        assert_eq!(format_cpc(Some(f64::NAN)), "\u{2014}");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(12.345), "12.3%");
        assert_eq!(format_percent(100.0), "100.0%");
    }

    #[test]
    fn test_format_excl_date() {
        assert_eq!(format_excl_date("20230115"), "01/15/2023");
        assert_eq!(format_excl_date("19991231"), "12/31/1999");
        assert_eq!(format_excl_date(""), "");
        assert_eq!(format_excl_date("2023011"), "2023011");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("SMITH, JOHN A"), "Smith, John A");
        assert_eq!(title_case("ACME HOME-CARE/LLC"), "Acme Home-Care/Llc");
    }

    #[test]
    fn test_city_slug() {
        assert_eq!(city_slug("Los Angeles"), "los-angeles");
        assert_eq!(city_slug("St. Louis"), "st-louis");
        assert_eq!(city_slug("Brooklyn!!"), "brooklyn");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Short", 35), "Short");
        let long = "A".repeat(40);
        assert_eq!(truncate_name(&long, 35), format!("{}...", "A".repeat(35)));
    }

    #[test]
    fn test_risk_level_thresholds() {
        assert_eq!(RiskLevel::from_flag_count(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_flag_count(1), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_flag_count(2), RiskLevel::High);
        assert_eq!(RiskLevel::from_flag_count(7), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_flag_count(3).label(), "CRITICAL");
    }
}
