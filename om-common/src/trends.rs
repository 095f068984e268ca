//! Year-over-year figures for the national spending trend

use serde::Serialize;

use crate::aggregate::bar_percent;
use crate::models::YearlyTrend;

/// One year of the trend with its change from the year before
#[derive(Debug, Clone, Serialize)]
pub struct YearGrowth<'a> {
    #[serde(flatten)]
    pub trend: &'a YearlyTrend,
    /// Percent change in payments; `None` for the first year or a zero base
    pub payment_growth: Option<f64>,
    pub claim_growth: Option<f64>,
    /// Average payments per provider
    pub per_provider: Option<f64>,
    pub payment_bar: f64,
    pub claim_bar: f64,
}

fn growth(prev: f64, current: f64) -> Option<f64> {
    (prev > 0.0).then(|| (current - prev) / prev * 100.0)
}

/// Trend rows in file order, with growth against the previous row and bar
/// widths scaled to the largest year.
pub fn year_over_year(trends: &[YearlyTrend]) -> Vec<YearGrowth<'_>> {
    let max_payments = trends.iter().map(|y| y.payments).fold(0.0, f64::max);
    let max_claims = trends.iter().map(|y| y.claims).fold(0.0, f64::max);

    trends
        .iter()
        .enumerate()
        .map(|(i, trend)| {
            let prev = i.checked_sub(1).map(|p| &trends[p]);
            YearGrowth {
                trend,
                payment_growth: prev.and_then(|p| growth(p.payments, trend.payments)),
                claim_growth: prev.and_then(|p| growth(p.claims, trend.claims)),
                per_provider: (trend.providers > 0.0).then(|| trend.payments / trend.providers),
                payment_bar: bar_percent(trend.payments, max_payments),
                claim_bar: bar_percent(trend.claims, max_claims),
            }
        })
        .collect()
}

/// Percent change in payments from the first year to the last
pub fn total_growth(trends: &[YearlyTrend]) -> Option<f64> {
    match trends {
        [first, .., last] => growth(first.payments, last.payments),
        _ => None,
    }
}

/// Year with the highest payments; the earliest wins a tie
pub fn peak_year(trends: &[YearlyTrend]) -> Option<&YearlyTrend> {
    trends.iter().fold(None, |best: Option<&YearlyTrend>, y| match best {
        Some(b) if b.payments >= y.payments => Some(b),
        _ => Some(y),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(y: &str, payments: f64, claims: f64, providers: f64) -> YearlyTrend {
        YearlyTrend {
            year: y.to_string(),
            payments,
            claims,
            providers,
        }
    }

    #[test]
    fn test_year_over_year_growth() {
        let trends = vec![year("2018", 100.0, 10.0, 4.0), year("2019", 150.0, 8.0, 0.0), year("2020", 120.0, 8.0, 2.0)];
        let rows = year_over_year(&trends);

        assert_eq!(rows[0].payment_growth, None);
        assert_eq!(rows[1].payment_growth, Some(50.0));
        assert_eq!(rows[1].claim_growth, Some(-20.0));
        assert_eq!(rows[2].payment_growth, Some(-20.0));

        assert_eq!(rows[0].per_provider, Some(25.0));
        assert_eq!(rows[1].per_provider, None);

        assert_eq!(rows[1].payment_bar, 100.0);
        assert_eq!(rows[0].claim_bar, 100.0);
    }

    #[test]
    fn test_zero_base_has_no_growth() {
        let trends = vec![year("2018", 0.0, 0.0, 0.0), year("2019", 10.0, 1.0, 1.0)];
        assert_eq!(year_over_year(&trends)[1].payment_growth, None);
        assert_eq!(total_growth(&trends), None);
    }

    #[test]
    fn test_total_growth_and_peak() {
        let trends = vec![year("2018", 100.0, 0.0, 0.0), year("2023", 190.0, 0.0, 0.0), year("2024", 185.0, 0.0, 0.0)];
        assert_eq!(total_growth(&trends), Some(85.0));
        assert_eq!(peak_year(&trends).unwrap().year, "2023");

        assert_eq!(total_growth(&trends[..1]), None);
        assert!(peak_year(&[]).is_none());
    }
}
