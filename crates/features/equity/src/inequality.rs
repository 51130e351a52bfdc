//! Citywide spread of ward equity scores.

use chrono::{DateTime, Utc};
use jal_domain::{CityStatus, CitywideEquityReport, EquitySnapshot};
use tracing::info;

/// Gini coefficient of `values`, `0.0` for fewer than two values or a zero sum.
///
/// `G = Σ (2i − n + 1) · x_i / (n · Σ x)` over the values sorted ascending.
#[must_use]
pub fn gini(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let total: f64 = sorted.iter().sum();
    let denominator = n as f64 * total;
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }

    let numerator: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (2.0 * i as f64 - n as f64 + 1.0) * x)
        .sum();
    numerator / denominator
}

#[must_use]
pub fn city_status(mean: f64, gini: f64) -> CityStatus {
    if mean < 0.7 || gini > 0.3 {
        CityStatus::HighInequality
    } else if mean < 0.9 || gini > 0.2 {
        CityStatus::ModerateInequality
    } else {
        CityStatus::GoodEquity
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Summarises scored wards. Wards are listed worst first; ties keep ward
/// id order.
#[must_use]
pub fn citywide_report(
    mut wards: Vec<EquitySnapshot>,
    generated_at: DateTime<Utc>,
) -> CitywideEquityReport {
    if wards.is_empty() {
        return CitywideEquityReport::empty(generated_at);
    }

    wards.sort_by(|a, b| a.score.total_cmp(&b.score).then(a.ward_id.cmp(&b.ward_id)));

    let scores: Vec<f64> = wards.iter().map(|w| w.score).collect();
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let gini = gini(&scores);
    let status = city_status(mean, gini);

    info!(
        wards = wards.len(),
        mean = round_to(mean, 2),
        gini = round_to(gini, 3),
        status = ?status,
        "Citywide equity computed"
    );

    CitywideEquityReport {
        mean_score: round_to(mean, 2),
        gini: round_to(gini, 3),
        status,
        message: status.message().to_owned(),
        action: status.action().to_owned(),
        ward_count: wards.len(),
        wards,
        generated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_and_single_lists_have_zero_gini() {
        assert!(gini(&[]).abs() < f64::EPSILON);
        assert!(gini(&[1.4]).abs() < f64::EPSILON);
        assert!(gini(&[0.8, 0.8, 0.8, 0.8]).abs() < 1e-12);
        assert!(gini(&[0.0, 0.0]).abs() < f64::EPSILON);
    }

    #[test]
    fn gini_follows_the_sorted_formula() {
        // (-2*0.5 + 0*1.0 + 2*1.5) / (3 * 3.0) = 2/9
        assert!((gini(&[1.5, 0.5, 1.0]) - 2.0 / 9.0).abs() < 1e-12);
        // maximal concentration in two wards: (−1*0 + 1*2) / (2*2) = 0.5
        assert!((gini(&[2.0, 0.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn status_thresholds() {
        assert_eq!(city_status(1.0, 0.1), CityStatus::GoodEquity);
        assert_eq!(city_status(0.69, 0.0), CityStatus::HighInequality);
        assert_eq!(city_status(1.2, 0.31), CityStatus::HighInequality);
        assert_eq!(city_status(0.85, 0.0), CityStatus::ModerateInequality);
        assert_eq!(city_status(1.0, 0.25), CityStatus::ModerateInequality);
        assert_eq!(city_status(0.9, 0.2), CityStatus::GoodEquity);
    }

    #[test]
    fn empty_city_reports_good_equity() {
        let report = citywide_report(Vec::new(), Utc::now());
        assert_eq!(report.ward_count, 0);
        assert_eq!(report.status, CityStatus::GoodEquity);
        assert!(report.mean_score.abs() < f64::EPSILON);
    }
}
