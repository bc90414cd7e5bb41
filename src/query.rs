//! The alert retrieval-filter-sort pipeline.
//!
//! [`apply_filters`] turns the alerts fetched from the store (already in
//! descending `created_at` order) into the list a user actually sees. It is
//! a pure function: no I/O, no shared state, and the same inputs always give
//! the same output, so callers can re-run it on every keystroke or toggle.
//!
//! Filters compose conjunctively:
//!
//! 1. City: case-insensitive literal substring match on `city_name`.
//!    Accents and whitespace are not normalized.
//! 2. Radius: great-circle distance to the reference location must be at
//!    most [`ALERT_RADIUS_KM`]. Without a reference location this filter
//!    lets everything through.
//! 3. Recency: stable sort by `created_at`, most recent first.

use crate::geo::{ALERT_RADIUS_KM, is_within_km};
use crate::model::{AlertRecord, FilterCriteria, ReferenceLocation};

/// Result of a filter pass together with whether the radius filter ran.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub alerts: Vec<AlertRecord>,

    /// False when `within_radius` was requested without a reference
    /// location, or was not requested at all.
    pub radius_applied: bool,
}

/// Produce the visible alerts for `criteria`.
///
/// The input slice is left untouched; the output is a fresh list, possibly
/// empty. Never fails: records with NaN coordinates simply fail the radius
/// check, and zero coordinates are treated as an ordinary position.
pub fn apply_filters(
    alerts: &[AlertRecord],
    criteria: &FilterCriteria,
    reference: Option<ReferenceLocation>,
) -> Vec<AlertRecord> {
    apply_filters_with_outcome(alerts, criteria, reference).alerts
}

/// Same as [`apply_filters`], also reporting whether the radius filter was
/// actually applied.
pub fn apply_filters_with_outcome(
    alerts: &[AlertRecord],
    criteria: &FilterCriteria,
    reference: Option<ReferenceLocation>,
) -> FilterOutcome {
    let city = criteria.city_filter().map(str::to_lowercase);
    let center = reference.filter(|_| criteria.within_radius);

    let mut visible: Vec<AlertRecord> = alerts
        .iter()
        .filter(|alert| match &city {
            Some(needle) => alert.city_name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .filter(|alert| match center {
            Some(center) => is_within_km(center, alert.coordinates, ALERT_RADIUS_KM),
            None => true,
        })
        .cloned()
        .collect();

    if criteria.sort_by_recency {
        // `sort_by` is stable; equal timestamps keep their input order.
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    FilterOutcome {
        alerts: visible,
        radius_applied: center.is_some(),
    }
}

/// Alerts within `radius_km` of `reference`, in input order.
pub fn within_radius(
    alerts: &[AlertRecord],
    reference: ReferenceLocation,
    radius_km: f64,
) -> Vec<AlertRecord> {
    alerts
        .iter()
        .filter(|alert| is_within_km(reference, alert.coordinates, radius_km))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::offset_north_km;
    use crate::model::{Coordinates, Severity};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    const ORIGIN: Coordinates = Coordinates {
        latitude: 0.0,
        longitude: 0.0,
    };

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 6, 12, 0, 0).unwrap()
    }

    fn alert(id: i64, city: &str, km_north: f64, minutes_after: i64) -> AlertRecord {
        AlertRecord {
            id,
            city_name: city.to_string(),
            coordinates: offset_north_km(ORIGIN, km_north),
            message: format!("alert {id}"),
            severity: Severity::Medium,
            created_at: base_time() + Duration::minutes(minutes_after),
            updated_at: None,
            user_id: "user-1".to_string(),
            user_name: "Tester".to_string(),
        }
    }

    fn ids(alerts: &[AlertRecord]) -> Vec<i64> {
        alerts.iter().map(|a| a.id).collect()
    }

    fn sample() -> Vec<AlertRecord> {
        vec![
            alert(1, "São Paulo - Mooca", 1.0, 50),
            alert(2, "Rio de Janeiro", 12.0, 40),
            alert(3, "Belo Horizonte", 3.0, 60),
            alert(4, "são paulo", 8.0, 10),
            alert(5, "Porto Alegre", 4.5, 60),
        ]
    }

    #[test]
    fn test_radius_scenario() {
        let alerts = vec![alert(1, "São Paulo", 2.0, 1), alert(2, "Rio", 10.0, 0)];
        let criteria = FilterCriteria::default().with_radius();

        let visible = apply_filters(&alerts, &criteria, Some(ORIGIN));

        assert_eq!(ids(&visible), vec![1]);
    }

    #[test]
    fn test_city_match_is_case_insensitive() {
        let alerts = vec![alert(1, "Belo Horizonte", 0.0, 0)];
        let criteria = FilterCriteria::default().with_city("belo");

        assert_eq!(ids(&apply_filters(&alerts, &criteria, None)), vec![1]);

        let criteria = FilterCriteria::default().with_city("HORIZ");
        assert_eq!(ids(&apply_filters(&alerts, &criteria, None)), vec![1]);
    }

    #[test]
    fn test_city_match_folds_non_ascii_case() {
        let criteria = FilterCriteria::default().with_city("SÃO");
        assert_eq!(ids(&apply_filters(&sample(), &criteria, None)), vec![1, 4]);
    }

    #[test]
    fn test_city_match_does_not_strip_accents() {
        let criteria = FilterCriteria::default().with_city("sao paulo");
        assert!(apply_filters(&sample(), &criteria, None).is_empty());
    }

    #[test]
    fn test_city_match_is_literal_about_whitespace() {
        let criteria = FilterCriteria::default().with_city(" rio");
        assert!(apply_filters(&sample(), &criteria, None).is_empty());
    }

    #[test]
    fn test_recency_sort_keeps_sorted_input() {
        let alerts = vec![alert(1, "A", 0.0, 20), alert(2, "B", 0.0, 10)];
        let criteria = FilterCriteria::default().with_recency_sort();

        assert_eq!(ids(&apply_filters(&alerts, &criteria, None)), vec![1, 2]);
    }

    #[test]
    fn test_recency_sort_orders_descending_and_is_stable() {
        let criteria = FilterCriteria::default().with_recency_sort();

        // Alerts 3 and 5 share a timestamp and must keep their input order.
        let visible = apply_filters(&sample(), &criteria, None);
        assert_eq!(ids(&visible), vec![3, 5, 1, 2, 4]);

        let mut reversed = sample();
        reversed.reverse();
        let visible = apply_filters(&reversed, &criteria, None);
        assert_eq!(ids(&visible), vec![5, 3, 1, 2, 4]);
    }

    #[test]
    fn test_without_recency_sort_store_order_is_kept() {
        let criteria = FilterCriteria::default();
        assert_eq!(ids(&apply_filters(&sample(), &criteria, None)), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_missing_location_makes_radius_inert() {
        let criteria = FilterCriteria::default().with_radius();

        let outcome = apply_filters_with_outcome(&sample(), &criteria, None);

        assert_eq!(outcome.alerts, sample());
        assert!(!outcome.radius_applied);
    }

    #[test]
    fn test_missing_location_still_applies_other_filters() {
        let criteria = FilterCriteria::default().with_radius().with_city("paulo");
        assert_eq!(ids(&apply_filters(&sample(), &criteria, None)), vec![1, 4]);
    }

    #[test]
    fn test_location_without_radius_toggle_is_ignored() {
        let outcome = apply_filters_with_outcome(&sample(), &FilterCriteria::default(), Some(ORIGIN));
        assert_eq!(outcome.alerts.len(), 5);
        assert!(!outcome.radius_applied);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let all = FilterCriteria::default()
            .with_city("rio")
            .with_radius()
            .with_recency_sort();

        for criteria in [FilterCriteria::default(), all] {
            assert!(apply_filters(&[], &criteria, Some(ORIGIN)).is_empty());
            assert!(apply_filters(&[], &criteria, None).is_empty());
        }
    }

    #[test]
    fn test_radius_boundary() {
        let alerts = vec![
            alert(1, "edge", ALERT_RADIUS_KM - 1e-9, 0),
            alert(2, "outside", 5.001, 0),
        ];
        let criteria = FilterCriteria::default().with_radius();

        assert_eq!(ids(&apply_filters(&alerts, &criteria, Some(ORIGIN))), vec![1]);
    }

    #[test]
    fn test_zero_coordinates_are_ordinary_values() {
        let mut ungeocoded = alert(1, "Recife", 0.0, 0);
        ungeocoded.coordinates = Coordinates::new(0.0, 0.0);
        let alerts = vec![ungeocoded];
        let criteria = FilterCriteria::default().with_radius();

        // Near the origin the zero point passes.
        assert_eq!(apply_filters(&alerts, &criteria, Some(ORIGIN)).len(), 1);

        // Anywhere else it is just far away.
        let recife = Coordinates::new(-8.0476, -34.877);
        assert!(apply_filters(&alerts, &criteria, Some(recife)).is_empty());
    }

    #[test]
    fn test_nan_coordinates_drop_out_of_radius_filter() {
        let mut broken = alert(1, "Nowhere", 0.0, 0);
        broken.coordinates = Coordinates::new(f64::NAN, f64::NAN);
        let alerts = vec![broken, alert(2, "Somewhere", 1.0, 0)];

        let with_radius = FilterCriteria::default().with_radius();
        assert_eq!(ids(&apply_filters(&alerts, &with_radius, Some(ORIGIN))), vec![2]);

        // Without the radius filter the record is listed like any other.
        assert_eq!(ids(&apply_filters(&alerts, &FilterCriteria::default(), Some(ORIGIN))), vec![1, 2]);
    }

    #[test]
    fn test_filters_compose_as_intersection() {
        let alerts = sample();
        let city = FilterCriteria::default().with_city("paulo");
        let radius = FilterCriteria::default().with_radius();
        let both = FilterCriteria::default().with_city("paulo").with_radius();

        let city_ids = ids(&apply_filters(&alerts, &city, Some(ORIGIN)));
        let radius_ids = ids(&apply_filters(&alerts, &radius, Some(ORIGIN)));
        let expected: Vec<i64> = city_ids
            .iter()
            .copied()
            .filter(|id| radius_ids.contains(id))
            .collect();

        assert_eq!(ids(&apply_filters(&alerts, &both, Some(ORIGIN))), expected);
        assert_eq!(expected, vec![1]);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let alerts = sample();
        let criteria = [
            FilterCriteria::default().with_city("o"),
            FilterCriteria::default().with_radius(),
            FilterCriteria::default().with_city("o").with_radius().with_recency_sort(),
        ];

        for criteria in criteria {
            let once = apply_filters(&alerts, &criteria, Some(ORIGIN));
            let twice = apply_filters(&once, &criteria, Some(ORIGIN));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_filtering_is_deterministic_and_non_mutating() {
        let alerts = sample();
        let snapshot = alerts.clone();
        let criteria = FilterCriteria::default().with_radius().with_recency_sort();

        let first = apply_filters(&alerts, &criteria, Some(ORIGIN));
        for _ in 0..10 {
            assert_eq!(apply_filters(&alerts, &criteria, Some(ORIGIN)), first);
        }
        assert_eq!(alerts, snapshot);
    }

    #[test]
    fn test_within_radius_uses_caller_radius() {
        let alerts = sample();
        assert_eq!(ids(&within_radius(&alerts, ORIGIN, 2.0)), vec![1]);
        assert_eq!(ids(&within_radius(&alerts, ORIGIN, 10.0)), vec![1, 3, 4, 5]);
    }
}
