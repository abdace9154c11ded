//! Property-based tests for the series primitives.

use ma_math::{
    exponential_smoothing, linear_regression, moving_average, population_std_dev,
    raw_autocorrelations,
};
use proptest::prelude::*;

fn series_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6f64..1.0e6, min..max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn r_squared_is_bounded(data in series_strategy(2, 200)) {
        let fit = linear_regression(&data);
        prop_assert!(fit.r_squared >= 0.0 && fit.r_squared <= 1.0, "r2 = {}", fit.r_squared);
        prop_assert!(fit.slope.is_finite());
    }

    #[test]
    fn constant_series_has_zero_r_squared(value in -1.0e6f64..1.0e6, n in 2usize..100) {
        let data = vec![value; n];
        let fit = linear_regression(&data);
        prop_assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn short_series_has_no_trend(data in series_strategy(0, 2)) {
        let fit = linear_regression(&data);
        prop_assert_eq!(fit.slope, 0.0);
        prop_assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn smoothing_stays_within_range(data in series_strategy(1, 100), alpha in 0.01f64..=1.0) {
        let s = exponential_smoothing(&data, alpha).unwrap();
        let lo = data.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(s >= lo - 1e-6 && s <= hi + 1e-6);
    }

    #[test]
    fn moving_average_preserves_length(data in series_strategy(0, 100), window in 0usize..10) {
        prop_assert_eq!(moving_average(&data, window).len(), data.len());
    }

    #[test]
    fn std_dev_is_non_negative(data in series_strategy(0, 100)) {
        prop_assert!(population_std_dev(&data) >= 0.0);
    }

    #[test]
    fn autocorrelation_count_bounded_by_length(
        data in series_strategy(0, 60),
        max_lag in 1usize..30,
    ) {
        let acs = raw_autocorrelations(&data, max_lag);
        prop_assert!(acs.len() <= max_lag);
        prop_assert!(acs.len() <= data.len().saturating_sub(1));
    }
}
