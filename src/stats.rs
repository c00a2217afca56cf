//! Descriptive statistics over record slices
//!
//! Every function takes an extractor closure that pulls the numeric field of
//! interest out of a record, so the same helpers serve trial records, group
//! summaries and plain `f64` slices.

/// Arithmetic mean of the extracted field
///
/// Returns `None` for an empty slice.
pub fn mean<T, F>(records: &[T], extract: F) -> Option<f64>
where
    F: Fn(&T) -> f64,
{
    if records.is_empty() {
        return None;
    }
    let sum: f64 = records.iter().map(&extract).sum();
    Some(sum / records.len() as f64)
}

/// Sample covariance with Bessel's correction (`n - 1` denominator)
///
/// Returns exactly `0.0` for fewer than two records.
pub fn covariance<T, A, B>(records: &[T], extract_a: A, extract_b: B) -> f64
where
    A: Fn(&T) -> f64,
    B: Fn(&T) -> f64,
{
    let n = records.len();
    if n <= 1 {
        return 0.0;
    }

    let (Some(mean_a), Some(mean_b)) = (mean(records, &extract_a), mean(records, &extract_b))
    else {
        return 0.0;
    };

    let sum: f64 = records
        .iter()
        .map(|r| (extract_a(r) - mean_a) * (extract_b(r) - mean_b))
        .sum();

    sum / (n - 1) as f64
}

/// Sample variance, defined as the covariance of a field with itself
pub fn variance<T, F>(records: &[T], extract: F) -> f64
where
    F: Fn(&T) -> f64,
{
    covariance(records, &extract, &extract)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(x: &f64) -> f64 {
        *x
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[2.0, 4.0, 9.0], identity), Some(5.0));
        assert_eq!(mean::<f64, _>(&[], identity), None);
    }

    #[test]
    fn test_variance_degenerate_sizes_are_zero() {
        assert_eq!(variance::<f64, _>(&[], identity), 0.0);
        assert_eq!(variance(&[42.0], identity), 0.0);
        assert_eq!(covariance::<f64, _, _>(&[], identity, identity), 0.0);
        assert_eq!(covariance(&[(1.0, 7.0)], |p: &(f64, f64)| p.0, |p| p.1), 0.0);
    }

    #[test]
    fn test_variance_uses_bessel_correction() {
        // mean 0, squared deviations 4 + 0 + 4 = 8, / (3 - 1)
        assert!((variance(&[-2.0, 0.0, 2.0], identity) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_covariance_of_linear_relation() {
        let pairs: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 3.0 * i as f64 + 1.0)).collect();
        let cov = covariance(&pairs, |p| p.0, |p| p.1);
        let var_x = variance(&pairs, |p| p.0);

        // var(0..5) = 2.5 with n - 1 denominator
        assert!((var_x - 2.5).abs() < 1e-12);
        assert!((cov - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_extractor_over_structs() {
        struct Sample {
            time: f64,
        }
        let samples = vec![Sample { time: 400.0 }, Sample { time: 600.0 }];
        assert_eq!(mean(&samples, |s| s.time), Some(500.0));
        assert!((variance(&samples, |s| s.time) - 20_000.0).abs() < 1e-9);
    }
}
