//! Local extrema of a 1-D signal.
//!
//! Maxima follow the usual signal-processing convention: a sample is a
//! maximum when it is strictly higher than both neighbours. Flat tops are
//! reported once, at the (lower) midpoint of the plateau. The first and last
//! samples are never extrema.

/// Indices of the local maxima of `values`, in increasing order.
///
/// # Example
///
/// ```
/// use analytecore::utils::extrema::local_maxima;
///
/// let maxima = local_maxima(&[1.0, 3.0, 2.0, 5.0, 5.0, 5.0, 1.0]);
/// assert_eq!(maxima, vec![1, 4]);
/// ```
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut out = Vec::new();
    if values.len() < 3 {
        return out;
    }
    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                let right = ahead - 1;
                out.push((i + right) / 2);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }
    out
}

/// Indices of the local minima of `values`, ie. the maxima of the negated signal.
pub fn local_minima(values: &[f64]) -> Vec<usize> {
    let negated: Vec<f64> = values.iter().map(|v| -v).collect();
    local_maxima(&negated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_apex() {
        let vals = [1.0, 2.0, 4.0, 8.0, 4.0, 2.0, 1.0];
        assert_eq!(local_maxima(&vals), vec![3]);
        assert!(local_minima(&vals).is_empty());
    }

    #[test]
    fn test_monotonic_has_no_extrema() {
        let vals = [1.0, 2.0, 3.0, 4.0];
        assert!(local_maxima(&vals).is_empty());
        assert!(local_minima(&vals).is_empty());
    }

    #[test]
    fn test_boundaries_are_excluded() {
        let vals = [10.0, 1.0, 10.0];
        assert!(local_maxima(&vals).is_empty());
        assert_eq!(local_minima(&vals), vec![1]);
    }

    #[test]
    fn test_plateau_reaching_the_end_is_not_a_maximum() {
        let vals = [1.0, 3.0, 3.0, 3.0];
        assert!(local_maxima(&vals).is_empty());
    }

    #[test]
    fn test_two_apexes_and_valley() {
        let vals = [1.0, 5.0, 10.0, 5.0, 2.0, 6.0, 8.0, 3.0, 1.0];
        assert_eq!(local_maxima(&vals), vec![2, 6]);
        assert_eq!(local_minima(&vals), vec![4]);
    }
}
