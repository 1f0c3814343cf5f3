/// Rounds `value` to `decimals` decimal places.
///
/// # Example
///
/// ```
/// use analytecore::utils::round_to;
///
/// assert_eq!(round_to(200.123456, 4), 200.1235);
/// assert_eq!(round_to(99.96, 1), 100.0);
/// ```
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Mean after adding one more value to an average of `old_count` values,
/// rounded to `decimals` places.
///
/// # Example
///
/// ```
/// use analytecore::utils::running_average_update;
///
/// // Average of four values is 4.0, adding a 6.0 gives (4 * 4 + 6) / 5
/// let updated = running_average_update(4.0, 4, 6.0, 4);
/// assert_eq!(updated, 4.4);
/// ```
pub fn running_average_update(old_avg: f64, old_count: usize, new_value: f64, decimals: i32) -> f64 {
    let count = old_count as f64;
    round_to((old_avg * count + new_value) / (count + 1.0), decimals)
}

/// Streaming mean that only needs the value count, used where the members
/// of an average arrive one at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f64)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_average_matches_batch_mean() {
        let values = [200.1001, 200.1003, 200.0998, 200.1010];
        let mut avg = values[0];
        for (i, v) in values.iter().enumerate().skip(1) {
            avg = running_average_update(avg, i, *v, 8);
        }
        let batch = values.iter().sum::<f64>() / values.len() as f64;
        assert!((avg - batch).abs() < 1e-6, "{avg} vs {batch}");
    }

    #[test]
    fn test_running_average_rounding() {
        assert_eq!(running_average_update(50.0, 1, 75.0, 2), 62.5);
        assert_eq!(running_average_update(1.0, 2, 2.0, 2), 1.33);
    }

    #[test]
    fn test_running_mean() {
        let mut rm = RunningMean::default();
        assert!(rm.mean().is_none());
        rm.add(10.0);
        rm.add(12.0);
        assert_eq!(rm.mean(), Some(11.0));
        assert_eq!(rm.count(), 2);
    }
}
