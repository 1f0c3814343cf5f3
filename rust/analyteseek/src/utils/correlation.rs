use crate::errors::{
    DataProcessingError,
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Ordinary least squares fit of `y` on `x`.
///
/// Returns `Ok(None)` when either series is constant, since the correlation
/// is undefined there.
///
/// # Example
///
/// ```
/// use analyteseek::utils::correlation::linear_regression;
///
/// let x = vec![1.0, 2.0, 3.0, 4.0];
/// let y = vec![3.0, 5.0, 7.0, 9.0];
/// let fit = linear_regression(&x, &y).unwrap().unwrap();
/// assert_eq!(fit.slope, 2.0);
/// assert_eq!(fit.intercept, 1.0);
/// assert_eq!(fit.r_squared, 1.0);
/// ```
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<Option<LinearFit>> {
    if x.len() != y.len() || x.is_empty() {
        return Err(DataProcessingError::ExpectedSlicesSameLength {
            expected: x.len(),
            other: y.len(),
            context: "linear_regression".to_string(),
        }
        .into());
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Ok(None);
    }

    let slope = sxy / sxx;
    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    Ok(Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        r_squared: r * r,
    }))
}
