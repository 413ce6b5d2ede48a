//! Fitness evaluation of a load vector.

use crate::config::FitnessPolicy;

impl FitnessPolicy {
    /// Scores a load vector. Lower = better balanced.
    ///
    /// An empty vector scores `0.0`.
    ///
    /// # Example
    /// ```
    /// use u_balance::config::FitnessPolicy;
    ///
    /// let loads = [2, 8, 5];
    /// assert_eq!(FitnessPolicy::MeanLoad.evaluate(&loads), 5.0);
    /// assert_eq!(FitnessPolicy::MaxLoad.evaluate(&loads), 8.0);
    /// ```
    pub fn evaluate(&self, position: &[i64]) -> f64 {
        if position.is_empty() {
            return 0.0;
        }
        match self {
            FitnessPolicy::MeanLoad => mean(position),
            FitnessPolicy::MaxLoad => position.iter().copied().max().unwrap_or(0) as f64,
        }
    }
}

/// Arithmetic mean, `0.0` for an empty slice.
pub(crate) fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<i64>() as f64 / values.len() as f64
}
