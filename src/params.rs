use crate::{Error, Result, Weight};

/// Numeric contract of a requested partition: number of parts, allowed
/// imbalance and the share of the total vertex weight each part aims for.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionParams {
    num_parts: usize,
    tolerance: f64,
    target_fractions: Vec<f64>,
}

impl PartitionParams {
    /// `num_parts` parts with equal target shares and a fractional imbalance
    /// `tolerance` (0.015 allows every part to deviate by 1.5% from its target).
    pub fn new(num_parts: usize, tolerance: f64) -> Result<Self> {
        if num_parts == 0 {
            return Err(Error::InvalidParameter("number of parts must be positive".into()));
        }
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(Error::InvalidParameter(format!("tolerance must be non-negative, got {tolerance}")));
        }
        Ok(Self {
            num_parts,
            tolerance,
            target_fractions: vec![1.0 / num_parts as f64; num_parts],
        })
    }

    /// Override the target shares. They are normalized to sum to one.
    pub fn with_target_fractions(mut self, fractions: Vec<f64>) -> Result<Self> {
        if fractions.len() != self.num_parts {
            return Err(Error::InputLenMismatch {
                expected: self.num_parts,
                actual: fractions.len(),
            });
        }
        if fractions.iter().any(|f| !f.is_finite() || *f <= 0.0) {
            return Err(Error::InvalidParameter("target fractions must be positive".into()));
        }
        let sum: f64 = fractions.iter().sum();
        self.target_fractions = fractions.into_iter().map(|f| f / sum).collect();
        Ok(self)
    }

    pub fn num_parts(&self) -> usize {
        self.num_parts
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn target_fractions(&self) -> &[f64] {
        &self.target_fractions
    }

    pub fn target_fraction(&self, part: usize) -> f64 {
        self.target_fractions[part]
    }

    /// Ideal weight of `part` for a graph of `total_weight`.
    pub fn target_weight(&self, part: usize, total_weight: Weight) -> f64 {
        self.target_fractions[part] * total_weight as f64
    }

    /// Largest weight `part` may carry. Never below the rounded-up target so
    /// that a balanced assignment of unit weights always exists.
    pub fn max_part_weight(&self, part: usize, total_weight: Weight) -> Weight {
        let target = self.target_weight(part, total_weight);
        let relaxed = ((1.0 + self.tolerance) * target).floor() as Weight;
        relaxed.max(target.ceil() as Weight)
    }

    /// Smallest weight `part` may carry.
    pub fn min_part_weight(&self, part: usize, total_weight: Weight) -> Weight {
        let target = self.target_weight(part, total_weight);
        let relaxed = ((1.0 - self.tolerance) * target).ceil() as Weight;
        relaxed.min(target.floor() as Weight).max(0)
    }

    /// Total weight carried above the per-part maxima. Zero means balanced.
    pub fn violation(&self, part_weights: &[Weight], total_weight: Weight) -> Weight {
        debug_assert_eq!(part_weights.len(), self.num_parts);
        part_weights
            .iter()
            .enumerate()
            .map(|(part, &weight)| (weight - self.max_part_weight(part, total_weight)).max(0))
            .sum()
    }

    /// Tolerance to use for each bisection of a recursive bisection so that
    /// the nested levels compound to this tolerance.
    pub fn bisection_tolerance(&self) -> f64 {
        if self.num_parts <= 2 {
            return self.tolerance;
        }
        let depth = (self.num_parts as f64).log2().ceil();
        (1.0 + self.tolerance).powf(1.0 / depth) - 1.0
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_relative_eq, assert_ulps_eq};
    use super::*;

    #[test]
    fn test_equal_shares_by_default() {
        // Act
        let params = PartitionParams::new(4, 0.03).unwrap();

        // Assert
        assert_eq!(params.num_parts(), 4);
        assert!(params.target_fractions().iter().all(|&f| f == 0.25));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(PartitionParams::new(0, 0.1), Err(Error::InvalidParameter(_))));
        assert!(matches!(PartitionParams::new(2, -0.1), Err(Error::InvalidParameter(_))));
        assert!(matches!(PartitionParams::new(2, f64::NAN), Err(Error::InvalidParameter(_))));
        let params = PartitionParams::new(2, 0.1).unwrap();
        assert_eq!(
            params.clone().with_target_fractions(vec![1.0]),
            Err(Error::InputLenMismatch { expected: 2, actual: 1 })
        );
        assert!(matches!(
            params.with_target_fractions(vec![1.0, 0.0]),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_target_fractions_are_normalized() {
        // Act
        let params = PartitionParams::new(2, 0.0).unwrap().with_target_fractions(vec![1.0, 3.0]).unwrap();

        // Assert
        assert_ulps_eq!(params.target_fraction(0), 0.25);
        assert_ulps_eq!(params.target_fraction(1), 0.75);
        assert_ulps_eq!(params.target_weight(1, 100), 75.0);
    }

    #[test]
    fn test_weight_bounds() {
        // Arrange
        let params = PartitionParams::new(2, 0.015).unwrap();

        // Assert
        assert_eq!(params.max_part_weight(0, 1320), 669);
        assert_eq!(params.min_part_weight(0, 1320), 651);
        // The bound never drops below the rounded-up target.
        assert_eq!(params.max_part_weight(0, 3), 2);
        assert_eq!(params.min_part_weight(0, 3), 1);
    }

    #[test]
    fn test_violation() {
        let params = PartitionParams::new(2, 0.1).unwrap();
        assert_eq!(params.violation(&[50, 50], 100), 0);
        assert_eq!(params.violation(&[55, 45], 100), 0);
        assert_eq!(params.violation(&[70, 30], 100), 15);
    }

    #[test]
    fn test_bisection_tolerance() {
        let two = PartitionParams::new(2, 0.05).unwrap();
        let four = PartitionParams::new(4, 0.05).unwrap();
        assert_ulps_eq!(two.bisection_tolerance(), 0.05);
        assert_relative_eq!((1.0 + four.bisection_tolerance()).powi(2), 1.05, epsilon = 1e-12);
    }
}
