use serde::{Deserialize, Serialize};

use super::{ArtifactError, PredictionError};

/// Fitted, stateless-per-call normalization applied before classification.
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError>;
}

/// Per-feature standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Pass-through scaler for models trained on unscaled inputs.
    pub fn identity(width: usize) -> Self {
        Self {
            mean: vec![0.0; width],
            scale: vec![1.0; width],
        }
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub(crate) fn validate(&self) -> Result<(), ArtifactError> {
        if self.mean.len() != self.scale.len() {
            return Err(ArtifactError::WidthMismatch {
                component: "scaler scale",
                expected: self.mean.len(),
                actual: self.scale.len(),
            });
        }

        for (index, (mean, scale)) in self.mean.iter().zip(&self.scale).enumerate() {
            if !mean.is_finite() || !scale.is_finite() || *scale == 0.0 {
                return Err(ArtifactError::InvalidScale { index });
            }
        }

        Ok(())
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if row.len() != self.mean.len() {
            return Err(PredictionError::ShapeMismatch {
                stage: "scaler",
                expected: self.mean.len(),
                actual: row.len(),
            });
        }

        let scaled: Vec<f64> = row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect();

        if scaled.iter().any(|value| !value.is_finite()) {
            return Err(PredictionError::NonFinite { stage: "scaler" });
        }

        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardizes_each_column() {
        let scaler = StandardScaler::new(vec![10.0, 0.0], vec![2.0, 0.5]).expect("valid scaler");
        let scaled = scaler.transform(&[14.0, 1.0]).expect("transform succeeds");
        assert_eq!(scaled, vec![2.0, 2.0]);
    }

    #[test]
    fn rejects_zero_scale_at_construction() {
        match StandardScaler::new(vec![1.0, 2.0], vec![1.0, 0.0]) {
            Err(ArtifactError::InvalidScale { index }) => assert_eq!(index, 1),
            other => panic!("expected invalid scale, got {other:?}"),
        }
    }

    #[test]
    fn reports_shape_mismatch_at_transform() {
        let scaler = StandardScaler::identity(3);
        let err = scaler.transform(&[1.0, 2.0]).expect_err("row too short");
        assert!(matches!(
            err,
            PredictionError::ShapeMismatch {
                stage: "scaler",
                expected: 3,
                actual: 2
            }
        ));
    }
}
