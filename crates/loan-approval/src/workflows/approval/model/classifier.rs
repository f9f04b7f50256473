use serde::{Deserialize, Serialize};

use super::{ArtifactError, PredictionError};

/// Externally trained binary classifier.
pub trait BinaryClassifier: Send + Sync {
    /// Class probabilities `[p0, p1]` for a single scaled row.
    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], PredictionError>;

    /// Most probable class; ties resolve to `0`.
    fn predict(&self, row: &[f64]) -> Result<u8, PredictionError> {
        let [p0, p1] = self.predict_proba(row)?;
        Ok(u8::from(p1 > p0))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn check_width(expected: usize, row: &[f64]) -> Result<(), PredictionError> {
    if row.len() != expected {
        return Err(PredictionError::ShapeMismatch {
            stage: "classifier",
            expected,
            actual: row.len(),
        });
    }
    Ok(())
}

/// Logistic regression: `sigmoid(intercept + w · x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticClassifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn width(&self) -> usize {
        self.coefficients.len()
    }
}

impl BinaryClassifier for LogisticClassifier {
    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], PredictionError> {
        check_width(self.coefficients.len(), row)?;
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(weight, value)| weight * value)
                .sum::<f64>();
        let p1 = sigmoid(z);
        Ok([1.0 - p1, p1])
    }
}

/// Node of a fitted regression tree, stored in a flat array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Rows with `x[feature] <= threshold` descend into `left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    // Children must come after their parent, which also rules out cycles.
    fn validate(&self, tree: usize, width: usize) -> Result<(), ArtifactError> {
        if self.nodes.is_empty() {
            return Err(ArtifactError::EmptyTree { tree });
        }

        for (node, entry) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = entry
            {
                if *feature >= width {
                    return Err(ArtifactError::UnknownFeatureIndex {
                        tree,
                        node,
                        feature: *feature,
                    });
                }
                for child in [*left, *right] {
                    if child <= node || child >= self.nodes.len() {
                        return Err(ArtifactError::DanglingNode { tree, node, child });
                    }
                }
            }
        }

        Ok(())
    }

    fn evaluate(&self, tree: usize, row: &[f64]) -> Result<f64, PredictionError> {
        let mut cursor = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(cursor) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row
                        .get(*feature)
                        .copied()
                        .ok_or(PredictionError::MalformedTree { tree, node: cursor })?;
                    cursor = if value <= *threshold { *left } else { *right };
                }
                None => return Err(PredictionError::MalformedTree { tree, node: cursor }),
            }
        }
        Err(PredictionError::MalformedTree { tree, node: cursor })
    }
}

/// Binary gradient-boosted trees with a log-loss objective.
///
/// The raw score is `init + learning_rate * Σ tree(x)` in log-odds space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedClassifier {
    n_features: usize,
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedClassifier {
    pub fn new(
        n_features: usize,
        init: f64,
        learning_rate: f64,
        trees: Vec<RegressionTree>,
    ) -> Result<Self, ArtifactError> {
        let model = Self {
            n_features,
            init,
            learning_rate,
            trees,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn width(&self) -> usize {
        self.n_features
    }

    pub(crate) fn validate(&self) -> Result<(), ArtifactError> {
        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(index, tree)| tree.validate(index, self.n_features))
    }
}

impl BinaryClassifier for GradientBoostedClassifier {
    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], PredictionError> {
        check_width(self.n_features, row)?;
        let mut raw = self.init;
        for (index, tree) in self.trees.iter().enumerate() {
            raw += self.learning_rate * tree.evaluate(index, row)?;
        }
        let p1 = sigmoid(raw);
        Ok([1.0 - p1, p1])
    }
}

/// Classifier section of the artifact bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Logistic(LogisticClassifier),
    GradientBoosting(GradientBoostedClassifier),
}

impl ClassifierSpec {
    pub fn width(&self) -> usize {
        match self {
            ClassifierSpec::Logistic(model) => model.width(),
            ClassifierSpec::GradientBoosting(model) => model.width(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ArtifactError> {
        match self {
            ClassifierSpec::Logistic(_) => Ok(()),
            ClassifierSpec::GradientBoosting(model) => model.validate(),
        }
    }
}

impl BinaryClassifier for ClassifierSpec {
    fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2], PredictionError> {
        match self {
            ClassifierSpec::Logistic(model) => model.predict_proba(row),
            ClassifierSpec::GradientBoosting(model) => model.predict_proba(row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> RegressionTree {
        RegressionTree::new(vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { value: left },
            TreeNode::Leaf { value: right },
        ])
    }

    #[test]
    fn logistic_at_zero_margin_is_a_coin_flip_resolved_to_rejection() {
        let model = LogisticClassifier::new(vec![1.0, -1.0], 0.0);
        let [p0, p1] = model.predict_proba(&[2.0, 2.0]).expect("predicts");
        assert_eq!(p0, 0.5);
        assert_eq!(p1, 0.5);
        assert_eq!(model.predict(&[2.0, 2.0]).expect("predicts"), 0);
        assert_eq!(model.predict(&[3.0, 2.0]).expect("predicts"), 1);
    }

    #[test]
    fn boosted_trees_sum_in_log_odds_space() {
        let model = GradientBoostedClassifier::new(
            2,
            0.0,
            0.5,
            vec![stump(0, 1.0, -2.0, 2.0), stump(1, 0.0, -2.0, 2.0)],
        )
        .expect("valid model");

        let [_, high] = model.predict_proba(&[5.0, 5.0]).expect("predicts");
        assert!((high - sigmoid(2.0)).abs() < 1e-12);

        // `x <= threshold` goes left.
        let [_, low] = model.predict_proba(&[1.0, 0.0]).expect("predicts");
        assert!((low - sigmoid(-2.0)).abs() < 1e-12);

        let [_, even] = model.predict_proba(&[0.0, 1.0]).expect("predicts");
        assert_eq!(even, 0.5);
    }

    #[test]
    fn rejects_trees_pointing_backwards() {
        let cyclic = RegressionTree::new(vec![
            TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 1,
            },
            TreeNode::Leaf { value: 1.0 },
        ]);
        match GradientBoostedClassifier::new(1, 0.0, 0.1, vec![cyclic]) {
            Err(ArtifactError::DanglingNode { tree, node, child }) => {
                assert_eq!((tree, node, child), (0, 0, 0))
            }
            other => panic!("expected dangling node, got {other:?}"),
        }
    }

    #[test]
    fn rejects_split_on_unknown_feature() {
        let result = GradientBoostedClassifier::new(1, 0.0, 0.1, vec![stump(3, 0.0, 0.0, 1.0)]);
        assert!(matches!(
            result,
            Err(ArtifactError::UnknownFeatureIndex { feature: 3, .. })
        ));
    }

    #[test]
    fn classifier_spec_parses_tagged_json() {
        let spec: ClassifierSpec = serde_json::from_str(
            r#"{
                "kind": "gradient_boosting",
                "n_features": 1,
                "init": -0.2,
                "learning_rate": 0.1,
                "trees": [{"nodes": [
                    {"kind": "split", "feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                    {"kind": "leaf", "value": -1.0},
                    {"kind": "leaf", "value": 1.0}
                ]}]
            }"#,
        )
        .expect("spec parses");
        assert_eq!(spec.width(), 1);
        assert!(spec.validate().is_ok());
        assert_eq!(spec.predict(&[1.0]).expect("predicts"), 0);
    }
}
