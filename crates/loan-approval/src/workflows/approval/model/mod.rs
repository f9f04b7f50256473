//! Load-once model artifacts and the scorer built on top of them.
//!
//! The scaler and classifier are capability traits so a bundled JSON model, an in-process
//! implementation, or a remote adapter can stand behind the same [`ModelArtifacts`].

mod classifier;
mod scaler;
mod schema;

pub use classifier::{
    BinaryClassifier, ClassifierSpec, GradientBoostedClassifier, LogisticClassifier,
    RegressionTree, TreeNode,
};
pub use scaler::{FeatureScaler, StandardScaler};
pub use schema::FeatureSchema;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{FeatureVector, ScoredResult};

/// Failure while loading or validating the artifact bundle.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read model artifacts from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifacts are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("feature schema is empty")]
    EmptySchema,
    #[error("feature '{0}' appears more than once in the schema")]
    DuplicateFeature(String),
    #[error("{component} covers {actual} features but the schema lists {expected}")]
    WidthMismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("scaler entry {index} has a non-finite mean or a zero/non-finite scale")]
    InvalidScale { index: usize },
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree} node {node} splits on unknown feature index {feature}")]
    UnknownFeatureIndex {
        tree: usize,
        node: usize,
        feature: usize,
    },
    #[error("tree {tree} node {node} references invalid child {child}")]
    DanglingNode {
        tree: usize,
        node: usize,
        child: usize,
    },
}

/// Failure raised while scaling or classifying a feature vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("{stage} expected {expected} features, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{stage} produced a non-finite value")]
    NonFinite { stage: &'static str },
    #[error("classifier returned probability {0} outside [0, 1]")]
    InvalidProbability(f64),
    #[error("classifier returned unknown label {0}")]
    InvalidLabel(u8),
    #[error("tree {tree} could not be evaluated at node {node}")]
    MalformedTree { tree: usize, node: usize },
}

/// On-disk layout of the bundled model: schema, fitted scaler, trained classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub features: FeatureSchema,
    pub scaler: StandardScaler,
    pub classifier: ClassifierSpec,
}

impl ArtifactBundle {
    pub fn validate(&self) -> Result<(), ArtifactError> {
        self.scaler.validate()?;
        if self.scaler.width() != self.features.len() {
            return Err(ArtifactError::WidthMismatch {
                component: "scaler",
                expected: self.features.len(),
                actual: self.scaler.width(),
            });
        }

        if self.classifier.width() != self.features.len() {
            return Err(ArtifactError::WidthMismatch {
                component: "classifier",
                expected: self.features.len(),
                actual: self.classifier.width(),
            });
        }

        self.classifier.validate()
    }
}

/// Immutable artifacts shared by every request for the lifetime of the process.
#[derive(Clone)]
pub struct ModelArtifacts {
    schema: FeatureSchema,
    scaler: Arc<dyn FeatureScaler>,
    classifier: Arc<dyn BinaryClassifier>,
}

impl fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("features", &self.schema.len())
            .finish_non_exhaustive()
    }
}

impl ModelArtifacts {
    /// Assemble artifacts from arbitrary implementations. Widths are checked per call.
    pub fn new(
        schema: FeatureSchema,
        scaler: Arc<dyn FeatureScaler>,
        classifier: Arc<dyn BinaryClassifier>,
    ) -> Self {
        Self {
            schema,
            scaler,
            classifier,
        }
    }

    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self, ArtifactError> {
        bundle.validate()?;
        let ArtifactBundle {
            features,
            scaler,
            classifier,
        } = bundle;
        Ok(Self::new(features, Arc::new(scaler), Arc::new(classifier)))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let bundle: ArtifactBundle = serde_json::from_reader(reader)?;
        Self::from_bundle(bundle)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifacts = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            features = artifacts.schema.len(),
            "loaded model artifacts"
        );
        Ok(artifacts)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Scale the vector and classify it. Nothing partial escapes on failure.
    pub fn score(&self, features: &FeatureVector) -> Result<ScoredResult, PredictionError> {
        let scaled = self.scaler.transform(features.values())?;
        let label = self.classifier.predict(&scaled)?;
        let [_, probability] = self.classifier.predict_proba(&scaled)?;

        if label > 1 {
            return Err(PredictionError::InvalidLabel(label));
        }
        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictionError::InvalidProbability(probability));
        }

        Ok(ScoredResult { label, probability })
    }
}
