//! Loan approval pipeline: intake clamping → feature engineering → schema-driven encoding →
//! scaling and classification → rejection commentary.
//!
//! Every submission runs the stages once, in order, and nothing is retained between
//! submissions. The only shared state is the [`ModelArtifacts`] loaded at startup.

pub mod domain;
pub mod explain;
pub mod features;
pub mod intake;
pub mod model;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Education, Explanation, FeatureVector, Gender, HomeOwnership, LoanIntent, PreviousDefault,
    RawApplication, RiskFactor, ScoredResult, UnknownCategory, Verdict,
};
pub use explain::{explain, RiskRule};
pub use features::{derive, encode, CategoricalGroup, DerivedFeatures, IncomeBucket};
pub use intake::{clamp, ApplicationForm, FieldRange, NumericInput, ValidationError};
pub use model::{
    ArtifactBundle, ArtifactError, BinaryClassifier, ClassifierSpec, FeatureScaler,
    FeatureSchema, GradientBoostedClassifier, LogisticClassifier, ModelArtifacts,
    PredictionError, RegressionTree, StandardScaler, TreeNode,
};
pub use router::assessment_router;
pub use service::{Assessment, AssessmentError, AssessmentView, LoanApprovalService};
