use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{FeatureVector, RawApplication, ScoredResult, Verdict};
use super::explain::explain;
use super::features::{derive, encode, DerivedFeatures};
use super::intake::{ApplicationForm, ValidationError};
use super::model::{FeatureSchema, ModelArtifacts, PredictionError};

/// Runs intake, feature engineering, encoding, scoring and explanation for one submission.
pub struct LoanApprovalService {
    artifacts: Arc<ModelArtifacts>,
}

impl LoanApprovalService {
    pub fn new(artifacts: Arc<ModelArtifacts>) -> Self {
        Self { artifacts }
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.artifacts.schema()
    }

    pub fn assess(&self, form: &ApplicationForm) -> Result<Assessment, AssessmentError> {
        let application = form.collect();
        if let Err(err) = application.ensure_scorable() {
            info!(income = application.income, "application halted at validation");
            return Err(err.into());
        }

        let derived = derive(&application);
        let features = encode(self.artifacts.schema(), &application, &derived);
        debug!(
            loan_percent_income = derived.loan_percent_income,
            aggressive_loan_flag = derived.aggressive_loan_flag,
            income_bucket = derived.income_bucket.label(),
            "features encoded"
        );

        let score = self.artifacts.score(&features).map_err(|err| {
            warn!(error = %err, "prediction failed");
            err
        })?;

        let verdict = Verdict::from_score(&score, || explain(&application, &derived));
        info!(
            decision = verdict.label(),
            probability = score.probability,
            "application assessed"
        );

        Ok(Assessment {
            application,
            derived,
            features,
            score,
            verdict,
        })
    }
}

/// Everything derived from a single submission. Discarded once rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub application: RawApplication,
    pub derived: DerivedFeatures,
    pub features: FeatureVector,
    pub score: ScoredResult,
    pub verdict: Verdict,
}

impl Assessment {
    pub fn view(&self, assessed_at: DateTime<Utc>) -> AssessmentView {
        let (risk_factors, recommendations) = match self.verdict.explanation() {
            Some(explanation) => (
                explanation.risk_factors().map(str::to_string).collect(),
                explanation.recommendations().map(str::to_string).collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        AssessmentView {
            decision: self.verdict.label(),
            approved: self.verdict.is_approved(),
            headline: self.verdict.headline(),
            confidence: self.verdict.confidence(),
            confidence_label: self.verdict.confidence_label(),
            probability: self.score.probability,
            risk_factors,
            recommendations,
            features: self.features.clone(),
            assessed_at,
        }
    }
}

/// Response body rendered for a completed assessment.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub decision: &'static str,
    pub approved: bool,
    pub headline: &'static str,
    pub confidence: f64,
    pub confidence_label: String,
    pub probability: f64,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub features: FeatureVector,
    pub assessed_at: DateTime<Utc>,
}

/// Error raised by the assessment service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Prediction error: {0}")]
    Prediction(#[from] PredictionError),
}
