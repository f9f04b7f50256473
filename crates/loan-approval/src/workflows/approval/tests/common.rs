use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::approval::domain::FeatureVector;
use crate::workflows::approval::intake::{ApplicationForm, NumericInput};
use crate::workflows::approval::model::{
    BinaryClassifier, FeatureScaler, FeatureSchema, LogisticClassifier, ModelArtifacts,
    PredictionError, StandardScaler,
};
use crate::workflows::approval::service::LoanApprovalService;

/// Column layout of a model trained on drop-first one-hot encoded loan data.
pub(super) const REFERENCE_FEATURES: [&str; 27] = [
    "person_age",
    "person_income",
    "person_emp_exp",
    "loan_amnt",
    "loan_int_rate",
    "loan_percent_income",
    "cb_person_cred_hist_length",
    "credit_score",
    "person_gender_male",
    "person_education_Bachelor",
    "person_education_Doctorate",
    "person_education_High School",
    "person_education_Master",
    "person_home_ownership_OTHER",
    "person_home_ownership_OWN",
    "person_home_ownership_RENT",
    "loan_intent_EDUCATION",
    "loan_intent_HOMEIMPROVEMENT",
    "loan_intent_MEDICAL",
    "loan_intent_PERSONAL",
    "loan_intent_VENTURE",
    "previous_loan_defaults_on_file_Yes",
    "aggressive_loan_flag",
    "risk_inversion_score",
    "income_bucket_Mid",
    "income_bucket_High",
    "income_bucket_Very High",
];

pub(super) fn schema() -> FeatureSchema {
    FeatureSchema::new(REFERENCE_FEATURES).expect("reference schema is valid")
}

/// Unscaled logistic model: approval driven by credit score, sunk by a prior default
/// or a venture loan.
///
/// With the default form the margin is `-5 + 0.01 * 700 = 2`.
pub(super) fn logistic_model(schema: &FeatureSchema) -> LogisticClassifier {
    let mut coefficients = vec![0.0; schema.len()];
    let mut set = |name: &str, weight: f64| {
        let index = schema.position(name).expect("feature in schema");
        coefficients[index] = weight;
    };
    set("credit_score", 0.01);
    set("previous_loan_defaults_on_file_Yes", -10.0);
    set("loan_intent_VENTURE", -10.0);
    LogisticClassifier::new(coefficients, -5.0)
}

pub(super) fn artifacts() -> Arc<ModelArtifacts> {
    let schema = schema();
    let scaler = StandardScaler::identity(schema.len());
    let classifier = logistic_model(&schema);
    Arc::new(ModelArtifacts::new(
        schema,
        Arc::new(scaler),
        Arc::new(classifier),
    ))
}

pub(super) fn service() -> LoanApprovalService {
    LoanApprovalService::new(artifacts())
}

/// Scaler standing in for an artifact that no longer matches the schema.
pub(super) struct BrokenScaler;

impl FeatureScaler for BrokenScaler {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError> {
        Err(PredictionError::ShapeMismatch {
            stage: "scaler",
            expected: row.len() + 1,
            actual: row.len(),
        })
    }
}

/// Classifier that fails the test if it is ever reached.
pub(super) struct UnreachableClassifier;

impl BinaryClassifier for UnreachableClassifier {
    fn predict_proba(&self, _row: &[f64]) -> Result<[f64; 2], PredictionError> {
        panic!("classifier must not be invoked")
    }
}

pub(super) fn service_with(
    scaler: Arc<dyn FeatureScaler>,
    classifier: Arc<dyn BinaryClassifier>,
) -> LoanApprovalService {
    LoanApprovalService::new(Arc::new(ModelArtifacts::new(schema(), scaler, classifier)))
}

pub(super) fn form(income: f64, loan_amount: f64, interest_rate: f64) -> ApplicationForm {
    ApplicationForm {
        income: Some(NumericInput::Number(income)),
        loan_amount: Some(NumericInput::Number(loan_amount)),
        interest_rate: Some(NumericInput::Number(interest_rate)),
        ..ApplicationForm::default()
    }
}

pub(super) fn value(vector: &FeatureVector, name: &str) -> f64 {
    vector
        .get(name)
        .unwrap_or_else(|| panic!("{name} missing from vector"))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
