use std::sync::Arc;

use super::common::*;
use crate::workflows::approval::domain::{
    Education, Gender, HomeOwnership, LoanIntent, PreviousDefault, Verdict,
};
use crate::workflows::approval::intake::{NumericInput, ValidationError};
use crate::workflows::approval::model::{PredictionError, StandardScaler};
use crate::workflows::approval::service::AssessmentError;

#[test]
fn modest_loan_scores_without_aggressive_flag() {
    let assessment = service()
        .assess(&form(50_000.0, 10_000.0, 10.0))
        .expect("assessment succeeds");

    assert_eq!(assessment.derived.loan_percent_income, 0.2);
    assert!(!assessment.derived.aggressive_loan_flag);
    assert_eq!(value(&assessment.features, "loan_percent_income"), 0.2);
    assert_eq!(value(&assessment.features, "aggressive_loan_flag"), 0.0);
    assert_eq!(value(&assessment.features, "income_bucket_Mid"), 1.0);
}

#[test]
fn oversized_loan_is_capped_and_flagged() {
    let assessment = service()
        .assess(&form(1_000.0, 35_000.0, 18.0))
        .expect("assessment succeeds");

    assert_eq!(assessment.derived.loan_percent_income, 0.6);
    assert!(assessment.derived.aggressive_loan_flag);
    assert_eq!(value(&assessment.features, "aggressive_loan_flag"), 1.0);
    assert_eq!(
        value(&assessment.features, "risk_inversion_score"),
        (18.0 * 0.6) / 701.0
    );
}

#[test]
fn zero_income_halts_before_scoring() {
    let service = service_with(
        Arc::new(StandardScaler::identity(REFERENCE_FEATURES.len())),
        Arc::new(UnreachableClassifier),
    );

    let err = service
        .assess(&form(0.0, 10_000.0, 10.0))
        .expect_err("zero income is rejected");

    assert_eq!(
        err,
        AssessmentError::Validation(ValidationError::NonPositiveIncome)
    );
    assert_eq!(
        err.to_string(),
        "Annual Income must be greater than 0 for prediction to work."
    );
}

#[test]
fn unparsable_income_is_treated_as_zero() {
    let mut submission = form(0.0, 10_000.0, 10.0);
    submission.income = Some(NumericInput::Text("sixty thousand".to_string()));

    let err = service().assess(&submission).expect_err("income clamps to 0");
    assert!(matches!(err, AssessmentError::Validation(_)));
}

#[test]
fn risky_profile_lists_every_factor_in_order() {
    let mut submission = form(20_000.0, 8_000.0, 11.0);
    submission.credit_score = Some(NumericInput::Number(600.0));
    submission.employment_years = Some(NumericInput::Number(1.0));
    submission.previous_default = PreviousDefault::Yes;

    let assessment = service().assess(&submission).expect("assessment succeeds");
    assert_eq!(assessment.derived.loan_percent_income, 0.4);

    let explanation = match &assessment.verdict {
        Verdict::Rejected { explanation, .. } => explanation,
        other => panic!("expected rejection, got {other:?}"),
    };
    assert!(!explanation.fallback);
    assert_eq!(
        explanation.risk_factors().collect::<Vec<_>>(),
        [
            "Low credit score",
            "High loan amount relative to income",
            "Previous loan defaults on file",
            "Low annual income",
            "Short employment history",
        ]
    );
    assert_eq!(
        explanation.recommendations().collect::<Vec<_>>(),
        [
            "Improve credit score before applying",
            "Reduce requested loan amount",
            "Build positive repayment history",
            "Increase income to improve approval chances",
            "Gain more work experience",
        ]
    );
}

#[test]
fn rejection_without_triggered_rules_uses_fallback() {
    let mut submission = form(80_000.0, 12_000.0, 9.0);
    submission.loan_intent = LoanIntent::Venture;

    let assessment = service().assess(&submission).expect("assessment succeeds");

    let explanation = assessment
        .verdict
        .explanation()
        .expect("venture loans are rejected by the test model");
    assert!(explanation.fallback);
    assert_eq!(
        explanation.items[0].factor,
        "Profile does not meet approval criteria"
    );
    assert_eq!(
        explanation.items[0].recommendation,
        "Review application details and try again"
    );
}

#[test]
fn approval_reports_probability_as_confidence() {
    let assessment = service()
        .assess(&Default::default())
        .expect("assessment succeeds");

    let expected = 1.0 / (1.0 + (-2.0_f64).exp());
    assert!(assessment.verdict.is_approved());
    assert!((assessment.score.probability - expected).abs() < 1e-9);
    assert_eq!(assessment.verdict.confidence_label(), "88.1%");
    assert!(assessment.verdict.explanation().is_none());
}

#[test]
fn vector_matches_schema_exactly() {
    let assessment = service()
        .assess(&Default::default())
        .expect("assessment succeeds");

    assert_eq!(
        assessment.features.names().collect::<Vec<_>>(),
        REFERENCE_FEATURES
    );
    assert_eq!(assessment.features.len(), REFERENCE_FEATURES.len());
}

#[test]
fn one_column_is_hot_per_group_when_the_column_exists() {
    let mut submission = form(120_000.0, 10_000.0, 10.0);
    submission.gender = Gender::Male;
    submission.education = Education::HighSchool;
    submission.home_ownership = HomeOwnership::Rent;
    submission.loan_intent = LoanIntent::Medical;

    let assessment = service().assess(&submission).expect("assessment succeeds");

    for prefix in [
        "person_gender_",
        "person_education_",
        "person_home_ownership_",
        "loan_intent_",
    ] {
        let hot: f64 = assessment
            .features
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(_, value)| value)
            .sum();
        assert_eq!(hot, 1.0, "group {prefix}");
    }
    assert_eq!(value(&assessment.features, "person_education_High School"), 1.0);
    assert_eq!(value(&assessment.features, "income_bucket_Very High"), 1.0);
}

#[test]
fn baseline_categories_leave_their_groups_cold() {
    let assessment = service()
        .assess(&Default::default())
        .expect("assessment succeeds");

    for prefix in ["person_gender_", "person_education_", "person_home_ownership_"] {
        assert!(
            assessment
                .features
                .iter()
                .filter(|(name, _)| name.starts_with(prefix))
                .all(|(_, value)| value == 0.0),
            "group {prefix} should be all zero"
        );
    }
}

#[test]
fn low_income_bucket_is_all_zero() {
    let assessment = service()
        .assess(&form(20_000.0, 1_000.0, 8.0))
        .expect("assessment succeeds");

    for column in ["income_bucket_Mid", "income_bucket_High", "income_bucket_Very High"] {
        assert_eq!(value(&assessment.features, column), 0.0, "{column}");
    }
}

#[test]
fn identical_inputs_give_identical_results() {
    let service = service();
    let mut submission = form(31_000.0, 14_000.0, 16.5);
    submission.previous_default = PreviousDefault::Yes;

    let first = service.assess(&submission).expect("first run");
    let second = service.assess(&submission).expect("second run");

    assert_eq!(first.features, second.features);
    assert_eq!(first.score, second.score);
    assert_eq!(first.verdict, second.verdict);
}

#[test]
fn scorer_failure_surfaces_generic_prediction_error() {
    let service = service_with(Arc::new(BrokenScaler), Arc::new(UnreachableClassifier));

    let err = service
        .assess(&Default::default())
        .expect_err("scaler failure propagates");

    match &err {
        AssessmentError::Prediction(PredictionError::ShapeMismatch { stage, .. }) => {
            assert_eq!(*stage, "scaler")
        }
        other => panic!("expected prediction error, got {other:?}"),
    }
    assert!(err.to_string().starts_with("Prediction error: "));
}
