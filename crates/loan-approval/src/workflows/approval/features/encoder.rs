use std::collections::HashMap;

use super::super::domain::{
    Education, FeatureVector, Gender, HomeOwnership, LoanIntent, RawApplication,
};
use super::super::model::FeatureSchema;
use super::engineer::{DerivedFeatures, IncomeBucket};

pub const PERSON_AGE: &str = "person_age";
pub const PERSON_EMP_EXP: &str = "person_emp_exp";
pub const PERSON_INCOME: &str = "person_income";
pub const LOAN_AMNT: &str = "loan_amnt";
pub const LOAN_INT_RATE: &str = "loan_int_rate";
pub const CRED_HIST_LENGTH: &str = "cb_person_cred_hist_length";
pub const CREDIT_SCORE: &str = "credit_score";
pub const LOAN_PERCENT_INCOME: &str = "loan_percent_income";
pub const AGGRESSIVE_LOAN_FLAG: &str = "aggressive_loan_flag";
pub const RISK_INVERSION_SCORE: &str = "risk_inversion_score";
pub const PREVIOUS_DEFAULT_YES: &str = "previous_loan_defaults_on_file_Yes";

/// One categorical answer together with the column prefix its indicators share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalGroup {
    Gender(Gender),
    Education(Education),
    HomeOwnership(HomeOwnership),
    LoanIntent(LoanIntent),
}

impl CategoricalGroup {
    pub fn for_application(application: &RawApplication) -> [CategoricalGroup; 4] {
        [
            CategoricalGroup::Gender(application.gender),
            CategoricalGroup::Education(application.education),
            CategoricalGroup::HomeOwnership(application.home_ownership),
            CategoricalGroup::LoanIntent(application.loan_intent),
        ]
    }

    pub const fn prefix(&self) -> &'static str {
        match self {
            CategoricalGroup::Gender(_) => "person_gender_",
            CategoricalGroup::Education(_) => "person_education_",
            CategoricalGroup::HomeOwnership(_) => "person_home_ownership_",
            CategoricalGroup::LoanIntent(_) => "loan_intent_",
        }
    }

    pub const fn selected(&self) -> &'static str {
        match self {
            CategoricalGroup::Gender(value) => value.label(),
            CategoricalGroup::Education(value) => value.label(),
            CategoricalGroup::HomeOwnership(value) => value.label(),
            CategoricalGroup::LoanIntent(value) => value.label(),
        }
    }

    /// `Some(1.0)` for this group's hot column, `Some(0.0)` for its other columns,
    /// `None` when `column` belongs to another group.
    pub fn indicator(&self, column: &str) -> Option<f64> {
        column
            .strip_prefix(self.prefix())
            .map(|value| if value == self.selected() { 1.0 } else { 0.0 })
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn assemble(
    application: &RawApplication,
    derived: &DerivedFeatures,
) -> HashMap<&'static str, f64> {
    let mut values = HashMap::from([
        (PERSON_AGE, application.age),
        (PERSON_EMP_EXP, application.employment_years),
        (PERSON_INCOME, application.income),
        (LOAN_AMNT, application.loan_amount),
        (LOAN_INT_RATE, application.interest_rate),
        (CRED_HIST_LENGTH, application.credit_history_years),
        (CREDIT_SCORE, application.credit_score),
        (LOAN_PERCENT_INCOME, derived.loan_percent_income),
        (AGGRESSIVE_LOAN_FLAG, flag(derived.aggressive_loan_flag)),
        (RISK_INVERSION_SCORE, derived.risk_inversion_score),
        (PREVIOUS_DEFAULT_YES, flag(application.previous_default)),
    ]);

    for bucket in IncomeBucket::ALL {
        if let Some(column) = bucket.indicator_column() {
            values.insert(column, flag(bucket == derived.income_bucket));
        }
    }

    values
}

/// Lay the application out in schema order. Columns nothing populates stay `0.0`.
pub fn encode(
    schema: &FeatureSchema,
    application: &RawApplication,
    derived: &DerivedFeatures,
) -> FeatureVector {
    let groups = CategoricalGroup::for_application(application);
    let values = assemble(application, derived);

    let row = schema
        .columns()
        .iter()
        .map(|column| {
            groups
                .iter()
                .find_map(|group| group.indicator(column))
                .or_else(|| values.get(column.as_str()).copied())
                .unwrap_or(0.0)
        })
        .collect();

    FeatureVector::new(schema.shared_columns(), row)
}
