use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::domain::{
    Education, Gender, HomeOwnership, LoanIntent, PreviousDefault, RawApplication,
};

/// Closed interval a numeric form field is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    const fn new(field: &'static str, min: f64, max: f64) -> Self {
        Self { field, min, max }
    }

    pub fn clamp(&self, raw: Option<f64>) -> f64 {
        clamp(raw, self.min, self.max)
    }
}

pub const AGE: FieldRange = FieldRange::new("age", 18.0, 75.0);
pub const EMPLOYMENT_YEARS: FieldRange = FieldRange::new("employment_years", 0.0, 50.0);
pub const INCOME: FieldRange = FieldRange::new("income", 0.0, 300_000.0);
pub const LOAN_AMOUNT: FieldRange = FieldRange::new("loan_amount", 0.0, 35_000.0);
pub const INTEREST_RATE: FieldRange = FieldRange::new("interest_rate", 0.0, 20.0);
pub const CREDIT_HISTORY_YEARS: FieldRange = FieldRange::new("credit_history_years", 0.0, 20.0);
pub const CREDIT_SCORE: FieldRange = FieldRange::new("credit_score", 300.0, 850.0);

/// Constrain `raw` to `[min, max]`. Missing or NaN input collapses to `min`.
pub fn clamp(raw: Option<f64>, min: f64, max: f64) -> f64 {
    match raw {
        Some(value) if !value.is_nan() => value.max(min).min(max),
        _ => min,
    }
}

/// A numeric form value as submitted: a JSON number, free text, or anything else.
///
/// Deserialization never fails. Booleans, arrays and objects become [`NumericInput::Other`]
/// and clamp to the field minimum; numbers beyond `f64` range read as infinite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
    Other,
}

impl NumericInput {
    /// Numeric reading of the input, `None` when it is not a number.
    pub fn parse(&self) -> Option<f64> {
        match self {
            NumericInput::Number(value) => Some(*value),
            NumericInput::Text(raw) => parse_text(raw),
            NumericInput::Other => None,
        }
    }
}

/// Decimal text, allowing `_` digit grouping between digits (`50_000`).
fn parse_text(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if !raw.contains('_') {
        return raw.parse::<f64>().ok();
    }

    let bytes = raw.as_bytes();
    let grouped = bytes.iter().enumerate().all(|(index, byte)| {
        *byte != b'_'
            || (index > 0
                && bytes[index - 1].is_ascii_digit()
                && bytes.get(index + 1).is_some_and(u8::is_ascii_digit))
    });
    if !grouped {
        return None;
    }
    raw.replace('_', "").parse::<f64>().ok()
}

impl<'de> Deserialize<'de> for NumericInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Raw token: `1e400` must read as infinity, not fail the body.
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let token = raw.get().trim();

        if token.starts_with('"') {
            return serde_json::from_str::<String>(token)
                .map(NumericInput::Text)
                .map_err(de::Error::custom);
        }
        Ok(match token.parse::<f64>() {
            Ok(value) => NumericInput::Number(value),
            Err(_) => NumericInput::Other,
        })
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

impl From<String> for NumericInput {
    fn from(value: String) -> Self {
        NumericInput::Text(value)
    }
}

/// Unvalidated submission. Absent fields take the form defaults; explicit `null` or
/// unparsable values clamp to the field minimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationForm {
    pub age: Option<NumericInput>,
    pub employment_years: Option<NumericInput>,
    pub gender: Gender,
    pub education: Education,
    pub income: Option<NumericInput>,
    pub loan_amount: Option<NumericInput>,
    pub interest_rate: Option<NumericInput>,
    pub credit_history_years: Option<NumericInput>,
    pub credit_score: Option<NumericInput>,
    pub home_ownership: HomeOwnership,
    pub loan_intent: LoanIntent,
    pub previous_default: PreviousDefault,
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self {
            age: Some(NumericInput::Number(30.0)),
            employment_years: Some(NumericInput::Number(5.0)),
            gender: Gender::Female,
            education: Education::Associate,
            income: Some("50000".into()),
            loan_amount: Some("10000".into()),
            interest_rate: Some("10.0".into()),
            credit_history_years: Some("6".into()),
            credit_score: Some("700".into()),
            home_ownership: HomeOwnership::Mortgage,
            loan_intent: LoanIntent::Education,
            previous_default: PreviousDefault::No,
        }
    }
}

fn read(input: &Option<NumericInput>, range: FieldRange) -> f64 {
    range.clamp(input.as_ref().and_then(NumericInput::parse))
}

impl ApplicationForm {
    /// Clamp every numeric field into its domain range. Never fails.
    pub fn collect(&self) -> RawApplication {
        RawApplication {
            age: read(&self.age, AGE),
            employment_years: read(&self.employment_years, EMPLOYMENT_YEARS),
            gender: self.gender,
            education: self.education,
            income: read(&self.income, INCOME),
            loan_amount: read(&self.loan_amount, LOAN_AMOUNT),
            interest_rate: read(&self.interest_rate, INTEREST_RATE),
            credit_history_years: read(&self.credit_history_years, CREDIT_HISTORY_YEARS),
            credit_score: read(&self.credit_score, CREDIT_SCORE),
            home_ownership: self.home_ownership,
            loan_intent: self.loan_intent,
            previous_default: self.previous_default.is_yes(),
        }
    }
}

/// The only rejection path before scoring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Annual Income must be greater than 0 for prediction to work.")]
    NonPositiveIncome,
}

impl RawApplication {
    /// Guard run before feature engineering; the loan-to-income ratio divides by income.
    pub fn ensure_scorable(&self) -> Result<(), ValidationError> {
        if self.income <= 0.0 {
            return Err(ValidationError::NonPositiveIncome);
        }
        Ok(())
    }
}
