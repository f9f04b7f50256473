use serde::{Deserialize, Serialize};

use super::super::domain::RawApplication;

/// Upper bound on the loan-to-income ratio.
pub const LOAN_PERCENT_INCOME_CAP: f64 = 0.6;
/// Ratio above which a loan counts toward the aggressive-loan flag.
pub const AGGRESSIVE_LOAN_RATIO: f64 = 0.3;
/// Interest rate (percent) above which a loan counts toward the aggressive-loan flag.
pub const AGGRESSIVE_LOAN_RATE: f64 = 15.0;

/// Upper edges (inclusive) of the Low, Mid and High income buckets.
pub const LOW_INCOME_CEILING: f64 = 25_000.0;
pub const MID_INCOME_CEILING: f64 = 50_000.0;
pub const HIGH_INCOME_CEILING: f64 = 100_000.0;

/// Annual income band: `(0, 25k]`, `(25k, 50k]`, `(50k, 100k]`, `(100k, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeBucket {
    Low,
    Mid,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl IncomeBucket {
    pub const ALL: [IncomeBucket; 4] = [
        IncomeBucket::Low,
        IncomeBucket::Mid,
        IncomeBucket::High,
        IncomeBucket::VeryHigh,
    ];

    pub fn from_income(income: f64) -> Self {
        if income <= LOW_INCOME_CEILING {
            IncomeBucket::Low
        } else if income <= MID_INCOME_CEILING {
            IncomeBucket::Mid
        } else if income <= HIGH_INCOME_CEILING {
            IncomeBucket::High
        } else {
            IncomeBucket::VeryHigh
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            IncomeBucket::Low => "Low",
            IncomeBucket::Mid => "Mid",
            IncomeBucket::High => "High",
            IncomeBucket::VeryHigh => "Very High",
        }
    }

    /// Indicator column for the bucket. `Low` is the implicit all-zero baseline.
    pub const fn indicator_column(self) -> Option<&'static str> {
        match self {
            IncomeBucket::Low => None,
            IncomeBucket::Mid => Some("income_bucket_Mid"),
            IncomeBucket::High => Some("income_bucket_High"),
            IncomeBucket::VeryHigh => Some("income_bucket_Very High"),
        }
    }
}

/// Features computed from the clamped application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub loan_percent_income: f64,
    pub aggressive_loan_flag: bool,
    pub risk_inversion_score: f64,
    pub income_bucket: IncomeBucket,
}

/// Derive the computed features. Callers must have rejected non-positive income first.
pub fn derive(application: &RawApplication) -> DerivedFeatures {
    let loan_percent_income =
        (application.loan_amount / application.income).min(LOAN_PERCENT_INCOME_CAP);

    let aggressive_loan_flag = loan_percent_income > AGGRESSIVE_LOAN_RATIO
        && application.interest_rate > AGGRESSIVE_LOAN_RATE;

    let risk_inversion_score =
        (application.interest_rate * loan_percent_income) / (application.credit_score + 1.0);

    DerivedFeatures {
        loan_percent_income,
        aggressive_loan_flag,
        risk_inversion_score,
        income_bucket: IncomeBucket::from_income(application.income),
    }
}
