mod encoder;
mod engineer;

pub use encoder::{
    encode, CategoricalGroup, AGGRESSIVE_LOAN_FLAG, CREDIT_SCORE, CRED_HIST_LENGTH, LOAN_AMNT,
    LOAN_INT_RATE, LOAN_PERCENT_INCOME, PERSON_AGE, PERSON_EMP_EXP, PERSON_INCOME,
    PREVIOUS_DEFAULT_YES, RISK_INVERSION_SCORE,
};
pub use engineer::{
    derive, DerivedFeatures, IncomeBucket, AGGRESSIVE_LOAN_RATE, AGGRESSIVE_LOAN_RATIO,
    HIGH_INCOME_CEILING, LOAN_PERCENT_INCOME_CAP, LOW_INCOME_CEILING, MID_INCOME_CEILING,
};
