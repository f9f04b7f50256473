use super::domain::{Explanation, RawApplication, RiskFactor};
use super::features::DerivedFeatures;

pub const LOW_CREDIT_SCORE: f64 = 650.0;
pub const HIGH_LOAN_PERCENT_INCOME: f64 = 0.3;
pub const LOW_ANNUAL_INCOME: f64 = 25_000.0;
pub const SHORT_EMPLOYMENT_YEARS: f64 = 2.0;

pub const FALLBACK_RISK_FACTOR: &str = "Profile does not meet approval criteria";
pub const FALLBACK_RECOMMENDATION: &str = "Review application details and try again";

/// Threshold rules behind the rejection commentary, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskRule {
    LowCreditScore,
    HighLoanToIncome,
    PreviousDefault,
    LowIncome,
    ShortEmployment,
}

impl RiskRule {
    pub const ALL: [RiskRule; 5] = [
        RiskRule::LowCreditScore,
        RiskRule::HighLoanToIncome,
        RiskRule::PreviousDefault,
        RiskRule::LowIncome,
        RiskRule::ShortEmployment,
    ];

    pub fn triggered(self, application: &RawApplication, derived: &DerivedFeatures) -> bool {
        match self {
            RiskRule::LowCreditScore => application.credit_score < LOW_CREDIT_SCORE,
            RiskRule::HighLoanToIncome => derived.loan_percent_income > HIGH_LOAN_PERCENT_INCOME,
            RiskRule::PreviousDefault => application.previous_default,
            RiskRule::LowIncome => application.income < LOW_ANNUAL_INCOME,
            RiskRule::ShortEmployment => application.employment_years < SHORT_EMPLOYMENT_YEARS,
        }
    }

    pub const fn risk_factor(self) -> &'static str {
        match self {
            RiskRule::LowCreditScore => "Low credit score",
            RiskRule::HighLoanToIncome => "High loan amount relative to income",
            RiskRule::PreviousDefault => "Previous loan defaults on file",
            RiskRule::LowIncome => "Low annual income",
            RiskRule::ShortEmployment => "Short employment history",
        }
    }

    pub const fn recommendation(self) -> &'static str {
        match self {
            RiskRule::LowCreditScore => "Improve credit score before applying",
            RiskRule::HighLoanToIncome => "Reduce requested loan amount",
            RiskRule::PreviousDefault => "Build positive repayment history",
            RiskRule::LowIncome => "Increase income to improve approval chances",
            RiskRule::ShortEmployment => "Gain more work experience",
        }
    }

    fn to_factor(self) -> RiskFactor {
        RiskFactor {
            factor: self.risk_factor().to_string(),
            recommendation: self.recommendation().to_string(),
        }
    }
}

/// Every rule that fires for the application, in table order.
pub fn triggered_rules(application: &RawApplication, derived: &DerivedFeatures) -> Vec<RiskRule> {
    RiskRule::ALL
        .into_iter()
        .filter(|rule| rule.triggered(application, derived))
        .collect()
}

/// Commentary for a rejected application; substitutes the generic pair when no rule fires.
pub fn explain(application: &RawApplication, derived: &DerivedFeatures) -> Explanation {
    let items: Vec<RiskFactor> = triggered_rules(application, derived)
        .into_iter()
        .map(RiskRule::to_factor)
        .collect();

    if items.is_empty() {
        return Explanation {
            items: vec![RiskFactor {
                factor: FALLBACK_RISK_FACTOR.to_string(),
                recommendation: FALLBACK_RECOMMENDATION.to_string(),
            }],
            fallback: true,
        };
    }

    Explanation {
        items,
        fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::approval::features::{derive, IncomeBucket};
    use crate::workflows::approval::intake::ApplicationForm;

    #[test]
    fn strong_profile_falls_back_to_generic_pair() {
        let application = ApplicationForm::default().collect();
        let explanation = explain(&application, &derive(&application));
        assert!(explanation.fallback);
        assert_eq!(
            explanation.risk_factors().collect::<Vec<_>>(),
            [FALLBACK_RISK_FACTOR]
        );
        assert_eq!(
            explanation.recommendations().collect::<Vec<_>>(),
            [FALLBACK_RECOMMENDATION]
        );
    }

    #[test]
    fn thresholds_are_strict() {
        let mut application = ApplicationForm::default().collect();
        application.credit_score = 650.0;
        application.income = 25_000.0;
        application.employment_years = 2.0;
        let derived = DerivedFeatures {
            loan_percent_income: 0.3,
            aggressive_loan_flag: false,
            risk_inversion_score: 0.0,
            income_bucket: IncomeBucket::Low,
        };
        assert!(triggered_rules(&application, &derived).is_empty());
    }

    #[test]
    fn rules_fire_independently() {
        let mut application = ApplicationForm::default().collect();
        application.employment_years = 1.0;
        let derived = derive(&application);
        assert_eq!(
            triggered_rules(&application, &derived),
            vec![RiskRule::ShortEmployment]
        );
    }
}
