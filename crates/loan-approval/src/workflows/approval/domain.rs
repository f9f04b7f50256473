use std::str::FromStr;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Applicant gender as offered by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Female, Gender::Male];

    pub const fn label(self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }
}

/// Highest education level attained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Education {
    Associate,
    Bachelor,
    Doctorate,
    #[serde(rename = "High School")]
    HighSchool,
    Master,
}

impl Education {
    pub const ALL: [Education; 5] = [
        Education::Associate,
        Education::Bachelor,
        Education::Doctorate,
        Education::HighSchool,
        Education::Master,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Education::Associate => "Associate",
            Education::Bachelor => "Bachelor",
            Education::Doctorate => "Doctorate",
            Education::HighSchool => "High School",
            Education::Master => "Master",
        }
    }
}

/// Current home ownership status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "UPPERCASE")]
pub enum HomeOwnership {
    Mortgage,
    Other,
    Own,
    Rent,
}

impl HomeOwnership {
    pub const ALL: [HomeOwnership; 4] = [
        HomeOwnership::Mortgage,
        HomeOwnership::Other,
        HomeOwnership::Own,
        HomeOwnership::Rent,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            HomeOwnership::Mortgage => "MORTGAGE",
            HomeOwnership::Other => "OTHER",
            HomeOwnership::Own => "OWN",
            HomeOwnership::Rent => "RENT",
        }
    }
}

/// Declared purpose of the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "UPPERCASE")]
pub enum LoanIntent {
    Education,
    HomeImprovement,
    Medical,
    Personal,
    Venture,
    DebtConsolidation,
}

impl LoanIntent {
    pub const ALL: [LoanIntent; 6] = [
        LoanIntent::Education,
        LoanIntent::HomeImprovement,
        LoanIntent::Medical,
        LoanIntent::Personal,
        LoanIntent::Venture,
        LoanIntent::DebtConsolidation,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LoanIntent::Education => "EDUCATION",
            LoanIntent::HomeImprovement => "HOMEIMPROVEMENT",
            LoanIntent::Medical => "MEDICAL",
            LoanIntent::Personal => "PERSONAL",
            LoanIntent::Venture => "VENTURE",
            LoanIntent::DebtConsolidation => "DEBTCONSOLIDATION",
        }
    }
}

/// Answer to "any previous loan defaults on file?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum PreviousDefault {
    #[default]
    No,
    Yes,
}

impl PreviousDefault {
    pub const ALL: [PreviousDefault; 2] = [PreviousDefault::No, PreviousDefault::Yes];

    pub const fn label(self) -> &'static str {
        match self {
            PreviousDefault::No => "No",
            PreviousDefault::Yes => "Yes",
        }
    }

    pub const fn is_yes(self) -> bool {
        matches!(self, PreviousDefault::Yes)
    }
}

/// A categorical answer that does not belong to the closed set of options.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {field} (expected one of: {expected})")]
pub struct UnknownCategory {
    pub field: &'static str,
    pub value: String,
    pub expected: String,
}

fn parse_category<T: Copy>(
    field: &'static str,
    raw: &str,
    options: &[T],
    label: fn(T) -> &'static str,
) -> Result<T, UnknownCategory> {
    let needle = raw.trim();
    options
        .iter()
        .copied()
        .find(|option| label(*option).eq_ignore_ascii_case(needle))
        .ok_or_else(|| UnknownCategory {
            field,
            value: raw.to_string(),
            expected: options
                .iter()
                .map(|option| label(*option))
                .collect::<Vec<_>>()
                .join(", "),
        })
}

impl FromStr for Gender {
    type Err = UnknownCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_category("gender", raw, &Self::ALL, Self::label)
    }
}

impl FromStr for Education {
    type Err = UnknownCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_category("education level", raw, &Self::ALL, Self::label)
    }
}

impl FromStr for HomeOwnership {
    type Err = UnknownCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_category("home ownership", raw, &Self::ALL, Self::label)
    }
}

impl FromStr for LoanIntent {
    type Err = UnknownCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_category("loan intent", raw, &Self::ALL, Self::label)
    }
}

impl FromStr for PreviousDefault {
    type Err = UnknownCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse_category("previous default answer", raw, &Self::ALL, Self::label)
    }
}

impl TryFrom<String> for Gender {
    type Error = UnknownCategory;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl TryFrom<String> for Education {
    type Error = UnknownCategory;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl TryFrom<String> for HomeOwnership {
    type Error = UnknownCategory;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl TryFrom<String> for LoanIntent {
    type Error = UnknownCategory;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl TryFrom<String> for PreviousDefault {
    type Error = UnknownCategory;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// Applicant values after intake clamping. Created fresh for every submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawApplication {
    pub age: f64,
    pub employment_years: f64,
    pub gender: Gender,
    pub education: Education,
    pub income: f64,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub credit_history_years: f64,
    pub credit_score: f64,
    pub home_ownership: HomeOwnership,
    pub loan_intent: LoanIntent,
    pub previous_default: bool,
}

/// Ordered feature-name to value mapping shaped exactly like the model's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<f64>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|column| column == name)
            .map(|index| self.values[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

impl Serialize for FeatureVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Classifier output for a single application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Predicted class, `1` meaning approval.
    pub label: u8,
    /// Probability of class `1`.
    pub probability: f64,
}

impl ScoredResult {
    pub const fn is_approved(&self) -> bool {
        self.label == 1
    }
}

/// Human-readable risk factor paired with the action that addresses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub recommendation: String,
}

/// Commentary attached to a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub items: Vec<RiskFactor>,
    /// Set when no rule fired and the generic pair was substituted.
    pub fallback: bool,
}

impl Explanation {
    pub fn risk_factors(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.factor.as_str())
    }

    pub fn recommendations(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.recommendation.as_str())
    }
}

/// Final decision shown to the applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Verdict {
    Approved {
        confidence: f64,
    },
    Rejected {
        confidence: f64,
        explanation: Explanation,
    },
}

impl Verdict {
    /// Build the verdict from a score, running the explainer only on rejection.
    pub fn from_score<F>(score: &ScoredResult, explain: F) -> Self
    where
        F: FnOnce() -> Explanation,
    {
        if score.is_approved() {
            Verdict::Approved {
                confidence: score.probability,
            }
        } else {
            Verdict::Rejected {
                confidence: 1.0 - score.probability,
                explanation: explain(),
            }
        }
    }

    pub const fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved { .. })
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Verdict::Approved { confidence } | Verdict::Rejected { confidence, .. } => *confidence,
        }
    }

    /// Confidence as a percentage with one decimal place, e.g. `87.5%`.
    pub fn confidence_label(&self) -> String {
        format!("{:.1}%", self.confidence() * 100.0)
    }

    pub fn explanation(&self) -> Option<&Explanation> {
        match self {
            Verdict::Approved { .. } => None,
            Verdict::Rejected { explanation, .. } => Some(explanation),
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Verdict::Approved { .. } => "approved",
            Verdict::Rejected { .. } => "rejected",
        }
    }

    pub const fn headline(&self) -> &'static str {
        match self {
            Verdict::Approved { .. } => "Loan Likely to be Approved!",
            Verdict::Rejected { .. } => "Loan Likely to be Rejected",
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Verdict::Approved { .. } => {
                format!("{} (confidence {})", self.headline(), self.confidence_label())
            }
            Verdict::Rejected { explanation, .. } => format!(
                "{} (confidence {}): {}",
                self.headline(),
                self.confidence_label(),
                explanation.risk_factors().collect::<Vec<_>>().join("; ")
            ),
        }
    }
}
