use crate::infra::load_artifacts;
use chrono::Utc;
use clap::Args;
use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::workflows::approval::{
    ApplicationForm, Assessment, Education, Gender, HomeOwnership, LoanApprovalService,
    LoanIntent, NumericInput, PreviousDefault, Verdict,
};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct ModelArgs {
    /// Serialized model bundle to load (defaults to LOAN_MODEL_PATH or models/loan_model.json)
    #[arg(long)]
    pub(crate) artifacts: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Applicant age in years (18-75)
    #[arg(long)]
    pub(crate) age: Option<String>,
    /// Years of employment experience (0-50)
    #[arg(long)]
    pub(crate) employment_years: Option<String>,
    /// female or male
    #[arg(long)]
    pub(crate) gender: Option<Gender>,
    /// Associate, Bachelor, Doctorate, High School or Master
    #[arg(long)]
    pub(crate) education: Option<Education>,
    /// Annual income in dollars (0-300000)
    #[arg(long)]
    pub(crate) income: Option<String>,
    /// Requested loan amount in dollars (0-35000)
    #[arg(long)]
    pub(crate) loan_amount: Option<String>,
    /// Loan interest rate in percent (0-20)
    #[arg(long)]
    pub(crate) interest_rate: Option<String>,
    /// Length of credit history in years (0-20)
    #[arg(long)]
    pub(crate) credit_history_years: Option<String>,
    /// Credit score (300-850)
    #[arg(long)]
    pub(crate) credit_score: Option<String>,
    /// RENT, OWN, MORTGAGE or OTHER
    #[arg(long)]
    pub(crate) home_ownership: Option<HomeOwnership>,
    /// EDUCATION, MEDICAL, VENTURE, PERSONAL, DEBTCONSOLIDATION or HOMEIMPROVEMENT
    #[arg(long)]
    pub(crate) loan_intent: Option<LoanIntent>,
    /// Previous loan defaults on file (Yes or No)
    #[arg(long)]
    pub(crate) previous_default: Option<PreviousDefault>,
    /// Emit the assessment as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

impl AssessArgs {
    /// Flags left unset keep the intake form defaults.
    fn into_form(self) -> ApplicationForm {
        let defaults = ApplicationForm::default();
        let numeric = |flag: Option<String>, fallback: Option<NumericInput>| {
            flag.map(NumericInput::Text).or(fallback)
        };

        ApplicationForm {
            age: numeric(self.age, defaults.age),
            employment_years: numeric(self.employment_years, defaults.employment_years),
            gender: self.gender.unwrap_or(defaults.gender),
            education: self.education.unwrap_or(defaults.education),
            income: numeric(self.income, defaults.income),
            loan_amount: numeric(self.loan_amount, defaults.loan_amount),
            interest_rate: numeric(self.interest_rate, defaults.interest_rate),
            credit_history_years: numeric(
                self.credit_history_years,
                defaults.credit_history_years,
            ),
            credit_score: numeric(self.credit_score, defaults.credit_score),
            home_ownership: self.home_ownership.unwrap_or(defaults.home_ownership),
            loan_intent: self.loan_intent.unwrap_or(defaults.loan_intent),
            previous_default: self.previous_default.unwrap_or(defaults.previous_default),
        }
    }
}

fn load_service(model: ModelArgs) -> Result<LoanApprovalService, AppError> {
    let config = AppConfig::load()?;
    let artifacts = load_artifacts(&config, model.artifacts)?;
    Ok(LoanApprovalService::new(artifacts))
}

pub(crate) fn run_assess(mut args: AssessArgs) -> Result<(), AppError> {
    let model = std::mem::take(&mut args.model);
    let as_json = args.json;
    let service = load_service(model)?;
    let form = args.into_form();

    let assessment = service.assess(&form)?;
    if as_json {
        let view = assessment.view(Utc::now());
        let rendered = serde_json::to_string_pretty(&view).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        render_assessment(&assessment);
    }
    Ok(())
}

pub(crate) fn run_schema(args: ModelArgs) -> Result<(), AppError> {
    let service = load_service(args)?;
    let schema = service.schema();

    println!("Model expects {} features:", schema.len());
    for (index, column) in schema.columns().iter().enumerate() {
        println!("  {:>2}. {}", index + 1, column);
    }
    Ok(())
}

pub(crate) fn run_demo(args: ModelArgs) -> Result<(), AppError> {
    let service = load_service(args)?;

    for (name, form) in demo_profiles() {
        println!("=== {name} ===");
        match service.assess(&form) {
            Ok(assessment) => render_assessment(&assessment),
            Err(err) => println!("{err}"),
        }
        println!();
    }
    Ok(())
}

fn demo_profiles() -> Vec<(&'static str, ApplicationForm)> {
    let number = |value: f64| Some(NumericInput::Number(value));

    vec![
        (
            "Established homeowner",
            ApplicationForm {
                age: number(41.0),
                employment_years: number(12.0),
                gender: Gender::Male,
                education: Education::Master,
                income: number(120_000.0),
                loan_amount: number(5_000.0),
                interest_rate: number(7.5),
                credit_history_years: number(15.0),
                credit_score: number(780.0),
                home_ownership: HomeOwnership::Own,
                loan_intent: LoanIntent::HomeImprovement,
                previous_default: PreviousDefault::No,
            },
        ),
        (
            "Stretched renter",
            ApplicationForm {
                age: number(27.0),
                employment_years: number(3.0),
                income: number(42_000.0),
                loan_amount: number(14_000.0),
                interest_rate: number(16.5),
                credit_history_years: number(4.0),
                credit_score: number(640.0),
                home_ownership: HomeOwnership::Rent,
                loan_intent: LoanIntent::Personal,
                ..ApplicationForm::default()
            },
        ),
        (
            "Prior defaulter",
            ApplicationForm {
                income: number(20_000.0),
                loan_amount: number(8_000.0),
                credit_score: number(600.0),
                employment_years: number(1.0),
                previous_default: PreviousDefault::Yes,
                ..ApplicationForm::default()
            },
        ),
    ]
}

fn render_assessment(assessment: &Assessment) {
    let application = &assessment.application;
    let derived = &assessment.derived;

    println!(
        "Applicant: age {:.0}, income ${:.0}, loan ${:.0} at {:.2}%, credit score {:.0}",
        application.age,
        application.income,
        application.loan_amount,
        application.interest_rate,
        application.credit_score,
    );
    println!(
        "Derived: loan/income {:.3}, income bucket {}, aggressive {}, risk inversion {:.3}",
        derived.loan_percent_income,
        derived.income_bucket.label(),
        derived.aggressive_loan_flag,
        derived.risk_inversion_score,
    );
    println!("{}", assessment.verdict.headline());
    println!("Confidence: {}", assessment.verdict.confidence_label());

    if let Verdict::Rejected { explanation, .. } = &assessment.verdict {
        println!("Potential risk factors:");
        for factor in explanation.risk_factors() {
            println!("  - {factor}");
        }
        println!("Recommendations:");
        for recommendation in explanation.recommendations() {
            println!("  - {recommendation}");
        }
    }
}
