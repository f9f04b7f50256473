use crate::demo::{run_assess, run_demo, run_schema, AssessArgs, ModelArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_approval::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Approval Predictor",
    about = "Score loan applications against a trained model from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Assess a single applicant and print the verdict
    Assess(AssessArgs),
    /// Print the feature schema the loaded model expects
    Schema(ModelArgs),
    /// Score a few canned applicants to show approval and rejection output
    Demo(ModelArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Schema(args) => run_schema(args),
        Command::Demo(args) => run_demo(args),
    }
}
