use crate::demo::{
    run_ask, run_demo, run_evaluate, run_kb_import, AskArgs, DemoArgs, EvaluateArgs, KbImportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use csf_compliance::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "CSF Compliance Engine",
    about = "Evaluate controlled-substance compliance and query the regulatory knowledge base",
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
    /// Evaluate an evidence file against one decision type's rule table
    Evaluate(EvaluateArgs),
    /// Ask the knowledge base a question through the confidence gate
    Ask(AskArgs),
    /// Knowledge-base maintenance
    Kb {
        #[command(subcommand)]
        command: KbCommand,
    },
    /// Walk through decision and retrieval scenarios end to end
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum KbCommand {
    /// Validate a CSV export and report what it would add to the index
    Import(KbImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Ask(args) => run_ask(args),
        Command::Kb {
            command: KbCommand::Import(args),
        } => run_kb_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
