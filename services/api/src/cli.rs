use crate::demo::{run_catalog, run_demo, run_derive, DeriveArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use cadence_quiz::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "CADENCE Calm+Rest Quiz",
    about = "Serve the sleep & stress quiz funnel or derive protocols from the command line",
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
    /// Derive a personalized protocol from a JSON file of quiz responses
    Derive(DeriveArgs),
    /// Render the demo protocol and price stack
    Demo,
    /// List the quiz questions in order
    Catalog,
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
        Command::Derive(args) => run_derive(args),
        Command::Demo => run_demo(),
        Command::Catalog => run_catalog(),
    }
}
