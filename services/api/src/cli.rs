use crate::commands::{run_batch, run_calculate, run_tariffs, run_vehicles, BatchArgs, CalculateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use exekutor_cestovne::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "exekutor-cestovne",
    about = "Calculate travel reimbursements and PUNE statements for court executor field trips",
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
    /// Calculate the reimbursement for one destination and print the statement
    Calculate(CalculateArgs),
    /// Process a CSV table of addresses and write the results next to each row
    Batch(BatchArgs),
    /// List the supported tariff periods, newest first
    Tariffs,
    /// List the configured vehicles
    Vehicles,
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
        Command::Calculate(args) => tokio::task::spawn_blocking(move || run_calculate(args)).await?,
        Command::Batch(args) => tokio::task::spawn_blocking(move || run_batch(args)).await?,
        Command::Tariffs => {
            run_tariffs();
            Ok(())
        }
        Command::Vehicles => run_vehicles(),
    }
}
