use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// A minimal relational data store speaking a line-oriented SQL protocol
#[derive(Parser)]
#[command(name = "tabdb", version)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 8888)]
    port: u16,

    /// Directory holding the database folders
    #[arg(long, default_value = "databases")]
    data_dir: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = tabdb::server::serve(args.data_dir, args.port) {
        error!(%err, "server exited");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
