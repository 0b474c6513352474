//! `azidentity` plugin binary

mod serve;

use std::path::PathBuf;
use std::process::ExitCode;

use azidentity_core::{AzidentityProvider, Settings};
use clap::Parser;
use tokio::io::BufReader;

use crate::serve::{serve, PluginResult};

#[derive(Parser, Debug)]
#[command(name = "azidentity", version)]
#[command(about = "Serves azidentity ephemeral resources and functions over stdio", long_about = None)]
struct Args {
    /// Write debug-level logs to stderr
    #[arg(long)]
    debug: bool,

    /// Settings file (defaults to ~/.config/azidentity/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,
}

async fn run(args: Args) -> PluginResult<()> {
    let settings = Settings::load(args.config.as_deref())?.with_debug(args.debug);
    let provider = AzidentityProvider::builder().settings(settings).build()?;
    serve(&provider, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[azidentity] ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}
