mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use fits_extractor::commands::{self, extract::default_output_name, ExtractOptions};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract {
            directory,
            output,
            format,
            print,
        } => {
            let options = ExtractOptions {
                directory,
                output: output.unwrap_or_else(|| default_output_name(format)),
                format,
                print,
            };
            commands::extract(&options)?;
        }
        Commands::Headers { file, format } => {
            commands::show_headers(&file, format)?;
        }
    }

    Ok(())
}
