use clap::{Parser, Subcommand};
use fits_extractor::commands::HeaderFormat;
use fits_extractor::export::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fits-extractor")]
#[command(
    about = "Extract RA, Dec, exposure time and observation date from FITS files",
    long_about = None
)]
pub struct Cli {
    /// Show debug logging (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory tree of FITS files and save one row per file
    Extract {
        /// Directory containing FITS files (searched recursively)
        directory: PathBuf,

        /// Output file name, saved inside the scanned directory unless absolute
        /// (default: fits_info.csv or fits_info.json)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Also print the results as a table
        #[arg(long)]
        print: bool,
    },

    /// Show the primary header of a single FITS file
    Headers {
        /// FITS file to read
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = HeaderFormat::Table)]
        format: HeaderFormat,
    },
}
