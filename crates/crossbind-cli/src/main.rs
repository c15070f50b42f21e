//! Crossbind CLI tool
//!
//! Command-line front end for the descriptor catalog and the
//! adapter/facade generator: validate descriptors, inspect them, and
//! render the generated source tree.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod output;

use output::{resolve_color_choice, StyledOutput};

#[derive(Parser)]
#[command(name = "crossbind")]
#[command(about = "Cross-component binding generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate adapter/facade sources from a descriptor directory
    Generate {
        /// Directory of per-class descriptor files
        descriptors: PathBuf,
        /// Output directory for the generated tree
        out_dir: PathBuf,
    },

    /// Validate descriptors without writing anything
    Check {
        /// Directory of per-class descriptor files
        descriptors: PathBuf,
    },

    /// List the declared classes with kind and policy
    List {
        /// Directory of per-class descriptor files
        descriptors: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));

    let result = match cli.command {
        Commands::Generate {
            descriptors,
            out_dir,
        } => commands::generate::execute(descriptors, out_dir, &mut out),
        Commands::Check { descriptors } => commands::check::execute(descriptors, &mut out),
        Commands::List { descriptors } => commands::list::execute(descriptors, &mut out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            out.error("error");
            out.eplain(&format!(": {:#}\n", error));
            ExitCode::FAILURE
        }
    }
}
