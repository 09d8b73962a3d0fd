//! StitchGrid - knitting chart editor
//!
//! Command-line front end for creating, inspecting and editing chart files.

use clap::{Parser, Subcommand};
use stitchgrid::cli::{
    CliResult, CopyArgs, ExitCode, InspectArgs, NewArgs, PasteArgs, PlaceArgs, ResizeArgs,
    ShowArgs, StructureArgs, StructureOp,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// StitchGrid - knitting chart editor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new chart file
    New(NewArgs),
    /// Show a summary of a chart file
    Inspect(InspectArgs),
    /// Print the flattened grid of a sheet
    Show(ShowArgs),
    /// Place a key on the chart
    Place(PlaceArgs),
    /// Insert a row before the index
    InsertRow(StructureArgs),
    /// Delete the row at the index
    DeleteRow(StructureArgs),
    /// Insert a column before the index
    InsertCol(StructureArgs),
    /// Delete the column at the index
    DeleteCol(StructureArgs),
    /// Resize a sheet
    Resize(ResizeArgs),
    /// Copy a region as clipboard JSON
    Copy(CopyArgs),
    /// Paste clipboard JSON into a chart
    Paste(PasteArgs),
}

impl Command {
    fn execute(&self) -> CliResult<()> {
        match self {
            Self::New(args) => args.execute(),
            Self::Inspect(args) => args.execute(),
            Self::Show(args) => args.execute(),
            Self::Place(args) => args.execute(),
            Self::InsertRow(args) => args.execute(StructureOp::InsertRow),
            Self::DeleteRow(args) => args.execute(StructureOp::DeleteRow),
            Self::InsertCol(args) => args.execute(StructureOp::InsertCol),
            Self::DeleteCol(args) => args.execute(StructureOp::DeleteCol),
            Self::Resize(args) => args.execute(),
            Self::Copy(args) => args.execute(),
            Self::Paste(args) => args.execute(),
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::Usage
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            std::process::exit(code.code());
        }
    };

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = cli.command.execute() {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code().code());
    }
}
