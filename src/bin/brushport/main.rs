//! brushport CLI - convert Unity brush materials into Godot 4 resources.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use brushport::prelude::*;
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "brushport",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BRUSHPORT_BUILD_DATE"), ")"),
    about = "Convert Unity brush materials and shaders into Godot 4 resources."
)]
struct Args {
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    quiet: bool,

    /// JSON configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Override the source asset root
    #[arg(long, value_name = "DIR", global = true)]
    assets: Option<PathBuf>,

    /// Override the brush material subtree
    #[arg(long, value_name = "DIR", global = true)]
    brushes: Option<PathBuf>,

    /// Override the output directory
    #[arg(long, value_name = "DIR", global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every material document under the brush root (default)
    Export,
    /// Convert the brushes listed in a catalog file
    Catalog {
        /// Catalog JSON (defaults to the configured catalog)
        file: Option<PathBuf>,
    },
    /// Build the identifier index and report its size
    Index,
    /// Translate one shader source to Godot shading language
    Transpile {
        shader: PathBuf,
        /// Write here instead of stdout
        #[arg(short = 'o', long = "out", value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Run the command; `Ok(false)` when some materials failed.
fn run(args: Args) -> Result<bool> {
    let mut config = ExportConfig::load_or_default(args.config.as_deref())
        .context("load configuration")?;
    if let Some(assets) = args.assets {
        config.assets_root = assets;
    }
    if let Some(brushes) = args.brushes {
        config.brush_root = brushes;
    }
    if let Some(output) = args.output {
        config.output_root = output;
    }
    config.validate()?;

    match args.command.unwrap_or(Command::Export) {
        Command::Export => {
            let mut pipeline = Pipeline::new(config)?;
            let summary = pipeline.run();
            println!("{}", summary);
            Ok(summary.is_clean())
        }
        Command::Catalog { file } => {
            let path = file.unwrap_or_else(|| config.catalog.clone());
            let catalog = BrushCatalog::load(&path)
                .with_context(|| format!("load catalog {}", path.display()))?;
            let mut pipeline = Pipeline::new(config)?;
            let summary = pipeline.run_catalog(&catalog);
            println!("{}", summary);
            Ok(summary.is_clean())
        }
        Command::Index => {
            let index = IdentifierIndex::build_with_extension(&config.assets_root, &config.metadata_extension);
            let files = FileNameIndex::build(&config.file_search_roots());
            println!("Identifiers: {}", index.len());
            println!("Searchable files: {}", files.len());
            Ok(true)
        }
        Command::Transpile { shader, out } => {
            let source = std::fs::read_to_string(&shader)
                .with_context(|| format!("read {}", shader.display()))?;
            let program = brushport::transpile(&source);
            match out {
                Some(path) => {
                    brushport::emit::write_atomic(&path, &program)?;
                    info!("Wrote {}", path.display());
                }
                None => print!("{}", program),
            }
            Ok(true)
        }
    }
}
