use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use schemagen::codegen::ArtifactKind;
use schemagen::scanner::ScanOptions;
use schemagen::{clean, compile_model, generate, GenerateOptions, SchemaGenError, DEFAULT_PACKAGE};

#[derive(Parser)]
#[command(name = "schemagen")]
#[command(author, version, about = "Generate data-access code from tagged Rust structs")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScanArgs {
    /// Directory containing the tagged declarations
    #[arg(short, long)]
    input: PathBuf,

    /// Walk subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Glob pattern (relative to the input directory) for files to skip; repeatable
    #[arg(short, long)]
    exclude: Vec<String>,
}

impl ScanArgs {
    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            recursive: self.recursive,
            exclude: self.exclude.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scan, validate and write generated code
    Generate {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output directory for generated files
        #[arg(short, long)]
        output: PathBuf,

        /// Package/module name recorded in generated files
        #[arg(short, long, default_value = DEFAULT_PACKAGE)]
        package: String,

        /// Artifact kinds to generate (columns, repository, query, relations, root).
        /// Defaults to all.
        #[arg(short, long, value_delimiter = ',')]
        artifacts: Vec<ArtifactKind>,
    },
    /// Scan and validate without generating
    Validate {
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Delete previously generated files
    Clean {
        /// Output directory to clean
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            scan,
            output,
            package,
            artifacts,
        } => {
            let mut options = GenerateOptions::new(&scan.input, output);
            options.package = package;
            options.scan = scan.scan_options();
            if !artifacts.is_empty() {
                options.artifacts = artifacts;
            }

            match generate(&options) {
                Ok(summary) => {
                    for path in &summary.files {
                        println!("{}", path.display());
                    }
                }
                Err(err) => match err.downcast_ref::<SchemaGenError>() {
                    Some(SchemaGenError::ValidationFailed { report }) => {
                        println!("{}", report);
                        return Ok(ExitCode::FAILURE);
                    }
                    _ => return Err(err),
                },
            }
        }
        Commands::Validate { scan } => {
            let compiled = compile_model(&scan.input, &scan.scan_options())?;
            println!("{}", compiled.report);
            if !compiled.report.is_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Clean { output } => {
            for path in clean(&output)? {
                println!("removed {}", path.display());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
