use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rust_ddl_import::{
    input, parse_ddl_files, parse_ddl_with, DdlImportError, IdGenerator, ParseOptions,
    SequentialIdGenerator, UuidIdGenerator,
};

#[derive(Parser)]
#[command(name = "rust-ddl-import")]
#[command(author, version, about = "Import vendor SQL DDL scripts into a normalized schema model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse DDL files and print the schema model as JSON
    Parse {
        /// DDL files, directories (searched for *.sql), or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Parse each file on its own and key the output by path
        #[arg(long)]
        separate: bool,

        /// Use only the manual extractors
        #[arg(long)]
        no_grammar: bool,

        /// Deterministic table ids (t1, t2, ...) instead of UUIDs
        #[arg(long)]
        sequential_ids: bool,

        /// Single-line JSON
        #[arg(long)]
        compact: bool,

        /// Enable debug logging
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String, DdlImportError> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            inputs,
            output,
            separate,
            no_grammar,
            sequential_ids,
            compact,
            verbose,
        } => {
            init_logging(verbose);

            let options = ParseOptions {
                grammar_extraction: !no_grammar,
            };
            let files = input::collect_sql_files(&inputs)?;
            log::info!("found {} SQL files", files.len());

            let json = if separate {
                let models: BTreeMap<String, _> = parse_ddl_files(&files, &options)?
                    .into_iter()
                    .map(|(path, model)| (path.display().to_string(), model))
                    .collect();
                to_json(&models, compact)?
            } else {
                let mut script = String::new();
                for file in &files {
                    script.push_str(&input::read_sql_file(file)?);
                    // files without a trailing terminator
                    script.push_str("\n;\n");
                }
                let mut ids: Box<dyn IdGenerator> = if sequential_ids {
                    Box::new(SequentialIdGenerator::new())
                } else {
                    Box::new(UuidIdGenerator)
                };
                let model = parse_ddl_with(&script, &options, ids.as_mut())?;
                to_json(&model, compact)?
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, json).map_err(|e| DdlImportError::OutputWriteError {
                        path: path.clone(),
                        source: e,
                    })?;
                    log::info!("wrote schema model to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}
