use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;

use ig_assembly::{collect_findings, parse};
use ig_schema::SchemaRegistry;
use x12_ta1::{validate_interchange_envelope, Ta1Generator};

#[derive(Parser)]
#[command(name = "x12-parse")]
#[command(about = "Parse and validate X12 EDI files against implementation-guide schemas")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an EDI file and write the validated document as JSON.
    Parse {
        /// Input EDI file.
        input: PathBuf,

        /// Output JSON file (default: input path with a .json extension).
        output: Option<PathBuf>,

        /// Schema file name inside the schema directory.
        #[arg(long, default_value = "837.5010.X222.A1.json")]
        schema: String,

        /// Directory holding guide schema JSON files.
        #[arg(long, default_value = "schemas")]
        schema_dir: PathBuf,
    },

    /// Validate the interchange envelope and write a TA1 acknowledgement.
    Ack {
        /// Input EDI file.
        input: PathBuf,

        /// Output file for the acknowledgement (default: input path with
        /// a .ta1 extension).
        output: Option<PathBuf>,

        /// Schema file name inside the schema directory.
        #[arg(long, default_value = "837.5010.X222.A1.json")]
        schema: String,

        /// Directory holding guide schema JSON files.
        #[arg(long, default_value = "schemas")]
        schema_dir: PathBuf,

        /// Generate an acknowledgement even when none was requested.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema not found in registry: {0}")]
    SchemaNotFound(String),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Parse {
            input,
            output,
            schema,
            schema_dir,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("json"));
            run_parse(&input, &output, &schema, &schema_dir)
        }
        Commands::Ack {
            input,
            output,
            schema,
            schema_dir,
            force,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("ta1"));
            run_ack(&input, &output, &schema, &schema_dir, force)
        }
    }
}

fn read_input(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(path: &Path, content: &str) -> Result<(), CliError> {
    std::fs::write(path, content).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn run_parse(
    input: &Path,
    output: &Path,
    schema_name: &str,
    schema_dir: &Path,
) -> Result<(), CliError> {
    let content = read_input(input)?;
    info!(input = %input.display(), bytes = content.len(), "loaded EDI file");

    let registry = SchemaRegistry::new(schema_dir);
    let schema = registry
        .get_base_schema(schema_name)
        .ok_or_else(|| CliError::SchemaNotFound(schema_name.to_string()))?;

    let interchange = parse(&content, schema);
    let findings = collect_findings(&interchange);

    println!("Interchange Control Number: {}", interchange.header.element(13));
    println!("Sender ID: {}", interchange.header.element(6).trim_end());
    println!("Receiver ID: {}", interchange.header.element(8).trim_end());
    println!("Functional Groups: {}", interchange.functional_groups.len());
    let transactions: usize = interchange
        .functional_groups
        .iter()
        .map(|g| g.transactions.len())
        .sum();
    println!("Transaction Sets: {transactions}");

    if findings.is_empty() {
        println!("Document is valid against {schema_name}.");
    } else {
        println!("Validation found {} issue(s):", findings.len());
        for located in findings.iter().take(5) {
            println!("  - [{}] {}", located.location, located.finding.message);
        }
        if findings.len() > 5 {
            println!("  ... and {} more", findings.len() - 5);
        }
    }

    let document = serde_json::json!({
        "interchange": interchange,
        "findings": findings,
    });
    write_output(output, &serde_json::to_string_pretty(&document)?)?;
    println!("JSON output saved to {}", output.display());
    Ok(())
}

fn run_ack(
    input: &Path,
    output: &Path,
    schema_name: &str,
    schema_dir: &Path,
    force: bool,
) -> Result<(), CliError> {
    let content = read_input(input)?;

    let registry = SchemaRegistry::new(schema_dir);
    let schema = registry
        .get_base_schema(schema_name)
        .ok_or_else(|| CliError::SchemaNotFound(schema_name.to_string()))?;

    let interchange = parse(&content, schema);
    let errors = validate_interchange_envelope(&interchange, &content);
    if errors.is_empty() {
        println!("Envelope is acceptable.");
    } else {
        let codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        println!("Envelope errors: {}", codes.join(", "));
    }

    match Ta1Generator::new().generate(&interchange.header, &errors, force) {
        Some(ack) => {
            write_output(output, &ack)?;
            println!("TA1 acknowledgement saved to {}", output.display());
        }
        None => println!("No acknowledgement due (accepted, none requested)."),
    }
    Ok(())
}
