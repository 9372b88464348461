//! API Spec Check CLI
//!
//! Lists the schemas of an OpenAPI document, reports `$ref` cycles and checks
//! a JSON value against a named schema.

use std::path::PathBuf;

use anyhow::{bail, Context};
use apispec_schemas::{load_path, AssertionError, CheckConfig, SatisfySchema, SpecDocument};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apispec-check")]
#[command(about = "Check values against schemas declared in an OpenAPI 2/3 document")]
struct Cli {
    /// Path to the OpenAPI document (JSON or YAML)
    #[arg(short, long)]
    spec: Option<PathBuf>,

    /// Extra config file layered over the default locations
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List schema names in declaration order
    List,

    /// Show schemas that take part in `$ref` cycles
    Cycles,

    /// Check a value against a named schema
    Check {
        /// Schema name as declared in the document
        schema: String,

        /// Value as inline JSON
        #[arg(short, long, conflicts_with = "file")]
        value: Option<String>,

        /// Read the value from a JSON file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Expect the value NOT to satisfy the schema
        #[arg(long)]
        not: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// `Ok(false)` means the check ran and failed
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = CheckConfig::load_from(cli.config.as_deref()).context("failed to load configuration")?;

    let spec_path = match cli.spec.or_else(|| config.spec.path.clone()) {
        Some(path) => path,
        None => bail!("no API description given; pass --spec or set spec.path in apispec.toml"),
    };
    let doc = load_path(&spec_path).with_context(|| format!("failed to load {}", spec_path.display()))?;

    match cli.command {
        Commands::List => {
            for name in doc.index().names() {
                println!("{}", name);
            }
            Ok(true)
        }

        Commands::Cycles => {
            let cycles = doc.ref_graph().cycles();
            if cycles.is_empty() {
                println!("✅ No $ref cycles in {}", spec_path.display());
                return Ok(true);
            }

            println!("❌ {} $ref cycle(s):", cycles.len());
            for group in &cycles {
                println!("   └─ {}", group.join(" <-> "));
            }
            Ok(false)
        }

        Commands::Check {
            schema,
            value,
            file,
            not,
        } => {
            let received = read_value(value, file)?;
            check(&doc, &config, schema, received, not)
        }
    }
}

fn read_value(value: Option<String>, file: Option<PathBuf>) -> anyhow::Result<Value> {
    let text = match (value, file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("pass the value with --value or --file"),
    };
    serde_json::from_str(&text).context("value is not valid JSON")
}

fn check(
    doc: &SpecDocument,
    config: &CheckConfig,
    schema: String,
    received: Value,
    not: bool,
) -> anyhow::Result<bool> {
    let mut assertion = SatisfySchema::new(schema).with_config(config);
    if not {
        assertion = assertion.not();
    }

    match assertion.evaluate(doc, &received) {
        Ok(()) => {
            println!("✅ {} ({})", assertion.schema_name(), doc.version());
            Ok(true)
        }
        Err(AssertionError::Unsatisfied { message, .. }) => {
            println!("❌ {}", message);
            Ok(false)
        }
        Err(e @ AssertionError::Schema(_)) => Err(e.into()),
    }
}
