//! CLI tool to parse substitutions and output JSON
//!
//! Usage:
//!   cargo run --bin parse_to_json -- <file>
//!   cargo run --bin parse_to_json -- -e '${variables.env}-orders'
//!   cargo run --bin parse_to_json -- --serialize <file>

use anyhow::{bail, Context, Result};
use blueprint_substitutions_parser::{
    parse_substitution_values, serialize_substitutions, ErrorReporter, ParseOptions,
    SourcePosition,
};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Parse a string containing ${...} substitutions and print it as JSON")]
struct Args {
    /// File holding the string to parse
    #[arg(required_unless_present = "expr", conflicts_with = "expr")]
    file: Option<PathBuf>,

    /// Parse this string instead of a file
    #[arg(short = 'e', long = "expr")]
    expr: Option<String>,

    /// Print the canonical serialized form instead of JSON
    #[arg(long)]
    serialize: bool,

    /// Omit source positions from the JSON output
    #[arg(long)]
    no_line_info: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (name, source) = match (&args.expr, &args.file) {
        (Some(expr), _) => ("<expr>".to_string(), expr.clone()),
        (None, Some(path)) => (
            path.display().to_string(),
            fs::read_to_string(path)
                .with_context(|| format!("Error reading file '{}'", path.display()))?,
        ),
        (None, None) => bail!("either a file or --expr is required"),
    };

    let options = ParseOptions::default()
        .with_context(name.clone())
        .with_parent_position(SourcePosition::new(1, 1))
        .with_line_info(!args.no_line_info);

    let parsed = match parse_substitution_values(&source, &options) {
        Ok(parsed) => parsed,
        Err(err) => {
            ErrorReporter::new(&name, &source)
                .report_error(&err)
                .context("Error writing diagnostics")?;
            process::exit(1);
        }
    };

    if args.serialize {
        let text = serialize_substitutions(&parsed, Some(&name))?;
        println!("{}", text);
    } else {
        let json =
            serde_json::to_string_pretty(&parsed).context("Error serializing AST to JSON")?;
        println!("{}", json);
    }
    Ok(())
}
