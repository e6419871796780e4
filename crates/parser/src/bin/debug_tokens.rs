//! Print the tokens of a substitution with their positions.
//!
//! Usage: cargo run --bin debug_tokens -- 'trim(resources.orders.spec.id)'

use blueprint_substitutions_parser::lexer::lex_with_errors;
use blueprint_substitutions_parser::position::{PositionContext, SourcePosition};
use blueprint_substitutions_parser::ColumnAccuracy;
use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Print the tokens of a substitution (without ${ and })")]
struct Args {
    /// Substitution text to tokenize
    text: String,

    /// Line of the substitution in its blueprint document
    #[arg(long, default_value_t = 1)]
    line: usize,

    /// Column of the substitution in its blueprint document
    #[arg(long, default_value_t = 1)]
    column: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let ctx = PositionContext::new(
        Some(SourcePosition::new(args.line, args.column)),
        ColumnAccuracy::Exact,
    );

    let (tokens, errors) = lex_with_errors(&args.text, &ctx);
    for token in &tokens {
        println!(
            "{:>4}:{:<4} {:<24} {:?} @ {:?}",
            ctx.absolute(token.position).line,
            ctx.absolute(token.position).column,
            token.kind.to_string(),
            token.value,
            token.span
        );
    }

    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "lexing failed");
        for err in &errors {
            eprintln!("Lexer error: {}", err);
        }
        process::exit(1);
    }
}
