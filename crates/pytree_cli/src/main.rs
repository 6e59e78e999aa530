//! pytc: The pytree command-line front end.
//!
//! Usage:
//!   pytc [options] [file...]
//!
//! Parses each input and prints the resulting tree as JSON. With no file
//! arguments the source is read from standard input.

use std::io::Read;
use std::process;

use clap::Parser as ClapParser;
use miette::{Diagnostic, NamedSource, SourceSpan};
use pytree_diagnostics::ParseError;
use pytree_parser::{parse_with_options, tokenize_with_options, ParseOptions};

#[derive(ClapParser, Debug)]
#[command(name = "pytc", about = "pytree - a Python front end emitting Parser API trees", version)]
struct Cli {
    /// Source files to parse.
    #[arg(value_name = "FILE")]
    files: Vec<String>,

    /// Print the token stream instead of the tree.
    #[arg(long)]
    tokens: bool,

    /// Attach line/column spans to every node.
    #[arg(long)]
    locations: bool,

    /// Attach [start, end] range arrays to every node.
    #[arg(long)]
    ranges: bool,

    /// Reject legacy octal literals and octal escapes.
    #[arg(long)]
    strict: bool,

    /// Accept reserved words where a name is expected.
    #[arg(long = "keyword-names")]
    keyword_names: bool,

    /// Permit `return` at the top level.
    #[arg(long = "top-level-return")]
    top_level_return: bool,

    /// Identifier used to reach the runtime library.
    #[arg(long, value_name = "NAME")]
    runtime: Option<String>,

    /// Emit compact JSON on one line.
    #[arg(long)]
    compact: bool,
}

#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
struct ParseFailure {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    label: String,
}

fn main() {
    let cli = Cli::parse();
    let mut failed = false;

    if cli.files.is_empty() {
        let mut source = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut source) {
            eprintln!("error: failed to read stdin: {e}");
            process::exit(1);
        }
        failed = !run_one("<stdin>", &source, &cli);
    } else {
        for file in &cli.files {
            let source = match std::fs::read_to_string(file) {
                Ok(source) => source,
                Err(e) => {
                    eprintln!("error: failed to read '{file}': {e}");
                    failed = true;
                    continue;
                }
            };
            if !run_one(file, &source, &cli) {
                failed = true;
            }
        }
    }

    if failed {
        process::exit(2);
    }
}

fn build_options(name: &str, cli: &Cli) -> ParseOptions<'static> {
    let mut options = ParseOptions {
        allow_return_outside_function: cli.top_level_return,
        allow_keyword_as_name: cli.keyword_names,
        strict_mode: cli.strict,
        locations: cli.locations,
        ranges: cli.ranges,
        ..ParseOptions::default()
    };
    if cli.locations {
        options.source_file_name = Some(name.to_string());
    }
    if let Some(runtime) = &cli.runtime {
        options.runtime_binding_name = runtime.clone();
    }
    options
}

fn run_one(name: &str, source: &str, cli: &Cli) -> bool {
    let options = build_options(name, cli);
    if cli.tokens {
        return match tokenize_with_options(source, options) {
            Ok(tokens) => {
                for token in &tokens {
                    println!("{:?} {}..{}", token.kind, token.range.pos, token.range.end);
                }
                true
            }
            Err(err) => {
                report(name, source, err);
                false
            }
        };
    }
    match parse_with_options(source, options) {
        Ok(program) => {
            let rendered = if cli.compact {
                serde_json::to_string(&program)
            } else {
                serde_json::to_string_pretty(&program)
            };
            match rendered {
                Ok(json) => {
                    println!("{json}");
                    true
                }
                Err(e) => {
                    eprintln!("error: failed to serialize tree: {e}");
                    false
                }
            }
        }
        Err(err) => {
            report(name, source, err);
            false
        }
    }
}

fn report(name: &str, source: &str, err: ParseError) {
    let pos = err.pos as usize;
    let length = usize::from(pos < source.len());
    let failure = ParseFailure {
        message: format!("{} [{}]: {}", err.kind, err.code, err.message),
        src: NamedSource::new(name, source.to_string()),
        span: SourceSpan::new(pos.into(), length),
        label: err.kind.to_string(),
    };
    eprintln!("{:?}", miette::Report::new(failure));
}
