//! pytree_parser: Recursive descent parser and desugarer.
//!
//! Consumes the indentation-aware token stream from `pytree_scanner` and
//! produces a Mozilla Parser API tree, lowering every surface construct
//! without a direct counterpart (tuples, slices, comprehensions, classes,
//! keyword arguments) into calls against a runtime support library.

mod factory;
mod options;
mod parser;
mod scope;

pub use options::{ParseOptions, DEFAULT_RUNTIME_BINDING};
pub use parser::Parser;

use std::rc::Rc;

use pytree_ast::Program;
use pytree_core::LineIndex;
use pytree_diagnostics::Result;
use pytree_scanner::{Token, TokenKind, Tokenizer};

/// Parse a complete module with default options.
pub fn parse(source: &str) -> Result<Program> {
    parse_with_options(source, ParseOptions::default())
}

pub fn parse_with_options(source: &str, options: ParseOptions<'_>) -> Result<Program> {
    Parser::new(source, options)?.parse_program()
}

/// Tokenize a complete module with default options. The returned list
/// includes the structural tokens and the final end-of-input token.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    tokenize_with_options(source, ParseOptions::default())
}

pub fn tokenize_with_options(source: &str, options: ParseOptions<'_>) -> Result<Vec<Token>> {
    let mut tokenizer = Tokenizer::new(source).with_strict(options.strict_mode);
    if let Some(on_comment) = options.on_comment {
        tokenizer = tokenizer.with_on_comment(on_comment);
    }
    if options.locations {
        tokenizer = tokenizer.with_line_index(Rc::new(LineIndex::new(source)));
    }
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    Ok(tokens)
}
