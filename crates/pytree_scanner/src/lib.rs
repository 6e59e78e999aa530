//! pytree_scanner: The tokenizer for the pytree Python front end.
//!
//! Converts source text into a stream of typed tokens, including the
//! synthetic `Newline`/`Indent`/`Dedent` tokens that make the
//! indentation-sensitive grammar parseable by ordinary recursive descent.

pub mod indent;
pub mod tokenizer;
pub mod tokens;

pub use indent::IndentTracker;
pub use tokenizer::{OnComment, Tokenizer};
pub use tokens::{Precedence, Token, TokenKind, TokenValue};
