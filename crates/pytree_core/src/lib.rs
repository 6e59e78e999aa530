//! pytree_core: Core utilities for the pytree Python front end.
//!
//! Provides text spans, source positions, and the line index used to
//! convert byte offsets into line/column locations.

pub mod line_index;
pub mod text;

// Re-export commonly used types
pub use line_index::LineIndex;
pub use text::{LineCol, TextPos, TextRange, TextSpan};
