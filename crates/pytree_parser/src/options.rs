//! Parse options.

use pytree_ast::Program;
use pytree_scanner::OnComment;

/// The identifier the emitted tree uses to reach the runtime library,
/// unless overridden. Chosen to be unlikely to collide with user code.
pub const DEFAULT_RUNTIME_BINDING: &str = "__pythonRuntime";

/// Options accepted by [`crate::parse_with_options`] and
/// [`crate::tokenize_with_options`]. Every field has a default; callers
/// typically build one with struct-update syntax over
/// `ParseOptions::default()`.
pub struct ParseOptions<'a> {
    /// Permit a trailing comma in parenthesized and bracketed lists.
    pub allow_trailing_commas: bool,
    /// Permit `return` at the top level, for REPL-style fragments.
    pub allow_return_outside_function: bool,
    /// Accept reserved words where a name is expected.
    pub allow_keyword_as_name: bool,
    /// Reject legacy octal literals and octal escapes.
    pub strict_mode: bool,
    /// Attach line/column spans to every node.
    pub locations: bool,
    /// Attach `[start, end]` byte-offset arrays to every node.
    pub ranges: bool,
    /// Recorded as the `source` of every location span.
    pub source_file_name: Option<String>,
    /// The identifier used to reach the runtime library.
    pub runtime_binding_name: String,
    /// An existing top-level node to append into, for multi-file merging.
    pub program: Option<Program>,
    /// Invoked once per comment, with text and span.
    pub on_comment: Option<OnComment<'a>>,
}

impl Default for ParseOptions<'_> {
    fn default() -> Self {
        Self {
            allow_trailing_commas: true,
            allow_return_outside_function: false,
            allow_keyword_as_name: false,
            strict_mode: false,
            locations: false,
            ranges: false,
            source_file_name: None,
            runtime_binding_name: DEFAULT_RUNTIME_BINDING.to_string(),
            program: None,
            on_comment: None,
        }
    }
}
