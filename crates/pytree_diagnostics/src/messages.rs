//! Message templates for every error the front end can raise.
//!
//! Codes 1xxx are lexical, 2xxx grammatical. Tests match on codes, not
//! message text, so the text can be reworded without breaking them.

use crate::{ErrorKind, MessageTemplate};

macro_rules! template {
    ($name:ident, $code:expr, $kind:ident, $message:expr) => {
        pub const $name: MessageTemplate = MessageTemplate {
            code: $code,
            kind: ErrorKind::$kind,
            message: $message,
        };
    };
}

// Lexical errors
template!(UNTERMINATED_STRING, 1001, Lex, "unterminated string literal");
template!(UNTERMINATED_REGEX, 1002, Lex, "unterminated regular expression");
template!(INVALID_NUMBER, 1003, Lex, "invalid number");
template!(IDENTIFIER_AFTER_NUMBER, 1004, Lex, "identifier directly after number");
template!(BAD_ESCAPE, 1005, Lex, "bad character escape sequence");
template!(INVALID_CHARACTER, 1006, Lex, "unexpected character '{0}'");
template!(EXPECTED_HEX_DIGITS, 1007, Lex, "expected hexadecimal number");
template!(INVALID_UNICODE_ESCAPE, 1008, Lex, "invalid unicode escape");
template!(OCTAL_IN_STRICT_MODE, 1009, Lex, "octal literal in strict mode");
template!(OCTAL_ESCAPE_IN_STRICT_MODE, 1010, Lex, "octal escape in strict mode");
template!(INVALID_REGEX_FLAG, 1011, Lex, "invalid regular expression flag");

// Grammatical errors
template!(UNEXPECTED_TOKEN, 2001, Syntax, "unexpected token '{0}'");
template!(EXPECTED_0, 2002, Syntax, "'{0}' expected");
template!(UNEXPECTED_INDENT, 2003, Syntax, "unexpected indent");
template!(INCONSISTENT_DEDENT, 2004, Syntax, "dedent does not match any outer indentation level");
template!(EXPECTED_INDENTED_BLOCK, 2005, Syntax, "expected an indented block");
template!(ASSIGN_TO_RVALUE, 2006, Syntax, "assigning to rvalue");
template!(MULTIPLE_INHERITANCE, 2007, Syntax, "multiple inheritance is not supported");
template!(RETURN_OUTSIDE_FUNCTION, 2008, Syntax, "'return' outside of function");
template!(EXPECTED_EXCEPT_OR_FINALLY, 2009, Syntax, "expected 'except' or 'finally' after 'try' block");
template!(MISALIGNED_ELSE, 2010, Syntax, "'else' does not align with the indentation of its 'if'");
template!(KEYWORD_AS_NAME, 2011, Syntax, "keyword '{0}' cannot be used as a name");
template!(UNEXPECTED_EOF, 2012, Syntax, "unexpected end of input");
template!(DUPLICATE_STAR_PARAM, 2013, Syntax, "only one '{0}' parameter is allowed");
template!(DEFAULT_BEFORE_STAR, 2014, Syntax, "non-default parameter follows default parameter");
template!(TRAILING_COMMA, 2015, Syntax, "trailing commas are not allowed here");
