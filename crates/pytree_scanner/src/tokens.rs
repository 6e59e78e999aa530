//! Token kinds and the data each kind carries.
//!
//! `TokenKind` is a closed enum; the parser matches on it exhaustively.
//! Operator kinds expose their binding power, associativity, and output
//! spelling through accessors instead of carrying ad hoc fields.

use pytree_core::TextRange;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    /// End of a logical line.
    Newline,
    /// The start of an indented suite.
    Indent,
    /// The end of an indented suite. One shorter line may produce several.
    Dedent,

    // Literals and names
    Name,
    Num,
    Str,
    /// A triple-quoted string, or a whole-statement string form.
    Docstring,
    Regex,

    // Keywords
    And,
    As,
    Assert,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    False,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    NoneKw,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    True,
    Try,
    While,
    With,
    Yield,

    // Punctuation
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Comma,
    Colon,
    Semi,
    Dot,
    Arrow,

    // Operators
    Eq,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    Percent,
    StarStar,
    Amp,
    Bar,
    Caret,
    Tilde,
    Shl,
    Shr,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    SlashSlashEq,
    PercentEq,
    StarStarEq,
    AmpEq,
    BarEq,
    CaretEq,
    ShlEq,
    ShrEq,
}

/// Binding powers for the expression grammar, lowest to highest.
///
/// `Exponent` sits above `Unary` so that a unary minus parsed at `Unary`
/// strength still lets `**` capture its operand (`-2**2` is `-(2**2)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    Lowest = 0,
    LogicalOr = 1,
    LogicalAnd = 2,
    Comparison = 3,
    BitOr = 4,
    BitXor = 5,
    BitAnd = 6,
    Shift = 7,
    Additive = 8,
    Multiplicative = 9,
    Unary = 10,
    Exponent = 11,
}

impl TokenKind {
    /// Map an identifier spelling to its keyword kind, if reserved.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        Some(match text {
            "and" => TokenKind::And,
            "as" => TokenKind::As,
            "assert" => TokenKind::Assert,
            "break" => TokenKind::Break,
            "class" => TokenKind::Class,
            "continue" => TokenKind::Continue,
            "def" => TokenKind::Def,
            "del" => TokenKind::Del,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "except" => TokenKind::Except,
            "False" => TokenKind::False,
            "finally" => TokenKind::Finally,
            "for" => TokenKind::For,
            "from" => TokenKind::From,
            "global" => TokenKind::Global,
            "if" => TokenKind::If,
            "import" => TokenKind::Import,
            "in" => TokenKind::In,
            "is" => TokenKind::Is,
            "lambda" => TokenKind::Lambda,
            "None" => TokenKind::NoneKw,
            "nonlocal" => TokenKind::Nonlocal,
            "not" => TokenKind::Not,
            "or" => TokenKind::Or,
            "pass" => TokenKind::Pass,
            "raise" => TokenKind::Raise,
            "return" => TokenKind::Return,
            "True" => TokenKind::True,
            "try" => TokenKind::Try,
            "while" => TokenKind::While,
            "with" => TokenKind::With,
            "yield" => TokenKind::Yield,
            _ => return None,
        })
    }

    /// The fixed spelling of a punctuation or keyword token, for error
    /// messages.
    pub fn text(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Newline => "newline",
            TokenKind::Indent => "indent",
            TokenKind::Dedent => "dedent",
            TokenKind::And => "and",
            TokenKind::As => "as",
            TokenKind::Assert => "assert",
            TokenKind::Break => "break",
            TokenKind::Class => "class",
            TokenKind::Continue => "continue",
            TokenKind::Def => "def",
            TokenKind::Del => "del",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::Except => "except",
            TokenKind::False => "False",
            TokenKind::Finally => "finally",
            TokenKind::For => "for",
            TokenKind::From => "from",
            TokenKind::Global => "global",
            TokenKind::If => "if",
            TokenKind::Import => "import",
            TokenKind::In => "in",
            TokenKind::Is => "is",
            TokenKind::Lambda => "lambda",
            TokenKind::NoneKw => "None",
            TokenKind::Nonlocal => "nonlocal",
            TokenKind::Not => "not",
            TokenKind::Or => "or",
            TokenKind::Pass => "pass",
            TokenKind::Raise => "raise",
            TokenKind::Return => "return",
            TokenKind::True => "True",
            TokenKind::Try => "try",
            TokenKind::While => "while",
            TokenKind::With => "with",
            TokenKind::Yield => "yield",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semi => ";",
            TokenKind::Dot => ".",
            TokenKind::Arrow => "->",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::SlashSlash => "//",
            TokenKind::Percent => "%",
            TokenKind::StarStar => "**",
            TokenKind::Amp => "&",
            TokenKind::Bar => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::SlashSlashEq => "//=",
            TokenKind::PercentEq => "%=",
            TokenKind::StarStarEq => "**=",
            TokenKind::AmpEq => "&=",
            TokenKind::BarEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::ShlEq => "<<=",
            TokenKind::ShrEq => ">>=",
            _ => return None,
        })
    }

    /// Binding power when this token appears in infix position.
    ///
    /// `Not` is included for the two-token `not in` operator; the parser
    /// only treats it as infix when `in` follows.
    pub fn binary_precedence(self) -> Option<Precedence> {
        Some(match self {
            TokenKind::Or => Precedence::LogicalOr,
            TokenKind::And => Precedence::LogicalAnd,
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEq
            | TokenKind::GtEq
            | TokenKind::In
            | TokenKind::Not
            | TokenKind::Is => Precedence::Comparison,
            TokenKind::Bar => Precedence::BitOr,
            TokenKind::Caret => Precedence::BitXor,
            TokenKind::Amp => Precedence::BitAnd,
            TokenKind::Shl | TokenKind::Shr => Precedence::Shift,
            TokenKind::Plus | TokenKind::Minus => Precedence::Additive,
            TokenKind::Star
            | TokenKind::Slash
            | TokenKind::SlashSlash
            | TokenKind::Percent => Precedence::Multiplicative,
            TokenKind::StarStar => Precedence::Exponent,
            _ => return None,
        })
    }

    /// Whether this infix operator is right-associative.
    pub fn is_right_associative(self) -> bool {
        self == TokenKind::StarStar
    }

    /// Whether this token can start a prefix (unary) expression.
    pub fn is_prefix_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Not | TokenKind::Minus | TokenKind::Plus | TokenKind::Tilde
        )
    }

    /// The output-operator spelling for infix operators that map directly
    /// onto a native operator of the target tree. Operators that lower to
    /// runtime calls (`+`, `*`, `**`, `//`, `in`) return `None`.
    pub fn js_operator(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::EqEq | TokenKind::Is => "===",
            TokenKind::NotEq => "!==",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Bar => "|",
            TokenKind::Caret => "^",
            TokenKind::Amp => "&",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::Minus => "-",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            _ => return None,
        })
    }

    /// The output spelling for augmented assignments that stay native.
    /// `+=`, `*=`, `//=` and `**=` lower to runtime calls and return `None`.
    pub fn augmented_js_operator(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::MinusEq => "-=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::BarEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::ShlEq => "<<=",
            TokenKind::ShrEq => ">>=",
            _ => return None,
        })
    }

    /// Whether this token is a reserved word.
    pub fn is_keyword(self) -> bool {
        self.text()
            .is_some_and(|text| TokenKind::keyword(text) == Some(self))
    }

    /// Whether this token is any augmented-assignment operator.
    pub fn is_augmented_assign(self) -> bool {
        matches!(
            self,
            TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::SlashSlashEq
                | TokenKind::PercentEq
                | TokenKind::StarStarEq
                | TokenKind::AmpEq
                | TokenKind::BarEq
                | TokenKind::CaretEq
                | TokenKind::ShlEq
                | TokenKind::ShrEq
        )
    }

    /// A short description for "unexpected token" messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Eof => "end of input",
            TokenKind::Name => "name",
            TokenKind::Num => "number",
            TokenKind::Str => "string",
            TokenKind::Docstring => "docstring",
            TokenKind::Regex => "regex",
            other => other.text().unwrap_or("token"),
        }
    }
}

/// The payload carried by a token, a closed sum over the kinds that
/// have one.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    /// Identifier spelling.
    Name(String),
    /// Decoded string value (escapes resolved).
    Str(String),
    /// Numeric value.
    Num(f64),
    /// Regex body and flags, undecoded.
    Regex { pattern: String, flags: String },
}

/// One token: kind, payload, and source range.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub range: TextRange,
}

impl Token {
    pub fn new(kind: TokenKind, range: TextRange) -> Self {
        Self {
            kind,
            value: TokenValue::None,
            range,
        }
    }

    /// The identifier spelling, for `Name` tokens.
    pub fn name(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Name(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric value, for `Num` tokens.
    pub fn num(&self) -> Option<f64> {
        match &self.value {
            TokenValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// The decoded string value, for `Str` and `Docstring` tokens.
    pub fn str_value(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Str(s) => Some(s),
            _ => None,
        }
    }
}
