//! The tokenizer.
//!
//! Produces one token per call to [`Tokenizer::next_token`]. Indentation
//! is handled here, not in the parser: at the start of each logical line
//! the whitespace prefix is compared against the open suite stack and
//! synthetic `Indent`/`Dedent` tokens are emitted before the line's first
//! real token. Newlines inside open brackets and backslash-newline pairs
//! are trivia. A synthetic final `Newline` and the closing `Dedent`s are
//! emitted at end of input so the parser never special-cases a missing
//! trailing line break.

use std::rc::Rc;

use pytree_core::{LineCol, LineIndex, TextPos, TextRange};
use pytree_diagnostics::{messages, ParseError, Result};
use unicode_xid::UnicodeXID;

use crate::indent::{IndentChange, IndentTracker};
use crate::tokens::{Token, TokenKind, TokenValue};

/// Callback invoked for each comment: text (without the `#`), start and
/// end byte offsets, and start/end locations when location tracking is on.
pub type OnComment<'a> =
    Box<dyn FnMut(&str, TextPos, TextPos, Option<LineCol>, Option<LineCol>) + 'a>;

pub struct Tokenizer<'a> {
    text: &'a str,
    pos: TextPos,
    strict: bool,
    indent: IndentTracker,
    pending_dedents: u32,
    at_line_start: bool,
    /// True before the first token of a simple statement; controls
    /// docstring detection for single-quoted strings.
    at_statement_start: bool,
    /// Open `(`/`[`/`{` nesting; newlines are trivia while nonzero.
    bracket_depth: u32,
    /// Whether a `/` in this position starts a regex rather than an
    /// operator, tracked acorn-style from the previous token kind.
    expr_allowed: bool,
    last_was_newline: bool,
    final_newline_emitted: bool,
    on_comment: Option<OnComment<'a>>,
    line_index: Option<Rc<LineIndex>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            strict: false,
            indent: IndentTracker::new(),
            pending_dedents: 0,
            at_line_start: true,
            at_statement_start: true,
            bracket_depth: 0,
            expr_allowed: true,
            last_was_newline: true,
            final_newline_emitted: false,
            on_comment: None,
            line_index: None,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_on_comment(mut self, on_comment: OnComment<'a>) -> Self {
        self.on_comment = Some(on_comment);
        self
    }

    pub fn with_line_index(mut self, line_index: Rc<LineIndex>) -> Self {
        self.line_index = Some(line_index);
        self
    }

    /// Current byte offset, for error reporting by the parser.
    pub fn pos(&self) -> TextPos {
        self.pos
    }

    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            if self.pending_dedents > 0 {
                self.pending_dedents -= 1;
                return Ok(self.make(TokenKind::Dedent, self.pos));
            }
            if self.at_line_start && self.bracket_depth == 0 {
                match self.scan_indentation()? {
                    Some(token) => return Ok(token),
                    None => continue,
                }
            }
            break;
        }
        self.skip_trivia()?;
        let Some(byte) = self.byte() else {
            return self.finish_input();
        };
        let start = self.pos;
        match byte {
            b'\n' | b'\r' => {
                self.eat_line_break();
                self.at_line_start = true;
                Ok(self.make(TokenKind::Newline, start))
            }
            b'\'' | b'"' => self.scan_string(),
            b'0'..=b'9' => self.scan_number(),
            b'.' => {
                if matches!(self.byte_at(1), Some(b'0'..=b'9')) {
                    self.scan_number()
                } else {
                    self.pos += 1;
                    Ok(self.make(TokenKind::Dot, start))
                }
            }
            b'(' | b'[' | b'{' => {
                self.bracket_depth += 1;
                self.pos += 1;
                let kind = match byte {
                    b'(' => TokenKind::OpenParen,
                    b'[' => TokenKind::OpenBracket,
                    _ => TokenKind::OpenBrace,
                };
                Ok(self.make(kind, start))
            }
            b')' | b']' | b'}' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                self.pos += 1;
                let kind = match byte {
                    b')' => TokenKind::CloseParen,
                    b']' => TokenKind::CloseBracket,
                    _ => TokenKind::CloseBrace,
                };
                Ok(self.make(kind, start))
            }
            b',' => self.punct(TokenKind::Comma),
            b':' => self.punct(TokenKind::Colon),
            b';' => self.punct(TokenKind::Semi),
            b'~' => self.punct(TokenKind::Tilde),
            b'=' => self.scan_eq(),
            b'!' => self.scan_bang(),
            b'<' => self.scan_lt(),
            b'>' => self.scan_gt(),
            b'+' => self.scan_plus(),
            b'-' => self.scan_minus(),
            b'*' => self.scan_star(),
            b'/' => self.scan_slash(),
            b'%' => self.one_or_assign(TokenKind::Percent, TokenKind::PercentEq),
            b'&' => self.one_or_assign(TokenKind::Amp, TokenKind::AmpEq),
            b'|' => self.one_or_assign(TokenKind::Bar, TokenKind::BarEq),
            b'^' => self.one_or_assign(TokenKind::Caret, TokenKind::CaretEq),
            _ => {
                let c = self.char_at(self.pos).unwrap_or('\u{fffd}');
                if c == '_' || c.is_xid_start() {
                    self.scan_name()
                } else {
                    Err(self.error(
                        &messages::INVALID_CHARACTER,
                        &[&c.to_string()],
                        start,
                    ))
                }
            }
        }
    }

    // ========================================================================
    // Line structure
    // ========================================================================

    /// At the start of a logical line: skip blank and comment-only lines,
    /// then compare the indentation prefix against the suite stack.
    /// Returns the `Indent` token if the line opens a suite; dedents are
    /// queued in `pending_dedents`.
    fn scan_indentation(&mut self) -> Result<Option<Token>> {
        loop {
            let line_start = self.pos;
            while matches!(self.byte(), Some(b' ' | b'\t')) {
                self.pos += 1;
            }
            let indent_end = self.pos;
            if self.byte() == Some(b'#') {
                self.skip_comment();
            }
            match self.byte() {
                None => {
                    self.at_line_start = false;
                    return Ok(None);
                }
                Some(b'\n') | Some(b'\r') => {
                    self.eat_line_break();
                    continue;
                }
                _ => {
                    let indent = &self.text[line_start as usize..indent_end as usize];
                    self.at_line_start = false;
                    self.at_statement_start = true;
                    return match self.indent.classify(indent) {
                        IndentChange::Deeper => {
                            self.indent.push(indent.to_string());
                            Ok(Some(self.make(TokenKind::Indent, line_start)))
                        }
                        IndentChange::Same => Ok(None),
                        IndentChange::Shallower(count) => {
                            self.indent.pop(count);
                            self.pending_dedents = count;
                            Ok(None)
                        }
                        IndentChange::Inconsistent => {
                            Err(self.error(&messages::INCONSISTENT_DEDENT, &[], indent_end))
                        }
                    };
                }
            }
        }
    }

    /// Skip inline whitespace, comments, backslash-newline continuations,
    /// and (inside brackets) bare newlines.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.byte() {
                Some(b' ' | b'\t' | b'\x0c') => self.pos += 1,
                Some(b'#') => self.skip_comment(),
                Some(b'\\') if matches!(self.byte_at(1), Some(b'\n' | b'\r')) => {
                    self.pos += 1;
                    self.eat_line_break();
                }
                Some(b'\n' | b'\r') if self.bracket_depth > 0 => {
                    self.eat_line_break();
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_comment(&mut self) {
        let start = self.pos;
        self.pos += 1; // '#'
        let body_start = self.pos;
        while !matches!(self.byte(), None | Some(b'\n' | b'\r')) {
            self.pos += 1;
        }
        let end = self.pos;
        if let Some(callback) = self.on_comment.as_mut() {
            let text = &self.text[body_start as usize..end as usize];
            let (start_loc, end_loc) = match &self.line_index {
                Some(index) => (Some(index.line_col(start)), Some(index.line_col(end))),
                None => (None, None),
            };
            callback(text, start, end, start_loc, end_loc);
        }
    }

    fn eat_line_break(&mut self) {
        if self.byte() == Some(b'\r') {
            self.pos += 1;
            if self.byte() == Some(b'\n') {
                self.pos += 1;
            }
        } else if self.byte() == Some(b'\n') {
            self.pos += 1;
        }
    }

    /// End of input: synthesize the final `Newline`, flush open suites as
    /// `Dedent`s, then report `Eof` forever.
    fn finish_input(&mut self) -> Result<Token> {
        if !self.final_newline_emitted {
            self.final_newline_emitted = true;
            self.pending_dedents = self.indent.drain();
            if !self.last_was_newline {
                return Ok(self.make(TokenKind::Newline, self.pos));
            }
        }
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            return Ok(self.make(TokenKind::Dedent, self.pos));
        }
        Ok(Token::new(TokenKind::Eof, TextRange::empty(self.pos)))
    }

    // ========================================================================
    // Names and keywords
    // ========================================================================

    fn scan_name(&mut self) -> Result<Token> {
        let start = self.pos;
        while let Some(c) = self.char_at(self.pos) {
            if c == '_' || c.is_xid_continue() {
                self.pos += c.len_utf8() as TextPos;
            } else {
                break;
            }
        }
        let text = &self.text[start as usize..self.pos as usize];
        match TokenKind::keyword(text) {
            Some(kind) => Ok(self.make(kind, start)),
            None => {
                let value = TokenValue::Name(text.to_string());
                Ok(self.make_value(TokenKind::Name, start, value))
            }
        }
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    fn scan_number(&mut self) -> Result<Token> {
        let start = self.pos;
        let value = if self.byte() == Some(b'0')
            && matches!(self.byte_at(1), Some(b'x' | b'X'))
        {
            self.pos += 2;
            self.read_radix_digits(16, start)?
        } else if self.byte() == Some(b'0') && matches!(self.byte_at(1), Some(b'o' | b'O')) {
            self.pos += 2;
            self.read_radix_digits(8, start)?
        } else if self.byte() == Some(b'0') && matches!(self.byte_at(1), Some(b'b' | b'B')) {
            self.pos += 2;
            self.read_radix_digits(2, start)?
        } else if self.byte() == Some(b'0') && matches!(self.byte_at(1), Some(b'0'..=b'9')) {
            self.scan_legacy_octal(start)?
        } else {
            self.scan_decimal(start)?
        };
        match self.char_at(self.pos) {
            Some(c) if c.is_ascii_digit() => {
                return Err(self.error(&messages::INVALID_NUMBER, &[], start));
            }
            Some(c) if c == '_' || c.is_xid_start() => {
                return Err(self.error(&messages::IDENTIFIER_AFTER_NUMBER, &[], self.pos));
            }
            _ => {}
        }
        Ok(self.make_value(TokenKind::Num, start, TokenValue::Num(value)))
    }

    fn read_radix_digits(&mut self, radix: u32, start: TextPos) -> Result<f64> {
        let mut value = 0f64;
        let mut count = 0u32;
        while let Some(digit) = self.byte().and_then(|b| (b as char).to_digit(radix)) {
            value = value * radix as f64 + digit as f64;
            count += 1;
            self.pos += 1;
        }
        if count == 0 {
            let template = if radix == 16 {
                &messages::EXPECTED_HEX_DIGITS
            } else {
                &messages::INVALID_NUMBER
            };
            return Err(self.error(template, &[], start));
        }
        Ok(value)
    }

    /// A leading zero followed by more digits: an octal literal unless a
    /// digit 8 or 9 forces a decimal reading.
    fn scan_legacy_octal(&mut self, start: TextPos) -> Result<f64> {
        while matches!(self.byte(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        let run = &self.text[start as usize..self.pos as usize];
        if run.bytes().all(|b| b < b'8') {
            if self.strict {
                return Err(self.error(&messages::OCTAL_IN_STRICT_MODE, &[], start));
            }
            Ok(run
                .bytes()
                .fold(0f64, |acc, b| acc * 8.0 + (b - b'0') as f64))
        } else {
            run.parse()
                .map_err(|_| self.error(&messages::INVALID_NUMBER, &[], start))
        }
    }

    fn scan_decimal(&mut self, start: TextPos) -> Result<f64> {
        while matches!(self.byte(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.byte() == Some(b'.') {
            self.pos += 1;
            while matches!(self.byte(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.byte(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.byte(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            let mut digits = 0;
            while matches!(self.byte(), Some(b'0'..=b'9')) {
                self.pos += 1;
                digits += 1;
            }
            if digits == 0 {
                return Err(self.error(&messages::INVALID_NUMBER, &[], start));
            }
        }
        self.text[start as usize..self.pos as usize]
            .parse()
            .map_err(|_| self.error(&messages::INVALID_NUMBER, &[], start))
    }

    // ========================================================================
    // Strings
    // ========================================================================

    fn scan_string(&mut self) -> Result<Token> {
        let start = self.pos;
        let at_statement_start = self.at_statement_start;
        let quote = self.byte().unwrap_or(b'"');
        self.pos += 1;
        let triple = self.byte() == Some(quote) && self.byte_at(1) == Some(quote);
        if triple {
            self.pos += 2;
        }
        let mut value = String::new();
        loop {
            let Some(byte) = self.byte() else {
                return Err(self.error(&messages::UNTERMINATED_STRING, &[], start));
            };
            match byte {
                b if b == quote => {
                    self.pos += 1;
                    if !triple {
                        break;
                    }
                    if self.byte() == Some(quote) && self.byte_at(1) == Some(quote) {
                        self.pos += 2;
                        break;
                    }
                    value.push(quote as char);
                }
                b'\\' => {
                    self.pos += 1;
                    self.read_escape(&mut value, start)?;
                }
                b'\n' | b'\r' => {
                    if !triple {
                        return Err(self.error(&messages::UNTERMINATED_STRING, &[], start));
                    }
                    self.eat_line_break();
                    value.push('\n');
                }
                _ => {
                    let c = self.char_at(self.pos).unwrap_or('\u{fffd}');
                    value.push(c);
                    self.pos += c.len_utf8() as TextPos;
                }
            }
        }
        let kind = if triple || (at_statement_start && self.line_end_follows()) {
            TokenKind::Docstring
        } else {
            TokenKind::Str
        };
        Ok(self.make_value(kind, start, TokenValue::Str(value)))
    }

    /// Whether only trivia remains before the end of the current line.
    fn line_end_follows(&self) -> bool {
        let mut pos = self.pos as usize;
        let bytes = self.text.as_bytes();
        while let Some(&b) = bytes.get(pos) {
            match b {
                b' ' | b'\t' => pos += 1,
                b'#' | b'\n' | b'\r' => return true,
                _ => return false,
            }
        }
        true
    }

    fn read_escape(&mut self, value: &mut String, string_start: TextPos) -> Result<()> {
        let Some(c) = self.char_at(self.pos) else {
            return Err(self.error(&messages::UNTERMINATED_STRING, &[], string_start));
        };
        self.pos += c.len_utf8() as TextPos;
        match c {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '\\' | '\'' | '"' => value.push(c),
            '\n' => {}
            '\r' => {
                if self.byte() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            'x' => {
                let code = self.read_hex_digits(2, &messages::BAD_ESCAPE)?;
                value.push(
                    char::from_u32(code)
                        .ok_or_else(|| self.error(&messages::BAD_ESCAPE, &[], self.pos))?,
                );
            }
            'u' => {
                let code = self.read_hex_digits(4, &messages::INVALID_UNICODE_ESCAPE)?;
                value.push(char::from_u32(code).ok_or_else(|| {
                    self.error(&messages::INVALID_UNICODE_ESCAPE, &[], self.pos)
                })?);
            }
            'U' => {
                let code = self.read_hex_digits(8, &messages::INVALID_UNICODE_ESCAPE)?;
                value.push(char::from_u32(code).ok_or_else(|| {
                    self.error(&messages::INVALID_UNICODE_ESCAPE, &[], self.pos)
                })?);
            }
            '0' if !matches!(self.byte(), Some(b'0'..=b'7')) => value.push('\0'),
            '0'..='7' => {
                if self.strict {
                    return Err(self.error(
                        &messages::OCTAL_ESCAPE_IN_STRICT_MODE,
                        &[],
                        self.pos - 1,
                    ));
                }
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.byte().and_then(|b| (b as char).to_digit(8)) {
                        Some(digit) if code * 8 + digit <= 0xff => {
                            code = code * 8 + digit;
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                value.push(char::from_u32(code).unwrap_or('\0'));
            }
            other => value.push(other),
        }
        Ok(())
    }

    fn read_hex_digits(
        &mut self,
        count: u32,
        template: &'static pytree_diagnostics::MessageTemplate,
    ) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..count {
            match self.byte().and_then(|b| (b as char).to_digit(16)) {
                Some(digit) => {
                    code = code * 16 + digit;
                    self.pos += 1;
                }
                None => return Err(self.error(template, &[], self.pos)),
            }
        }
        Ok(code)
    }

    // ========================================================================
    // Operators and regexes
    // ========================================================================

    fn punct(&mut self, kind: TokenKind) -> Result<Token> {
        let start = self.pos;
        self.pos += 1;
        Ok(self.make(kind, start))
    }

    fn one_or_assign(&mut self, plain: TokenKind, assign: TokenKind) -> Result<Token> {
        let start = self.pos;
        self.pos += 1;
        let kind = if self.byte() == Some(b'=') {
            self.pos += 1;
            assign
        } else {
            plain
        };
        Ok(self.make(kind, start))
    }

    fn scan_eq(&mut self) -> Result<Token> {
        self.one_or_assign(TokenKind::Eq, TokenKind::EqEq)
    }

    fn scan_bang(&mut self) -> Result<Token> {
        let start = self.pos;
        if self.byte_at(1) == Some(b'=') {
            self.pos += 2;
            Ok(self.make(TokenKind::NotEq, start))
        } else {
            Err(self.error(&messages::INVALID_CHARACTER, &["!"], start))
        }
    }

    fn scan_lt(&mut self) -> Result<Token> {
        let start = self.pos;
        let kind = if self.byte_at(1) == Some(b'<') {
            if self.byte_at(2) == Some(b'=') {
                self.pos += 3;
                TokenKind::ShlEq
            } else {
                self.pos += 2;
                TokenKind::Shl
            }
        } else if self.byte_at(1) == Some(b'=') {
            self.pos += 2;
            TokenKind::LtEq
        } else {
            self.pos += 1;
            TokenKind::Lt
        };
        Ok(self.make(kind, start))
    }

    fn scan_gt(&mut self) -> Result<Token> {
        let start = self.pos;
        let kind = if self.byte_at(1) == Some(b'>') {
            if self.byte_at(2) == Some(b'=') {
                self.pos += 3;
                TokenKind::ShrEq
            } else {
                self.pos += 2;
                TokenKind::Shr
            }
        } else if self.byte_at(1) == Some(b'=') {
            self.pos += 2;
            TokenKind::GtEq
        } else {
            self.pos += 1;
            TokenKind::Gt
        };
        Ok(self.make(kind, start))
    }

    fn scan_plus(&mut self) -> Result<Token> {
        self.one_or_assign(TokenKind::Plus, TokenKind::PlusEq)
    }

    fn scan_minus(&mut self) -> Result<Token> {
        let start = self.pos;
        if self.byte_at(1) == Some(b'>') {
            self.pos += 2;
            return Ok(self.make(TokenKind::Arrow, start));
        }
        self.one_or_assign(TokenKind::Minus, TokenKind::MinusEq)
    }

    fn scan_star(&mut self) -> Result<Token> {
        let start = self.pos;
        let kind = if self.byte_at(1) == Some(b'*') {
            if self.byte_at(2) == Some(b'=') {
                self.pos += 3;
                TokenKind::StarStarEq
            } else {
                self.pos += 2;
                TokenKind::StarStar
            }
        } else if self.byte_at(1) == Some(b'=') {
            self.pos += 2;
            TokenKind::StarEq
        } else {
            self.pos += 1;
            TokenKind::Star
        };
        Ok(self.make(kind, start))
    }

    fn scan_slash(&mut self) -> Result<Token> {
        if self.expr_allowed {
            return self.scan_regex();
        }
        let start = self.pos;
        let kind = if self.byte_at(1) == Some(b'/') {
            if self.byte_at(2) == Some(b'=') {
                self.pos += 3;
                TokenKind::SlashSlashEq
            } else {
                self.pos += 2;
                TokenKind::SlashSlash
            }
        } else if self.byte_at(1) == Some(b'=') {
            self.pos += 2;
            TokenKind::SlashEq
        } else {
            self.pos += 1;
            TokenKind::Slash
        };
        Ok(self.make(kind, start))
    }

    fn scan_regex(&mut self) -> Result<Token> {
        let start = self.pos;
        self.pos += 1; // '/'
        let pattern_start = self.pos;
        let mut in_class = false;
        loop {
            match self.byte() {
                None | Some(b'\n' | b'\r') => {
                    return Err(self.error(&messages::UNTERMINATED_REGEX, &[], start));
                }
                Some(b'\\') => {
                    self.pos += 1;
                    if matches!(self.byte(), None | Some(b'\n' | b'\r')) {
                        return Err(self.error(&messages::UNTERMINATED_REGEX, &[], start));
                    }
                    self.pos += self.char_at(self.pos).map_or(1, |c| c.len_utf8()) as TextPos;
                }
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => break,
                _ => {
                    self.pos += self.char_at(self.pos).map_or(1, |c| c.len_utf8()) as TextPos;
                }
            }
        }
        let pattern = self.text[pattern_start as usize..self.pos as usize].to_string();
        self.pos += 1; // closing '/'
        let flags_start = self.pos;
        while let Some(c) = self.char_at(self.pos) {
            if !c.is_xid_continue() {
                break;
            }
            if !"gimsuy".contains(c)
                || self.text[flags_start as usize..self.pos as usize].contains(c)
            {
                return Err(self.error(&messages::INVALID_REGEX_FLAG, &[], self.pos));
            }
            self.pos += 1;
        }
        let flags = self.text[flags_start as usize..self.pos as usize].to_string();
        Ok(self.make_value(TokenKind::Regex, start, TokenValue::Regex { pattern, flags }))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn byte(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos as usize).copied()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos as usize + offset).copied()
    }

    fn char_at(&self, pos: TextPos) -> Option<char> {
        self.text[pos as usize..].chars().next()
    }

    fn make(&mut self, kind: TokenKind, start: TextPos) -> Token {
        self.register(kind);
        Token::new(kind, TextRange::new(start, self.pos))
    }

    fn make_value(&mut self, kind: TokenKind, start: TextPos, value: TokenValue) -> Token {
        let mut token = self.make(kind, start);
        token.value = value;
        token
    }

    fn register(&mut self, kind: TokenKind) {
        self.last_was_newline = kind == TokenKind::Newline;
        self.at_statement_start = matches!(
            kind,
            TokenKind::Newline
                | TokenKind::Indent
                | TokenKind::Dedent
                | TokenKind::Semi
                | TokenKind::Colon
        );
        self.expr_allowed = !matches!(
            kind,
            TokenKind::Name
                | TokenKind::Num
                | TokenKind::Str
                | TokenKind::Docstring
                | TokenKind::Regex
                | TokenKind::True
                | TokenKind::False
                | TokenKind::NoneKw
                | TokenKind::CloseParen
                | TokenKind::CloseBracket
                | TokenKind::CloseBrace
        );
    }

    fn error(
        &self,
        template: &pytree_diagnostics::MessageTemplate,
        args: &[&str],
        pos: TextPos,
    ) -> ParseError {
        let error = ParseError::new(template, args, pos);
        match &self.line_index {
            Some(index) => error.with_loc(index.line_col(pos)),
            None => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(source: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = tokenizer.next_token().expect("scan failure");
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan_all(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_line() {
        assert_eq!(
            kinds("x = 1"),
            vec![
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::Num,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_indent_dedent_balance() {
        let tokens = kinds("if x:\n    pass\n");
        let indents = tokens.iter().filter(|k| **k == TokenKind::Indent).count();
        let dedents = tokens.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(indents, 1);
        assert_eq!(dedents, 1);
    }

    #[test]
    fn test_multi_dedent_at_eof() {
        let tokens = kinds("if a:\n  if b:\n    pass");
        let dedents = tokens.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(dedents, 2);
        // The synthesized newline precedes the dedents.
        assert_eq!(tokens[tokens.len() - 1], TokenKind::Eof);
        assert_eq!(tokens[tokens.len() - 2], TokenKind::Dedent);
    }

    #[test]
    fn test_blank_and_comment_lines_do_not_dedent() {
        let tokens = kinds("if x:\n    a = 1\n\n    # note\n    b = 2\n");
        let dedents = tokens.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(dedents, 1);
    }

    #[test]
    fn test_bracket_suppresses_newline() {
        let tokens = kinds("f(1,\n  2)\n");
        assert!(!tokens[..tokens.len() - 2].contains(&TokenKind::Newline));
    }

    #[test]
    fn test_backslash_continuation() {
        assert_eq!(
            kinds("x = \\\n    1\n"),
            vec![
                TokenKind::Name,
                TokenKind::Eq,
                TokenKind::Num,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        let tokens = scan_all("31 0x1F 0o17 0b101 2.5 1e3");
        let nums: Vec<f64> = tokens.iter().filter_map(|t| t.num()).collect();
        assert_eq!(nums, vec![31.0, 31.0, 15.0, 5.0, 2.5, 1000.0]);
    }

    #[test]
    fn test_strict_octal_literal() {
        let mut tokenizer = Tokenizer::new("017").with_strict(true);
        let err = tokenizer.next_token().unwrap_err();
        assert_eq!(err.code, messages::OCTAL_IN_STRICT_MODE.code);
    }

    #[test]
    fn test_identifier_after_number() {
        let mut tokenizer = Tokenizer::new("3px");
        let err = tokenizer.next_token().unwrap_err();
        assert_eq!(err.code, messages::IDENTIFIER_AFTER_NUMBER.code);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = scan_all(r#"x = 'a\n\x41\u0042'"#);
        assert_eq!(tokens[2].str_value(), Some("a\nAB"));
    }

    #[test]
    fn test_unterminated_string() {
        let mut tokenizer = Tokenizer::new("'abc");
        let err = tokenizer.next_token().unwrap_err();
        assert_eq!(err.code, messages::UNTERMINATED_STRING.code);
        assert!(err.is_lex_error());
    }

    #[test]
    fn test_triple_quoted_is_docstring() {
        let tokens = scan_all("'''line one\nline two'''\n");
        assert_eq!(tokens[0].kind, TokenKind::Docstring);
        assert_eq!(tokens[0].str_value(), Some("line one\nline two"));
    }

    #[test]
    fn test_statement_start_string_is_docstring() {
        let tokens = scan_all("'doc'\nx = 'value'\n");
        assert_eq!(tokens[0].kind, TokenKind::Docstring);
        let strs: Vec<TokenKind> = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Str | TokenKind::Docstring))
            .map(|t| t.kind)
            .collect();
        assert_eq!(strs, vec![TokenKind::Docstring, TokenKind::Str]);
    }

    #[test]
    fn test_operator_maxmunch() {
        assert_eq!(
            kinds("a //= b ** c"),
            vec![
                TokenKind::Name,
                TokenKind::SlashSlashEq,
                TokenKind::Name,
                TokenKind::StarStar,
                TokenKind::Name,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_regex_in_operand_position() {
        let tokens = scan_all("x = /ab+c/gi\n");
        assert_eq!(tokens[2].kind, TokenKind::Regex);
        match &tokens[2].value {
            TokenValue::Regex { pattern, flags } => {
                assert_eq!(pattern, "ab+c");
                assert_eq!(flags, "gi");
            }
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_slash_after_operand_is_division() {
        let tokens = kinds("a / b\n");
        assert_eq!(tokens[1], TokenKind::Slash);
    }

    #[test]
    fn test_inconsistent_dedent() {
        let mut tokenizer = Tokenizer::new("if a:\n        x = 1\n    y = 2\n");
        let err = loop {
            match tokenizer.next_token() {
                Ok(token) if token.kind == TokenKind::Eof => panic!("expected an error"),
                Ok(_) => {}
                Err(err) => break err,
            }
        };
        assert_eq!(err.code, messages::INCONSISTENT_DEDENT.code);
    }

    #[test]
    fn test_on_comment_callback() {
        let mut seen: Vec<(String, TextPos, TextPos)> = Vec::new();
        {
            let mut tokenizer = Tokenizer::new("x = 1  # trailing\n").with_on_comment(
                Box::new(|text, start, end, _, _| {
                    seen.push((text.to_string(), start, end));
                }),
            );
            loop {
                let token = tokenizer.next_token().expect("scan failure");
                if token.kind == TokenKind::Eof {
                    break;
                }
            }
        }
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, " trailing");
        assert_eq!(seen[0].1, 7);
    }

    #[test]
    fn test_keyword_vs_name() {
        let tokens = scan_all("for item in items:\n    pass\n");
        assert_eq!(tokens[0].kind, TokenKind::For);
        assert_eq!(tokens[1].name(), Some("item"));
        assert_eq!(tokens[2].kind, TokenKind::In);
    }
}
