//! The recursive-descent statement parser and precedence-climbing
//! expression parser.
//!
//! The parser owns all mutable parse state: the tokenizer, a small
//! lookahead buffer, the scope tracker, and the node factory. Statements
//! parse into a caller-supplied vector because most surface statements
//! lower to more than one output statement.

use std::collections::VecDeque;
use std::rc::Rc;

use pytree_ast::{
    AssignmentExpression, BlockStatement, BreakStatement, CallExpression, CatchClause,
    ConditionalExpression, ContinueStatement, EmptyStatement, Expr, ExpressionStatement,
    ForInStatement, ForInit, ForStatement, FunctionDeclaration, FunctionExpression, Identifier,
    IfStatement, Literal, LiteralValue, MemberExpression, NewExpression, NodeData, Program,
    RegexLiteral, ReturnStatement, Stmt, ThisExpression, ThrowStatement, TryStatement,
    UnaryExpression, WhileStatement,
};
use pytree_core::{LineIndex, TextPos, TextRange};
use pytree_diagnostics::{messages, MessageTemplate, ParseError, Result};
use pytree_scanner::{Precedence, Token, TokenKind, TokenValue, Tokenizer};
use rustc_hash::FxHashSet;

use crate::factory::{self, Formal, NodeFactory, ParamSpec};
use crate::options::ParseOptions;
use crate::scope::{BindingKind, ScopeTracker};

/// One recognized infix operator, possibly spanning two tokens
/// (`not in`, `is not`).
struct InfixOp {
    kind: TokenKind,
    prec: u8,
    negated: bool,
    two_tokens: bool,
}

/// One `except` clause, before lowering into the single catch handler.
struct ExceptClause {
    etype: Option<Expr>,
    name: Option<String>,
    body: Vec<Stmt>,
    at: TextPos,
}

pub struct Parser<'a> {
    source: &'a str,
    tokenizer: Tokenizer<'a>,
    lookahead: VecDeque<Token>,
    token: Token,
    last_end: TextPos,
    scope: ScopeTracker,
    factory: NodeFactory,
    line_index: Option<Rc<LineIndex>>,
    allow_trailing_commas: bool,
    allow_return_outside_function: bool,
    allow_keyword_as_name: bool,
    program: Option<Program>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, options: ParseOptions<'a>) -> Result<Self> {
        let line_index = options.locations.then(|| Rc::new(LineIndex::new(source)));
        let mut tokenizer = Tokenizer::new(source).with_strict(options.strict_mode);
        if let Some(on_comment) = options.on_comment {
            tokenizer = tokenizer.with_on_comment(on_comment);
        }
        if let Some(index) = &line_index {
            tokenizer = tokenizer.with_line_index(Rc::clone(index));
        }
        let token = tokenizer.next_token()?;
        let factory = NodeFactory::new(
            options.runtime_binding_name,
            options.locations,
            options.ranges,
            options.source_file_name.map(Into::into),
            line_index.clone(),
        );
        Ok(Self {
            source,
            tokenizer,
            lookahead: VecDeque::new(),
            token,
            last_end: 0,
            scope: ScopeTracker::new(),
            factory,
            line_index,
            allow_trailing_commas: options.allow_trailing_commas,
            allow_return_outside_function: options.allow_return_outside_function,
            allow_keyword_as_name: options.allow_keyword_as_name,
            program: options.program,
        })
    }

    pub fn parse_program(mut self) -> Result<Program> {
        let appending = self.program.is_some();
        let mut program = match self.program.take() {
            Some(existing) => existing,
            None => Program {
                data: self.factory.user_data(TextRange::empty(0)),
                body: Vec::new(),
            },
        };
        while !self.at(TokenKind::Eof) {
            self.parse_statement_into(&mut program.body)?;
        }
        if !appending {
            program.data = self.factory.user_data(TextRange::new(0, self.last_end));
        }
        Ok(program)
    }

    // ========================================================================
    // Token plumbing
    // ========================================================================

    fn bump(&mut self) -> Result<()> {
        self.last_end = self.token.range.end;
        self.token = match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.tokenizer.next_token()?,
        };
        Ok(())
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.token.kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> Result<bool> {
        if self.at(kind) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        if self.at(kind) {
            self.bump()
        } else {
            Err(self.error(
                &messages::EXPECTED_0,
                &[kind.text().unwrap_or("token")],
                self.token.range.pos,
            ))
        }
    }

    fn peek_kind(&mut self, n: usize) -> Result<TokenKind> {
        while self.lookahead.len() <= n {
            let token = self.tokenizer.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(self.lookahead[n].kind)
    }

    fn expect_name(&mut self) -> Result<(String, TextRange)> {
        let range = self.token.range;
        if self.token.kind == TokenKind::Name {
            let name = self.token.name().unwrap_or_default().to_string();
            self.bump()?;
            return Ok((name, range));
        }
        if self.token.kind.is_keyword() {
            let text = self.token.kind.text().unwrap_or_default().to_string();
            if self.allow_keyword_as_name {
                self.bump()?;
                return Ok((text, range));
            }
            return Err(self.error(&messages::KEYWORD_AS_NAME, &[&text], range.pos));
        }
        self.unexpected()
    }

    fn unexpected<T>(&self) -> Result<T> {
        let pos = self.token.range.pos;
        if self.token.kind == TokenKind::Eof {
            Err(self.error(&messages::UNEXPECTED_EOF, &[], pos))
        } else {
            Err(self.error(
                &messages::UNEXPECTED_TOKEN,
                &[self.token.kind.describe()],
                pos,
            ))
        }
    }

    fn error(&self, template: &MessageTemplate, args: &[&str], pos: TextPos) -> ParseError {
        let error = ParseError::new(template, args, pos);
        match &self.line_index {
            Some(index) => error.with_loc(index.line_col(pos)),
            None => error,
        }
    }

    fn node_data(&self, start: TextPos) -> NodeData {
        self.factory.user_data(TextRange::new(start, self.last_end))
    }

    fn raw(&self, range: TextRange) -> String {
        self.source[range.to_range()].to_string()
    }

    fn at_line_end(&self) -> bool {
        matches!(
            self.token.kind,
            TokenKind::Newline | TokenKind::Semi | TokenKind::Eof | TokenKind::Dedent
        )
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement_into(&mut self, out: &mut Vec<Stmt>) -> Result<()> {
        match self.token.kind {
            TokenKind::Newline | TokenKind::Semi => {
                self.bump()?;
                Ok(())
            }
            TokenKind::Docstring => match self.peek_kind(0)? {
                TokenKind::Newline | TokenKind::Semi | TokenKind::Eof => {
                    // documentation strings produce no output statement
                    self.bump()?;
                    if self.at(TokenKind::Newline) {
                        self.bump()?;
                    }
                    Ok(())
                }
                _ => self.parse_simple_line(out),
            },
            TokenKind::Indent => {
                Err(self.error(&messages::UNEXPECTED_INDENT, &[], self.token.range.pos))
            }
            TokenKind::Else | TokenKind::Elif | TokenKind::Except | TokenKind::Finally => {
                Err(self.error(&messages::MISALIGNED_ELSE, &[], self.token.range.pos))
            }
            TokenKind::If => {
                let stmt = self.parse_if()?;
                out.push(stmt);
                Ok(())
            }
            TokenKind::While => {
                let stmt = self.parse_while()?;
                out.push(stmt);
                Ok(())
            }
            TokenKind::For => self.parse_for(out),
            TokenKind::Def => {
                let decl = self.parse_def()?;
                out.push(Stmt::FunctionDeclaration(decl));
                Ok(())
            }
            TokenKind::Class => self.parse_class(out),
            TokenKind::Try => {
                let stmt = self.parse_try()?;
                out.push(stmt);
                Ok(())
            }
            TokenKind::Import | TokenKind::From => self.skip_import(),
            _ => self.parse_simple_line(out),
        }
    }

    /// One logical line of `;`-separated simple statements.
    fn parse_simple_line(&mut self, out: &mut Vec<Stmt>) -> Result<()> {
        loop {
            self.parse_small_statement(out)?;
            if self.eat(TokenKind::Semi)? {
                if self.at(TokenKind::Newline) {
                    self.bump()?;
                    break;
                }
                if self.at(TokenKind::Eof) {
                    break;
                }
                continue;
            }
            if self.at(TokenKind::Newline) {
                self.bump()?;
                break;
            }
            if self.at(TokenKind::Eof) || self.at(TokenKind::Dedent) {
                break;
            }
            return self.unexpected();
        }
        Ok(())
    }

    fn parse_small_statement(&mut self, out: &mut Vec<Stmt>) -> Result<()> {
        let start = self.token.range.pos;
        match self.token.kind {
            TokenKind::Pass => {
                self.bump()?;
                out.push(Stmt::Empty(EmptyStatement {
                    data: self.node_data(start),
                }));
                Ok(())
            }
            TokenKind::Break => {
                self.bump()?;
                out.push(Stmt::Break(BreakStatement {
                    data: self.node_data(start),
                }));
                Ok(())
            }
            TokenKind::Continue => {
                self.bump()?;
                out.push(Stmt::Continue(ContinueStatement {
                    data: self.node_data(start),
                }));
                Ok(())
            }
            TokenKind::Return => {
                if !self.scope.in_function() && !self.allow_return_outside_function {
                    return Err(self.error(&messages::RETURN_OUTSIDE_FUNCTION, &[], start));
                }
                self.bump()?;
                let argument = if self.at_line_end() {
                    None
                } else {
                    Some(Box::new(self.parse_expression_list()?))
                };
                out.push(Stmt::Return(ReturnStatement {
                    data: self.node_data(start),
                    argument,
                }));
                Ok(())
            }
            TokenKind::Raise => {
                self.bump()?;
                if self.at_line_end() {
                    return self.unexpected();
                }
                let argument = self.parse_expression_list()?;
                out.push(Stmt::Throw(ThrowStatement {
                    data: self.node_data(start),
                    argument: Box::new(argument),
                }));
                Ok(())
            }
            _ => self.parse_expression_statement(out),
        }
    }

    fn parse_expression_statement(&mut self, out: &mut Vec<Stmt>) -> Result<()> {
        let start = self.token.range.pos;
        let first = self.parse_expression_list()?;
        if self.at(TokenKind::Eq) {
            let mut targets = vec![first];
            while self.eat(TokenKind::Eq)? {
                targets.push(self.parse_expression_list()?);
            }
            let value = targets.pop().expect("value expression follows '='");
            if targets.len() == 1 {
                let target = targets.pop().expect("single target");
                return self.emit_assignment(target, value, out);
            }
            // chained targets share one evaluation of the right side
            let tmp = self.factory.fresh("Tmp");
            out.push(self.factory.var_decl(&tmp, Some(value), start));
            for target in targets {
                let shared = self.factory.ident_expr(&tmp, start);
                self.emit_assignment(target, shared, out)?;
            }
            return Ok(());
        }
        if self.token.kind.is_augmented_assign() {
            return self.emit_augmented(first, start, out);
        }
        out.push(Stmt::Expression(ExpressionStatement {
            data: self.node_data(start),
            expression: Box::new(first),
        }));
        Ok(())
    }

    fn emit_assignment(&mut self, target: Expr, value: Expr, out: &mut Vec<Stmt>) -> Result<()> {
        let at = target.data().range.pos;
        match self.factory.into_tuple_target(target) {
            Ok(elements) => {
                let tmp = self.factory.fresh("Right");
                out.push(self.factory.var_decl(&tmp, Some(value), at));
                for (index, element) in elements.into_iter().enumerate() {
                    let item = self.factory.computed(
                        self.factory.ident_expr(&tmp, at),
                        self.factory.num(index as f64, at),
                        at,
                    );
                    self.emit_assignment(element, item, out)?;
                }
                Ok(())
            }
            Err(target) => match target {
                Expr::Identifier(id) => {
                    self.bind_identifier(id, value, out);
                    Ok(())
                }
                member @ Expr::Member(_) => {
                    out.push(self.factory.assign_stmt(member, value));
                    Ok(())
                }
                other => Err(self.error(&messages::ASSIGN_TO_RVALUE, &[], other.data().range.pos)),
            },
        }
    }

    /// Bind an identifier target: a declaration on first assignment in
    /// the frame, a plain assignment afterwards, and an instance-member
    /// store inside a class body.
    fn bind_identifier(&mut self, id: Identifier, value: Expr, out: &mut Vec<Stmt>) {
        let at = id.data.range.pos;
        if self.scope.in_class_frame() {
            self.scope.declare(&id.name, BindingKind::Variable);
            let member = self
                .factory
                .member(self.factory.this_expr(at), &id.name, at);
            out.push(self.factory.assign_stmt(member, value));
            return;
        }
        if self.scope.exists(&id.name) {
            out.push(self.factory.assign_stmt(Expr::Identifier(id), value));
        } else {
            self.scope.declare(&id.name, BindingKind::Variable);
            let declaration = pytree_ast::VariableDeclaration {
                data: self.factory.synth_data(at),
                kind: "var",
                declarations: vec![pytree_ast::VariableDeclarator {
                    data: self.factory.synth_data(at),
                    id,
                    init: Some(Box::new(value)),
                }],
            };
            out.push(Stmt::VariableDeclaration(declaration));
        }
    }

    fn emit_augmented(&mut self, target: Expr, start: TextPos, out: &mut Vec<Stmt>) -> Result<()> {
        let op = self.token.kind;
        self.bump()?;
        let value = self.parse_expression_list()?;
        match &target {
            Expr::Identifier(id) => {
                if !self.scope.exists(&id.name) {
                    self.scope.declare(&id.name, BindingKind::Variable);
                }
            }
            Expr::Member(_) => {}
            other => {
                return Err(self.error(&messages::ASSIGN_TO_RVALUE, &[], other.data().range.pos));
            }
        }
        let stmt = if let Some(operator) = op.augmented_js_operator() {
            self.factory.expr_stmt(Expr::Assignment(AssignmentExpression {
                data: self.node_data(start),
                operator,
                left: Box::new(target),
                right: Box::new(value),
            }))
        } else {
            // +=, *=, //= and **= route through the same lowering as
            // their binary forms
            let binary_op = match op {
                TokenKind::PlusEq => TokenKind::Plus,
                TokenKind::StarEq => TokenKind::Star,
                TokenKind::SlashSlashEq => TokenKind::SlashSlash,
                _ => TokenKind::StarStar,
            };
            let lowered = self.factory.lower_binary(
                binary_op,
                false,
                target.clone(),
                value,
                self.factory.synth_data(start),
            );
            self.factory.assign_stmt(target, lowered)
        };
        out.push(stmt);
        Ok(())
    }

    // ========================================================================
    // Suites and compound statements
    // ========================================================================

    /// An indented block, or the single-line `: stmt` form.
    fn parse_suite(&mut self) -> Result<Vec<Stmt>> {
        self.expect(TokenKind::Colon)?;
        let mut body = Vec::new();
        if self.eat(TokenKind::Newline)? {
            if !self.at(TokenKind::Indent) {
                return Err(self.error(
                    &messages::EXPECTED_INDENTED_BLOCK,
                    &[],
                    self.token.range.pos,
                ));
            }
            self.bump()?;
            while !self.at(TokenKind::Dedent) && !self.at(TokenKind::Eof) {
                self.parse_statement_into(&mut body)?;
            }
            self.eat(TokenKind::Dedent)?;
        } else {
            self.parse_simple_line(&mut body)?;
        }
        Ok(body)
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let start = self.token.range.pos;
        self.bump()?; // `if` or `elif`
        let test = self.parse_expression_list()?;
        let body_start = self.token.range.pos;
        let consequent = self.parse_suite()?;
        let consequent = Stmt::Block(BlockStatement {
            data: self.node_data(body_start),
            body: consequent,
        });
        let alternate = if self.at(TokenKind::Elif) {
            Some(Box::new(self.parse_if()?))
        } else if self.at(TokenKind::Else) {
            let else_start = self.token.range.pos;
            self.bump()?;
            let body = self.parse_suite()?;
            Some(Box::new(Stmt::Block(BlockStatement {
                data: self.node_data(else_start),
                body,
            })))
        } else {
            None
        };
        Ok(Stmt::If(IfStatement {
            data: self.node_data(start),
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate,
        }))
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        let start = self.token.range.pos;
        self.bump()?;
        let test = self.parse_expression_list()?;
        let body_start = self.token.range.pos;
        let body = self.parse_suite()?;
        Ok(Stmt::While(WhileStatement {
            data: self.node_data(start),
            test: Box::new(test),
            body: Box::new(Stmt::Block(BlockStatement {
                data: self.node_data(body_start),
                body,
            })),
        }))
    }

    fn parse_for(&mut self, out: &mut Vec<Stmt>) -> Result<()> {
        let start = self.token.range.pos;
        self.bump()?;
        let target = self.parse_target_list()?;
        self.expect(TokenKind::In)?;
        let iterable = self.parse_expression_list()?;
        let new_names = self.declare_loop_target(&target)?;
        let body = self.parse_suite()?;
        self.lower_for(target, iterable, body, &new_names, start, out)
    }

    /// The dual-path `for` lowering: an indexed loop for runtime
    /// sequences, a property-enumeration loop for everything else, each
    /// carrying its own copy of the body.
    fn lower_for(
        &mut self,
        target: Expr,
        iterable: Expr,
        body: Vec<Stmt>,
        new_names: &FxHashSet<String>,
        at: TextPos,
        out: &mut Vec<Stmt>,
    ) -> Result<()> {
        let right = self.factory.fresh("Right");
        out.push(self.factory.var_decl(&right, Some(iterable), at));

        let index = self.factory.fresh("Index");
        let mut indexed_body = Vec::new();
        let element = self.factory.computed(
            self.factory.ident_expr(&right, at),
            self.factory.ident_expr(&index, at),
            at,
        );
        self.emit_loop_binding(&target, element, new_names, at, &mut indexed_body)?;
        indexed_body.extend(body.iter().cloned());
        let indexed = Stmt::For(ForStatement {
            data: self.factory.synth_data(at),
            init: Some(ForInit::Declaration(self.factory.var_declaration(
                &index,
                Some(self.factory.num(0.0, at)),
                at,
            ))),
            test: Some(Box::new(self.factory.binary(
                "<",
                self.factory.ident_expr(&index, at),
                self.factory
                    .member(self.factory.ident_expr(&right, at), "length", at),
                at,
            ))),
            update: Some(Box::new(
                self.factory
                    .prefix_increment(self.factory.ident_expr(&index, at), at),
            )),
            body: Box::new(Stmt::Block(self.factory.block(indexed_body, at))),
        });

        let (left, mut enum_body) = match &target {
            Expr::Identifier(id) => {
                let left = if new_names.contains(&id.name) {
                    ForInit::Declaration(self.factory.var_declaration(&id.name, None, at))
                } else {
                    ForInit::Expression(Box::new(Expr::Identifier(id.clone())))
                };
                (left, Vec::new())
            }
            _ => {
                let key = self.factory.fresh("Key");
                let mut prefix = Vec::new();
                let value = self.factory.ident_expr(&key, at);
                self.emit_loop_binding(&target, value, new_names, at, &mut prefix)?;
                (
                    ForInit::Declaration(self.factory.var_declaration(&key, None, at)),
                    prefix,
                )
            }
        };
        enum_body.extend(body);
        let enumeration = Stmt::ForIn(ForInStatement {
            data: self.factory.synth_data(at),
            left,
            right: Box::new(self.factory.ident_expr(&right, at)),
            body: Box::new(Stmt::Block(self.factory.block(enum_body, at))),
        });

        let guard = self.factory.binary(
            "instanceof",
            self.factory.ident_expr(&right, at),
            self.factory.sequence_marker(at),
            at,
        );
        out.push(
            self.factory
                .if_stmt(guard, vec![indexed], Some(vec![enumeration]), at),
        );
        Ok(())
    }

    /// Bind a loop target from a per-iteration value, unpacking tuples.
    fn emit_loop_binding(
        &mut self,
        target: &Expr,
        value: Expr,
        new_names: &FxHashSet<String>,
        at: TextPos,
        out: &mut Vec<Stmt>,
    ) -> Result<()> {
        match target {
            Expr::Identifier(id) => {
                if new_names.contains(&id.name) {
                    out.push(self.factory.var_decl(&id.name, Some(value), at));
                } else {
                    out.push(self.factory.assign_stmt(Expr::Identifier(id.clone()), value));
                }
                Ok(())
            }
            Expr::Member(_) => {
                out.push(self.factory.assign_stmt(target.clone(), value));
                Ok(())
            }
            other => match self.factory.tuple_target_slice(other).map(<[Expr]>::to_vec) {
                Some(elements) => {
                    let tmp = self.factory.fresh("Item");
                    out.push(self.factory.var_decl(&tmp, Some(value), at));
                    for (index, element) in elements.iter().enumerate() {
                        let item = self.factory.computed(
                            self.factory.ident_expr(&tmp, at),
                            self.factory.num(index as f64, at),
                            at,
                        );
                        self.emit_loop_binding(element, item, new_names, at, out)?;
                    }
                    Ok(())
                }
                None => Err(self.error(&messages::ASSIGN_TO_RVALUE, &[], other.data().range.pos)),
            },
        }
    }

    /// Declare a loop target's names in the current frame and report
    /// which of them are new.
    fn declare_loop_target(&mut self, target: &Expr) -> Result<FxHashSet<String>> {
        let mut new_names = FxHashSet::default();
        self.collect_target_names(target, &mut new_names)?;
        Ok(new_names)
    }

    fn collect_target_names(
        &mut self,
        target: &Expr,
        new_names: &mut FxHashSet<String>,
    ) -> Result<()> {
        match target {
            Expr::Identifier(id) => {
                if !self.scope.exists(&id.name) {
                    self.scope.declare(&id.name, BindingKind::Variable);
                    new_names.insert(id.name.clone());
                }
                Ok(())
            }
            Expr::Member(_) => Ok(()),
            other => match self.factory.tuple_target_slice(other).map(<[Expr]>::to_vec) {
                Some(elements) => {
                    for element in &elements {
                        self.collect_target_names(element, new_names)?;
                    }
                    Ok(())
                }
                None => Err(self.error(&messages::ASSIGN_TO_RVALUE, &[], other.data().range.pos)),
            },
        }
    }

    /// Comma-separated loop targets, parsed below operator level so the
    /// `in` keyword terminates them.
    fn parse_target_list(&mut self) -> Result<Expr> {
        let start = self.token.range.pos;
        let first = self.parse_postfix()?;
        if !self.at(TokenKind::Comma) {
            return Ok(first);
        }
        let mut elements = vec![first];
        while self.eat(TokenKind::Comma)? {
            if self.at(TokenKind::In) {
                break;
            }
            elements.push(self.parse_postfix()?);
        }
        Ok(self.factory.tuple_literal(elements, self.node_data(start)))
    }

    // ========================================================================
    // Functions and classes
    // ========================================================================

    fn parse_def(&mut self) -> Result<FunctionDeclaration> {
        let start = self.token.range.pos;
        self.bump()?;
        let (name, name_range) = self.expect_name()?;
        let in_class = self.scope.in_class_frame();
        self.scope.declare(&name, BindingKind::Function);
        let (spec, this_alias) = self.parse_param_list(in_class)?;
        if self.eat(TokenKind::Arrow)? {
            // return annotations are accepted and discarded
            let _ = self.parse_test()?;
        }
        self.scope.enter_function();
        if let Some(alias) = &this_alias {
            self.scope.set_this_alias(alias);
        }
        for formal in &spec.formals {
            self.scope.declare(&formal.name, BindingKind::Variable);
        }
        if let Some(star) = &spec.star {
            self.scope.declare(star, BindingKind::Variable);
        }
        if let Some(kwargs) = &spec.kwargs {
            self.scope.declare(kwargs, BindingKind::Variable);
        }
        let stmts = self.parse_suite()?;
        self.scope.exit();
        let mut body = if spec.needs_prologue() {
            self.factory.params_prologue(&spec, start)
        } else {
            Vec::new()
        };
        body.extend(stmts);
        let params = spec
            .formals
            .iter()
            .map(|formal| self.factory.ident(&formal.name, start))
            .collect();
        Ok(FunctionDeclaration {
            data: self.node_data(start),
            id: Identifier {
                data: self.factory.user_data(name_range),
                name,
            },
            params,
            body: Box::new(self.factory.block(body, start)),
        })
    }

    fn parse_param_list(&mut self, in_class: bool) -> Result<(ParamSpec, Option<String>)> {
        self.expect(TokenKind::OpenParen)?;
        let mut spec = ParamSpec::default();
        let mut seen_default = false;
        let mut this_alias = None;
        if in_class
            && self.at(TokenKind::Name)
            && matches!(
                self.peek_kind(0)?,
                TokenKind::Comma | TokenKind::CloseParen
            )
        {
            // the first parameter of a method names the instance
            let (name, _) = self.expect_name()?;
            this_alias = Some(name);
            let _ = self.eat(TokenKind::Comma)?;
        }
        while !self.at(TokenKind::CloseParen) {
            self.parse_param_item(&mut spec, &mut seen_default)?;
            if !self.eat(TokenKind::Comma)? {
                break;
            }
            if self.at(TokenKind::CloseParen) {
                if !self.allow_trailing_commas {
                    return Err(self.error(&messages::TRAILING_COMMA, &[], self.last_end));
                }
                break;
            }
        }
        self.expect(TokenKind::CloseParen)?;
        Ok((spec, this_alias))
    }

    fn parse_param_item(&mut self, spec: &mut ParamSpec, seen_default: &mut bool) -> Result<()> {
        match self.token.kind {
            TokenKind::Star => {
                let pos = self.token.range.pos;
                self.bump()?;
                let (name, _) = self.expect_name()?;
                if spec.star.replace(name).is_some() {
                    return Err(self.error(&messages::DUPLICATE_STAR_PARAM, &["*"], pos));
                }
            }
            TokenKind::StarStar => {
                let pos = self.token.range.pos;
                self.bump()?;
                let (name, _) = self.expect_name()?;
                if spec.kwargs.replace(name).is_some() {
                    return Err(self.error(&messages::DUPLICATE_STAR_PARAM, &["**"], pos));
                }
            }
            _ => {
                let pos = self.token.range.pos;
                let (name, _) = self.expect_name()?;
                let default = if self.eat(TokenKind::Eq)? {
                    *seen_default = true;
                    Some(self.parse_test()?)
                } else {
                    if *seen_default && spec.star.is_none() {
                        return Err(self.error(&messages::DEFAULT_BEFORE_STAR, &[], pos));
                    }
                    None
                };
                spec.formals.push(Formal { name, default });
            }
        }
        Ok(())
    }

    fn parse_lambda(&mut self) -> Result<Expr> {
        let start = self.token.range.pos;
        self.bump()?;
        let mut spec = ParamSpec::default();
        let mut seen_default = false;
        while !self.at(TokenKind::Colon) {
            self.parse_param_item(&mut spec, &mut seen_default)?;
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::Colon)?;
        self.scope.enter_function();
        for formal in &spec.formals {
            self.scope.declare(&formal.name, BindingKind::Variable);
        }
        if let Some(star) = &spec.star {
            self.scope.declare(star, BindingKind::Variable);
        }
        if let Some(kwargs) = &spec.kwargs {
            self.scope.declare(kwargs, BindingKind::Variable);
        }
        let value = self.parse_test()?;
        self.scope.exit();
        let mut body = if spec.needs_prologue() {
            self.factory.params_prologue(&spec, start)
        } else {
            Vec::new()
        };
        body.push(self.factory.return_stmt(Some(value), start));
        let params = spec
            .formals
            .iter()
            .map(|formal| self.factory.ident(&formal.name, start))
            .collect();
        Ok(Expr::Function(FunctionExpression {
            data: self.node_data(start),
            id: None,
            params,
            body: Box::new(self.factory.block(body, start)),
        }))
    }

    /// A class lowers to a constructor function, an optional prototype
    /// link, and one prototype assignment per method.
    fn parse_class(&mut self, out: &mut Vec<Stmt>) -> Result<()> {
        let start = self.token.range.pos;
        self.bump()?;
        let (name, name_range) = self.expect_name()?;
        let mut base: Option<Expr> = None;
        if self.eat(TokenKind::OpenParen)? {
            if !self.at(TokenKind::CloseParen) {
                base = Some(self.parse_test()?);
                if self.at(TokenKind::Comma) && self.peek_kind(0)? != TokenKind::CloseParen {
                    return Err(self.error(
                        &messages::MULTIPLE_INHERITANCE,
                        &[],
                        self.token.range.pos,
                    ));
                }
                let _ = self.eat(TokenKind::Comma)?;
            }
            self.expect(TokenKind::CloseParen)?;
        }
        self.scope.declare(&name, BindingKind::Class);
        self.scope.enter_class();
        let suite = self.parse_suite()?;
        self.scope.exit();

        let mut methods: Vec<FunctionDeclaration> = Vec::new();
        let mut frame_stmts: Vec<Stmt> = Vec::new();
        for stmt in suite {
            match stmt {
                Stmt::FunctionDeclaration(decl) => methods.push(decl),
                other => frame_stmts.push(other),
            }
        }
        let init = methods
            .iter()
            .position(|m| m.id.name == "__init__")
            .map(|index| methods.remove(index));

        let at = start;
        let mut ctor_body: Vec<Stmt> = Vec::new();
        if let Some(base_expr) = &base {
            let bound = if init.is_some() {
                self.factory.call(
                    self.factory.member(base_expr.clone(), "call", at),
                    vec![self.factory.this_expr(at)],
                    at,
                )
            } else {
                self.factory.call(
                    self.factory.member(base_expr.clone(), "apply", at),
                    vec![
                        self.factory.this_expr(at),
                        self.factory.ident_expr("arguments", at),
                    ],
                    at,
                )
            };
            ctor_body.push(self.factory.expr_stmt(bound));
        }
        ctor_body.extend(frame_stmts);
        let params = match &init {
            Some(init) => init.params.clone(),
            None => Vec::new(),
        };
        if let Some(init) = init {
            ctor_body.extend(init.body.body);
        }

        out.push(Stmt::FunctionDeclaration(FunctionDeclaration {
            data: self.node_data(start),
            id: Identifier {
                data: self.factory.user_data(name_range),
                name: name.clone(),
            },
            params,
            body: Box::new(self.factory.block(ctor_body, at)),
        }));

        if let Some(base_expr) = &base {
            let proto = self
                .factory
                .member(self.factory.ident_expr(&name, at), "prototype", at);
            let create = self.factory.call(
                self.factory
                    .member(self.factory.ident_expr("Object", at), "create", at),
                vec![self.factory.member(base_expr.clone(), "prototype", at)],
                at,
            );
            out.push(self.factory.assign_stmt(proto, create));
        }

        for method in methods {
            let slot = self.factory.member(
                self.factory
                    .member(self.factory.ident_expr(&name, at), "prototype", at),
                &method.id.name,
                at,
            );
            let function = Expr::Function(FunctionExpression {
                data: method.data,
                id: None,
                params: method.params,
                body: method.body,
            });
            out.push(self.factory.assign_stmt(slot, function));
        }
        Ok(())
    }

    fn parse_try(&mut self) -> Result<Stmt> {
        let start = self.token.range.pos;
        self.bump()?;
        let block_start = self.token.range.pos;
        let block_body = self.parse_suite()?;
        let block = BlockStatement {
            data: self.node_data(block_start),
            body: block_body,
        };

        let mut clauses: Vec<ExceptClause> = Vec::new();
        while self.at(TokenKind::Except) {
            let at = self.token.range.pos;
            self.bump()?;
            let etype = if !self.at(TokenKind::Colon) {
                Some(self.parse_test()?)
            } else {
                None
            };
            let name = if etype.is_some()
                && (self.eat(TokenKind::As)? || self.eat(TokenKind::Comma)?)
            {
                let (n, _) = self.expect_name()?;
                self.scope.declare(&n, BindingKind::Variable);
                Some(n)
            } else {
                None
            };
            let body = self.parse_suite()?;
            clauses.push(ExceptClause {
                etype,
                name,
                body,
                at,
            });
        }
        let finalizer = if self.at(TokenKind::Finally) {
            let fstart = self.token.range.pos;
            self.bump()?;
            let body = self.parse_suite()?;
            Some(Box::new(BlockStatement {
                data: self.node_data(fstart),
                body,
            }))
        } else {
            None
        };
        if clauses.is_empty() && finalizer.is_none() {
            return Err(self.error(
                &messages::EXPECTED_EXCEPT_OR_FINALLY,
                &[],
                self.token.range.pos,
            ));
        }
        let handler = self.build_catch(clauses, start);
        Ok(Stmt::Try(TryStatement {
            data: self.node_data(start),
            block: Box::new(block),
            handler,
            finalizer,
        }))
    }

    /// Fold the `except` clauses into one catch handler. Typed clauses
    /// become an instanceof chain ending in a rethrow unless a bare
    /// clause supplies the final branch.
    fn build_catch(&mut self, clauses: Vec<ExceptClause>, at: TextPos) -> Option<CatchClause> {
        if clauses.is_empty() {
            return None;
        }
        let param_name = self.factory.fresh("Err");
        let mut tail = vec![Stmt::Throw(ThrowStatement {
            data: self.factory.synth_data(at),
            argument: Box::new(self.factory.ident_expr(&param_name, at)),
        })];
        for clause in clauses.into_iter().rev() {
            match clause.etype {
                None => tail = clause.body,
                Some(etype) => {
                    let mut body = Vec::new();
                    if let Some(name) = clause.name {
                        body.push(self.factory.var_decl(
                            &name,
                            Some(self.factory.ident_expr(&param_name, clause.at)),
                            clause.at,
                        ));
                    }
                    body.extend(clause.body);
                    let test = self.factory.binary(
                        "instanceof",
                        self.factory.ident_expr(&param_name, clause.at),
                        etype,
                        clause.at,
                    );
                    tail = vec![self.factory.if_stmt(test, body, Some(tail), clause.at)];
                }
            }
        }
        Some(CatchClause {
            data: self.factory.synth_data(at),
            param: self.factory.ident(&param_name, at),
            body: Box::new(self.factory.block(tail, at)),
        })
    }

    /// Module imports are skipped wholesale; the runtime provides the
    /// builtin environment and everything else is out of scope.
    fn skip_import(&mut self) -> Result<()> {
        while !matches!(self.token.kind, TokenKind::Newline | TokenKind::Eof) {
            self.bump()?;
        }
        if self.at(TokenKind::Newline) {
            self.bump()?;
        }
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// A comma-separated expression list; two or more elements (or a
    /// trailing comma) make a tuple.
    fn parse_expression_list(&mut self) -> Result<Expr> {
        let start = self.token.range.pos;
        let first = self.parse_test()?;
        if !self.at(TokenKind::Comma) {
            return Ok(first);
        }
        let mut elements = vec![first];
        while self.eat(TokenKind::Comma)? {
            if self.at_expression_list_end() {
                break;
            }
            elements.push(self.parse_test()?);
        }
        Ok(self.factory.tuple_literal(elements, self.node_data(start)))
    }

    fn at_expression_list_end(&self) -> bool {
        matches!(
            self.token.kind,
            TokenKind::Newline
                | TokenKind::Semi
                | TokenKind::Eof
                | TokenKind::Dedent
                | TokenKind::Eq
                | TokenKind::CloseParen
                | TokenKind::CloseBracket
                | TokenKind::CloseBrace
                | TokenKind::Colon
        ) || self.token.kind.is_augmented_assign()
    }

    /// Conditional expressions and lambdas sit above the operator grammar.
    fn parse_test(&mut self) -> Result<Expr> {
        if self.at(TokenKind::Lambda) {
            return self.parse_lambda();
        }
        let start = self.token.range.pos;
        let expr = self.parse_or_test()?;
        if self.at(TokenKind::If) {
            self.bump()?;
            let test = self.parse_or_test()?;
            self.expect(TokenKind::Else)?;
            let alternate = self.parse_test()?;
            return Ok(Expr::Conditional(ConditionalExpression {
                data: self.node_data(start),
                test: Box::new(test),
                consequent: Box::new(expr),
                alternate: Box::new(alternate),
            }));
        }
        Ok(expr)
    }

    fn parse_or_test(&mut self) -> Result<Expr> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr> {
        let start = self.token.range.pos;
        let left = self.parse_unary()?;
        self.parse_binary_continue(left, min_prec, start)
    }

    fn parse_binary_continue(
        &mut self,
        mut left: Expr,
        min_prec: u8,
        start: TextPos,
    ) -> Result<Expr> {
        loop {
            let Some(op) = self.classify_infix()? else {
                break;
            };
            if op.prec < min_prec {
                break;
            }
            self.bump()?;
            if op.two_tokens {
                self.bump()?;
            }
            let next_min = if op.kind.is_right_associative() {
                op.prec
            } else {
                op.prec + 1
            };
            let right = self.parse_binary(next_min)?;
            left = self
                .factory
                .lower_binary(op.kind, op.negated, left, right, self.node_data(start));
        }
        Ok(left)
    }

    fn classify_infix(&mut self) -> Result<Option<InfixOp>> {
        let kind = self.token.kind;
        match kind {
            TokenKind::Not => {
                if self.peek_kind(0)? == TokenKind::In {
                    Ok(Some(InfixOp {
                        kind: TokenKind::In,
                        prec: Precedence::Comparison as u8,
                        negated: true,
                        two_tokens: true,
                    }))
                } else {
                    Ok(None)
                }
            }
            TokenKind::Is => {
                let negated = self.peek_kind(0)? == TokenKind::Not;
                Ok(Some(InfixOp {
                    kind: TokenKind::Is,
                    prec: Precedence::Comparison as u8,
                    negated,
                    two_tokens: negated,
                }))
            }
            _ => Ok(kind.binary_precedence().map(|prec| InfixOp {
                kind,
                prec: prec as u8,
                negated: false,
                two_tokens: false,
            })),
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let start = self.token.range.pos;
        match self.token.kind {
            TokenKind::Not | TokenKind::Tilde => {
                let operator = if self.at(TokenKind::Not) { "!" } else { "~" };
                self.bump()?;
                let argument = self.parse_unary()?;
                Ok(Expr::Unary(UnaryExpression {
                    data: self.node_data(start),
                    operator,
                    prefix: true,
                    argument: Box::new(argument),
                }))
            }
            TokenKind::Minus | TokenKind::Plus => {
                let operator = if self.at(TokenKind::Minus) { "-" } else { "+" };
                self.bump()?;
                let operand_start = self.token.range.pos;
                let operand = self.parse_unary()?;
                // only `**` binds tighter than a unary sign
                let argument = self.parse_binary_continue(
                    operand,
                    Precedence::Unary as u8 + 1,
                    operand_start,
                )?;
                Ok(Expr::Unary(UnaryExpression {
                    data: self.node_data(start),
                    operator,
                    prefix: true,
                    argument: Box::new(argument),
                }))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let start = self.token.range.pos;
        let mut expr = if self.token.kind == TokenKind::Name
            && self.peek_kind(0)? == TokenKind::OpenParen
        {
            self.parse_name_call(start)?
        } else {
            self.parse_atom()?
        };
        loop {
            match self.token.kind {
                TokenKind::Dot => {
                    self.bump()?;
                    let (name, name_range) = self.expect_name()?;
                    let property = Expr::Identifier(Identifier {
                        data: self.factory.user_data(name_range),
                        name,
                    });
                    expr = Expr::Member(MemberExpression {
                        data: self.node_data(start),
                        object: Box::new(expr),
                        property: Box::new(property),
                        computed: false,
                    });
                }
                TokenKind::OpenParen => {
                    let (arguments, _) = self.parse_arguments()?;
                    expr = Expr::Call(CallExpression {
                        data: self.node_data(start),
                        callee: Box::new(expr),
                        arguments,
                    });
                }
                TokenKind::OpenBracket => {
                    expr = self.parse_subscript(expr, start)?;
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// A call whose callee is a bare name gets the scope-driven special
    /// cases: the `len` fast path and known-class constructor calls.
    fn parse_name_call(&mut self, start: TextPos) -> Result<Expr> {
        let name = self.token.name().unwrap_or_default().to_string();
        let name_range = self.token.range;
        self.bump()?;
        let (arguments, used_params_obj) = self.parse_arguments()?;
        let data = self.node_data(start);
        if name == "len"
            && !used_params_obj
            && arguments.len() == 1
            && !self.scope.bound_anywhere("len")
        {
            let argument = arguments.into_iter().next().expect("one argument");
            return Ok(Expr::Member(MemberExpression {
                data,
                object: Box::new(argument),
                property: Box::new(self.factory.ident_expr("length", start)),
                computed: false,
            }));
        }
        let callee_id = Identifier {
            data: self.factory.user_data(name_range),
            name: name.clone(),
        };
        if self.scope.is_known_constructor(&name) {
            return Ok(Expr::New(NewExpression {
                data,
                callee: Box::new(Expr::Identifier(callee_id)),
                arguments,
            }));
        }
        let callee = self.resolve_name(callee_id);
        Ok(Expr::Call(CallExpression {
            data,
            callee: Box::new(callee),
            arguments,
        }))
    }

    /// `( positional* (name=value | *seq | **map)* )`; keyword and splat
    /// arguments fold into one trailing parameter object.
    fn parse_arguments(&mut self) -> Result<(Vec<Expr>, bool)> {
        let at = self.token.range.pos;
        self.expect(TokenKind::OpenParen)?;
        let mut positional = Vec::new();
        let mut entries: Vec<(String, Expr)> = Vec::new();
        while !self.at(TokenKind::CloseParen) {
            match self.token.kind {
                TokenKind::Star => {
                    self.bump()?;
                    let value = self.parse_test()?;
                    entries.push(("*".to_string(), value));
                }
                TokenKind::StarStar => {
                    self.bump()?;
                    let value = self.parse_test()?;
                    entries.push(("**".to_string(), value));
                }
                TokenKind::Name => {
                    if self.peek_kind(0)? == TokenKind::Eq {
                        let key = self.token.name().unwrap_or_default().to_string();
                        self.bump()?;
                        self.bump()?;
                        let value = self.parse_test()?;
                        entries.push((key, value));
                    } else {
                        positional.push(self.parse_test()?);
                    }
                }
                _ => positional.push(self.parse_test()?),
            }
            let comma_pos = self.token.range.pos;
            if !self.eat(TokenKind::Comma)? {
                break;
            }
            if self.at(TokenKind::CloseParen) {
                if !self.allow_trailing_commas {
                    return Err(self.error(&messages::TRAILING_COMMA, &[], comma_pos));
                }
                break;
            }
        }
        self.expect(TokenKind::CloseParen)?;
        let used_params_obj = !entries.is_empty();
        if used_params_obj {
            positional.push(self.factory.create_params_obj(entries, at));
        }
        Ok((positional, used_params_obj))
    }

    fn parse_subscript(&mut self, object: Expr, start: TextPos) -> Result<Expr> {
        self.bump()?; // '['
        let lower = if self.at(TokenKind::Colon) {
            None
        } else {
            Some(self.parse_test()?)
        };
        if self.eat(TokenKind::Colon)? {
            let upper = if self.at(TokenKind::Colon) || self.at(TokenKind::CloseBracket) {
                None
            } else {
                Some(self.parse_test()?)
            };
            let step = if self.eat(TokenKind::Colon)? {
                if self.at(TokenKind::CloseBracket) {
                    None
                } else {
                    Some(self.parse_test()?)
                }
            } else {
                None
            };
            self.expect(TokenKind::CloseBracket)?;
            return Ok(self
                .factory
                .slice_call(object, lower, upper, step, self.node_data(start)));
        }
        let Some(index) = lower else {
            return self.unexpected();
        };
        self.expect(TokenKind::CloseBracket)?;
        Ok(self
            .factory
            .subscript_load(object, index, self.node_data(start)))
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let start = self.token.range.pos;
        match self.token.kind {
            TokenKind::Name => {
                let name = self.token.name().unwrap_or_default().to_string();
                let range = self.token.range;
                self.bump()?;
                let id = Identifier {
                    data: self.factory.user_data(range),
                    name,
                };
                // assignment targets stay plain identifiers
                if self.at(TokenKind::Eq) || self.token.kind.is_augmented_assign() {
                    return Ok(Expr::Identifier(id));
                }
                Ok(self.resolve_name(id))
            }
            TokenKind::Num => {
                let value = self.token.num().unwrap_or(0.0);
                let range = self.token.range;
                self.bump()?;
                Ok(Expr::Literal(Literal {
                    data: self.factory.user_data(range),
                    value: LiteralValue::Num(value),
                    raw: Some(self.raw(range)),
                    regex: None,
                }))
            }
            TokenKind::Str | TokenKind::Docstring => {
                let value = self.token.str_value().unwrap_or_default().to_string();
                let range = self.token.range;
                self.bump()?;
                Ok(Expr::Literal(Literal {
                    data: self.factory.user_data(range),
                    value: LiteralValue::Str(value),
                    raw: Some(self.raw(range)),
                    regex: None,
                }))
            }
            TokenKind::Regex => {
                let (pattern, flags) = match &self.token.value {
                    TokenValue::Regex { pattern, flags } => (pattern.clone(), flags.clone()),
                    _ => (String::new(), String::new()),
                };
                let range = self.token.range;
                self.bump()?;
                Ok(Expr::Literal(Literal {
                    data: self.factory.user_data(range),
                    value: LiteralValue::Regex,
                    raw: Some(self.raw(range)),
                    regex: Some(RegexLiteral { pattern, flags }),
                }))
            }
            TokenKind::True | TokenKind::False => {
                let value = self.at(TokenKind::True);
                let range = self.token.range;
                self.bump()?;
                Ok(Expr::Literal(Literal {
                    data: self.factory.user_data(range),
                    value: LiteralValue::Bool(value),
                    raw: Some(self.raw(range)),
                    regex: None,
                }))
            }
            TokenKind::NoneKw => {
                let range = self.token.range;
                self.bump()?;
                Ok(Expr::Literal(Literal {
                    data: self.factory.user_data(range),
                    value: LiteralValue::Null,
                    raw: Some(self.raw(range)),
                    regex: None,
                }))
            }
            TokenKind::OpenParen => self.parse_paren(start),
            TokenKind::OpenBracket => self.parse_list_display(start),
            TokenKind::OpenBrace => self.parse_dict_display(start),
            TokenKind::Lambda => self.parse_lambda(),
            _ => self.unexpected(),
        }
    }

    /// Resolve a name reference against the scope chain: the method
    /// instance alias, class-frame attributes, user bindings, and runtime
    /// builtins, in that order.
    fn resolve_name(&self, id: Identifier) -> Expr {
        let at = id.data.range.pos;
        if self.scope.this_alias() == Some(id.name.as_str()) {
            return Expr::This(ThisExpression { data: id.data });
        }
        if self.scope.in_class_frame() && self.scope.exists(&id.name) {
            return Expr::Member(MemberExpression {
                data: id.data.clone(),
                object: Box::new(self.factory.this_expr(at)),
                property: Box::new(Expr::Identifier(id)),
                computed: false,
            });
        }
        if self.scope.bound_anywhere(&id.name) {
            return Expr::Identifier(id);
        }
        if factory::is_builtin(&id.name) {
            let object = self.factory.runtime_member(&["functions"], at);
            return Expr::Member(MemberExpression {
                data: id.data.clone(),
                object: Box::new(object),
                property: Box::new(self.factory.ident_expr(&id.name, at)),
                computed: false,
            });
        }
        Expr::Identifier(id)
    }

    fn parse_paren(&mut self, start: TextPos) -> Result<Expr> {
        self.bump()?; // '('
        if self.eat(TokenKind::CloseParen)? {
            return Ok(self
                .factory
                .tuple_literal(Vec::new(), self.node_data(start)));
        }
        let first = self.parse_test()?;
        if self.at(TokenKind::Comma) {
            let mut elements = vec![first];
            while self.eat(TokenKind::Comma)? {
                if self.at(TokenKind::CloseParen) {
                    break;
                }
                elements.push(self.parse_test()?);
            }
            self.expect(TokenKind::CloseParen)?;
            return Ok(self.factory.tuple_literal(elements, self.node_data(start)));
        }
        self.expect(TokenKind::CloseParen)?;
        Ok(first)
    }

    fn parse_list_display(&mut self, start: TextPos) -> Result<Expr> {
        self.bump()?; // '['
        if self.eat(TokenKind::CloseBracket)? {
            return Ok(self.factory.list_literal(Vec::new(), self.node_data(start)));
        }
        let first = self.parse_test()?;
        if self.at(TokenKind::For) {
            return self.parse_comprehension(first, start);
        }
        let mut elements = vec![first];
        while self.eat(TokenKind::Comma)? {
            if self.at(TokenKind::CloseBracket) {
                if !self.allow_trailing_commas {
                    return Err(self.error(&messages::TRAILING_COMMA, &[], self.last_end));
                }
                break;
            }
            elements.push(self.parse_test()?);
        }
        self.expect(TokenKind::CloseBracket)?;
        Ok(self.factory.list_literal(elements, self.node_data(start)))
    }

    fn parse_dict_display(&mut self, start: TextPos) -> Result<Expr> {
        self.bump()?; // '{'
        let mut pairs = Vec::new();
        while !self.at(TokenKind::CloseBrace) {
            let key = self.parse_test()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_test()?;
            pairs.push((key, value));
            if !self.eat(TokenKind::Comma)? {
                break;
            }
            if self.at(TokenKind::CloseBrace) {
                if !self.allow_trailing_commas {
                    return Err(self.error(&messages::TRAILING_COMMA, &[], self.last_end));
                }
                break;
            }
        }
        self.expect(TokenKind::CloseBrace)?;
        Ok(self.factory.dict_literal(pairs, self.node_data(start)))
    }

    /// A list comprehension lowers to an immediately-invoked function
    /// that fills and returns a fresh runtime list.
    fn parse_comprehension(&mut self, element: Expr, start: TextPos) -> Result<Expr> {
        enum Clause {
            For {
                target: Expr,
                iterable: Expr,
                new_names: FxHashSet<String>,
            },
            Guard(Expr),
        }

        self.scope.enter_function();
        let mut clauses = Vec::new();
        loop {
            if self.eat(TokenKind::For)? {
                let target = self.parse_target_list()?;
                self.expect(TokenKind::In)?;
                let iterable = self.parse_or_test()?;
                let new_names = self.declare_loop_target(&target)?;
                clauses.push(Clause::For {
                    target,
                    iterable,
                    new_names,
                });
            } else if self.eat(TokenKind::If)? {
                clauses.push(Clause::Guard(self.parse_or_test()?));
            } else {
                break;
            }
        }
        self.expect(TokenKind::CloseBracket)?;

        let at = start;
        let list_name = self.factory.fresh("List");
        let append = self.factory.expr_stmt(self.factory.call(
            self.factory
                .member(self.factory.ident_expr(&list_name, at), "append", at),
            vec![element],
            at,
        ));
        let mut body = vec![append];
        for clause in clauses.into_iter().rev() {
            match clause {
                Clause::Guard(test) => body = vec![self.factory.if_stmt(test, body, None, at)],
                Clause::For {
                    target,
                    iterable,
                    new_names,
                } => {
                    let mut lowered = Vec::new();
                    self.lower_for(target, iterable, body, &new_names, at, &mut lowered)?;
                    body = lowered;
                }
            }
        }
        self.scope.exit();

        let empty_list = self.factory.new_with_data(
            self.factory.runtime_member(&["objects", "list"], at),
            Vec::new(),
            self.factory.synth_data(at),
        );
        let mut fn_body = vec![self.factory.var_decl(&list_name, Some(empty_list), at)];
        fn_body.extend(body);
        fn_body.push(
            self.factory
                .return_stmt(Some(self.factory.ident_expr(&list_name, at)), at),
        );
        let function = Expr::Function(FunctionExpression {
            data: self.factory.synth_data(at),
            id: None,
            params: Vec::new(),
            body: Box::new(self.factory.block(fn_body, at)),
        });
        Ok(self
            .factory
            .call_with_data(function, Vec::new(), self.node_data(start)))
    }
}
