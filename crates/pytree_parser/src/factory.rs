//! Synthesis of desugared output nodes.
//!
//! The parser hands surface constructs that have no direct counterpart in
//! the output schema (tuples, slices, runtime-mediated operators, the
//! parameter-object prologue) to this factory, which assembles the
//! equivalent trees out of the generic node kinds. Every node built here
//! is marked as synthesized, anchored at the source position that caused
//! it, so downstream tooling never attributes invented code to user lines.

use std::rc::Rc;

use pytree_ast::{
    ArrayExpression, AssignmentExpression, BinaryExpression, BlockStatement, CallExpression,
    ConditionalExpression, Expr, ExpressionStatement, ForInStatement, ForInit, Identifier,
    IfStatement, Literal, LiteralValue, LogicalExpression, MemberExpression, NewExpression,
    NodeData, ReturnStatement, SourceLocation, Stmt, ThisExpression, UnaryExpression,
    UpdateExpression, VariableDeclaration, VariableDeclarator,
};
use pytree_core::{LineIndex, TextPos, TextRange};
use pytree_scanner::TokenKind;

/// Names resolved against the runtime's `functions` namespace when they
/// are not bound by user code.
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "abs", "all", "any", "bool", "chr", "divmod", "enumerate", "filter", "float", "hex", "int",
    "len", "list", "map", "max", "min", "oct", "ord", "pow", "print", "range", "repr", "reversed",
    "round", "sorted", "str", "sum", "tuple",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(&name)
}

/// One declared formal parameter.
#[derive(Debug)]
pub struct Formal {
    pub name: String,
    pub default: Option<Expr>,
}

/// A parsed parameter list: ordinary formals plus the optional variadic
/// positional and keyword catch-alls.
#[derive(Debug, Default)]
pub struct ParamSpec {
    pub formals: Vec<Formal>,
    pub star: Option<String>,
    pub kwargs: Option<String>,
}

impl ParamSpec {
    /// Whether the function needs the parameter-object prologue. Plain
    /// positional signatures take the fast path and skip it entirely.
    pub fn needs_prologue(&self) -> bool {
        self.star.is_some()
            || self.kwargs.is_some()
            || self.formals.iter().any(|f| f.default.is_some())
    }
}

pub struct NodeFactory {
    runtime: String,
    counter: u32,
    locations: bool,
    ranges: bool,
    source_name: Option<Box<str>>,
    line_index: Option<Rc<LineIndex>>,
}

impl NodeFactory {
    pub fn new(
        runtime: String,
        locations: bool,
        ranges: bool,
        source_name: Option<Box<str>>,
        line_index: Option<Rc<LineIndex>>,
    ) -> Self {
        Self {
            runtime,
            counter: 0,
            locations,
            ranges,
            source_name,
            line_index,
        }
    }

    pub fn runtime_name(&self) -> &str {
        &self.runtime
    }

    /// A synthesized name that cannot collide with user identifiers.
    pub fn fresh(&mut self, base: &str) -> String {
        let n = self.counter;
        self.counter += 1;
        format!("__py{base}{n}")
    }

    // ========================================================================
    // Node data
    // ========================================================================

    pub fn user_data(&self, range: TextRange) -> NodeData {
        let mut data = NodeData::new(range);
        self.apply_options(&mut data);
        data
    }

    pub fn synth_data(&self, at: TextPos) -> NodeData {
        let mut data = NodeData::synthetic(TextRange::empty(at));
        self.apply_options(&mut data);
        data
    }

    fn apply_options(&self, data: &mut NodeData) {
        data.emit_range = self.ranges;
        if self.locations {
            if let Some(index) = &self.line_index {
                data.loc = Some(SourceLocation {
                    start: index.line_col(data.range.pos),
                    end: index.line_col(data.range.end),
                    source: self.source_name.clone(),
                });
            }
        }
    }

    // ========================================================================
    // Leaf builders
    // ========================================================================

    pub fn ident(&self, name: &str, at: TextPos) -> Identifier {
        Identifier {
            data: self.synth_data(at),
            name: name.to_string(),
        }
    }

    pub fn ident_expr(&self, name: &str, at: TextPos) -> Expr {
        Expr::Identifier(self.ident(name, at))
    }

    pub fn this_expr(&self, at: TextPos) -> Expr {
        Expr::This(ThisExpression {
            data: self.synth_data(at),
        })
    }

    pub fn num(&self, value: f64, at: TextPos) -> Expr {
        Expr::Literal(Literal {
            data: self.synth_data(at),
            value: LiteralValue::Num(value),
            raw: None,
            regex: None,
        })
    }

    pub fn str_lit(&self, value: &str, at: TextPos) -> Expr {
        Expr::Literal(Literal {
            data: self.synth_data(at),
            value: LiteralValue::Str(value.to_string()),
            raw: None,
            regex: None,
        })
    }

    pub fn bool_lit(&self, value: bool, at: TextPos) -> Expr {
        Expr::Literal(Literal {
            data: self.synth_data(at),
            value: LiteralValue::Bool(value),
            raw: None,
            regex: None,
        })
    }

    pub fn null_lit(&self, at: TextPos) -> Expr {
        Expr::Literal(Literal {
            data: self.synth_data(at),
            value: LiteralValue::Null,
            raw: None,
            regex: None,
        })
    }

    pub fn undefined_expr(&self, at: TextPos) -> Expr {
        self.ident_expr("undefined", at)
    }

    pub fn array(&self, elements: Vec<Expr>, at: TextPos) -> Expr {
        Expr::Array(ArrayExpression {
            data: self.synth_data(at),
            elements,
        })
    }

    // ========================================================================
    // Compound builders
    // ========================================================================

    pub fn member(&self, object: Expr, name: &str, at: TextPos) -> Expr {
        Expr::Member(MemberExpression {
            data: self.synth_data(at),
            object: Box::new(object),
            property: Box::new(self.ident_expr(name, at)),
            computed: false,
        })
    }

    pub fn computed(&self, object: Expr, property: Expr, at: TextPos) -> Expr {
        Expr::Member(MemberExpression {
            data: self.synth_data(at),
            object: Box::new(object),
            property: Box::new(property),
            computed: true,
        })
    }

    /// `<runtime>.<path[0]>.<path[1]>...`
    pub fn runtime_member(&self, path: &[&str], at: TextPos) -> Expr {
        let mut expr = self.ident_expr(&self.runtime, at);
        for segment in path {
            expr = self.member(expr, segment, at);
        }
        expr
    }

    pub fn call(&self, callee: Expr, arguments: Vec<Expr>, at: TextPos) -> Expr {
        self.call_with_data(callee, arguments, self.synth_data(at))
    }

    pub fn call_with_data(&self, callee: Expr, arguments: Vec<Expr>, data: NodeData) -> Expr {
        Expr::Call(CallExpression {
            data,
            callee: Box::new(callee),
            arguments,
        })
    }

    pub fn new_with_data(&self, callee: Expr, arguments: Vec<Expr>, data: NodeData) -> Expr {
        Expr::New(NewExpression {
            data,
            callee: Box::new(callee),
            arguments,
        })
    }

    pub fn binary(&self, operator: &'static str, left: Expr, right: Expr, at: TextPos) -> Expr {
        Expr::Binary(BinaryExpression {
            data: self.synth_data(at),
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn logical(&self, operator: &'static str, left: Expr, right: Expr, at: TextPos) -> Expr {
        Expr::Logical(LogicalExpression {
            data: self.synth_data(at),
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(&self, operator: &'static str, argument: Expr, at: TextPos) -> Expr {
        Expr::Unary(UnaryExpression {
            data: self.synth_data(at),
            operator,
            prefix: true,
            argument: Box::new(argument),
        })
    }

    pub fn prefix_increment(&self, argument: Expr, at: TextPos) -> Expr {
        Expr::Update(UpdateExpression {
            data: self.synth_data(at),
            operator: "++",
            prefix: true,
            argument: Box::new(argument),
        })
    }

    pub fn conditional(&self, test: Expr, consequent: Expr, alternate: Expr, at: TextPos) -> Expr {
        Expr::Conditional(ConditionalExpression {
            data: self.synth_data(at),
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    pub fn assign(&self, left: Expr, right: Expr, at: TextPos) -> Expr {
        Expr::Assignment(AssignmentExpression {
            data: self.synth_data(at),
            operator: "=",
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    // ========================================================================
    // Statement builders
    // ========================================================================

    pub fn var_declaration(
        &self,
        name: &str,
        init: Option<Expr>,
        at: TextPos,
    ) -> VariableDeclaration {
        VariableDeclaration {
            data: self.synth_data(at),
            kind: "var",
            declarations: vec![VariableDeclarator {
                data: self.synth_data(at),
                id: self.ident(name, at),
                init: init.map(Box::new),
            }],
        }
    }

    pub fn var_decl(&self, name: &str, init: Option<Expr>, at: TextPos) -> Stmt {
        Stmt::VariableDeclaration(self.var_declaration(name, init, at))
    }

    pub fn expr_stmt(&self, expression: Expr) -> Stmt {
        let at = expression.data().range.pos;
        Stmt::Expression(ExpressionStatement {
            data: self.synth_data(at),
            expression: Box::new(expression),
        })
    }

    pub fn assign_stmt(&self, left: Expr, right: Expr) -> Stmt {
        let at = left.data().range.pos;
        let assignment = self.assign(left, right, at);
        self.expr_stmt(assignment)
    }

    pub fn block(&self, body: Vec<Stmt>, at: TextPos) -> BlockStatement {
        BlockStatement {
            data: self.synth_data(at),
            body,
        }
    }

    pub fn if_stmt(
        &self,
        test: Expr,
        consequent: Vec<Stmt>,
        alternate: Option<Vec<Stmt>>,
        at: TextPos,
    ) -> Stmt {
        Stmt::If(IfStatement {
            data: self.synth_data(at),
            test: Box::new(test),
            consequent: Box::new(Stmt::Block(self.block(consequent, at))),
            alternate: alternate.map(|stmts| Box::new(Stmt::Block(self.block(stmts, at)))),
        })
    }

    pub fn return_stmt(&self, argument: Option<Expr>, at: TextPos) -> Stmt {
        Stmt::Return(ReturnStatement {
            data: self.synth_data(at),
            argument: argument.map(Box::new),
        })
    }

    // ========================================================================
    // Surface-construct lowerings
    // ========================================================================

    /// `[a, b]` becomes a runtime list construction.
    pub fn list_literal(&self, elements: Vec<Expr>, data: NodeData) -> Expr {
        let at = data.range.pos;
        self.new_with_data(self.runtime_member(&["objects", "list"], at), elements, data)
    }

    /// `(a, b)` becomes a runtime tuple construction.
    pub fn tuple_literal(&self, elements: Vec<Expr>, data: NodeData) -> Expr {
        let at = data.range.pos;
        self.new_with_data(self.runtime_member(&["objects", "tuple"], at), elements, data)
    }

    /// `{k: v}` becomes a runtime dict construction over `[k, v]` pairs.
    pub fn dict_literal(&self, pairs: Vec<(Expr, Expr)>, data: NodeData) -> Expr {
        let at = data.range.pos;
        let arguments = pairs
            .into_iter()
            .map(|(key, value)| self.array(vec![key, value], at))
            .collect();
        self.new_with_data(self.runtime_member(&["objects", "dict"], at), arguments, data)
    }

    /// `a[i]` becomes `a[<runtime>.ops.subscriptIndex(a, i)]`, letting the
    /// runtime translate negative indexes.
    pub fn subscript_load(&self, object: Expr, index: Expr, data: NodeData) -> Expr {
        let at = data.range.pos;
        let translated = self.call(
            self.runtime_member(&["ops", "subscriptIndex"], at),
            vec![object.clone(), index],
            at,
        );
        Expr::Member(MemberExpression {
            data,
            object: Box::new(object),
            property: Box::new(translated),
            computed: true,
        })
    }

    /// `a[lo:hi:step]` becomes `a.pySlice(lo, hi, step)` with absent
    /// bounds passed as null.
    pub fn slice_call(
        &self,
        object: Expr,
        start: Option<Expr>,
        stop: Option<Expr>,
        step: Option<Expr>,
        data: NodeData,
    ) -> Expr {
        let at = data.range.pos;
        let arguments = vec![
            start.unwrap_or_else(|| self.null_lit(at)),
            stop.unwrap_or_else(|| self.null_lit(at)),
            step.unwrap_or_else(|| self.null_lit(at)),
        ];
        self.call_with_data(self.member(object, "pySlice", at), arguments, data)
    }

    /// If the expression is a tuple or list construction usable as an
    /// unpacking target, give back its elements; otherwise return the
    /// expression unchanged.
    pub fn into_tuple_target(&self, expr: Expr) -> std::result::Result<Vec<Expr>, Expr> {
        match expr {
            Expr::Array(array) => Ok(array.elements),
            Expr::New(new) if self.is_sequence_constructor(&new.callee) => Ok(new.arguments),
            other => Err(other),
        }
    }

    /// Borrowing counterpart of [`Self::into_tuple_target`], for callers
    /// that inspect a target without consuming it.
    pub fn tuple_target_slice<'e>(&self, expr: &'e Expr) -> Option<&'e [Expr]> {
        match expr {
            Expr::Array(array) => Some(&array.elements),
            Expr::New(new) if self.is_sequence_constructor(&new.callee) => Some(&new.arguments),
            _ => None,
        }
    }

    fn is_sequence_constructor(&self, callee: &Expr) -> bool {
        let Expr::Member(outer) = callee else {
            return false;
        };
        let Expr::Identifier(kind) = outer.property.as_ref() else {
            return false;
        };
        if kind.name != "tuple" && kind.name != "list" {
            return false;
        }
        let Expr::Member(inner) = outer.object.as_ref() else {
            return false;
        };
        let (Expr::Identifier(base), Expr::Identifier(namespace)) =
            (inner.object.as_ref(), inner.property.as_ref())
        else {
            return false;
        };
        base.name == self.runtime && namespace.name == "objects"
    }

    /// The marker type distinguishing ordered sequences from mappings in
    /// the dual-path `for` lowering.
    pub fn sequence_marker(&self, at: TextPos) -> Expr {
        self.runtime_member(&["objects", "list"], at)
    }

    /// One infix operation, routed to a native operator, a logical node,
    /// or a runtime/Math call depending on the operator.
    pub fn lower_binary(
        &self,
        op: TokenKind,
        negated: bool,
        left: Expr,
        right: Expr,
        data: NodeData,
    ) -> Expr {
        let at = data.range.pos;
        match op {
            TokenKind::And | TokenKind::Or => Expr::Logical(LogicalExpression {
                data,
                operator: if op == TokenKind::And { "&&" } else { "||" },
                left: Box::new(left),
                right: Box::new(right),
            }),
            TokenKind::Plus => self.call_with_data(
                self.runtime_member(&["ops", "add"], at),
                vec![left, right],
                data,
            ),
            TokenKind::Star => self.call_with_data(
                self.runtime_member(&["ops", "multiply"], at),
                vec![left, right],
                data,
            ),
            TokenKind::StarStar => self.call_with_data(
                self.member(self.ident_expr("Math", at), "pow", at),
                vec![left, right],
                data,
            ),
            TokenKind::SlashSlash => {
                let quotient = self.binary("/", left, right, at);
                self.call_with_data(
                    self.member(self.ident_expr("Math", at), "floor", at),
                    vec![quotient],
                    data,
                )
            }
            TokenKind::In => self.call_with_data(
                self.runtime_member(&["ops", "in"], at),
                vec![left, right, self.bool_lit(negated, at)],
                data,
            ),
            TokenKind::Is => Expr::Binary(BinaryExpression {
                data,
                operator: if negated { "!==" } else { "===" },
                left: Box::new(left),
                right: Box::new(right),
            }),
            other => Expr::Binary(BinaryExpression {
                data,
                operator: other.js_operator().unwrap_or("==="),
                left: Box::new(left),
                right: Box::new(right),
            }),
        }
    }

    /// The trailing argument assembled at call sites that used keyword or
    /// splat syntax: `<runtime>.utils.createParamsObj(k1, v1, ...)`.
    /// Splats are keyed by the `"*"` / `"**"` markers.
    pub fn create_params_obj(&self, entries: Vec<(String, Expr)>, at: TextPos) -> Expr {
        let mut arguments = Vec::with_capacity(entries.len() * 2);
        for (key, value) in entries {
            arguments.push(self.str_lit(&key, at));
            arguments.push(value);
        }
        self.call(
            self.runtime_member(&["utils", "createParamsObj"], at),
            arguments,
            at,
        )
    }

    // ========================================================================
    // Parameter prologue
    // ========================================================================

    fn arguments_len(&self, at: TextPos) -> Expr {
        self.member(self.ident_expr("arguments", at), "length", at)
    }

    fn arguments_last(&self, at: TextPos) -> Expr {
        let index = self.binary("-", self.arguments_len(at), self.num(1.0, at), at);
        self.computed(self.ident_expr("arguments", at), index, at)
    }

    fn slice_arguments(&self, extra: Option<Expr>, at: TextPos) -> Expr {
        let slice = self.member(
            self.member(
                self.member(self.ident_expr("Array", at), "prototype", at),
                "slice",
                at,
            ),
            "call",
            at,
        );
        let mut arguments = vec![self.ident_expr("arguments", at), self.num(0.0, at)];
        if let Some(end) = extra {
            arguments.push(end);
        }
        self.call(slice, arguments, at)
    }

    /// The synthesized prologue for functions with defaults or variadics.
    ///
    /// Detects whether the caller passed a trailing parameter object,
    /// derives the real positional argument list, assigns every formal
    /// from positional, keyword, or default in that priority order, and
    /// collects overflow into the variadic catch-alls when declared.
    pub fn params_prologue(&mut self, spec: &ParamSpec, at: TextPos) -> Vec<Stmt> {
        let params_name = self.fresh("Params");
        let args_name = self.fresh("Args");
        let mut out = Vec::new();

        // var __pyParams = <trailing argument is a params object> ? it : null;
        let is_params_obj = self.logical(
            "&&",
            self.logical(
                "&&",
                self.logical(
                    "&&",
                    self.binary(">", self.arguments_len(at), self.num(0.0, at), at),
                    self.binary("!==", self.arguments_last(at), self.null_lit(at), at),
                    at,
                ),
                self.binary(
                    "===",
                    self.unary("typeof", self.arguments_last(at), at),
                    self.str_lit("object", at),
                    at,
                ),
                at,
            ),
            self.binary(
                "instanceof",
                self.member(self.arguments_last(at), "formals", at),
                self.ident_expr("Array", at),
                at,
            ),
            at,
        );
        let params_init = self.conditional(
            is_params_obj,
            self.arguments_last(at),
            self.null_lit(at),
            at,
        );
        out.push(self.var_decl(&params_name, Some(params_init), at));

        // var __pyArgs = plain arguments, or arguments + params.formals.
        let plain = self.slice_arguments(None, at);
        let but_last = self.slice_arguments(
            Some(self.binary("-", self.arguments_len(at), self.num(1.0, at), at)),
            at,
        );
        let with_formals = self.call(
            self.member(but_last, "concat", at),
            vec![self.member(self.ident_expr(&params_name, at), "formals", at)],
            at,
        );
        let args_init = self.conditional(
            self.binary(
                "===",
                self.ident_expr(&params_name, at),
                self.null_lit(at),
                at,
            ),
            plain,
            with_formals,
            at,
        );
        out.push(self.var_decl(&args_name, Some(args_init), at));

        // Each formal: positional, else keyword, else default.
        for (index, formal) in spec.formals.iter().enumerate() {
            let positional = self.computed(
                self.ident_expr(&args_name, at),
                self.num(index as f64, at),
                at,
            );
            let has_positional = self.binary(
                ">",
                self.member(self.ident_expr(&args_name, at), "length", at),
                self.num(index as f64, at),
                at,
            );
            let has_keyword = self.logical(
                "&&",
                self.binary(
                    "!==",
                    self.ident_expr(&params_name, at),
                    self.null_lit(at),
                    at,
                ),
                self.binary(
                    "in",
                    self.str_lit(&formal.name, at),
                    self.member(self.ident_expr(&params_name, at), "keywords", at),
                    at,
                ),
                at,
            );
            let keyword_value = self.computed(
                self.member(self.ident_expr(&params_name, at), "keywords", at),
                self.str_lit(&formal.name, at),
                at,
            );
            let fallback = formal
                .default
                .clone()
                .unwrap_or_else(|| self.undefined_expr(at));
            let value = self.conditional(
                has_positional,
                positional,
                self.conditional(has_keyword, keyword_value, fallback, at),
                at,
            );
            let target = self.ident_expr(&formal.name, at);
            out.push(self.assign_stmt(target, value));
        }

        // *rest collects positional overflow into a runtime tuple.
        if let Some(star) = &spec.star {
            let overflow = self.call(
                self.member(self.ident_expr(&args_name, at), "slice", at),
                vec![self.num(spec.formals.len() as f64, at)],
                at,
            );
            let as_tuple = self.call(
                self.member(self.runtime_member(&["objects", "tuple"], at), "apply", at),
                vec![self.null_lit(at), overflow],
                at,
            );
            out.push(self.var_decl(star, Some(as_tuple), at));
        }

        // **rest collects keyword overflow into a runtime dict.
        if let Some(kwargs) = &spec.kwargs {
            let empty_dict = self.new_with_data(
                self.runtime_member(&["objects", "dict"], at),
                Vec::new(),
                self.synth_data(at),
            );
            out.push(self.var_decl(kwargs, Some(empty_dict), at));
            let key = self.fresh("Key");
            let copy = self.assign_stmt(
                self.computed(self.ident_expr(kwargs, at), self.ident_expr(&key, at), at),
                self.computed(
                    self.member(self.ident_expr(&params_name, at), "keywords", at),
                    self.ident_expr(&key, at),
                    at,
                ),
            );
            let body = if spec.formals.is_empty() {
                copy
            } else {
                let mut not_a_formal: Option<Expr> = None;
                for formal in &spec.formals {
                    let check = self.binary(
                        "!==",
                        self.ident_expr(&key, at),
                        self.str_lit(&formal.name, at),
                        at,
                    );
                    not_a_formal = Some(match not_a_formal {
                        Some(test) => self.logical("&&", test, check, at),
                        None => check,
                    });
                }
                let test = not_a_formal.expect("at least one formal");
                self.if_stmt(test, vec![copy], None, at)
            };
            let enumerate = Stmt::ForIn(ForInStatement {
                data: self.synth_data(at),
                left: ForInit::Declaration(self.var_declaration(&key, None, at)),
                right: Box::new(self.member(
                    self.ident_expr(&params_name, at),
                    "keywords",
                    at,
                )),
                body: Box::new(Stmt::Block(self.block(vec![body], at))),
            });
            let guard = self.binary(
                "!==",
                self.ident_expr(&params_name, at),
                self.null_lit(at),
                at,
            );
            out.push(self.if_stmt(guard, vec![enumerate], None, at));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> NodeFactory {
        NodeFactory::new("__pythonRuntime".to_string(), false, false, None, None)
    }

    #[test]
    fn test_fresh_names_are_distinct() {
        let mut f = factory();
        assert_eq!(f.fresh("Right"), "__pyRight0");
        assert_eq!(f.fresh("Right"), "__pyRight1");
        assert_eq!(f.fresh("Index"), "__pyIndex2");
    }

    #[test]
    fn test_runtime_member_path() {
        let f = factory();
        let expr = f.runtime_member(&["ops", "add"], 0);
        let Expr::Member(outer) = &expr else {
            panic!("expected member");
        };
        let Expr::Identifier(prop) = outer.property.as_ref() else {
            panic!("expected identifier property");
        };
        assert_eq!(prop.name, "add");
    }

    #[test]
    fn test_tuple_target_detection() {
        let f = factory();
        let at = 0;
        let tuple = f.tuple_literal(
            vec![f.ident_expr("a", at), f.ident_expr("b", at)],
            f.synth_data(at),
        );
        let elements = f.into_tuple_target(tuple).expect("tuple target");
        assert_eq!(elements.len(), 2);

        let plain = f.ident_expr("a", at);
        assert!(f.into_tuple_target(plain).is_err());
    }

    #[test]
    fn test_fast_path_detection() {
        let simple = ParamSpec {
            formals: vec![
                Formal {
                    name: "a".into(),
                    default: None,
                },
                Formal {
                    name: "b".into(),
                    default: None,
                },
            ],
            star: None,
            kwargs: None,
        };
        assert!(!simple.needs_prologue());

        let defaulted = ParamSpec {
            formals: vec![Formal {
                name: "a".into(),
                default: Some(factory().num(1.0, 0)),
            }],
            star: None,
            kwargs: None,
        };
        assert!(defaulted.needs_prologue());
    }

    #[test]
    fn test_floor_division_lowering() {
        let f = factory();
        let lowered = f.lower_binary(
            TokenKind::SlashSlash,
            false,
            f.ident_expr("a", 0),
            f.ident_expr("b", 0),
            f.synth_data(0),
        );
        let Expr::Call(call) = &lowered else {
            panic!("expected Math.floor call");
        };
        let Expr::Member(callee) = call.callee.as_ref() else {
            panic!("expected member callee");
        };
        let Expr::Identifier(object) = callee.object.as_ref() else {
            panic!("expected Math identifier");
        };
        assert_eq!(object.name, "Math");
        assert!(matches!(call.arguments[0], Expr::Binary(_)));
    }
}
