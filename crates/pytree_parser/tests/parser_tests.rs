//! Parser integration tests.
//!
//! Verifies the output-tree shapes of the lowerings: operator routing,
//! scope-driven declarations, tuple unpacking, the dual-path loop, class
//! and parameter desugaring, and the grammatical error codes.

use pytree_ast::{Expr, ForInit, LiteralValue, Program, Stmt};
use pytree_diagnostics::{messages, ParseError};
use pytree_parser::{parse, parse_with_options, ParseOptions};

fn parse_ok(source: &str) -> Program {
    parse(source).unwrap_or_else(|e| panic!("parse failed for {source:?}: {e}"))
}

fn parse_err(source: &str) -> ParseError {
    parse(source).expect_err("expected a parse error")
}

fn expr_of(stmt: &Stmt) -> &Expr {
    match stmt {
        Stmt::Expression(e) => &e.expression,
        other => panic!("expected an expression statement, got {other:?}"),
    }
}

/// Render a dotted member path like `__pythonRuntime.ops.add`, if the
/// expression is a chain of plain member accesses over identifiers.
fn render_path(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(id) => Some(id.name.clone()),
        Expr::Member(m) if !m.computed => {
            let object = render_path(&m.object)?;
            let Expr::Identifier(prop) = m.property.as_ref() else {
                return None;
            };
            Some(format!("{object}.{}", prop.name))
        }
        _ => None,
    }
}

fn assert_call_path(expr: &Expr, path: &str) -> Vec<Expr> {
    let Expr::Call(call) = expr else {
        panic!("expected a call to {path}, got {expr:?}");
    };
    assert_eq!(render_path(&call.callee).as_deref(), Some(path));
    call.arguments.clone()
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_addition_and_multiplication_route_through_runtime() {
    let program = parse_ok("2 + 3 * 2\n");
    let args = assert_call_path(expr_of(&program.body[0]), "__pythonRuntime.ops.add");
    assert_eq!(args.len(), 2);
    let inner = assert_call_path(&args[1], "__pythonRuntime.ops.multiply");
    assert_eq!(inner.len(), 2);
}

#[test]
fn test_exponent_binds_tighter_than_unary_minus() {
    let program = parse_ok("-2 ** 2\n");
    let Expr::Unary(unary) = expr_of(&program.body[0]) else {
        panic!("expected a unary minus at the top");
    };
    assert_eq!(unary.operator, "-");
    assert_call_path(&unary.argument, "Math.pow");
}

#[test]
fn test_floor_division() {
    let program = parse_ok("7 // 2\n");
    let args = assert_call_path(expr_of(&program.body[0]), "Math.floor");
    assert!(matches!(&args[0], Expr::Binary(b) if b.operator == "/"));
}

#[test]
fn test_identity_and_membership_operators() {
    let program = parse_ok("a is b\na is not b\na in b\na not in b\n");
    assert!(matches!(expr_of(&program.body[0]), Expr::Binary(b) if b.operator == "==="));
    assert!(matches!(expr_of(&program.body[1]), Expr::Binary(b) if b.operator == "!=="));

    let contains = assert_call_path(expr_of(&program.body[2]), "__pythonRuntime.ops.in");
    assert!(matches!(
        &contains[2],
        Expr::Literal(l) if l.value == LiteralValue::Bool(false)
    ));
    let negated = assert_call_path(expr_of(&program.body[3]), "__pythonRuntime.ops.in");
    assert!(matches!(
        &negated[2],
        Expr::Literal(l) if l.value == LiteralValue::Bool(true)
    ));
}

#[test]
fn test_boolean_operators_stay_logical() {
    let program = parse_ok("a and b or not c\n");
    let Expr::Logical(or) = expr_of(&program.body[0]) else {
        panic!("expected a logical expression");
    };
    assert_eq!(or.operator, "||");
    assert!(matches!(or.left.as_ref(), Expr::Logical(and) if and.operator == "&&"));
    assert!(matches!(or.right.as_ref(), Expr::Unary(not) if not.operator == "!"));
}

#[test]
fn test_conditional_expression() {
    let program = parse_ok("a = 1 if c else 2\n");
    let Stmt::VariableDeclaration(decl) = &program.body[0] else {
        panic!("expected a declaration");
    };
    let init = decl.declarations[0].init.as_ref().expect("initializer");
    assert!(matches!(init.as_ref(), Expr::Conditional(_)));
}

// ============================================================================
// Assignment and scope
// ============================================================================

#[test]
fn test_first_assignment_declares_then_assigns() {
    let program = parse_ok("x = 1\nx = 2\n");
    assert!(matches!(&program.body[0], Stmt::VariableDeclaration(_)));
    let Expr::Assignment(second) = expr_of(&program.body[1]) else {
        panic!("expected a plain assignment");
    };
    assert_eq!(second.operator, "=");
}

#[test]
fn test_function_assignment_shadows_global() {
    let program = parse_ok("x = 1\ndef f():\n    x = 2\n");
    let Stmt::FunctionDeclaration(decl) = &program.body[1] else {
        panic!("expected a function declaration");
    };
    assert!(matches!(&decl.body.body[0], Stmt::VariableDeclaration(_)));
}

#[test]
fn test_tuple_unpacking() {
    let program = parse_ok("a, b = 1, 2\n");
    assert_eq!(program.body.len(), 3);
    let Stmt::VariableDeclaration(tmp) = &program.body[0] else {
        panic!("expected the shared right-side declaration");
    };
    assert!(tmp.declarations[0].id.name.starts_with("__pyRight"));
    let Stmt::VariableDeclaration(first) = &program.body[1] else {
        panic!("expected a declaration for the first target");
    };
    assert_eq!(first.declarations[0].id.name, "a");
}

#[test]
fn test_chained_assignment_shares_one_evaluation() {
    let program = parse_ok("a = b = 1\n");
    assert_eq!(program.body.len(), 3);
    let Stmt::VariableDeclaration(tmp) = &program.body[0] else {
        panic!("expected the temp declaration");
    };
    assert!(tmp.declarations[0].id.name.starts_with("__pyTmp"));
}

#[test]
fn test_augmented_assignment_routing() {
    let program = parse_ok("x = 1\nx += 2\nx -= 3\n");
    let Expr::Assignment(plus) = expr_of(&program.body[1]) else {
        panic!("expected an assignment");
    };
    assert_eq!(plus.operator, "=");
    assert_call_path(&plus.right, "__pythonRuntime.ops.add");

    let Expr::Assignment(minus) = expr_of(&program.body[2]) else {
        panic!("expected an assignment");
    };
    assert_eq!(minus.operator, "-=");
}

#[test]
fn test_assignment_to_rvalue_is_rejected() {
    let err = parse_err("1 = x\n");
    assert_eq!(err.code, messages::ASSIGN_TO_RVALUE.code);
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_dual_path_for() {
    let program = parse_ok("for x in items:\n    pass\n");
    assert_eq!(program.body.len(), 2);
    let Stmt::VariableDeclaration(right) = &program.body[0] else {
        panic!("expected the iterable capture");
    };
    assert!(right.declarations[0].id.name.starts_with("__pyRight"));
    let Stmt::If(guard) = &program.body[1] else {
        panic!("expected the sequence-type dispatch");
    };
    let Stmt::Block(indexed) = guard.consequent.as_ref() else {
        panic!("expected a block consequent");
    };
    assert!(matches!(&indexed.body[0], Stmt::For(_)));
    let Some(alternate) = &guard.alternate else {
        panic!("expected an enumeration alternate");
    };
    let Stmt::Block(enumeration) = alternate.as_ref() else {
        panic!("expected a block alternate");
    };
    assert!(matches!(&enumeration.body[0], Stmt::ForIn(_)));
}

#[test]
fn test_loop_target_binding_decided_before_body() {
    // existing binding: the enumeration path assigns instead of declaring
    let program = parse_ok("x = 0\nfor x in items:\n    pass\n");
    let Stmt::If(guard) = &program.body[2] else {
        panic!("expected the dispatch");
    };
    let Stmt::Block(enumeration) = guard.alternate.as_ref().expect("alternate").as_ref() else {
        panic!("expected a block");
    };
    let Stmt::ForIn(for_in) = &enumeration.body[0] else {
        panic!("expected the enumeration loop");
    };
    assert!(matches!(for_in.left, ForInit::Expression(_)));

    // fresh binding: the loop declares its own variable
    let program = parse_ok("for y in items:\n    pass\n");
    let Stmt::If(guard) = &program.body[1] else {
        panic!("expected the dispatch");
    };
    let Stmt::Block(enumeration) = guard.alternate.as_ref().expect("alternate").as_ref() else {
        panic!("expected a block");
    };
    let Stmt::ForIn(for_in) = &enumeration.body[0] else {
        panic!("expected the enumeration loop");
    };
    assert!(matches!(for_in.left, ForInit::Declaration(_)));
}

#[test]
fn test_while_and_break_continue() {
    let program = parse_ok("while x:\n    break\n    continue\n");
    let Stmt::While(stmt) = &program.body[0] else {
        panic!("expected a while loop");
    };
    let Stmt::Block(block) = stmt.body.as_ref() else {
        panic!("expected a block body");
    };
    assert!(matches!(&block.body[0], Stmt::Break(_)));
    assert!(matches!(&block.body[1], Stmt::Continue(_)));
}

// ============================================================================
// Literals and postfix forms
// ============================================================================

#[test]
fn test_collection_literals_construct_runtime_objects() {
    let program = parse_ok("[1, 2]\n(1, 2)\n{'a': 1, 'b': 2}\n");
    let Expr::New(list) = expr_of(&program.body[0]) else {
        panic!("expected a list construction");
    };
    assert_eq!(
        render_path(&list.callee).as_deref(),
        Some("__pythonRuntime.objects.list")
    );
    let Expr::New(tuple) = expr_of(&program.body[1]) else {
        panic!("expected a tuple construction");
    };
    assert_eq!(
        render_path(&tuple.callee).as_deref(),
        Some("__pythonRuntime.objects.tuple")
    );
    let Expr::New(dict) = expr_of(&program.body[2]) else {
        panic!("expected a dict construction");
    };
    assert_eq!(
        render_path(&dict.callee).as_deref(),
        Some("__pythonRuntime.objects.dict")
    );
    assert_eq!(dict.arguments.len(), 2);
    assert!(matches!(&dict.arguments[0], Expr::Array(pair) if pair.elements.len() == 2));
}

#[test]
fn test_subscript_translates_negative_indexes() {
    let program = parse_ok("xs[0]\n");
    let Expr::Member(member) = expr_of(&program.body[0]) else {
        panic!("expected a computed member");
    };
    assert!(member.computed);
    assert_call_path(&member.property, "__pythonRuntime.ops.subscriptIndex");
}

#[test]
fn test_slice_lowers_to_pyslice_with_null_defaults() {
    let program = parse_ok("xs[1:2]\n");
    let Expr::Call(call) = expr_of(&program.body[0]) else {
        panic!("expected a slice call");
    };
    assert_eq!(render_path(&call.callee).as_deref(), Some("xs.pySlice"));
    assert_eq!(call.arguments.len(), 3);
    assert!(matches!(
        &call.arguments[2],
        Expr::Literal(l) if l.value == LiteralValue::Null
    ));
}

#[test]
fn test_builtins_resolve_through_runtime() {
    let program = parse_ok("print(1)\n");
    assert_call_path(
        expr_of(&program.body[0]),
        "__pythonRuntime.functions.print",
    );
}

#[test]
fn test_len_rewrites_to_length_property() {
    let program = parse_ok("len(xs)\n");
    let Expr::Member(member) = expr_of(&program.body[0]) else {
        panic!("expected a length access");
    };
    assert!(!member.computed);
    assert!(matches!(
        member.property.as_ref(),
        Expr::Identifier(id) if id.name == "length"
    ));
}

#[test]
fn test_shadowed_len_is_an_ordinary_call() {
    let program = parse_ok("len = f\nlen(xs)\n");
    let Expr::Call(call) = expr_of(&program.body[1]) else {
        panic!("expected an ordinary call");
    };
    assert!(matches!(
        call.callee.as_ref(),
        Expr::Identifier(id) if id.name == "len"
    ));
}

#[test]
fn test_keyword_arguments_fold_into_params_object() {
    let program = parse_ok("f(1, x=2)\n");
    let Expr::Call(call) = expr_of(&program.body[0]) else {
        panic!("expected a call");
    };
    assert_eq!(call.arguments.len(), 2);
    assert_call_path(
        &call.arguments[1],
        "__pythonRuntime.utils.createParamsObj",
    );
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_plain_positional_signature_takes_fast_path() {
    let program = parse_ok("def f(a, b):\n    return a\n");
    let Stmt::FunctionDeclaration(decl) = &program.body[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(decl.params.len(), 2);
    assert_eq!(decl.body.body.len(), 1);
    assert!(matches!(&decl.body.body[0], Stmt::Return(_)));
}

#[test]
fn test_defaults_emit_parameter_prologue() {
    let program = parse_ok("def f(a, b=2):\n    return a\n");
    let Stmt::FunctionDeclaration(decl) = &program.body[0] else {
        panic!("expected a function declaration");
    };
    let Stmt::VariableDeclaration(first) = &decl.body.body[0] else {
        panic!("expected the params-object capture");
    };
    assert!(first.declarations[0].id.name.starts_with("__pyParams"));
    let Stmt::VariableDeclaration(second) = &decl.body.body[1] else {
        panic!("expected the argument-list capture");
    };
    assert!(second.declarations[0].id.name.starts_with("__pyArgs"));
}

#[test]
fn test_variadic_catch_alls_declared_in_prologue() {
    let program = parse_ok("def f(a, *rest, **options):\n    return a\n");
    let Stmt::FunctionDeclaration(decl) = &program.body[0] else {
        panic!("expected a function declaration");
    };
    let declared: Vec<&str> = decl
        .body
        .body
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::VariableDeclaration(d) => Some(d.declarations[0].id.name.as_str()),
            _ => None,
        })
        .collect();
    assert!(declared.contains(&"rest"));
    assert!(declared.contains(&"options"));
}

#[test]
fn test_lambda_becomes_function_expression() {
    let program = parse_ok("f = lambda x: x + 1\n");
    let Stmt::VariableDeclaration(decl) = &program.body[0] else {
        panic!("expected a declaration");
    };
    let init = decl.declarations[0].init.as_ref().expect("initializer");
    let Expr::Function(function) = init.as_ref() else {
        panic!("expected a function expression");
    };
    assert_eq!(function.params.len(), 1);
    let Stmt::Return(ret) = function.body.body.last().expect("body") else {
        panic!("expected a return");
    };
    assert_call_path(
        ret.argument.as_ref().expect("argument"),
        "__pythonRuntime.ops.add",
    );
}

#[test]
fn test_return_outside_function() {
    let err = parse_err("return 1\n");
    assert_eq!(err.code, messages::RETURN_OUTSIDE_FUNCTION.code);

    let options = ParseOptions {
        allow_return_outside_function: true,
        ..ParseOptions::default()
    };
    assert!(parse_with_options("return 1\n", options).is_ok());
}

#[test]
fn test_default_before_plain_parameter_rejected() {
    let err = parse_err("def f(a=1, b):\n    pass\n");
    assert_eq!(err.code, messages::DEFAULT_BEFORE_STAR.code);
}

// ============================================================================
// Comprehensions
// ============================================================================

#[test]
fn test_comprehension_lowers_to_iife() {
    let program = parse_ok("[x * 2 for x in xs if x]\n");
    let Expr::Call(call) = expr_of(&program.body[0]) else {
        panic!("expected an immediately-invoked function");
    };
    assert!(call.arguments.is_empty());
    let Expr::Function(function) = call.callee.as_ref() else {
        panic!("expected a function callee");
    };
    let Stmt::VariableDeclaration(first) = &function.body.body[0] else {
        panic!("expected the accumulator declaration");
    };
    assert!(first.declarations[0].id.name.starts_with("__pyList"));
    assert!(matches!(
        function.body.body.last(),
        Some(Stmt::Return(_))
    ));
}

#[test]
fn test_comprehension_variable_does_not_leak() {
    // the comprehension's x lives in its own frame, so the later
    // assignment still declares
    let program = parse_ok("[x for x in xs]\ny = x\n");
    assert!(matches!(&program.body[1], Stmt::VariableDeclaration(_)));
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn test_class_lowering_shape() {
    let source = "\
class Animal:
    kind = 'beast'
    def __init__(self, name):
        self.name = name
    def speak(self):
        return self.name
";
    let program = parse_ok(source);
    let Stmt::FunctionDeclaration(ctor) = &program.body[0] else {
        panic!("expected the constructor function");
    };
    assert_eq!(ctor.id.name, "Animal");
    assert_eq!(ctor.params.len(), 1);
    assert_eq!(ctor.params[0].name, "name");

    // class-frame assignment and the inlined __init__ body both store
    // through `this`
    let Expr::Assignment(kind) = expr_of(&ctor.body.body[0]) else {
        panic!("expected the class-frame assignment");
    };
    assert!(matches!(
        kind.left.as_ref(),
        Expr::Member(m) if matches!(m.object.as_ref(), Expr::This(_))
    ));
    let Expr::Assignment(name) = expr_of(&ctor.body.body[1]) else {
        panic!("expected the inlined initializer body");
    };
    assert!(matches!(
        name.left.as_ref(),
        Expr::Member(m) if matches!(m.object.as_ref(), Expr::This(_))
    ));

    let Expr::Assignment(method) = expr_of(&program.body[1]) else {
        panic!("expected the prototype method assignment");
    };
    assert_eq!(
        render_path(&method.left).as_deref(),
        Some("Animal.prototype.speak")
    );
    assert!(matches!(method.right.as_ref(), Expr::Function(_)));
}

#[test]
fn test_subclass_without_init_forwards_arguments() {
    let source = "\
class Animal:
    def __init__(self, name):
        self.name = name

class Dog(Animal):
    def bark(self):
        return 1

d = Dog('rex')
";
    let program = parse_ok(source);
    // Dog's constructor applies the base over the incoming arguments
    let ctor = program
        .body
        .iter()
        .find_map(|stmt| match stmt {
            Stmt::FunctionDeclaration(decl) if decl.id.name == "Dog" => Some(decl),
            _ => None,
        })
        .expect("Dog constructor");
    let forward = expr_of(&ctor.body.body[0]);
    assert_call_path(forward, "Animal.apply");

    // the prototype chain is linked through Object.create
    let linked = program.body.iter().any(|stmt| {
        let Stmt::Expression(e) = stmt else {
            return false;
        };
        let Expr::Assignment(assign) = e.expression.as_ref() else {
            return false;
        };
        render_path(&assign.left).as_deref() == Some("Dog.prototype")
    });
    assert!(linked);

    // calling a known class builds an instance
    let last = &program.body[program.body.len() - 1];
    let Stmt::VariableDeclaration(decl) = last else {
        panic!("expected the instance declaration");
    };
    let init = decl.declarations[0].init.as_ref().expect("initializer");
    assert!(matches!(init.as_ref(), Expr::New(_)));
}

#[test]
fn test_multiple_inheritance_rejected() {
    let err = parse_err("class C(A, B):\n    pass\n");
    assert_eq!(err.code, messages::MULTIPLE_INHERITANCE.code);
}

// ============================================================================
// Exceptions
// ============================================================================

#[test]
fn test_except_clauses_fold_into_instanceof_chain() {
    let source = "\
try:
    risky()
except ValueError as e:
    handle(e)
except:
    fallback()
finally:
    done()
";
    let program = parse_ok(source);
    let Stmt::Try(stmt) = &program.body[0] else {
        panic!("expected a try statement");
    };
    assert!(stmt.finalizer.is_some());
    let handler = stmt.handler.as_ref().expect("catch handler");
    assert!(handler.param.name.starts_with("__pyErr"));
    let Stmt::If(dispatch) = &handler.body.body[0] else {
        panic!("expected the instanceof dispatch");
    };
    assert!(matches!(
        dispatch.test.as_ref(),
        Expr::Binary(b) if b.operator == "instanceof"
    ));
    // the bare clause is the final alternative, so nothing rethrows
    assert!(dispatch.alternate.is_some());
}

#[test]
fn test_typed_except_rethrows_unmatched() {
    let source = "\
try:
    risky()
except ValueError:
    handle()
";
    let program = parse_ok(source);
    let Stmt::Try(stmt) = &program.body[0] else {
        panic!("expected a try statement");
    };
    let handler = stmt.handler.as_ref().expect("catch handler");
    let Stmt::If(dispatch) = &handler.body.body[0] else {
        panic!("expected the instanceof dispatch");
    };
    let Stmt::Block(alternate) = dispatch.alternate.as_ref().expect("alternate").as_ref() else {
        panic!("expected a block");
    };
    assert!(matches!(&alternate.body[0], Stmt::Throw(_)));
}

#[test]
fn test_try_requires_handler_or_finalizer() {
    let err = parse_err("try:\n    pass\nx = 1\n");
    assert_eq!(err.code, messages::EXPECTED_EXCEPT_OR_FINALLY.code);
}

#[test]
fn test_raise_becomes_throw() {
    let program = parse_ok("raise Error('bad')\n");
    assert!(matches!(&program.body[0], Stmt::Throw(_)));
}

// ============================================================================
// Statement-level errors and skipped lines
// ============================================================================

#[test]
fn test_misaligned_else_reports_its_offset() {
    let err = parse_err("x = 1\nelse:\n    pass\n");
    assert_eq!(err.code, messages::MISALIGNED_ELSE.code);
    assert_eq!(err.pos, 6);
}

#[test]
fn test_unexpected_indent() {
    let err = parse_err("x = 1\n    y = 2\n");
    assert_eq!(err.code, messages::UNEXPECTED_INDENT.code);
}

#[test]
fn test_missing_block_after_colon() {
    let err = parse_err("if x:\ny = 1\n");
    assert_eq!(err.code, messages::EXPECTED_INDENTED_BLOCK.code);
}

#[test]
fn test_imports_are_skipped() {
    let program = parse_ok("import os\nfrom sys import path\nx = 1\n");
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_docstrings_are_dropped() {
    let program = parse_ok("\"\"\"module doc\"\"\"\nx = 1\n");
    assert_eq!(program.body.len(), 1);
}

#[test]
fn test_keyword_as_name_option() {
    let err = parse_err("a.pass\n");
    assert_eq!(err.code, messages::KEYWORD_AS_NAME.code);

    let options = ParseOptions {
        allow_keyword_as_name: true,
        ..ParseOptions::default()
    };
    assert!(parse_with_options("a.pass\n", options).is_ok());
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_locations_and_source_name() {
    let options = ParseOptions {
        locations: true,
        source_file_name: Some("test.py".to_string()),
        ..ParseOptions::default()
    };
    let program = parse_with_options("x = 1\n", options).expect("parse");
    let loc = program.data.loc.as_ref().expect("program location");
    assert_eq!(loc.start.line, 1);
    assert_eq!(loc.source.as_deref(), Some("test.py"));
}

#[test]
fn test_runtime_binding_name_override() {
    let options = ParseOptions {
        runtime_binding_name: "__rt".to_string(),
        ..ParseOptions::default()
    };
    let program = parse_with_options("print(1)\n", options).expect("parse");
    assert_call_path(expr_of(&program.body[0]), "__rt.functions.print");
}

#[test]
fn test_program_option_appends() {
    let first = parse_ok("x = 1\n");
    let options = ParseOptions {
        program: Some(first),
        ..ParseOptions::default()
    };
    let merged = parse_with_options("y = 2\n", options).expect("parse");
    assert_eq!(merged.body.len(), 2);
}

#[test]
fn test_trailing_comma_rejected_when_disallowed() {
    let options = ParseOptions {
        allow_trailing_commas: false,
        ..ParseOptions::default()
    };
    let err = parse_with_options("f(1, 2,)\n", options).expect_err("trailing comma");
    assert_eq!(err.code, messages::TRAILING_COMMA.code);
}

#[test]
fn test_desugared_nodes_marked_synthetic() {
    let program = parse_ok("for x in items:\n    pass\n");
    let Stmt::If(guard) = &program.body[1] else {
        panic!("expected the dispatch");
    };
    assert!(!guard.data.user_code);
    let Stmt::VariableDeclaration(right) = &program.body[0] else {
        panic!("expected the capture");
    };
    assert!(!right.data.user_code);
}

#[test]
fn test_json_serialization_shape() {
    let program = parse_ok("x = 1\n");
    let json = serde_json::to_value(&program).expect("serialize");
    assert_eq!(json["type"], "Program");
    assert_eq!(json["body"][0]["type"], "VariableDeclaration");
    assert_eq!(json["body"][0]["declarations"][0]["id"]["name"], "x");
}
