//! ESTree-flavored JSON serialization.
//!
//! Each node serializes as an object with a `"type"` tag, `start`/`end`
//! byte offsets, an optional `range` array and `loc` object, and a
//! `userCode` marker, followed by its own fields. Absent optional children
//! serialize as `null`, matching how the reference tooling emits trees.

use crate::node::*;
use serde::ser::{Serialize, SerializeMap, Serializer};

impl Serialize for SourceLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Pos {
            line: u32,
            column: u32,
        }
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(
            "start",
            &Pos {
                line: self.start.line,
                column: self.start.column,
            },
        )?;
        map.serialize_entry(
            "end",
            &Pos {
                line: self.end.line,
                column: self.end.column,
            },
        )?;
        if let Some(source) = &self.source {
            map.serialize_entry("source", source)?;
        }
        map.end()
    }
}

impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LiteralValue::Null => serializer.serialize_none(),
            LiteralValue::Bool(b) => serializer.serialize_bool(*b),
            LiteralValue::Num(n) => serializer.serialize_f64(*n),
            LiteralValue::Str(s) => serializer.serialize_str(s),
            // The value slot of a regex literal is an opaque object.
            LiteralValue::Regex => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

impl Serialize for RegexLiteral {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("pattern", &self.pattern)?;
        map.serialize_entry("flags", &self.flags)?;
        map.end()
    }
}

/// Emit the shared node-data fields into an open map.
fn serialize_data<S: SerializeMap>(map: &mut S, tag: &str, data: &NodeData) -> Result<(), S::Error> {
    map.serialize_entry("type", tag)?;
    map.serialize_entry("start", &data.range.pos)?;
    map.serialize_entry("end", &data.range.end)?;
    if data.emit_range {
        map.serialize_entry("range", &[data.range.pos, data.range.end])?;
    }
    if let Some(loc) = &data.loc {
        map.serialize_entry("loc", loc)?;
    }
    map.serialize_entry("userCode", &data.user_code)?;
    Ok(())
}

macro_rules! serialize_node {
    ($ty:ident, $tag:literal $(, $field:ident => $name:literal)*) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(None)?;
                serialize_data(&mut map, $tag, &self.data)?;
                $( map.serialize_entry($name, &self.$field)?; )*
                map.end()
            }
        }
    };
}

serialize_node!(Program, "Program", body => "body");

serialize_node!(Identifier, "Identifier", name => "name");
serialize_node!(Literal, "Literal", value => "value", raw => "raw", regex => "regex");
serialize_node!(ThisExpression, "ThisExpression");
serialize_node!(ArrayExpression, "ArrayExpression", elements => "elements");
serialize_node!(UnaryExpression, "UnaryExpression",
    operator => "operator", prefix => "prefix", argument => "argument");
serialize_node!(UpdateExpression, "UpdateExpression",
    operator => "operator", prefix => "prefix", argument => "argument");
serialize_node!(BinaryExpression, "BinaryExpression",
    operator => "operator", left => "left", right => "right");
serialize_node!(LogicalExpression, "LogicalExpression",
    operator => "operator", left => "left", right => "right");
serialize_node!(AssignmentExpression, "AssignmentExpression",
    operator => "operator", left => "left", right => "right");
serialize_node!(ConditionalExpression, "ConditionalExpression",
    test => "test", consequent => "consequent", alternate => "alternate");
serialize_node!(CallExpression, "CallExpression",
    callee => "callee", arguments => "arguments");
serialize_node!(NewExpression, "NewExpression",
    callee => "callee", arguments => "arguments");
serialize_node!(MemberExpression, "MemberExpression",
    object => "object", property => "property", computed => "computed");
serialize_node!(FunctionExpression, "FunctionExpression",
    id => "id", params => "params", body => "body");

serialize_node!(ExpressionStatement, "ExpressionStatement", expression => "expression");
serialize_node!(BlockStatement, "BlockStatement", body => "body");
serialize_node!(VariableDeclaration, "VariableDeclaration",
    declarations => "declarations", kind => "kind");
serialize_node!(VariableDeclarator, "VariableDeclarator", id => "id", init => "init");
serialize_node!(FunctionDeclaration, "FunctionDeclaration",
    id => "id", params => "params", body => "body");
serialize_node!(ReturnStatement, "ReturnStatement", argument => "argument");
serialize_node!(IfStatement, "IfStatement",
    test => "test", consequent => "consequent", alternate => "alternate");
serialize_node!(ForStatement, "ForStatement",
    init => "init", test => "test", update => "update", body => "body");
serialize_node!(ForInStatement, "ForInStatement",
    left => "left", right => "right", body => "body");
serialize_node!(WhileStatement, "WhileStatement", test => "test", body => "body");
serialize_node!(BreakStatement, "BreakStatement");
serialize_node!(ContinueStatement, "ContinueStatement");
serialize_node!(EmptyStatement, "EmptyStatement");
serialize_node!(TryStatement, "TryStatement",
    block => "block", handler => "handler", finalizer => "finalizer");
serialize_node!(CatchClause, "CatchClause", param => "param", body => "body");
serialize_node!(ThrowStatement, "ThrowStatement", argument => "argument");

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expr::Identifier(n) => n.serialize(serializer),
            Expr::Literal(n) => n.serialize(serializer),
            Expr::This(n) => n.serialize(serializer),
            Expr::Array(n) => n.serialize(serializer),
            Expr::Unary(n) => n.serialize(serializer),
            Expr::Update(n) => n.serialize(serializer),
            Expr::Binary(n) => n.serialize(serializer),
            Expr::Logical(n) => n.serialize(serializer),
            Expr::Assignment(n) => n.serialize(serializer),
            Expr::Conditional(n) => n.serialize(serializer),
            Expr::Call(n) => n.serialize(serializer),
            Expr::New(n) => n.serialize(serializer),
            Expr::Member(n) => n.serialize(serializer),
            Expr::Function(n) => n.serialize(serializer),
        }
    }
}

impl Serialize for Stmt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Stmt::Expression(n) => n.serialize(serializer),
            Stmt::Block(n) => n.serialize(serializer),
            Stmt::VariableDeclaration(n) => n.serialize(serializer),
            Stmt::FunctionDeclaration(n) => n.serialize(serializer),
            Stmt::Return(n) => n.serialize(serializer),
            Stmt::If(n) => n.serialize(serializer),
            Stmt::For(n) => n.serialize(serializer),
            Stmt::ForIn(n) => n.serialize(serializer),
            Stmt::While(n) => n.serialize(serializer),
            Stmt::Break(n) => n.serialize(serializer),
            Stmt::Continue(n) => n.serialize(serializer),
            Stmt::Empty(n) => n.serialize(serializer),
            Stmt::Try(n) => n.serialize(serializer),
            Stmt::Throw(n) => n.serialize(serializer),
        }
    }
}

impl Serialize for ForInit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ForInit::Declaration(n) => n.serialize(serializer),
            ForInit::Expression(n) => n.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::node::*;
    use pytree_core::TextRange;

    fn ident(name: &str) -> Identifier {
        Identifier {
            data: NodeData::new(TextRange::new(0, name.len() as u32)),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_identifier_json() {
        let json = serde_json::to_value(Expr::Identifier(ident("foo"))).unwrap();
        assert_eq!(json["type"], "Identifier");
        assert_eq!(json["name"], "foo");
        assert_eq!(json["start"], 0);
        assert_eq!(json["end"], 3);
        assert_eq!(json["userCode"], true);
    }

    #[test]
    fn test_synthetic_marker() {
        let node = ThisExpression {
            data: NodeData::synthetic(TextRange::empty(7)),
        };
        let json = serde_json::to_value(Expr::This(node)).unwrap();
        assert_eq!(json["type"], "ThisExpression");
        assert_eq!(json["userCode"], false);
    }

    #[test]
    fn test_absent_child_is_null() {
        let stmt = Stmt::Return(ReturnStatement {
            data: NodeData::new(TextRange::new(0, 6)),
            argument: None,
        });
        let json = serde_json::to_value(stmt).unwrap();
        assert_eq!(json["type"], "ReturnStatement");
        assert!(json["argument"].is_null());
    }

    #[test]
    fn test_range_option() {
        let mut data = NodeData::new(TextRange::new(2, 5));
        data.emit_range = true;
        let json = serde_json::to_value(Expr::This(ThisExpression { data })).unwrap();
        assert_eq!(json["range"][0], 2);
        assert_eq!(json["range"][1], 5);
    }

    #[test]
    fn test_deep_clone_is_structural() {
        let expr = Expr::Binary(BinaryExpression {
            data: NodeData::new(TextRange::new(0, 5)),
            operator: "===",
            left: Box::new(Expr::Identifier(ident("a"))),
            right: Box::new(Expr::Identifier(ident("b"))),
        });
        let copy = expr.clone();
        assert_eq!(expr, copy);
    }
}
