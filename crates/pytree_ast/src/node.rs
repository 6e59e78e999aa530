//! AST node definitions.
//!
//! Every node struct carries a [`NodeData`] with its source range, optional
//! line/column location, and a marker distinguishing user-written nodes from
//! ones synthesized by desugaring. Wrapper enums [`Expr`] and [`Stmt`] give
//! the parser closed tagged variants to match on.

use pytree_core::{LineCol, TextRange};

/// Common data shared by all AST nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Source byte-offset range.
    pub range: TextRange,
    /// Line/column span, when location tracking is enabled.
    pub loc: Option<SourceLocation>,
    /// False for nodes invented by desugaring. Downstream tools must not
    /// attribute synthetic nodes to source lines.
    pub user_code: bool,
    /// Whether serialization should also emit the `range` array
    /// (the `ranges` parse option).
    pub emit_range: bool,
}

impl NodeData {
    /// Node data for a node copied from user source.
    pub fn new(range: TextRange) -> Self {
        Self {
            range,
            loc: None,
            user_code: true,
            emit_range: false,
        }
    }

    /// Node data for a node invented by desugaring, anchored at a position.
    pub fn synthetic(range: TextRange) -> Self {
        Self {
            range,
            loc: None,
            user_code: false,
            emit_range: false,
        }
    }
}

/// A line/column span in the Mozilla Parser API shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub start: LineCol,
    pub end: LineCol,
    /// The `sourceFileName` option, when given.
    pub source: Option<Box<str>>,
}

// ============================================================================
// Program
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub data: NodeData,
    pub body: Vec<Stmt>,
}

// ============================================================================
// Expressions
// ============================================================================

/// All expression node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Identifier),
    Literal(Literal),
    This(ThisExpression),
    Array(ArrayExpression),
    Unary(UnaryExpression),
    Update(UpdateExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Assignment(AssignmentExpression),
    Conditional(ConditionalExpression),
    Call(CallExpression),
    New(NewExpression),
    Member(MemberExpression),
    Function(FunctionExpression),
}

impl Expr {
    /// The shared node data of any expression.
    pub fn data(&self) -> &NodeData {
        match self {
            Expr::Identifier(n) => &n.data,
            Expr::Literal(n) => &n.data,
            Expr::This(n) => &n.data,
            Expr::Array(n) => &n.data,
            Expr::Unary(n) => &n.data,
            Expr::Update(n) => &n.data,
            Expr::Binary(n) => &n.data,
            Expr::Logical(n) => &n.data,
            Expr::Assignment(n) => &n.data,
            Expr::Conditional(n) => &n.data,
            Expr::Call(n) => &n.data,
            Expr::New(n) => &n.data,
            Expr::Member(n) => &n.data,
            Expr::Function(n) => &n.data,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub data: NodeData,
    pub name: String,
}

/// The intrinsic value of a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    /// Regex literal values serialize as an empty object; the pattern and
    /// flags live on [`Literal::regex`].
    Regex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegexLiteral {
    pub pattern: String,
    pub flags: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub data: NodeData,
    pub value: LiteralValue,
    /// The literal's source spelling, for user-code literals.
    pub raw: Option<String>,
    pub regex: Option<RegexLiteral>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThisExpression {
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpression {
    pub data: NodeData,
    pub elements: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub data: NodeData,
    pub operator: &'static str,
    pub prefix: bool,
    pub argument: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub data: NodeData,
    pub operator: &'static str,
    pub prefix: bool,
    pub argument: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub data: NodeData,
    pub operator: &'static str,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    pub data: NodeData,
    pub operator: &'static str,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpression {
    pub data: NodeData,
    pub operator: &'static str,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    pub data: NodeData,
    pub test: Box<Expr>,
    pub consequent: Box<Expr>,
    pub alternate: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub data: NodeData,
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpression {
    pub data: NodeData,
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub data: NodeData,
    pub object: Box<Expr>,
    pub property: Box<Expr>,
    pub computed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpression {
    pub data: NodeData,
    pub id: Option<Identifier>,
    pub params: Vec<Identifier>,
    pub body: Box<BlockStatement>,
}

// ============================================================================
// Statements
// ============================================================================

/// All statement node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(ExpressionStatement),
    Block(BlockStatement),
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(FunctionDeclaration),
    Return(ReturnStatement),
    If(IfStatement),
    For(ForStatement),
    ForIn(ForInStatement),
    While(WhileStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Empty(EmptyStatement),
    Try(TryStatement),
    Throw(ThrowStatement),
}

impl Stmt {
    /// The shared node data of any statement.
    pub fn data(&self) -> &NodeData {
        match self {
            Stmt::Expression(n) => &n.data,
            Stmt::Block(n) => &n.data,
            Stmt::VariableDeclaration(n) => &n.data,
            Stmt::FunctionDeclaration(n) => &n.data,
            Stmt::Return(n) => &n.data,
            Stmt::If(n) => &n.data,
            Stmt::For(n) => &n.data,
            Stmt::ForIn(n) => &n.data,
            Stmt::While(n) => &n.data,
            Stmt::Break(n) => &n.data,
            Stmt::Continue(n) => &n.data,
            Stmt::Empty(n) => &n.data,
            Stmt::Try(n) => &n.data,
            Stmt::Throw(n) => &n.data,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub data: NodeData,
    pub expression: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub data: NodeData,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub data: NodeData,
    pub declarations: Vec<VariableDeclarator>,
    /// Always `"var"`; the target language's function-scoped binding is the
    /// closest match for Python's function-local variables.
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    pub data: NodeData,
    pub id: Identifier,
    pub init: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub data: NodeData,
    pub id: Identifier,
    pub params: Vec<Identifier>,
    pub body: Box<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub data: NodeData,
    pub argument: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub data: NodeData,
    pub test: Box<Expr>,
    pub consequent: Box<Stmt>,
    pub alternate: Option<Box<Stmt>>,
}

/// The init slot of a `for` statement, or the left slot of `for`-`in`.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Declaration(VariableDeclaration),
    Expression(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub data: NodeData,
    pub init: Option<ForInit>,
    pub test: Option<Box<Expr>>,
    pub update: Option<Box<Expr>>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForInStatement {
    pub data: NodeData,
    pub left: ForInit,
    pub right: Box<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub data: NodeData,
    pub test: Box<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStatement {
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStatement {
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStatement {
    pub data: NodeData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    pub data: NodeData,
    pub block: Box<BlockStatement>,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<Box<BlockStatement>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub data: NodeData,
    pub param: Identifier,
    pub body: Box<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStatement {
    pub data: NodeData,
    pub argument: Box<Expr>,
}
