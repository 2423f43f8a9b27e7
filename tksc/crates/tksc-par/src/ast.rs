//! AST node definitions for TokenScript.
//!
//! Every node carries the [`Span`] of its defining token so evaluation
//! errors can point back into the original token body.

use tksc_util::Span;

/// A parsed script: a sequence of statements, optionally closed by a single
/// expression with no terminator (the usual shape of a token body such as
/// `16 * {base}px`).
#[derive(Debug, Clone)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub trailing: Option<Expr>,
}

impl Program {
    /// True when the script contains nothing at all.
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty() && self.trailing.is_none()
    }
}

/// Statement
#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl(VarDeclStmt),
    Assign(AssignStmt),
    If(IfStmt),
    While(WhileStmt),
    Return(ReturnStmt),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::VarDecl(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Expr(s) => s.span,
        }
    }
}

/// `variable name: Type.Sub = init;`
#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    pub name: String,
    pub ty: TypeDecl,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Declared type, e.g. `Number`, `Color.Hex`, `NumberWithUnit.Px`.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub base: String,
    pub sub: Option<String>,
    pub span: Span,
}

/// `lvalue = expr;`
#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub target: LValue,
    pub value: Expr,
    pub span: Span,
}

/// Assignment target: a bare variable or a dotted attribute chain.
#[derive(Debug, Clone)]
pub enum LValue {
    Var { name: String, span: Span },
    Attr {
        base: String,
        chain: Vec<String>,
        span: Span,
    },
}

impl LValue {
    pub fn span(&self) -> Span {
        match self {
            LValue::Var { span, .. } | LValue::Attr { span, .. } => *span,
        }
    }
}

/// `if (cond) [..] elif (cond) [..] else [..]`
#[derive(Debug, Clone)]
pub struct IfStmt {
    /// The `if` arm followed by any `elif` arms, in source order.
    pub arms: Vec<IfArm>,
    pub else_block: Option<Block>,
    pub span: Span,
}

/// One condition/body pair of an if statement.
#[derive(Debug, Clone)]
pub struct IfArm {
    pub cond: Expr,
    pub body: Block,
}

/// `while (cond) [..]`
#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
    pub span: Span,
}

/// `return expr;`
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Expr,
    pub span: Span,
}

/// An expression in statement position.
#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// `[ statement* ]`
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Expression
#[derive(Debug, Clone)]
pub enum Expr {
    /// Numeric literal.
    Number(NumberLit),
    /// Bare identifier; resolves to a variable if one is in scope, and to a
    /// plain string otherwise.
    Str(StrLit),
    /// Quoted string literal.
    ExplicitStr(StrLit),
    /// `#RGB` / `#RRGGBB` literal.
    HexColor(StrLit),
    /// `true` / `false`.
    Bool(BoolLit),
    /// `null` / `undefined`.
    Null(Span),
    /// `{dotted.name}`.
    Reference(RefExpr),
    /// `<expr><unit>`, e.g. `2px` or `{base}px`.
    UnitSuffix(UnitSuffixExpr),
    /// `-expr` or `!expr`.
    Unary(UnaryExpr),
    /// Arithmetic binary operation.
    Binary(BinaryExpr),
    /// `&&` / `||`, short-circuiting.
    Logical(LogicalExpr),
    /// Comparison, non-chaining.
    Compare(CompareExpr),
    /// Explicit (comma) or implicit (juxtaposition) list.
    List(ListExpr),
    /// `name(args)`.
    Call(CallExpr),
    /// `expr.name`.
    Attribute(AttrExpr),
    /// `expr.name(args)`.
    MethodCall(MethodCallExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(e) => e.span,
            Expr::Str(e) | Expr::ExplicitStr(e) | Expr::HexColor(e) => e.span,
            Expr::Bool(e) => e.span,
            Expr::Null(span) => *span,
            Expr::Reference(e) => e.span,
            Expr::UnitSuffix(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Logical(e) => e.span,
            Expr::Compare(e) => e.span,
            Expr::List(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::Attribute(e) => e.span,
            Expr::MethodCall(e) => e.span,
        }
    }
}

/// Numeric literal payload.
#[derive(Debug, Clone)]
pub struct NumberLit {
    pub value: f64,
    /// Whether the source spelled a decimal point.
    pub is_float: bool,
    pub span: Span,
}

/// String-like literal payload.
#[derive(Debug, Clone)]
pub struct StrLit {
    pub value: String,
    pub span: Span,
}

/// Boolean literal payload.
#[derive(Debug, Clone)]
pub struct BoolLit {
    pub value: bool,
    pub span: Span,
}

/// `{name}` payload.
#[derive(Debug, Clone)]
pub struct RefExpr {
    pub name: String,
    pub span: Span,
}

/// Unit suffix payload.
#[derive(Debug, Clone)]
pub struct UnitSuffixExpr {
    pub expr: Box<Expr>,
    /// Canonical lowercase unit keyword (`px`, `%`, ...).
    pub unit: String,
    pub span: Span,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Unary expression payload.
#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub expr: Box<Expr>,
    pub span: Span,
}

/// Arithmetic binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    /// `^`, right-associative.
    Pow,
}

/// Binary expression payload.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

/// Short-circuiting logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Logical expression payload.
#[derive(Debug, Clone)]
pub struct LogicalExpr {
    pub op: LogicalOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Comparison expression payload.
#[derive(Debug, Clone)]
pub struct CompareExpr {
    pub op: CmpOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

/// List payload. Implicit lists come from juxtaposition (`1px 2px`),
/// explicit lists from the comma operator (`a, b`).
#[derive(Debug, Clone)]
pub struct ListExpr {
    pub items: Vec<Expr>,
    pub is_implicit: bool,
    pub span: Span,
}

/// Function call payload.
#[derive(Debug, Clone)]
pub struct CallExpr {
    /// Original casing preserved: uninterpreted keywords are case-sensitive.
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// Attribute access payload.
#[derive(Debug, Clone)]
pub struct AttrExpr {
    pub receiver: Box<Expr>,
    pub name: String,
    pub span: Span,
}

/// Method call payload.
#[derive(Debug, Clone)]
pub struct MethodCallExpr {
    pub receiver: Box<Expr>,
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Span,
}
