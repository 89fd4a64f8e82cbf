use crate::frontend::token::{Span, TokenKind};

/// A `{ ... }` statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    /// Position of the opening brace.
    pub span: Span,
}

/// Statement node of the kindle syntax tree.
///
/// Every statement owns its children outright; dropping a statement drops the
/// whole subtree.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    // ───────────────────────────── Simple ───────────────────────────────
    /// An expression evaluated for its side effects: `print(1);`
    Expr { expr: Expr, span: Span },

    /// Variable assignment: `$x = 1 + 2;`
    ///
    /// Variables need no declaration; the first assignment creates them.
    Assign {
        name: String,
        value: Expr,
        span: Span,
    },

    /// `return <expr>;`
    ///
    /// At program scope this stops execution.
    Return { value: Expr, span: Span },

    // ──────────────────────────── Control flow ──────────────────────────
    /// `if (cond) { ... } else { ... }`
    ///
    /// The condition is false when it evaluates to `0`.
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
        span: Span,
    },

    /// `while (cond) { ... }`
    While {
        cond: Expr,
        body: Block,
        span: Span,
    },

    // ───────────────────────────── Definitions ──────────────────────────
    /// `function name(a, b) { ... }`
    ///
    /// Only accepted at program scope. The compiler does not lower function
    /// declarations yet: they parse, but produce no code.
    Function {
        name: String,
        params: Vec<String>,
        body: Block,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Function { span, .. } => *span,
        }
    }
}

/// Literal payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    /// Accepted by the grammar; the bytecode compiler rejects it.
    Str(String),
}

/// Expression node of the kindle syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `left <op> right`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },

    Literal { value: Literal, span: Span },

    /// A variable read. Unset variables read as `0`.
    Variable { name: String, span: Span },

    /// `name(args...)`
    ///
    /// `print` with one argument is the only call the compiler lowers.
    Call {
        name: String,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Binary { span, .. }
            | Expr::Literal { span, .. }
            | Expr::Variable { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }
}

/// Binary operators, both arithmetic and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Gt,
    Lt,
    GtEq,
    LtEq,
    Eq,
    NotEq,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        Some(match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            _ => return None,
        })
    }

    /// Binding power used by precedence climbing. Higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 3,
            BinaryOp::Add | BinaryOp::Sub => 2,
            BinaryOp::Gt
            | BinaryOp::Lt
            | BinaryOp::GtEq
            | BinaryOp::LtEq
            | BinaryOp::Eq
            | BinaryOp::NotEq => 1,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::GtEq => ">=",
            BinaryOp::LtEq => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
