use super::node::Stmt;

/// Parsed kindle program: top-level statements and function declarations in
/// source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    /// Declared functions, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &Stmt> {
        self.statements
            .iter()
            .filter(|s| matches!(s, Stmt::Function { .. }))
    }
}
