use crate::bytecode::ir::{MAX_CONSTANTS, MAX_SYMBOLS};
use crate::frontend::token::Span;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// The constant pool is full and a new distinct literal was interned.
    #[error("compile error: too many constants (the pool holds {})", MAX_CONSTANTS)]
    TooManyConstants,

    /// The symbol table is full and a new distinct variable name was interned.
    #[error("compile error: too many variables (the symbol table holds {})", MAX_SYMBOLS)]
    TooManySymbols,

    /// A branch target is further away than a signed byte can express.
    #[error(
        "compile error: {span}: jump of {distance} bytes does not fit in a signed byte\n  hint: split the {construct} body into smaller pieces"
    )]
    JumpTooFar {
        construct: &'static str,
        distance: isize,
        span: Span,
    },

    /// A node the grammar accepts but the compiler cannot lower.
    #[error("compile error: {span}: cannot compile {node_type}\n  hint: {hint}")]
    Unsupported {
        node_type: &'static str,
        hint: &'static str,
        span: Span,
    },
}

impl CompileError {
    pub fn string_literal(span: Span) -> Self {
        CompileError::Unsupported {
            node_type: "string literal",
            hint: "only integer values exist at runtime",
            span,
        }
    }
}
