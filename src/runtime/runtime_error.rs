use crate::lang::value::Value;

/// Errors raised while executing bytecode.
///
/// Offsets are positions in the instruction stream of the faulting
/// instruction.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("runtime error: stack overflow at {offset:04} (limit is {limit} values)")]
    StackOverflow { offset: usize, limit: usize },

    #[error("runtime error: stack underflow at {offset:04}: '{op}' needs {needed} value(s)")]
    StackUnderflow {
        offset: usize,
        op: &'static str,
        needed: usize,
    },

    #[error("runtime error: division by zero at {offset:04}")]
    DivisionByZero { offset: usize },

    #[error("runtime error: integer overflow at {offset:04}: {left} {op} {right}")]
    IntegerOverflow {
        offset: usize,
        op: &'static str,
        left: Value,
        right: Value,
    },

    #[error("runtime error: unknown opcode 0x{opcode:02x} at {offset:04}")]
    UnknownOpcode { opcode: u8, offset: usize },

    #[error("runtime error: '{op}' at {offset:04} is missing its operand byte")]
    TruncatedInstruction { offset: usize, op: &'static str },

    #[error("runtime error: constant index {index} at {offset:04} is out of range")]
    InvalidConstant { offset: usize, index: u8 },

    #[error("runtime error: symbol index {index} at {offset:04} is out of range")]
    InvalidSymbol { offset: usize, index: u8 },

    #[error("runtime error: jump at {offset:04} lands outside the program (target {target})")]
    InvalidJump { offset: usize, target: isize },

    #[error("runtime error: too many variables (limit is {limit})")]
    TooManyVariables { limit: usize },

    #[error("runtime error: execution step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    #[error("runtime error: failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
