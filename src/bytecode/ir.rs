use crate::bytecode::compile_error::CompileError;
use crate::bytecode::op::OpCode;
use crate::lang::value::Value;
use serde::{Deserialize, Serialize};

/// Capacity of the constant pool. Indices are single operand bytes.
pub const MAX_CONSTANTS: usize = 256;

/// Capacity of the symbol table. Indices are single operand bytes.
pub const MAX_SYMBOLS: usize = 256;

/// A compiled kindle program.
///
/// Integer literals live in `constants` and variable names in `symbols`;
/// the two tables are separate so an operand byte can only ever mean one of
/// them, decided by the instruction that carries it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bytecode {
    /// Instruction stream: opcodes and their operand bytes.
    pub code: Vec<u8>,

    /// Literal pool, indexed by `Constant` operands.
    pub constants: Vec<Value>,

    /// Variable names, indexed by `Load` / `Store` operands.
    pub symbols: Vec<String>,
}

impl Bytecode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length of the instruction stream.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn emit_byte(&mut self, byte: u8) {
        self.code.push(byte);
    }

    pub fn emit_op(&mut self, op: OpCode) {
        self.emit_byte(op.into());
    }

    pub fn emit_op_operand(&mut self, op: OpCode, operand: u8) {
        self.emit_op(op);
        self.emit_byte(operand);
    }

    /// Overwrites a previously emitted byte (used for backpatching).
    pub fn patch(&mut self, at: usize, byte: u8) {
        self.code[at] = byte;
    }

    /// Returns the pool index for `value`, adding it when it is new.
    ///
    /// Equal values share one slot, so the pool only fills up with distinct
    /// literals.
    pub fn add_constant(&mut self, value: Value) -> Result<u8, CompileError> {
        if let Some(idx) = self.constants.iter().position(|&c| c == value) {
            return Ok(idx as u8);
        }
        if self.constants.len() >= MAX_CONSTANTS {
            return Err(CompileError::TooManyConstants);
        }
        self.constants.push(value);
        Ok((self.constants.len() - 1) as u8)
    }

    /// Returns the symbol index for `name`, adding it when it is new.
    pub fn intern_symbol(&mut self, name: &str) -> Result<u8, CompileError> {
        if let Some(idx) = self.symbols.iter().position(|s| s == name) {
            return Ok(idx as u8);
        }
        if self.symbols.len() >= MAX_SYMBOLS {
            return Err(CompileError::TooManySymbols);
        }
        self.symbols.push(name.to_string());
        Ok((self.symbols.len() - 1) as u8)
    }

    /// Encodes the program as a compact postcard image.
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Decodes an image produced by `to_bytes`.
    ///
    /// The instruction stream is not validated here; the VM reports bad
    /// opcodes and operands when it reaches them.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
