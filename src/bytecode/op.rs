// =============================================================================
// OPCODE - one-byte bytecode instructions
// =============================================================================

/// Instruction opcodes.
///
/// Each instruction is a single opcode byte, optionally followed by one
/// operand byte (see `OpCode::has_operand`).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Push `constants[idx]`. Operand: u8 constant index.
    Constant = 0,
    /// Push the variable `symbols[idx]`, creating it as `0` if unset.
    /// Operand: u8 symbol index.
    Load = 1,
    /// Pop into the variable `symbols[idx]`. Operand: u8 symbol index.
    Store = 2,

    // arithmetic: ( a b -- a<op>b )
    Add = 3,
    Sub = 4,
    Mul = 5,
    Div = 6,
    Mod = 7,

    // comparison: ( a b -- 0|1 )
    Gt = 8,
    Lt = 9,
    GtEq = 10,
    LtEq = 11,
    Eq = 12,
    NotEq = 13,

    /// Unconditional relative jump. Operand: i8 offset from the byte after
    /// the operand.
    Jump = 14,
    /// Pop; jump when the value is `0`. Operand: i8 offset.
    JumpIfFalse = 15,

    /// Reserved for function calls. Never emitted.
    Call = 16,
    /// Stop execution.
    Return = 17,
    /// Pop and write the value.
    Print = 18,
    /// Stop execution. Always the last instruction the compiler emits.
    Halt = 19,
}

impl OpCode {
    /// Whether the opcode is followed by an operand byte.
    pub fn has_operand(self) -> bool {
        matches!(
            self,
            OpCode::Constant
                | OpCode::Load
                | OpCode::Store
                | OpCode::Jump
                | OpCode::JumpIfFalse
        )
    }

    /// Encoded size of the instruction in bytes.
    pub fn width(self) -> usize {
        if self.has_operand() { 2 } else { 1 }
    }

    pub fn is_jump(self) -> bool {
        matches!(self, OpCode::Jump | OpCode::JumpIfFalse)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Constant => "CONST",
            OpCode::Load => "LOAD",
            OpCode::Store => "STORE",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::Mod => "MOD",
            OpCode::Gt => "GT",
            OpCode::Lt => "LT",
            OpCode::GtEq => "GE",
            OpCode::LtEq => "LE",
            OpCode::Eq => "EQ",
            OpCode::NotEq => "NE",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfFalse => "JUMP_FALSE",
            OpCode::Call => "CALL",
            OpCode::Return => "RETURN",
            OpCode::Print => "PRINT",
            OpCode::Halt => "HALT",
        }
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> u8 {
        op as u8
    }
}

impl TryFrom<u8> for OpCode {
    /// The byte that is not a valid opcode.
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            0 => OpCode::Constant,
            1 => OpCode::Load,
            2 => OpCode::Store,
            3 => OpCode::Add,
            4 => OpCode::Sub,
            5 => OpCode::Mul,
            6 => OpCode::Div,
            7 => OpCode::Mod,
            8 => OpCode::Gt,
            9 => OpCode::Lt,
            10 => OpCode::GtEq,
            11 => OpCode::LtEq,
            12 => OpCode::Eq,
            13 => OpCode::NotEq,
            14 => OpCode::Jump,
            15 => OpCode::JumpIfFalse,
            16 => OpCode::Call,
            17 => OpCode::Return,
            18 => OpCode::Print,
            19 => OpCode::Halt,
            other => return Err(other),
        })
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.mnemonic())
    }
}
