pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod ir;
pub mod op;

pub use compile::{Compiler, compile};
pub use compile_error::CompileError;
pub use ir::Bytecode;
pub use op::OpCode;
