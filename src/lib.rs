//! kindle: a small imperative scripting language.
//!
//! Source is tokenized and parsed into an AST (`frontend`, `lang`), lowered
//! to a compact byte-encoded program (`bytecode`) and executed by a stack
//! machine (`runtime`). `pipeline` ties the stages together.

pub mod bytecode;
pub mod frontend;
pub mod lang;
pub mod pipeline;
pub mod runtime;

pub use bytecode::{Bytecode, CompileError};
pub use frontend::ParseError;
pub use pipeline::{Error, Pipeline, run_source};
pub use runtime::{RuntimeError, VmBc, VmBcConfig};
