//! Source-to-output pipeline.
//!
//! `Pipeline` strings the stages together: tokenize, parse, compile, run.
//! Each stage is also available on its own so the CLI can stop early to dump
//! tokens, the AST or the disassembly.
//!
//! ```no_run
//! # use kindle::pipeline::Pipeline;
//! let pipeline = Pipeline::new("print(1 + 2 * 3);");
//! let mut out = Vec::new();
//! pipeline.run_to(&mut out, Default::default())?;
//! assert_eq!(out, b"7");
//! # Ok::<(), kindle::pipeline::Error>(())
//! ```

use crate::bytecode::{self, Bytecode, CompileError};
use crate::frontend::{self, ParseError, Token};
use crate::lang::program::Program;
use crate::runtime::{RuntimeError, VmBc, VmBcConfig};
use std::io::Write;

/// Errors that can occur during pipeline execution
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    // Compile and runtime errors carry their own prefix.
    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),
}

pub struct Pipeline<'src> {
    source: &'src str,
}

impl<'src> Pipeline<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source }
    }

    pub fn tokens(&self) -> Vec<Token> {
        frontend::tokenize(self.source)
    }

    pub fn parse(&self) -> Result<Program, Error> {
        Ok(frontend::parse(self.tokens())?)
    }

    pub fn compile(&self, program: &Program) -> Result<Bytecode, Error> {
        Ok(bytecode::compile(program)?)
    }

    /// Parses and compiles.
    pub fn build(&self) -> Result<Bytecode, Error> {
        let program = self.parse()?;
        self.compile(&program)
    }

    /// Runs the whole pipeline, writing program output to `out`.
    pub fn run_to<W: Write>(&self, out: W, config: VmBcConfig) -> Result<(), Error> {
        let bc = self.build()?;
        let mut vm = VmBc::with_output(config, out);
        vm.run(&bc)?;
        Ok(())
    }
}

/// Runs `source` with the default VM configuration and returns what it
/// printed.
pub fn run_source(source: &str) -> Result<String, Error> {
    let mut out = Vec::new();
    Pipeline::new(source).run_to(&mut out, VmBcConfig::default())?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_source() {
        assert_eq!(run_source("print(1 + 2 * 3);").unwrap(), "7");
    }

    #[test]
    fn test_parse_error_is_prefixed() {
        let err = run_source("print(1 +);").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().starts_with("Parse error: 1:10: "));
    }

    #[test]
    fn test_compile_error_passes_through() {
        let err = run_source("print(\"x\");").unwrap_err();
        assert!(matches!(err, Error::Compile(_)));
        assert!(err.to_string().starts_with("compile error: 1:7: "));
    }

    #[test]
    fn test_runtime_error_passes_through() {
        let err = run_source("print(1 / 0);").unwrap_err();
        assert!(matches!(err, Error::Runtime(RuntimeError::DivisionByZero { .. })));
        assert!(err.to_string().starts_with("runtime error: division by zero"));
    }

    #[test]
    fn test_build_stops_before_running() {
        let bc = Pipeline::new("print(1 / 0);").build().unwrap();
        assert!(!bc.is_empty());
    }
}
