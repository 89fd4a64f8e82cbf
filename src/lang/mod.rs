//! # kindle syntax tree
//!
//! This module defines the abstract syntax tree produced by the parser and
//! consumed by the bytecode compiler.
//!
//! ## Documentation conventions
//!
//! - `$name` is the conventional spelling of a variable; the `$` is part of
//!   the identifier and carries no meaning of its own.
//! - `{ ... }` denotes a block of statements.

pub mod node;
pub mod program;
pub mod value;
