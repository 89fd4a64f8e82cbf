//! Source text to syntax tree: tokens, the lexer and the parser.

pub mod lexer;
pub mod parser;
pub mod parser_error;
pub mod token;
pub mod token_dumper;

pub use lexer::{Lexer, tokenize};
pub use parser::{Parser, parse};
pub use parser_error::ParseError;
pub use token::{Span, Token, TokenKind};
