use crate::frontend::token::{Token, TokenKind};
use std::fmt::Write;

/// Renders lexer output one token per line, for `--tokens`.
pub struct TokenDumper {
    pub color: bool,
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self { color: true }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const RED: &'static str = "\x1b[31m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const BLU: &'static str = "\x1b[34m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn dump(&self, tokens: &[Token]) {
        print!("{}", self.render(tokens));
    }

    pub fn render(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for token in tokens {
            self.render_one(&mut out, token);
        }
        out
    }

    fn render_one(&self, out: &mut String, token: &Token) {
        let colr = if self.color { self.color(token.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "[{:02}:{:02}] {}{:<8} {}{}",
            token.span.line,
            token.span.col,
            colr,
            self.kind(token.kind),
            token,
            reset
        );
    }

    fn kind(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Eof => "EOF",
            Error => "ERROR",
            Number => "NUMBER",
            Str => "STRING",
            Ident => "IDENT",
            LParen | RParen | LBrace | RBrace | Semicolon | Comma => "PUNCT",
            Plus | Minus | Star | Slash | Percent | Assign => "OP",
            Gt | Lt | GtEq | LtEq | EqEq | NotEq => "CMP",
            k if k.is_keyword() => "KEYWORD",
            _ => "OTHER",
        }
    }

    fn color(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Eof => Self::DIM,
            Error => Self::RED,
            Str => Self::GRN,
            Number => Self::CYN,
            Ident => Self::YEL,
            Plus | Minus | Star | Slash | Percent | Assign => Self::MAG,
            Gt | Lt | GtEq | LtEq | EqEq | NotEq => Self::MAG,
            k if k.is_keyword() => Self::BLU,
            _ => Self::RESET,
        }
    }
}
