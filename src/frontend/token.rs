/// Longest lexeme kept in a token's `text`. Longer identifiers, numbers and
/// strings are cut to this many characters.
pub const MAX_TOKEN_TEXT: usize = 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special
    Eof,
    Error,

    // Keywords
    If,
    Else,
    While,
    Function,
    Return,
    Print,

    // Delimiters
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Semicolon, // ;
    Comma,     // ,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Assignment and comparison
    Assign, // =
    Gt,
    Lt,
    GtEq,
    LtEq,
    EqEq,
    NotEq,

    // Identifiers and literals
    Ident,
    Number,
    Str,
}

impl TokenKind {
    /// Maps identifier text to its keyword kind, if it is one.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        match text {
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "function" => Some(TokenKind::Function),
            "return" => Some(TokenKind::Return),
            "print" => Some(TokenKind::Print),
            _ => None,
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Function
                | TokenKind::Return
                | TokenKind::Print
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Eof => "end of input",
            TokenKind::Error => "invalid character",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::Print => "print",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Assign => "=",
            TokenKind::Gt => ">",
            TokenKind::Lt => "<",
            TokenKind::GtEq => ">=",
            TokenKind::LtEq => "<=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::Str => "string",
        };
        write!(f, "{}", s)
    }
}

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn new(line: usize, col: usize) -> Self {
        Span { line, col }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A classified, positioned lexeme.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Text used when the token shows up in a diagnostic.
    pub fn describe(&self) -> String {
        if self.text.is_empty() {
            self.kind.to_string()
        } else {
            self.text.clone()
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Ident | TokenKind::Number | TokenKind::Error => {
                write!(f, "{}", self.text)
            }
            TokenKind::Str => write!(f, "\"{}\"", self.text),
            TokenKind::Eof => write!(f, "EOF"),
            kind => write!(f, "{}", kind),
        }
    }
}
