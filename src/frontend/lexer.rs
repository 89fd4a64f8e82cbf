use crate::frontend::token::{MAX_TOKEN_TEXT, Span, Token, TokenKind};

/// Hand-written scanner for kindle source text.
///
/// The lexer never fails: characters it does not understand become
/// `TokenKind::Error` tokens and scanning carries on, so the parser is the
/// first stage that can reject a program.
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

/// Tokenizes `source` in one go. The result always ends with an `Eof` token.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }

    /// Skips blanks, newlines and `//` comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.current() {
            match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '/' if self.peek() == Some('/') => {
                    while let Some(c) = self.current() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Consumes characters while `pred` holds, keeping at most
    /// `MAX_TOKEN_TEXT` of them.
    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        let mut kept = 0;
        while let Some(ch) = self.current() {
            if !pred(ch) {
                break;
            }
            if kept < MAX_TOKEN_TEXT {
                text.push(ch);
                kept += 1;
            }
            self.advance();
        }
        text
    }

    fn read_identifier(&mut self, span: Span) -> Token {
        let text = self.read_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Ident);
        Token::new(kind, text, span)
    }

    fn read_number(&mut self, span: Span) -> Token {
        let text = self.read_while(|c| c.is_ascii_digit());
        Token::new(TokenKind::Number, text, span)
    }

    fn read_string(&mut self, span: Span) -> Token {
        self.advance(); // opening quote

        let text = self.read_while(|c| c != '"' && c != '\n');
        match self.current() {
            Some('"') => {
                self.advance();
                Token::new(TokenKind::Str, text, span)
            }
            // Newline or end of input before the closing quote.
            _ => Token::new(TokenKind::Error, "\"", span),
        }
    }

    fn read_operator(&mut self, span: Span) -> Token {
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, "", span);
        };

        let two_char = |next: Option<char>| next == Some('=');
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '>' | '<' | '=' | '!' if two_char(self.current()) => {
                self.advance();
                let kind = match ch {
                    '>' => TokenKind::GtEq,
                    '<' => TokenKind::LtEq,
                    '=' => TokenKind::EqEq,
                    _ => TokenKind::NotEq,
                };
                let mut text = String::from(ch);
                text.push('=');
                return Token::new(kind, text, span);
            }
            '>' => TokenKind::Gt,
            '<' => TokenKind::Lt,
            '=' => TokenKind::Assign,
            // A lone '!' and anything unknown.
            _ => TokenKind::Error,
        };

        Token::new(kind, ch.to_string(), span)
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();
            let span = self.span();

            match self.current() {
                None => {
                    tokens.push(Token::new(TokenKind::Eof, "", span));
                    break;
                }
                Some(ch) if ch.is_ascii_alphabetic() || ch == '$' => {
                    tokens.push(self.read_identifier(span));
                }
                Some(ch) if ch.is_ascii_digit() => {
                    tokens.push(self.read_number(span));
                }
                Some('"') => {
                    tokens.push(self.read_string(span));
                }
                Some(_) => {
                    tokens.push(self.read_operator(span));
                }
            }
        }

        tokens
    }
}
