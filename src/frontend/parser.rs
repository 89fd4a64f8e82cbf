use crate::frontend::parser_error::ParseError;
use crate::frontend::token::{Span, Token, TokenKind};
use crate::lang::node::{BinaryOp, Block, Expr, Literal, Stmt};
use crate::lang::program::Program;

/// Recursive-descent parser for kindle.
///
/// The parser consumes lexed tokens and produces a `Program`. Binary
/// expressions use precedence climbing (see `parse_expression`).
///
/// Notes:
/// - There is no error recovery: the first unexpected token is reported and
///   parsing stops.
/// - Lexer `Error` tokens are not filtered; they are rejected wherever they
///   show up.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// Parses a complete token sequence.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    Parser::new(tokens).parse()
}

impl Parser {
    /// Creates a new parser from lexer output.
    ///
    /// A trailing `Eof` is appended if the sequence does not already end with
    /// one, so the cursor always has a token to look at.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or(Span::new(1, 1));
            tokens.push(Token::new(TokenKind::Eof, "", span));
        }
        Parser { tokens, pos: 0 }
    }

    /// Returns the current token without consuming it.
    ///
    /// Once the cursor reaches `Eof` it stays there.
    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    /// Peeks the token after the current one without consuming anything.
    fn peek_next(&self) -> TokenKind {
        let last = self.tokens.len() - 1;
        self.tokens[(self.pos + 1).min(last)].kind
    }

    /// Consumes the current token and returns it. Never moves past `Eof`.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    /// Consumes the current token if it has the given kind.
    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a required token or fails with `message`.
    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    /// Builds an error positioned at the current token.
    fn error(&self, message: &str) -> ParseError {
        let token = self.current();
        ParseError::new(
            format!("{}, found '{}'", message, token.describe()),
            token.span,
        )
    }

    /// Parses a complete kindle program.
    ///
    /// ```text
    /// program := (function-decl | statement)* EOF
    /// ```
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::Eof) {
            let stmt = if self.check(TokenKind::Function) {
                self.parse_function()?
            } else {
                self.parse_statement()?
            };
            statements.push(stmt);
        }

        Ok(Program { statements })
    }

    /// Parses a function declaration:
    ///
    /// ```text
    /// function <name> ( <param>, ... ) { <body> }
    /// ```
    fn parse_function(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // consume 'function'

        let name = self.expect(TokenKind::Ident, "expected function name after 'function'")?;
        self.expect(TokenKind::LParen, "expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.match_kind(TokenKind::RParen) {
            loop {
                let param = self.expect(TokenKind::Ident, "expected parameter name")?;
                params.push(param.text);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "expected ')' after parameters")?;
        }

        let body = self.parse_block()?;

        Ok(Stmt::Function {
            name: name.text,
            params,
            body,
            span: name.span,
        })
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => {
                let keyword = self.advance();
                let value = self.parse_expression(0)?;
                self.expect(TokenKind::Semicolon, "expected ';' after return value")?;
                Ok(Stmt::Return {
                    value,
                    span: keyword.span,
                })
            }
            // `name = ...` is an assignment only when '=' follows directly.
            TokenKind::Ident if self.peek_next() == TokenKind::Assign => {
                let name = self.advance();
                self.advance(); // consume '='
                let value = self.parse_expression(0)?;
                self.expect(TokenKind::Semicolon, "expected ';' after assignment")?;
                Ok(Stmt::Assign {
                    name: name.text,
                    value,
                    span: name.span,
                })
            }
            _ => {
                let expr = self.parse_expression(0)?;
                self.expect(TokenKind::Semicolon, "expected ';' after expression")?;
                let span = expr.span();
                Ok(Stmt::Expr { expr, span })
            }
        }
    }

    /// ```text
    /// if ( <cond> ) { ... } [ else { ... } ]
    /// ```
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.advance(); // consume 'if'

        self.expect(TokenKind::LParen, "expected '(' after 'if'")?;
        let cond = self.parse_expression(0)?;
        self.expect(TokenKind::RParen, "expected ')' after condition")?;

        let then_block = self.parse_block()?;
        let else_block = if self.match_kind(TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
            span: keyword.span,
        })
    }

    /// ```text
    /// while ( <cond> ) { ... }
    /// ```
    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.advance(); // consume 'while'

        self.expect(TokenKind::LParen, "expected '(' after 'while'")?;
        let cond = self.parse_expression(0)?;
        self.expect(TokenKind::RParen, "expected ')' after condition")?;

        let body = self.parse_block()?;

        Ok(Stmt::While {
            cond,
            body,
            span: keyword.span,
        })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.expect(TokenKind::LBrace, "expected '{'")?;

        let mut statements = Vec::new();
        while !self.match_kind(TokenKind::RBrace) {
            if self.check(TokenKind::Eof) {
                return Err(self.error("expected '}' to close block"));
            }
            statements.push(self.parse_statement()?);
        }

        Ok(Block {
            statements,
            span: open.span,
        })
    }

    /// Precedence climbing over binary operators.
    ///
    /// Keeps folding operators whose binding power is at least `min_prec`.
    /// The right operand of each operator is parsed with `prec + 1`, so a run
    /// of equal-precedence operators groups to the left:
    /// `10 - 3 - 2` is `(10 - 3) - 2`.
    fn parse_expression(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_primary()?;

        loop {
            let Some(op) = BinaryOp::from_token(self.peek()) else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }

            let op_token = self.advance();
            let rhs = self.parse_expression(prec + 1)?;
            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                span: op_token.span,
            };
        }

        Ok(lhs)
    }

    /// ```text
    /// primary := NUMBER | STRING | (IDENT | print) [ ( args ) ] | ( expr )
    /// ```
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();

        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value: i64 = token.text.parse().map_err(|_| {
                    ParseError::new(
                        format!("integer literal '{}' is out of range", token.text),
                        token.span,
                    )
                })?;
                Ok(Expr::Literal {
                    value: Literal::Integer(value),
                    span: token.span,
                })
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Str(token.text),
                    span: token.span,
                })
            }
            TokenKind::Ident | TokenKind::Print => {
                self.advance();
                if self.match_kind(TokenKind::LParen) {
                    let args = self.parse_arguments()?;
                    Ok(Expr::Call {
                        name: token.text,
                        args,
                        span: token.span,
                    })
                } else {
                    Ok(Expr::Variable {
                        name: token.text,
                        span: token.span,
                    })
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression(0)?;
                self.expect(TokenKind::RParen, "expected ')'")?;
                Ok(expr)
            }
            TokenKind::Error => Err(ParseError::new(
                format!("unrecognized character '{}'", token.text),
                token.span,
            )),
            TokenKind::Eof => Err(ParseError::new(
                "unexpected end of input, expected an expression",
                token.span,
            )),
            _ => Err(ParseError::new(
                format!("unexpected token '{}'", token.describe()),
                token.span,
            )),
        }
    }

    /// Parses call arguments after the opening parenthesis.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.match_kind(TokenKind::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression(0)?);
            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "expected ')' after arguments")?;

        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        parse(tokenize(source))
    }

    fn parse_ok(source: &str) -> Program {
        parse_source(source).expect("program should parse")
    }

    fn parse_err(source: &str) -> ParseError {
        match parse_source(source) {
            Ok(program) => panic!("expected parse error, got {:?}", program),
            Err(e) => e,
        }
    }

    /// Parses `source` as a single expression statement and renders the
    /// grouping with explicit parentheses.
    fn grouping(source: &str) -> String {
        fn render(expr: &Expr) -> String {
            match expr {
                Expr::Binary {
                    op, left, right, ..
                } => format!("({} {} {})", render(left), op, render(right)),
                Expr::Literal {
                    value: Literal::Integer(n),
                    ..
                } => n.to_string(),
                Expr::Literal {
                    value: Literal::Str(s),
                    ..
                } => format!("{:?}", s),
                Expr::Variable { name, .. } => name.clone(),
                Expr::Call { name, args, .. } => {
                    let args: Vec<String> = args.iter().map(render).collect();
                    format!("{}({})", name, args.join(", "))
                }
            }
        }

        let program = parse_ok(&format!("{};", source));
        match &program.statements[..] {
            [Stmt::Expr { expr, .. }] => render(expr),
            other => panic!("expected one expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_program() {
        let program = parse_ok("");
        assert!(program.statements.is_empty());
    }

    #[test]
    fn test_precedence() {
        assert_eq!(grouping("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(grouping("1 * 2 + 3"), "((1 * 2) + 3)");
        assert_eq!(grouping("1 + 2 < 3 * 4"), "((1 + 2) < (3 * 4))");
        assert_eq!(grouping("7 % 3 == 1"), "((7 % 3) == 1)");
    }

    #[test]
    fn test_equal_precedence_chains_group_left() {
        assert_eq!(grouping("10 - 3 - 2"), "((10 - 3) - 2)");
        assert_eq!(grouping("100 / 10 / 5"), "((100 / 10) / 5)");
        assert_eq!(grouping("1 - 2 + 3"), "((1 - 2) + 3)");
    }

    #[test]
    fn test_parentheses_override_precedence() {
        assert_eq!(grouping("(1 + 2) * 3"), "((1 + 2) * 3)");
        assert_eq!(grouping("10 - (3 - 2)"), "(10 - (3 - 2))");
    }

    #[test]
    fn test_calls() {
        assert_eq!(grouping("print($x + 1)"), "print(($x + 1))");
        assert_eq!(grouping("foo(1, 2, bar())"), "foo(1, 2, bar())");
        assert_eq!(grouping("foo()"), "foo()");
    }

    #[test]
    fn test_string_literal_parses() {
        assert_eq!(grouping("print(\"hi\")"), "print(\"hi\")");
    }

    #[test]
    fn test_assignment() {
        let program = parse_ok("$x = 1 + 2;");
        match &program.statements[0] {
            Stmt::Assign { name, value, span } => {
                assert_eq!(name, "$x");
                assert!(matches!(value, Expr::Binary { op: BinaryOp::Add, .. }));
                assert_eq!(*span, Span::new(1, 1));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_without_dollar() {
        let program = parse_ok("count = 3;");
        assert!(matches!(&program.statements[0], Stmt::Assign { name, .. } if name == "count"));
    }

    #[test]
    fn test_identifier_without_assign_is_expression() {
        let program = parse_ok("$x == 1;");
        assert!(matches!(&program.statements[0], Stmt::Expr { .. }));
    }

    #[test]
    fn test_if_else() {
        let program = parse_ok("if (1 < 2) { print(1); } else { print(2); print(3); }");
        match &program.statements[0] {
            Stmt::If {
                then_block,
                else_block,
                ..
            } => {
                assert_eq!(then_block.statements.len(), 1);
                assert_eq!(else_block.as_ref().map(|b| b.statements.len()), Some(2));
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_if_without_else() {
        let program = parse_ok("if ($x) { }");
        assert!(matches!(
            &program.statements[0],
            Stmt::If { else_block: None, .. }
        ));
    }

    #[test]
    fn test_while() {
        let program = parse_ok("while ($i < 5) { $i = $i + 1; }");
        match &program.statements[0] {
            Stmt::While { body, span, .. } => {
                assert_eq!(body.statements.len(), 1);
                assert_eq!(*span, Span::new(1, 1));
            }
            other => panic!("expected while, got {:?}", other),
        }
    }

    #[test]
    fn test_return() {
        let program = parse_ok("return 42;");
        assert!(matches!(&program.statements[0], Stmt::Return { .. }));
    }

    #[test]
    fn test_function_declaration() {
        let program = parse_ok("function add(a, b) { return a + b; } print(1);");
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.functions().count(), 1);
        match &program.statements[0] {
            Stmt::Function {
                name, params, body, ..
            } => {
                assert_eq!(name, "add");
                assert_eq!(params, &vec!["a".to_string(), "b".to_string()]);
                assert_eq!(body.statements.len(), 1);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_function_without_params() {
        let program = parse_ok("function main() { }");
        assert!(matches!(
            &program.statements[0],
            Stmt::Function { params, .. } if params.is_empty()
        ));
    }

    #[test]
    fn test_nested_blocks() {
        let program = parse_ok("while (1) { if (2) { while (3) { print(4); } } }");
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_err("print(1)\nprint(2);");
        assert_eq!((err.line, err.col), (2, 1));
        assert!(err.message.contains("expected ';'"), "{}", err.message);
    }

    #[test]
    fn test_missing_paren_after_if() {
        let err = parse_err("if 1 { }");
        assert_eq!((err.line, err.col), (1, 4));
        assert!(err.message.contains("'(' after 'if'"), "{}", err.message);
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse_err("while (1) { print(1);");
        assert!(err.message.contains("expected '}'"), "{}", err.message);
    }

    #[test]
    fn test_error_token_is_reported() {
        let err = parse_err("$x = 1 @ 2;");
        assert_eq!((err.line, err.col), (1, 8));
        assert!(err.message.contains("'@'"), "{}", err.message);

        let err = parse_err("print(!1);");
        assert!(err.message.contains("unrecognized character '!'"), "{}", err.message);
    }

    #[test]
    fn test_unexpected_token_in_primary() {
        let err = parse_err("$x = ;");
        assert_eq!((err.line, err.col), (1, 6));
        assert!(err.message.contains("unexpected token ';'"), "{}", err.message);
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let err = parse_err("$x = 1 +");
        assert!(err.message.contains("unexpected end of input"), "{}", err.message);
    }

    #[test]
    fn test_integer_out_of_range() {
        let err = parse_err("print(99999999999999999999);");
        assert!(err.message.contains("out of range"), "{}", err.message);
    }

    #[test]
    fn test_function_inside_block_is_rejected() {
        let err = parse_err("if (1) { function f() { } }");
        assert!(err.message.contains("'function'"), "{}", err.message);
    }

    #[test]
    fn test_parser_without_eof_token() {
        let mut tokens = tokenize("print(1);");
        tokens.pop();
        let program = parse(tokens).expect("should parse");
        assert_eq!(program.statements.len(), 1);
    }
}
