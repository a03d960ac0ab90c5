use crate::{
    ast::{Expr, FunctionDecl, LiteralValue, Stmt},
    error::Reporter,
    token::{Token, TokenKind},
};
use std::rc::Rc;
use thiserror::Error;

const MAX_ARITY: usize = 255;

/// Recursive descent parser. Syntax errors are reported and the parser
/// resynchronizes at the next statement boundary, so one pass can report
/// several independent errors.
pub struct Parser<'a, 'r> {
    tokens: &'a [Token],
    current: usize,
    num_of_parser_errs: usize,
    loop_depth: usize,
    function_depth: usize,
    reporter: &'r mut dyn Reporter,
}

/// Parses `tokens`, which must end with an `Eof` token.
pub fn parse(tokens: &[Token], reporter: &mut dyn Reporter) -> Vec<Stmt> {
    Parser::new(tokens, reporter).parse()
}

impl<'a, 'r> Parser<'a, 'r> {
    pub fn new(tokens: &'a [Token], reporter: &'r mut dyn Reporter) -> Parser<'a, 'r> {
        Parser {
            tokens,
            current: 0,
            num_of_parser_errs: 0,
            loop_depth: 0,
            function_depth: 0,
            reporter,
        }
    }

    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements: Vec<Stmt> = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        tracing::debug!(
            statements = statements.len(),
            errors = self.num_of_parser_errs,
            "parsed program"
        );
        statements
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    fn advance(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn peek(&self) -> &'a Token {
        // The stream always ends with Eof; clamp in case a caller passed an empty slice.
        let tokens: &'a [Token] = self.tokens;
        &tokens[self.current.min(tokens.len().saturating_sub(1))]
    }

    fn previous(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        &tokens[self.current.saturating_sub(1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<&'a Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::new(self.peek(), message))
        }
    }

    /// Reports an error that does not need resynchronizing.
    fn error(&mut self, token: &Token, message: &str) {
        self.num_of_parser_errs += 1;
        self.reporter.error_at(token, message);
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let stmt = if self.matches(&[TokenKind::Var]) {
            self.var_declaration()
        } else if self.matches(&[TokenKind::Fun]) {
            self.function().map(|fun| Stmt::Function(Rc::new(fun)))
        } else {
            self.statement()
        };

        match stmt {
            Ok(stmt) => Some(stmt),
            Err(err) => {
                self.error(&err.token, &err.message);
                self.synchronize();
                None
            }
        }
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self
            .consume(TokenKind::Identifier, "Expect variable name.")?
            .clone();

        let mut initializer = None;
        if self.matches(&[TokenKind::Equal]) {
            initializer = Some(self.expression()?);
        }
        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        use TokenKind::*;

        if self.matches(&[Print]) {
            self.print_statement()
        } else if self.matches(&[If]) {
            self.if_statement()
        } else if self.matches(&[While]) {
            self.while_statement()
        } else if self.matches(&[For]) {
            self.for_statement()
        } else if self.matches(&[Return]) {
            self.return_statement()
        } else if self.matches(&[Break, Continue]) {
            self.loop_control_statement()
        } else if self.matches(&[Sleep]) {
            self.sleep_statement()
        } else if self.matches(&[LeftBrace]) {
            let statements = self.block()?;
            Ok(Stmt::Block { statements })
        } else {
            self.expression_statement()
        }
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.statement()?);

        let mut else_branch = None;
        if self.matches(&[TokenKind::Else]) {
            else_branch = Some(Box::new(self.statement()?));
        }
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.loop_body()?);
        Ok(Stmt::While { condition, body })
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;
        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(Box::new(self.var_declaration()?))
        } else {
            Some(Box::new(self.expression_statement()?))
        };

        let mut condition = None;
        if !self.check(TokenKind::Semicolon) {
            condition = Some(self.expression()?);
        }
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let mut increment = None;
        if !self.check(TokenKind::RightParen) {
            increment = Some(self.expression()?);
        }
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;
        let body = Box::new(self.loop_body()?);

        Ok(Stmt::For {
            initializer,
            condition,
            increment,
            body,
        })
    }

    fn loop_body(&mut self) -> ParseResult<Stmt> {
        self.loop_depth += 1;
        let body = self.statement();
        self.loop_depth -= 1;
        body
    }

    fn loop_control_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous();
        if self.loop_depth == 0 {
            let message = format!("Can't use '{}' outside of a loop.", keyword.lexeme);
            self.error(keyword, &message);
        }
        let message = format!("Expect ';' after '{}'.", keyword.lexeme);
        self.consume(TokenKind::Semicolon, &message)?;

        if keyword.kind == TokenKind::Break {
            Ok(Stmt::Break)
        } else {
            Ok(Stmt::Continue)
        }
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        if self.function_depth == 0 {
            self.error(&keyword, "Can't return from top-level code.");
        }
        let mut value = None;
        if !self.check(TokenKind::Semicolon) {
            value = Some(self.expression()?);
        }
        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;

        Ok(Stmt::Return { keyword, value })
    }

    fn sleep_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let duration = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after sleep duration.")?;
        Ok(Stmt::Sleep { keyword, duration })
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        let expression = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print {
            keyword,
            expression,
        })
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expression = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression { expression })
    }

    fn function(&mut self) -> ParseResult<FunctionDecl> {
        let name = self
            .consume(TokenKind::Identifier, "Expect function name.")?
            .clone();
        self.consume(TokenKind::LeftParen, "Expect '(' after function name.")?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARITY {
                    self.error(self.peek(), "Can't have more than 255 parameters.");
                }
                let param = self.consume(TokenKind::Identifier, "Expect parameter name.")?;
                params.push(param.clone());
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.")?;

        // A loop around the declaration doesn't license break/continue inside it.
        let enclosing_loop_depth = std::mem::take(&mut self.loop_depth);
        self.function_depth += 1;
        let body = self.block();
        self.function_depth -= 1;
        self.loop_depth = enclosing_loop_depth;

        Ok(FunctionDecl {
            name,
            params,
            body: body?,
        })
    }

    pub fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous();
            let value = self.assignment()?;

            if let Expr::Variable(name) = expr {
                return Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                });
            }
            self.error(equals, "Invalid assignment target.");
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while self.matches(&[TokenKind::Or]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.matches(&[TokenKind::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    /// Folds `operand (op operand)*` left-associatively.
    fn binary(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;

        while self.matches(operators) {
            let operator = self.previous().clone();
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary(
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        use TokenKind::*;
        self.binary(&[Greater, GreaterEqual, Less, LessEqual], Self::term)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary(&[TokenKind::Minus, TokenKind::Plus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary(&[TokenKind::Slash, TokenKind::Star], Self::unary)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            })
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        while self.matches(&[TokenKind::LeftParen]) {
            expr = self.finish_call(expr)?;
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    self.error(self.peek(), "Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let paren = self
            .consume(TokenKind::RightParen, "Expect ')' after arguments.")?
            .clone();

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        use TokenKind::*;

        if self.matches(&[False, True, Nil, Number, String]) {
            let literal = self.previous().literal.clone().unwrap_or(LiteralValue::Nil);
            Ok(Expr::Literal(literal))
        } else if self.matches(&[Identifier]) {
            Ok(Expr::Variable(self.previous().clone()))
        } else if self.matches(&[LeftParen]) {
            let expression = self.expression()?;
            self.consume(RightParen, "Expect ')' after expression.")?;
            Ok(Expr::Grouping {
                expression: Box::new(expression),
            })
        } else {
            Err(ParseError::new(self.peek(), "Expect expression."))
        }
    }

    /// Discards tokens until just past a `;` or up to a token that starts a statement.
    fn synchronize(&mut self) {
        use TokenKind::*;
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == Semicolon {
                return;
            }

            match self.peek().kind {
                Class | Fun | Var | For | If | While | Print | Return | Break | Continue
                | Sleep => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl ParseError {
    fn new(token: &Token, message: &str) -> ParseError {
        ParseError {
            token: token.clone(),
            message: String::from(message),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
