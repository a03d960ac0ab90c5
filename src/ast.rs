use std::fmt;
use std::rc::Rc;

use crate::token::Token;

/// Value carried by a literal token or a literal expression.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
}

/// Renders the literal the way it would be written in source, strings quoted.
impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(number) => write!(f, "{number}"),
            LiteralValue::String(string) => write!(f, "\"{string}\""),
            LiteralValue::Boolean(boolean) => write!(f, "{boolean}"),
            LiteralValue::Nil => write!(f, "nil"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(LiteralValue),
    Grouping {
        expression: Box<Expr>,
    },
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Variable(Token),
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },
}

/// Source rendering of an expression.
///
/// Parser output nests a lower precedence operator only through `Grouping`,
/// so scanning and parsing the rendered text rebuilds the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal) => write!(f, "{literal}"),
            Expr::Grouping { expression } => write!(f, "({expression})"),
            Expr::Unary { operator, right } => write!(f, "{}{right}", operator.lexeme),
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => write!(f, "{left} {} {right}", operator.lexeme),
            Expr::Variable(name) => write!(f, "{}", name.lexeme),
            Expr::Assign { name, value } => write!(f, "{} = {value}", name.lexeme),
            Expr::Call {
                callee, arguments, ..
            } => {
                write!(f, "{callee}(")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expression {
        expression: Expr,
    },
    Print {
        keyword: Token,
        expression: Expr,
    },
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block {
        statements: Vec<Stmt>,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    For {
        initializer: Option<Box<Stmt>>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Box<Stmt>,
    },
    Function(Rc<FunctionDecl>),
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    Break,
    Continue,
    Sleep {
        keyword: Token,
        duration: Expr,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;
    use pretty_assertions::assert_eq;

    fn number(value: f64) -> Box<Expr> {
        Box::new(Expr::Literal(LiteralValue::Number(value)))
    }

    #[test]
    fn renders_source_text() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Unary {
                operator: Token::new(TokenKind::Minus, "-", None, 1),
                right: number(123.0),
            }),
            operator: Token::new(TokenKind::Star, "*", None, 1),
            right: Box::new(Expr::Grouping {
                expression: number(45.67),
            }),
        };
        assert_eq!(expr.to_string(), "-123 * (45.67)");
    }

    #[test]
    fn renders_calls_and_strings() {
        let expr = Expr::Call {
            callee: Box::new(Expr::Variable(Token::new(
                TokenKind::Identifier,
                "greet",
                None,
                1,
            ))),
            paren: Token::new(TokenKind::RightParen, ")", None, 1),
            arguments: vec![
                Expr::Literal(LiteralValue::String(String::from("hi"))),
                Expr::Literal(LiteralValue::Nil),
            ],
        };
        assert_eq!(expr.to_string(), "greet(\"hi\", nil)");
    }
}
