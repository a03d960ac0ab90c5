//! Parenthesized, Lisp style rendering of the syntax tree for debugging.
//!
//! `-123 * (45.67)` prints as `(* (- 123) (group 45.67))`. String literals
//! are quoted so they can be told apart from identifiers.

use crate::ast::{Expr, Stmt};

pub struct AstPrinter;

impl AstPrinter {
    /// One line per top-level statement.
    pub fn print_program(&self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| self.print_stmt(stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression { expression } => self.parenthesize(";", &[expression]),
            Stmt::Print { expression, .. } => self.parenthesize("print", &[expression]),
            Stmt::Var { name, initializer } => match initializer {
                Some(initializer) => {
                    format!("(var {} {})", name.lexeme, self.print_expr(initializer))
                }
                None => format!("(var {})", name.lexeme),
            },
            Stmt::Block { statements } => self.group("block", statements),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut out = format!(
                    "(if {} {}",
                    self.print_expr(condition),
                    self.print_stmt(then_branch)
                );
                if let Some(else_branch) = else_branch {
                    out.push(' ');
                    out.push_str(&self.print_stmt(else_branch));
                }
                out.push(')');
                out
            }
            Stmt::While { condition, body } => format!(
                "(while {} {})",
                self.print_expr(condition),
                self.print_stmt(body)
            ),
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => format!(
                "(for {} {} {} {})",
                initializer
                    .as_ref()
                    .map_or_else(|| String::from("nil"), |init| self.print_stmt(init)),
                condition
                    .as_ref()
                    .map_or_else(|| String::from("nil"), |cond| self.print_expr(cond)),
                increment
                    .as_ref()
                    .map_or_else(|| String::from("nil"), |incr| self.print_expr(incr)),
                self.print_stmt(body)
            ),
            Stmt::Function(fun) => {
                let params: Vec<&str> = fun.params.iter().map(|p| p.lexeme.as_str()).collect();
                let mut out = format!("(fun {} ({})", fun.name.lexeme, params.join(" "));
                for stmt in &fun.body {
                    out.push(' ');
                    out.push_str(&self.print_stmt(stmt));
                }
                out.push(')');
                out
            }
            Stmt::Return { value, .. } => match value {
                Some(value) => self.parenthesize("return", &[value]),
                None => String::from("(return)"),
            },
            Stmt::Break => String::from("(break)"),
            Stmt::Continue => String::from("(continue)"),
            Stmt::Sleep { duration, .. } => self.parenthesize("sleep", &[duration]),
        }
    }

    pub fn print_expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(literal) => literal.to_string(),
            Expr::Grouping { expression } => self.parenthesize("group", &[&**expression]),
            Expr::Unary { operator, right } => self.parenthesize(&operator.lexeme, &[&**right]),
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => self.parenthesize(&operator.lexeme, &[&**left, &**right]),
            Expr::Variable(name) => name.lexeme.clone(),
            Expr::Assign { name, value } => {
                format!("(= {} {})", name.lexeme, self.print_expr(value))
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out = format!("(call {}", self.print_expr(callee));
                for argument in arguments {
                    out.push(' ');
                    out.push_str(&self.print_expr(argument));
                }
                out.push(')');
                out
            }
        }
    }

    fn parenthesize(&self, name: &str, exprs: &[&Expr]) -> String {
        let mut out = format!("({}", name);
        for expr in exprs {
            out.push(' ');
            out.push_str(&self.print_expr(expr));
        }
        out.push(')');
        out
    }

    fn group(&self, name: &str, statements: &[Stmt]) -> String {
        let mut out = format!("({}", name);
        for stmt in statements {
            out.push(' ');
            out.push_str(&self.print_stmt(stmt));
        }
        out.push(')');
        out
    }
}
