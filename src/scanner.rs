use crate::{
    ast::LiteralValue,
    error::Reporter,
    token::{Token, TokenKind},
};
use unicode_segmentation::UnicodeSegmentation;

struct ScanPosition {
    start: usize,
    current: usize,
    line: usize,
}

/// Single pass scanner over the grapheme clusters of a source text.
pub struct Scanner<'a, 'r> {
    source: &'a str,
    // (byte offset, grapheme) pairs
    graphemes: Vec<(usize, &'a str)>,
    pos: ScanPosition,
    tokens: Vec<Token>,
    reporter: &'r mut dyn Reporter,
}

/// Scans `source` into tokens, reporting invalid input to `reporter`.
pub fn scan(source: &str, reporter: &mut dyn Reporter) -> Vec<Token> {
    Scanner::new(source, reporter).scan_tokens()
}

impl<'a, 'r> Scanner<'a, 'r> {
    pub fn new(source: &'a str, reporter: &'r mut dyn Reporter) -> Scanner<'a, 'r> {
        Scanner {
            source,
            graphemes: source.grapheme_indices(true).collect(),
            pos: ScanPosition {
                start: 0,
                current: 0,
                line: 1,
            },
            tokens: Vec::new(),
            reporter,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.pos.start = self.pos.current;
            self.scan_token()
        }
        self.tokens
            .push(Token::new(TokenKind::Eof, "", None, self.pos.line));
        tracing::debug!(tokens = self.tokens.len(), "scanned source");
        self.tokens
    }

    fn is_at_end(&self) -> bool {
        self.pos.current >= self.graphemes.len()
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            "(" => self.add_token(TokenKind::LeftParen),
            ")" => self.add_token(TokenKind::RightParen),
            "{" => self.add_token(TokenKind::LeftBrace),
            "}" => self.add_token(TokenKind::RightBrace),
            "," => self.add_token(TokenKind::Comma),
            "." => self.add_token(TokenKind::Dot),
            "-" => self.add_token(TokenKind::Minus),
            "+" => self.add_token(TokenKind::Plus),
            ";" => self.add_token(TokenKind::Semicolon),
            "*" => self.add_token(TokenKind::Star),
            "!" => {
                let kind = if self.advance_if_matched("=") {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.add_token(kind)
            }
            "=" => {
                let kind = if self.advance_if_matched("=") {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind)
            }
            "<" => {
                let kind = if self.advance_if_matched("=") {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind)
            }
            ">" => {
                let kind = if self.advance_if_matched("=") {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind)
            }
            "/" => {
                if self.advance_if_matched("/") {
                    while !is_newline(self.peek()) && !self.is_at_end() {
                        self.advance();
                    }
                } else if self.advance_if_matched("*") {
                    self.block_comment()
                } else {
                    self.add_token(TokenKind::Slash)
                }
            }
            " " | "\r" | "\t" => {}
            "\n" | "\r\n" => self.pos.line += 1,
            "\"" => self.string_literal(),
            c if is_digit(c) => self.number_literal(),
            c if is_alpha(c) => self.identifier(),
            c => {
                let message = format!("Unexpected character '{}'.", c);
                self.reporter.error(self.pos.line, &message)
            }
        }
    }

    fn advance(&mut self) -> &'a str {
        let (_, s) = self.graphemes[self.pos.current];
        self.pos.current += 1;
        s
    }

    fn advance_if_matched(&mut self, expected: &str) -> bool {
        if self.is_at_end() || self.peek() != expected {
            false
        } else {
            self.pos.current += 1;
            true
        }
    }

    fn peek(&self) -> &'a str {
        self.peek_at(0)
    }

    fn peek_next(&self) -> &'a str {
        self.peek_at(1)
    }

    fn peek_at(&self, distance: usize) -> &'a str {
        match self.graphemes.get(self.pos.current + distance) {
            Some((_, s)) => s,
            None => "\0",
        }
    }

    fn byte_offset(&self, index: usize) -> usize {
        match self.graphemes.get(index) {
            Some((offset, _)) => *offset,
            None => self.source.len(),
        }
    }

    fn lexeme(&self, start: usize, end: usize) -> &'a str {
        &self.source[self.byte_offset(start)..self.byte_offset(end)]
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_literal_token(kind, None)
    }

    fn add_literal_token(&mut self, kind: TokenKind, literal: Option<LiteralValue>) {
        let text = self.lexeme(self.pos.start, self.pos.current);
        self.tokens
            .push(Token::new(kind, text, literal, self.pos.line))
    }

    fn block_comment(&mut self) {
        while !(self.peek() == "*" && self.peek_next() == "/") && !self.is_at_end() {
            if is_newline(self.peek()) {
                self.pos.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.reporter
                .error(self.pos.line, "Unterminated block comment.");
        } else {
            // The closing */
            self.advance();
            self.advance();
        }
    }

    fn string_literal(&mut self) {
        // Strings keep the line of their opening quote.
        let line = self.pos.line;
        while self.peek() != "\"" && !self.is_at_end() {
            if is_newline(self.peek()) {
                self.pos.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.reporter.error(self.pos.line, "Unterminated string.");
            return;
        }
        self.advance(); // The closing ".

        let text = self.lexeme(self.pos.start, self.pos.current);
        let value = self.lexeme(self.pos.start + 1, self.pos.current - 1);
        self.tokens.push(Token::new(
            TokenKind::String,
            text,
            Some(LiteralValue::String(String::from(value))),
            line,
        ))
    }

    fn number_literal(&mut self) {
        while is_digit(self.peek()) {
            self.advance();
        }

        // A trailing '.' without digits is left for the next token.
        if self.peek() == "." && is_digit(self.peek_next()) {
            self.advance();
            while is_digit(self.peek()) {
                self.advance();
            }
        }

        let text = self.lexeme(self.pos.start, self.pos.current);
        match text.parse::<f64>() {
            Ok(number) => {
                self.add_literal_token(TokenKind::Number, Some(LiteralValue::Number(number)))
            }
            Err(err) => {
                let message = format!("Invalid number '{}': {}.", text, err);
                self.reporter.error(self.pos.line, &message)
            }
        }
    }

    fn identifier(&mut self) {
        while is_alpha(self.peek()) || is_digit(self.peek()) {
            self.advance();
        }

        let text = self.lexeme(self.pos.start, self.pos.current);
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
        let literal = match kind {
            TokenKind::True => Some(LiteralValue::Boolean(true)),
            TokenKind::False => Some(LiteralValue::Boolean(false)),
            TokenKind::Nil => Some(LiteralValue::Nil),
            _ => None,
        };
        self.add_literal_token(kind, literal)
    }
}

fn is_newline(s: &str) -> bool {
    s == "\n" || s == "\r\n"
}

fn is_digit(s: &str) -> bool {
    s.len() == 1 && s.as_bytes()[0].is_ascii_digit()
}

fn is_alpha(s: &str) -> bool {
    s.len() == 1 && (s.as_bytes()[0].is_ascii_alphabetic() || s == "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostics;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut diagnostics = Diagnostics::silent();
        scan(source, &mut diagnostics)
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn scans_operators_with_maximal_munch() {
        use TokenKind::*;
        assert_eq!(
            kinds("! != = == < <= > >= / // ignored"),
            vec![Bang, BangEqual, Equal, EqualEqual, Less, LessEqual, Greater, GreaterEqual, Slash, Eof]
        );
    }

    #[test]
    fn number_with_trailing_dot_is_two_tokens() {
        let mut diagnostics = Diagnostics::silent();
        let tokens = scan("12.5 7.", &mut diagnostics);
        assert_eq!(tokens[0].literal, Some(LiteralValue::Number(12.5)));
        assert_eq!(tokens[1].literal, Some(LiteralValue::Number(7.0)));
        assert_eq!(tokens[1].lexeme, "7");
        assert_eq!(tokens[2].kind, TokenKind::Dot);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("var sleep_ms = nil; while break continue sleep fun"),
            vec![Var, Identifier, Equal, Nil, Semicolon, While, Break, Continue, Sleep, Fun, Eof]
        );
    }

    #[test]
    fn multi_line_string_advances_line() {
        let mut diagnostics = Diagnostics::silent();
        let tokens = scan("\"one\ntwo\" x", &mut diagnostics);
        assert_eq!(
            tokens[0].literal,
            Some(LiteralValue::String(String::from("one\ntwo")))
        );
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn comments_produce_no_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("a // line\n/* block\n comment */ b"),
            vec![Identifier, Identifier, Eof]
        );

        let mut diagnostics = Diagnostics::silent();
        let tokens = scan("/* one\ntwo */\nx", &mut diagnostics);
        assert_eq!(tokens[0].line, 3);
    }

    #[test]
    fn invalid_characters_are_reported_and_skipped() {
        let mut diagnostics = Diagnostics::silent();
        let tokens = scan("a @ b\n#", &mut diagnostics);
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["a", "b", ""]);

        let messages: Vec<String> = diagnostics
            .reported()
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(
            messages,
            vec![
                "[line 1] Error: Unexpected character '@'.",
                "[line 2] Error: Unexpected character '#'.",
            ]
        );
    }

    #[test]
    fn unterminated_input_is_reported() {
        let mut diagnostics = Diagnostics::silent();
        let tokens = scan("\"open", &mut diagnostics);
        assert_eq!(tokens.len(), 1);
        assert!(diagnostics.had_error());

        let mut diagnostics = Diagnostics::silent();
        scan("/* open", &mut diagnostics);
        assert_eq!(
            diagnostics.reported()[0].message,
            "Unterminated block comment."
        );
    }

    #[test]
    fn non_ascii_grapheme_is_one_error() {
        let mut diagnostics = Diagnostics::silent();
        scan("é", &mut diagnostics);
        assert_eq!(diagnostics.reported().len(), 1);
    }
}
