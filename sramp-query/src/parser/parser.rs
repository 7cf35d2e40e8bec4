//! Parser implementation

use super::ast::*;
use crate::lexer::{Lexer, Token, TokenKind};
use sramp_core::QueryError;

/// Parse error with the byte offset where parsing stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        QueryError::Parse {
            message: err.message,
            position: err.position,
        }
    }
}

/// Parse a normalized query expression. The expression must already be
/// rooted at `/s-ramp` (see [`crate::normalize`]).
pub fn parse(expression: &str) -> Result<Query, ParseError> {
    let tokens = Lexer::new(expression).tokenize();
    Parser::new(tokens).parse()
}

/// Recursive-descent parser over the token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse the full expression: `/s-ramp[/model[/Type]][predicate]`.
    pub fn parse(&mut self) -> Result<Query, ParseError> {
        self.expect(TokenKind::Slash)?;
        let root = self.expect_identifier()?;
        if root != "s-ramp" {
            return Err(self.error(&format!(
                "query must be rooted at /s-ramp, found /{}",
                root
            )));
        }

        let mut query = Query::all();
        if self.check(&TokenKind::Slash) {
            self.advance();
            query.model = Some(self.expect_identifier()?);
        }
        if self.check(&TokenKind::Slash) {
            self.advance();
            query.type_name = Some(self.expect_identifier()?);
        }
        if self.check(&TokenKind::LBracket) {
            query.predicate = self.parse_predicate()?;
        }

        if !self.is_at_end() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(query)
    }

    /// Parse `[clause (and clause)*]`.
    fn parse_predicate(&mut self) -> Result<Vec<Clause>, ParseError> {
        self.expect(TokenKind::LBracket)?;
        let mut clauses = vec![self.parse_clause()?];
        while self.check(&TokenKind::And) {
            self.advance();
            clauses.push(self.parse_clause()?);
        }
        self.expect(TokenKind::RBracket)?;
        Ok(clauses)
    }

    /// Parse `@name`, optionally followed by a comparison.
    fn parse_clause(&mut self) -> Result<Clause, ParseError> {
        self.expect(TokenKind::At)?;
        let property = self.expect_identifier()?;

        let op = match &self.current().kind {
            TokenKind::Eq => CompareOp::Eq,
            TokenKind::Ne => CompareOp::Ne,
            _ => return Ok(Clause::Exists { property }),
        };
        self.advance();

        let value = self.parse_literal()?;
        Ok(Clause::Compare {
            property,
            op,
            value,
        })
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        match &self.current().kind {
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance();
                Ok(Literal::Str(s))
            }
            TokenKind::Number(n) => {
                let n = *n;
                self.advance();
                Ok(Literal::Number(n))
            }
            _ => Err(self.error("expected string or number literal")),
        }
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.check(&kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("expected {:?}", kind)))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match &self.current().kind {
            TokenKind::Identifier(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn error(&self, msg: &str) -> ParseError {
        let message = match &self.current().kind {
            TokenKind::Error(lex_msg) => format!("{} ({})", msg, lex_msg),
            _ => msg.to_string(),
        };
        ParseError {
            message,
            position: self.current().span.start,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_only() {
        let query = parse("/s-ramp").unwrap();
        assert_eq!(query, Query::all());
    }

    #[test]
    fn test_parse_model_segment() {
        let query = parse("/s-ramp/xsd").unwrap();
        assert_eq!(query.model.as_deref(), Some("xsd"));
        assert_eq!(query.type_name, None);
        assert!(query.predicate.is_empty());
    }

    #[test]
    fn test_parse_model_and_type() {
        let query = parse("/s-ramp/xsd/XsdDocument").unwrap();
        assert_eq!(query.model.as_deref(), Some("xsd"));
        assert_eq!(query.type_name.as_deref(), Some("XsdDocument"));
    }

    #[test]
    fn test_parse_equality_predicate() {
        let query = parse("/s-ramp/core/Document[@name = 'a.bin']").unwrap();
        assert_eq!(
            query.predicate,
            vec![Clause::Compare {
                property: "name".to_string(),
                op: CompareOp::Eq,
                value: Literal::Str("a.bin".to_string()),
            }]
        );
    }

    #[test]
    fn test_parse_conjunction_with_existence() {
        let query = parse("/s-ramp/xsd/XsdDocument[@project and @rank != 3]").unwrap();
        assert_eq!(query.predicate.len(), 2);
        assert_eq!(
            query.predicate[0],
            Clause::Exists {
                property: "project".to_string()
            }
        );
        assert_eq!(
            query.predicate[1],
            Clause::Compare {
                property: "rank".to_string(),
                op: CompareOp::Ne,
                value: Literal::Number(3.0),
            }
        );
    }

    #[test]
    fn test_parse_rejects_unrooted_expression() {
        let err = parse("/nope/core").unwrap_err();
        assert!(err.message.contains("rooted at /s-ramp"));
    }

    #[test]
    fn test_parse_rejects_trailing_input() {
        let err = parse("/s-ramp/core/Document extra").unwrap_err();
        assert!(err.message.contains("trailing"));
    }

    #[test]
    fn test_parse_rejects_empty_predicate() {
        assert!(parse("/s-ramp/core/Document[]").is_err());
    }

    #[test]
    fn test_parse_error_carries_offset() {
        let err = parse("/s-ramp/core/Document[@name =]").unwrap_err();
        assert!(err.position > 0);
    }

    #[test]
    fn test_parse_error_converts_to_query_error() {
        let err: QueryError = parse("/s-ramp/[").unwrap_err().into();
        assert!(matches!(err, QueryError::Parse { .. }));
    }
}
