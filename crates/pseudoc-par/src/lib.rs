//! pseudoc-par - Parser (Syntactic Analyzer)
//!
//! Transforms the token stream into an abstract syntax tree. The parser is
//! recursive descent with a single-position cursor and one-token lookahead;
//! expressions use Pratt parsing (top-down operator precedence, see
//! [`expr`]).
//!
//! The grammar is statement oriented: every top-level construct begins with
//! a keyword, or with an identifier that opens an assignment. Block
//! constructs are delimited by their closing keyword (`ENDIF`, `ENDWHILE`,
//! `NEXT`, `UNTIL`, `ENDCASE`, `ENDTYPE`, `ENDPROCEDURE`, `ENDFUNCTION`),
//! so statement lists are parsed up to the expected terminator.
//!
//! The parser keeps its own table of user-defined type names so that a
//! record or pointer-alias name is recognized in type positions; an unknown
//! name there is a syntax error.
//!
//! Syntax errors are fatal: parsing stops at the first offending token.

pub mod ast;

mod edge_cases;
mod expr;
mod items;
mod stmt;
mod types;

use rustc_hash::FxHashSet;
use thiserror::Error;

use pseudoc_lex::{Keyword, Token, TokenKind};

pub use crate::ast::*;
pub use crate::expr::bp;

/// Error produced while parsing the token stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The token stream ended inside an unfinished construct.
    #[error("syntax error: unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    /// The current token does not fit the grammar here.
    #[error("syntax error: expected {expected}, found '{found}' at line {line}, column {column}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },

    /// A type position names neither a scalar nor a known user type.
    #[error("syntax error: unknown type '{name}' at line {line}, column {column}")]
    UnknownType {
        name: String,
        line: u32,
        column: u32,
    },

    /// The identifier after `NEXT` differs from the loop variable.
    #[error("syntax error: NEXT names '{found}' but the loop variable is '{expected}' at line {line}, column {column}")]
    LoopVariableMismatch {
        expected: String,
        found: String,
        line: u32,
        column: u32,
    },
}

/// Parses a full token stream into a [`Program`].
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    Parser::new(tokens).parse()
}

/// The parser itself; use [`parse`] for the one-shot entry point.
pub struct Parser {
    /// Token stream from the lexer.
    tokens: Vec<Token>,

    /// Current position in the token stream.
    position: usize,

    /// Names registered by TYPE definitions, recognized in type positions.
    user_types: FxHashSet<String>,
}

impl Parser {
    /// Creates a new parser over a token stream.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            user_types: FxHashSet::default(),
        }
    }

    /// Parses the whole stream as a sequence of statements.
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while self.current().is_some() {
            statements.push(self.parse_stmt()?);
        }
        Ok(statements)
    }

    /// Parses a single statement, dispatching on the leading token.
    pub(crate) fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.kind().cloned() {
            Some(TokenKind::Keyword(kw)) => match kw {
                Keyword::Declare => self.parse_declare(),
                Keyword::Output => self.parse_output(),
                Keyword::Input => self.parse_input(),
                Keyword::If => self.parse_if(),
                Keyword::While => self.parse_while(),
                Keyword::For => self.parse_for(),
                Keyword::Repeat => self.parse_repeat(),
                Keyword::CaseOf => self.parse_case(),
                Keyword::Type => self.parse_type_definition(),
                Keyword::Procedure => self.parse_procedure_definition(),
                Keyword::Function => self.parse_function_definition(),
                Keyword::Call => self.parse_call_stmt(),
                Keyword::Return => self.parse_return(),
                _ => Err(self.error_at_current("a statement")),
            },
            Some(TokenKind::Ident(_)) => self.parse_assign(),
            Some(_) => Err(self.error_at_current("a statement")),
            None => Err(ParseError::UnexpectedEof {
                expected: "a statement".to_string(),
            }),
        }
    }

    /// Parses statements up to (not including) one of the terminators.
    ///
    /// Running out of tokens first is a syntax error naming the expected
    /// terminators, which is how unterminated blocks are reported.
    pub(crate) fn parse_block_until(
        &mut self,
        terminators: &[Keyword],
    ) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();
        loop {
            let at_terminator = match self.kind() {
                None => {
                    let expected = terminators
                        .iter()
                        .map(|kw| format!("'{kw}'"))
                        .collect::<Vec<_>>()
                        .join(" or ");
                    return Err(ParseError::UnexpectedEof { expected });
                }
                Some(TokenKind::Keyword(kw)) => terminators.contains(kw),
                Some(_) => false,
            };
            if at_terminator {
                return Ok(body);
            }
            body.push(self.parse_stmt()?);
        }
    }

    // =========================================================================
    // TOKEN HELPERS
    // =========================================================================

    /// The current token, if any.
    pub(crate) fn current(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// The current token's kind, if any.
    pub(crate) fn kind(&self) -> Option<&TokenKind> {
        self.current().map(|t| &t.kind)
    }

    /// The kind `offset` tokens past the current one, if any.
    pub(crate) fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.position + offset).map(|t| &t.kind)
    }

    /// Advances past the current token.
    pub(crate) fn bump(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    /// True when the current token is the given keyword.
    pub(crate) fn check_keyword(&self, kw: Keyword) -> bool {
        matches!(self.kind(), Some(TokenKind::Keyword(k)) if *k == kw)
    }

    /// Consumes the current token when it matches.
    pub(crate) fn match_kind(&mut self, expected: &TokenKind) -> bool {
        if self.kind() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes a specific token kind or errors.
    pub(crate) fn expect_kind(&mut self, expected: TokenKind) -> Result<(), ParseError> {
        if self.kind() == Some(&expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.error_at_current(&format!("'{expected}'")))
        }
    }

    /// Consumes a specific keyword or errors.
    pub(crate) fn expect_keyword(&mut self, kw: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(kw) {
            self.bump();
            Ok(())
        } else {
            Err(self.error_at_current(&format!("'{kw}'")))
        }
    }

    /// Consumes an identifier or errors.
    pub(crate) fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.kind().cloned() {
            Some(TokenKind::Ident(name)) => {
                self.bump();
                Ok(name)
            }
            _ => Err(self.error_at_current("an identifier")),
        }
    }

    /// Builds the error for an unexpected current token (or end of input).
    pub(crate) fn error_at_current(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(token) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.kind.to_string(),
                line: token.line,
                column: token.column,
            },
            None => ParseError::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    // =========================================================================
    // USER TYPE TABLE
    // =========================================================================

    /// Registers a TYPE name so later type positions recognize it.
    pub(crate) fn register_user_type(&mut self, name: &str) {
        self.user_types.insert(name.to_string());
    }

    /// True when the name was registered by a TYPE definition.
    pub(crate) fn is_user_type(&self, name: &str) -> bool {
        self.user_types.contains(name)
    }
}
