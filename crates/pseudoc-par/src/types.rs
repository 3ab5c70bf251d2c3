//! Type annotation parsing - scalars, user types, arrays, pointers.

use pseudoc_lex::{Keyword, TokenKind};

use crate::ast::{ScalarType, TypeSpec};
use crate::{ParseError, Parser};

/// Maps a scalar type keyword to its [`ScalarType`].
pub(crate) fn scalar_from_keyword(kw: Keyword) -> Option<ScalarType> {
    let scalar = match kw {
        Keyword::Integer => ScalarType::Integer,
        Keyword::Real => ScalarType::Real,
        Keyword::String => ScalarType::String,
        Keyword::Char => ScalarType::Char,
        Keyword::Boolean => ScalarType::Boolean,
        Keyword::Date => ScalarType::Date,
        _ => return None,
    };
    Some(scalar)
}

impl Parser {
    /// Parses the type annotation of a `DECLARE`: a scalar keyword, a user
    /// type name, `^Scalar`, or `ARRAY[l:u, …] OF base`.
    pub(crate) fn parse_type_spec(&mut self) -> Result<TypeSpec, ParseError> {
        match self.kind() {
            Some(TokenKind::Caret) => {
                self.bump();
                Ok(TypeSpec::Pointer(self.parse_scalar_type()?))
            }
            Some(TokenKind::Keyword(Keyword::Array)) => self.parse_array_type(),
            _ => self.parse_simple_type(),
        }
    }

    /// Parses a scalar keyword or a registered user type name.
    ///
    /// This is the type form accepted for parameters, function results and
    /// array bases.
    pub(crate) fn parse_simple_type(&mut self) -> Result<TypeSpec, ParseError> {
        match self.kind().cloned() {
            Some(TokenKind::Keyword(kw)) => match scalar_from_keyword(kw) {
                Some(scalar) => {
                    self.bump();
                    Ok(TypeSpec::Scalar(scalar))
                }
                None => Err(self.error_at_current("a type name")),
            },
            Some(TokenKind::Ident(name)) => {
                if self.is_user_type(&name) {
                    self.bump();
                    Ok(TypeSpec::Named(name))
                } else {
                    match self.current() {
                        Some(token) => Err(ParseError::UnknownType {
                            name,
                            line: token.line,
                            column: token.column,
                        }),
                        None => Err(ParseError::UnexpectedEof {
                            expected: "a type name".to_string(),
                        }),
                    }
                }
            }
            _ => Err(self.error_at_current("a type name")),
        }
    }

    /// Parses a record field type: `^Scalar`, a scalar, or a user type.
    pub(crate) fn parse_field_type(&mut self) -> Result<TypeSpec, ParseError> {
        if self.match_kind(&TokenKind::Caret) {
            Ok(TypeSpec::Pointer(self.parse_scalar_type()?))
        } else {
            self.parse_simple_type()
        }
    }

    /// Parses the scalar keyword a pointer type refers to.
    pub(crate) fn parse_scalar_type(&mut self) -> Result<ScalarType, ParseError> {
        match self.kind() {
            Some(TokenKind::Keyword(kw)) => match scalar_from_keyword(*kw) {
                Some(scalar) => {
                    self.bump();
                    Ok(scalar)
                }
                None => Err(self.error_at_current("a scalar type")),
            },
            _ => Err(self.error_at_current("a scalar type")),
        }
    }

    /// Parses `ARRAY[l:u {, l:u}] OF base`.
    fn parse_array_type(&mut self) -> Result<TypeSpec, ParseError> {
        self.expect_keyword(Keyword::Array)?;
        self.expect_kind(TokenKind::LBracket)?;

        let mut lowers = Vec::new();
        let mut uppers = Vec::new();
        loop {
            lowers.push(self.parse_array_bound()?);
            self.expect_kind(TokenKind::Colon)?;
            uppers.push(self.parse_array_bound()?);
            if self.match_kind(&TokenKind::Comma) {
                continue;
            }
            break;
        }

        self.expect_kind(TokenKind::RBracket)?;
        self.expect_keyword(Keyword::Of)?;
        let base = self.parse_simple_type()?;

        Ok(TypeSpec::Array {
            lowers,
            uppers,
            base: Box::new(base),
        })
    }

    /// Parses one integer array bound.
    fn parse_array_bound(&mut self) -> Result<i64, ParseError> {
        match self.kind().cloned() {
            Some(TokenKind::Number(text)) => match text.parse::<i64>() {
                Ok(value) => {
                    self.bump();
                    Ok(value)
                }
                Err(_) => Err(self.error_at_current("an integer array bound")),
            },
            _ => Err(self.error_at_current("an integer array bound")),
        }
    }
}
