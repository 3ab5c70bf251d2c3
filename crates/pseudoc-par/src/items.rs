//! Definition parsing - TYPE, PROCEDURE, and FUNCTION.

use pseudoc_lex::{Keyword, TokenKind};

use crate::ast::{FunctionDef, Param, ProcedureDef, Stmt, TypeDef, TypeDefBody};
use crate::{ParseError, Parser};

impl Parser {
    /// Parses a type definition, either of:
    ///
    /// - a pointer alias: `TYPE IntPtr = ^INTEGER`
    /// - a record: `TYPE Name` followed by `DECLARE field : Type` lines and
    ///   `ENDTYPE`
    ///
    /// The name is registered so later type positions recognize it.
    pub(crate) fn parse_type_definition(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Type)?;
        let name = self.expect_ident()?;

        if self.match_kind(&TokenKind::Eq) {
            self.expect_kind(TokenKind::Caret)?;
            let base = self.parse_scalar_type()?;
            self.register_user_type(&name);
            return Ok(Stmt::TypeDef(TypeDef {
                name,
                body: TypeDefBody::PointerAlias(base),
            }));
        }

        let mut fields = Vec::new();
        loop {
            match self.kind() {
                None => {
                    return Err(ParseError::UnexpectedEof {
                        expected: "'ENDTYPE'".to_string(),
                    })
                }
                Some(TokenKind::Keyword(Keyword::EndType)) => break,
                _ => {}
            }
            self.expect_keyword(Keyword::Declare)?;
            let field_name = self.expect_ident()?;
            self.expect_kind(TokenKind::Colon)?;
            let field_type = self.parse_field_type()?;
            fields.push((field_name, field_type));
        }
        self.expect_keyword(Keyword::EndType)?;
        self.register_user_type(&name);

        Ok(Stmt::TypeDef(TypeDef {
            name,
            body: TypeDefBody::Record(fields),
        }))
    }

    /// Parses `PROCEDURE name [(params)] body ENDPROCEDURE`.
    pub(crate) fn parse_procedure_definition(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Procedure)?;
        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        let body = self.parse_block_until(&[Keyword::EndProcedure])?;
        self.expect_keyword(Keyword::EndProcedure)?;
        Ok(Stmt::ProcedureDef(ProcedureDef { name, params, body }))
    }

    /// Parses `FUNCTION name [(params)] RETURNS Type body ENDFUNCTION`.
    pub(crate) fn parse_function_definition(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Function)?;
        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        self.expect_keyword(Keyword::Returns)?;
        let return_type = self.parse_simple_type()?;
        let body = self.parse_block_until(&[Keyword::EndFunction])?;
        self.expect_keyword(Keyword::EndFunction)?;
        Ok(Stmt::FunctionDef(FunctionDef {
            name,
            params,
            return_type,
            body,
        }))
    }

    /// Parses an optional parenthesized parameter list. A definition with no
    /// `(` has no parameters.
    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        if !self.match_kind(&TokenKind::LParen) {
            return Ok(params);
        }
        if self.match_kind(&TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            params.push(self.parse_param()?);
            if self.match_kind(&TokenKind::Comma) {
                continue;
            }
            self.expect_kind(TokenKind::RParen)?;
            break;
        }
        Ok(params)
    }

    /// Parses `[BYREF | BYVAL] name : Type`.
    ///
    /// The mode words are not keywords; they are recognized here only when
    /// followed by the parameter name, so a parameter may itself be called
    /// `BYREF`. The default mode is by-value.
    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let mode = match (self.kind(), self.peek_kind(1)) {
            (Some(TokenKind::Ident(word)), Some(TokenKind::Ident(_))) if word == "BYREF" => {
                Some(true)
            }
            (Some(TokenKind::Ident(word)), Some(TokenKind::Ident(_))) if word == "BYVAL" => {
                Some(false)
            }
            _ => None,
        };
        let mut byref = false;
        if let Some(flag) = mode {
            self.bump();
            byref = flag;
        }

        let name = self.expect_ident()?;
        self.expect_kind(TokenKind::Colon)?;
        let ty = self.parse_simple_type()?;
        Ok(Param { name, ty, byref })
    }
}
