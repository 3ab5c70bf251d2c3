//! Statement parsing - declarations, assignment, I/O, and control flow.

use pseudoc_lex::{Keyword, TokenKind};

use crate::ast::{Assign, CaseOf, Declare, Expr, For, If, RepeatUntil, Stmt, While};
use crate::{ParseError, Parser};

impl Parser {
    /// Parses `DECLARE name : Type`.
    pub(crate) fn parse_declare(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Declare)?;
        let name = self.expect_ident()?;
        self.expect_kind(TokenKind::Colon)?;
        let ty = self.parse_type_spec()?;
        Ok(Stmt::Declare(Declare { name, ty }))
    }

    /// Parses `lvalue <- expr`.
    pub(crate) fn parse_assign(&mut self) -> Result<Stmt, ParseError> {
        let target = self.parse_lvalue()?;
        self.expect_kind(TokenKind::Assign)?;
        let value = self.parse_expr()?;
        Ok(Stmt::Assign(Assign { target, value }))
    }

    /// Parses `OUTPUT expr {, expr}`.
    ///
    /// The value list ends at the next keyword, so `OUTPUT` directly before
    /// one prints an empty line.
    pub(crate) fn parse_output(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Output)?;
        let mut values = Vec::new();
        if !matches!(self.kind(), None | Some(TokenKind::Keyword(_))) {
            loop {
                values.push(self.parse_expr()?);
                if self.match_kind(&TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }
        Ok(Stmt::Output(values))
    }

    /// Parses `INPUT name`.
    pub(crate) fn parse_input(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Input)?;
        let name = self.expect_ident()?;
        Ok(Stmt::Input(name))
    }

    /// Parses `IF expr THEN stmts [ELSE stmts] ENDIF`.
    pub(crate) fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::If)?;
        let condition = self.parse_expr()?;
        self.expect_keyword(Keyword::Then)?;

        let then_body = self.parse_block_until(&[Keyword::Else, Keyword::EndIf])?;

        let else_body = if self.check_keyword(Keyword::Else) {
            self.bump();
            Some(self.parse_block_until(&[Keyword::EndIf])?)
        } else {
            None
        };

        self.expect_keyword(Keyword::EndIf)?;
        Ok(Stmt::If(If {
            condition,
            then_body,
            else_body,
        }))
    }

    /// Parses `WHILE expr stmts ENDWHILE`.
    pub(crate) fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::While)?;
        let condition = self.parse_expr()?;
        let body = self.parse_block_until(&[Keyword::EndWhile])?;
        self.expect_keyword(Keyword::EndWhile)?;
        Ok(Stmt::While(While { condition, body }))
    }

    /// Parses `FOR var <- expr TO expr stmts NEXT var`.
    ///
    /// The identifier after `NEXT` must name the loop variable.
    pub(crate) fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::For)?;
        let var = self.expect_ident()?;
        self.expect_kind(TokenKind::Assign)?;
        let start = self.parse_expr()?;
        self.expect_keyword(Keyword::To)?;
        let end = self.parse_expr()?;

        let body = self.parse_block_until(&[Keyword::Next])?;
        self.expect_keyword(Keyword::Next)?;

        let (found, line, column) = match self.current() {
            Some(token) => match &token.kind {
                TokenKind::Ident(name) => (name.clone(), token.line, token.column),
                _ => return Err(self.error_at_current("the loop variable after NEXT")),
            },
            None => return Err(self.error_at_current("the loop variable after NEXT")),
        };
        if found != var {
            return Err(ParseError::LoopVariableMismatch {
                expected: var,
                found,
                line,
                column,
            });
        }
        self.bump();

        Ok(Stmt::For(For {
            var,
            start,
            end,
            body,
        }))
    }

    /// Parses `REPEAT stmts UNTIL expr`.
    pub(crate) fn parse_repeat(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Repeat)?;
        let body = self.parse_block_until(&[Keyword::Until])?;
        self.expect_keyword(Keyword::Until)?;
        let condition = self.parse_expr()?;
        Ok(Stmt::RepeatUntil(RepeatUntil { body, condition }))
    }

    /// Parses `CASE OF expr` arms `ENDCASE`.
    ///
    /// Each arm is a numeric label, a colon, and a body running to the next
    /// label, `OTHERWISE`, or `ENDCASE`.
    pub(crate) fn parse_case(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::CaseOf)?;
        let expr = self.parse_expr()?;

        let mut arms = Vec::new();
        let mut otherwise = None;
        loop {
            match self.kind().cloned() {
                Some(TokenKind::Number(text)) => {
                    self.bump();
                    self.expect_kind(TokenKind::Colon)?;
                    let mut body = Vec::new();
                    while !matches!(self.kind(), None | Some(TokenKind::Number(_)))
                        && !self.check_keyword(Keyword::Otherwise)
                        && !self.check_keyword(Keyword::EndCase)
                    {
                        body.push(self.parse_stmt()?);
                    }
                    arms.push((Expr::Number(text), body));
                }
                Some(TokenKind::Keyword(Keyword::Otherwise)) => {
                    self.bump();
                    otherwise = Some(self.parse_block_until(&[Keyword::EndCase])?);
                }
                Some(TokenKind::Keyword(Keyword::EndCase)) => break,
                Some(_) => {
                    return Err(
                        self.error_at_current("a numeric case label, 'OTHERWISE', or 'ENDCASE'")
                    )
                }
                None => {
                    return Err(ParseError::UnexpectedEof {
                        expected: "'ENDCASE'".to_string(),
                    })
                }
            }
        }
        self.expect_keyword(Keyword::EndCase)?;

        Ok(Stmt::CaseOf(CaseOf {
            expr,
            arms,
            otherwise,
        }))
    }

    /// Parses `CALL name [(args)]`.
    pub(crate) fn parse_call_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Call)?;
        let name = self.expect_ident()?;
        let args = if self.match_kind(&TokenKind::LParen) {
            self.parse_call_args()?
        } else {
            Vec::new()
        };
        Ok(Stmt::CallStmt(crate::ast::Call { name, args }))
    }

    /// Parses `RETURN [expr]`; the expression is absent when the next token
    /// is a keyword (typically the enclosing block terminator).
    pub(crate) fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword(Keyword::Return)?;
        let expr = if matches!(self.kind(), None | Some(TokenKind::Keyword(_))) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        Ok(Stmt::Return(expr))
    }
}
