//! Expression parsing using Pratt parsing (top-down operator precedence).
//!
//! # Operator precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `OR` | Left |
//! | 2 | `AND` | Left |
//! | 3 | prefix `NOT` | - |
//! | 4 | `=`, `<>`, `<`, `<=`, `>`, `>=` | Left |
//! | 5 | `&` | Left |
//! | 6 | `+`, `-` | Left |
//! | 7 | `*`, `/` | Left |
//! | 8 | prefix `^` | - |
//!
//! `NOT` sits between `AND` and the comparisons, so `NOT a = b` negates the
//! whole comparison while `NOT a AND b` negates only `a`.
//!
//! Postfix forms bind tighter than any operator: a call argument list, an
//! array subscript, a field access, and any number of dereference `^` marks
//! attach directly to an identifier atom.

use pseudoc_lex::TokenKind;

use crate::ast::{BinOp, Call, Expr, UnOp};
use crate::{ParseError, Parser};

/// Binding power levels for Pratt parsing.
/// Higher numbers = tighter binding (higher precedence).
#[doc(hidden)]
pub mod bp {
    /// Minimum binding power (start of expression)
    pub const MIN: u8 = 0;

    /// Logical OR
    pub const LOGICAL_OR: u8 = 2;

    /// Logical AND
    pub const LOGICAL_AND: u8 = 4;

    /// Comparison: = <> < <= > >=
    pub const COMPARISON: u8 = 6;

    /// String concatenation: &
    pub const CONCAT: u8 = 8;

    /// Additive: + -
    pub const ADDITIVE: u8 = 10;

    /// Multiplicative: * /
    pub const MULTIPLICATIVE: u8 = 12;

    /// Prefix operators: NOT, address-of ^
    pub const PREFIX: u8 = 14;
}

impl Parser {
    /// Main expression entry point.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(bp::MIN)
    }

    /// Parses an expression whose operators all have left binding power of
    /// at least `min_bp` (the Pratt parser core).
    ///
    /// Left-associativity comes from using `left_bp + 1` as the right
    /// binding power, so `a - b - c` parses as `(a - b) - c`.
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = match self.kind() {
            Some(TokenKind::Not) => {
                self.bump();
                // NOT swallows comparisons but stops at AND/OR
                let operand = self.parse_expr_bp(bp::COMPARISON)?;
                Expr::Unary {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                }
            }
            Some(TokenKind::Caret) => {
                self.bump();
                let target = self.parse_expr_bp(bp::PREFIX)?;
                Expr::AddressOf(Box::new(target))
            }
            _ => self.parse_atom()?,
        };

        loop {
            let Some((op, left_bp, right_bp)) = self.infix_binding_power() else {
                break;
            };
            if left_bp < min_bp {
                break;
            }
            self.bump();
            let rhs = self.parse_expr_bp(right_bp)?;
            lhs = Expr::Binary {
                left: Box::new(lhs),
                op,
                right: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    /// Binding powers of the current token as an infix operator.
    ///
    /// Returns `(op, left_bp, right_bp)`; `None` when the current token is
    /// not a binary operator.
    fn infix_binding_power(&self) -> Option<(BinOp, u8, u8)> {
        let (op, level) = match self.kind()? {
            TokenKind::Or => (BinOp::Or, bp::LOGICAL_OR),
            TokenKind::And => (BinOp::And, bp::LOGICAL_AND),
            TokenKind::Eq => (BinOp::Eq, bp::COMPARISON),
            TokenKind::Neq => (BinOp::Neq, bp::COMPARISON),
            TokenKind::Lt => (BinOp::Lt, bp::COMPARISON),
            TokenKind::Gt => (BinOp::Gt, bp::COMPARISON),
            TokenKind::Lte => (BinOp::Lte, bp::COMPARISON),
            TokenKind::Gte => (BinOp::Gte, bp::COMPARISON),
            TokenKind::StrComb => (BinOp::Concat, bp::CONCAT),
            TokenKind::Plus => (BinOp::Add, bp::ADDITIVE),
            TokenKind::Minus => (BinOp::Sub, bp::ADDITIVE),
            TokenKind::Star => (BinOp::Mul, bp::MULTIPLICATIVE),
            TokenKind::Slash => (BinOp::Div, bp::MULTIPLICATIVE),
            _ => return None,
        };
        Some((op, level, level + 1))
    }

    /// Parses an atom: a literal, a parenthesized expression, or an
    /// identifier with its postfix forms.
    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        match self.kind().cloned() {
            Some(TokenKind::Number(text)) => {
                self.bump();
                Ok(Expr::Number(text))
            }
            Some(TokenKind::Str(text)) => {
                self.bump();
                Ok(Expr::Str(text))
            }
            Some(TokenKind::LParen) => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect_kind(TokenKind::RParen)?;
                Ok(inner)
            }
            Some(TokenKind::Ident(name)) => {
                self.bump();
                self.parse_postfix(name)
            }
            _ => Err(self.error_at_current("an expression")),
        }
    }

    /// Parses the postfix forms after an identifier: a call argument list,
    /// a field access, or an array subscript, then any number of `^`.
    fn parse_postfix(&mut self, name: String) -> Result<Expr, ParseError> {
        let mut node = if self.match_kind(&TokenKind::LParen) {
            let args = self.parse_call_args()?;
            Expr::Call(Call { name, args })
        } else if self.match_kind(&TokenKind::Dot) {
            let field = self.expect_ident()?;
            Expr::FieldAccess {
                record: name,
                field,
            }
        } else if self.match_kind(&TokenKind::LBracket) {
            let indices = self.parse_index_list()?;
            Expr::ArrayAccess { name, indices }
        } else {
            Expr::Var(name)
        };

        while self.match_kind(&TokenKind::Caret) {
            node = Expr::Dereference(Box::new(node));
        }

        Ok(node)
    }

    /// Parses a comma-separated argument list; the `(` is already consumed,
    /// the `)` is consumed here. The list may be empty.
    pub(crate) fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if self.match_kind(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.match_kind(&TokenKind::Comma) {
                continue;
            }
            self.expect_kind(TokenKind::RParen)?;
            break;
        }
        Ok(args)
    }

    /// Parses a non-empty subscript list; the `[` is already consumed, the
    /// `]` is consumed here.
    pub(crate) fn parse_index_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut indices = vec![self.parse_expr()?];
        while self.match_kind(&TokenKind::Comma) {
            indices.push(self.parse_expr()?);
        }
        self.expect_kind(TokenKind::RBracket)?;
        Ok(indices)
    }

    /// Parses an assignment target: `IDENT ( .field | [indices] )? ( ^ )*`.
    pub(crate) fn parse_lvalue(&mut self) -> Result<Expr, ParseError> {
        let name = self.expect_ident()?;
        let mut node = if self.match_kind(&TokenKind::Dot) {
            let field = self.expect_ident()?;
            Expr::FieldAccess {
                record: name,
                field,
            }
        } else if self.match_kind(&TokenKind::LBracket) {
            let indices = self.parse_index_list()?;
            Expr::ArrayAccess { name, indices }
        } else {
            Expr::Var(name)
        };

        while self.match_kind(&TokenKind::Caret) {
            node = Expr::Dereference(Box::new(node));
        }

        Ok(node)
    }
}

// =============================================================================
// TESTS
// =============================================================================
