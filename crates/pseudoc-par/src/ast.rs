//! pseudoc-par - AST Node Definitions
//!
//! This module contains all AST node definitions produced by the parser.
//! Nodes are plain data; the evaluator owns all semantics.

use std::fmt;

/// AST root - a source file is an ordered list of top-level statements.
pub type Program = Vec<Stmt>;

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Variable declaration
    ///
    /// Example: `DECLARE count : INTEGER`
    Declare(Declare),

    /// User type definition (record or pointer alias)
    TypeDef(TypeDef),

    /// Assignment to an lvalue
    ///
    /// Example: `count <- count + 1`
    Assign(Assign),

    /// Conditional
    If(If),

    /// Pre-tested loop
    While(While),

    /// Counted loop, inclusive bounds
    For(For),

    /// Post-tested loop
    RepeatUntil(RepeatUntil),

    /// Multi-way branch on numeric labels
    CaseOf(CaseOf),

    /// Print zero or more values on one line
    Output(Vec<Expr>),

    /// Prompted read into a declared variable
    Input(String),

    /// Procedure definition
    ProcedureDef(ProcedureDef),

    /// Function definition
    FunctionDef(FunctionDef),

    /// Call in statement position
    ///
    /// Example: `CALL Increment(v)`
    CallStmt(Call),

    /// Early exit, with a value inside a function
    Return(Option<Expr>),
}

/// `DECLARE name : Type`
#[derive(Debug, Clone, PartialEq)]
pub struct Declare {
    pub name: String,
    pub ty: TypeSpec,
}

/// `TYPE name … ENDTYPE` or `TYPE name = ^Scalar`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub body: TypeDefBody,
}

/// Payload of a type definition.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefBody {
    /// Record with ordered, typed fields.
    Record(Vec<(String, TypeSpec)>),
    /// Pointer alias: `TYPE IntPtr = ^INTEGER`.
    PointerAlias(ScalarType),
}

/// `target <- value`; the target is restricted to lvalue expression forms.
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: Expr,
    pub value: Expr,
}

/// `IF … THEN … [ELSE …] ENDIF`
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Expr,
    pub then_body: Vec<Stmt>,
    pub else_body: Option<Vec<Stmt>>,
}

/// `WHILE … ENDWHILE`
#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

/// `FOR var <- start TO end … NEXT var`
#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub var: String,
    pub start: Expr,
    pub end: Expr,
    pub body: Vec<Stmt>,
}

/// `REPEAT … UNTIL condition`
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatUntil {
    pub body: Vec<Stmt>,
    pub condition: Expr,
}

/// `CASE OF expr … ENDCASE`
#[derive(Debug, Clone, PartialEq)]
pub struct CaseOf {
    pub expr: Expr,
    /// Arms in source order: numeric label and body.
    pub arms: Vec<(Expr, Vec<Stmt>)>,
    pub otherwise: Option<Vec<Stmt>>,
}

/// `PROCEDURE name [(params)] … ENDPROCEDURE`
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

/// `FUNCTION name [(params)] RETURNS Type … ENDFUNCTION`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeSpec,
    pub body: Vec<Stmt>,
}

/// Formal parameter; `byref` aliases the caller's cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeSpec,
    pub byref: bool,
}

/// `name(args)` in either expression or statement position.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Expr>,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number literal, lexeme preserved verbatim.
    Number(String),

    /// String literal.
    Str(String),

    /// Variable read.
    Var(String),

    /// `record.field` (single level).
    FieldAccess { record: String, field: String },

    /// `name[i, j, …]`
    ArrayAccess { name: String, indices: Vec<Expr> },

    /// Intrinsic or user function call.
    Call(Call),

    /// Binary operation.
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    /// Unary operation.
    Unary { op: UnOp, operand: Box<Expr> },

    /// `^lvalue` - pointer to a named storage cell.
    AddressOf(Box<Expr>),

    /// `ptr^` - value of the cell a pointer designates.
    Dereference(Box<Expr>),
}

/// Binary operators, loosest-binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinOp::Or => "OR",
            BinOp::And => "AND",
            BinOp::Eq => "=",
            BinOp::Neq => "<>",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Lte => "<=",
            BinOp::Gte => ">=",
            BinOp::Concat => "&",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        };
        f.write_str(text)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnOp::Not => f.write_str("NOT"),
        }
    }
}

/// The six scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Integer,
    Real,
    String,
    Char,
    Boolean,
    Date,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ScalarType::Integer => "INTEGER",
            ScalarType::Real => "REAL",
            ScalarType::String => "STRING",
            ScalarType::Char => "CHAR",
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Date => "DATE",
        };
        f.write_str(text)
    }
}

/// A type annotation as written in a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    /// One of the six scalar keywords.
    Scalar(ScalarType),

    /// A user-defined type name (record or pointer alias).
    Named(String),

    /// `ARRAY[l:u, …] OF base`; bounds are inclusive on both ends.
    Array {
        lowers: Vec<i64>,
        uppers: Vec<i64>,
        base: Box<TypeSpec>,
    },

    /// `^Scalar` inline pointer type.
    Pointer(ScalarType),
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Scalar(s) => write!(f, "{s}"),
            TypeSpec::Named(name) => f.write_str(name),
            TypeSpec::Array {
                lowers,
                uppers,
                base,
            } => {
                f.write_str("ARRAY[")?;
                for (i, (l, u)) in lowers.iter().zip(uppers).enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{l}:{u}")?;
                }
                write!(f, "] OF {base}")
            }
            TypeSpec::Pointer(base) => write!(f, "^{base}"),
        }
    }
}
