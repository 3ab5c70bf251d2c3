//! The run-time value model.
//!
//! One tagged union spans every value the language can produce: the six
//! scalars, records as ordered field maps, arrays as sparse element maps
//! with stored bounds, and pointers as structural referent handles. `Unit`
//! is the result of a call with no value.
//!
//! Conversions happen on assignment and on `INPUT` through [`convert`];
//! unwritten storage reads the type-dependent default from
//! [`default_value`].

use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use pseudoc_par::ast::{BinOp, ScalarType, TypeSpec};

use crate::error::RuntimeError;

/// A run-time value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Str(String),
    /// One-character string; empty before first assignment.
    Char(String),
    Boolean(bool),
    /// `None` until a date is assigned.
    Date(Option<NaiveDate>),
    /// Ordered field map, mirroring the record's declaration order.
    Record(IndexMap<String, Value>),
    Array(ArrayValue),
    /// `None` is the null pointer.
    Pointer(Option<Referent>),
    /// Result of a procedure call or a function that fell off the end.
    Unit,
}

/// Array storage: declared bounds plus a sparse element map.
///
/// Elements never written read as the base type's default, so the map only
/// holds cells that were assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    pub lowers: Vec<i64>,
    pub uppers: Vec<i64>,
    pub base: TypeSpec,
    pub data: FxHashMap<Vec<i64>, Value>,
}

/// What a pointer designates: a named storage cell, never a raw address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Referent {
    /// A plain variable.
    Var(String),
    /// A record field: `(record_name, field_name)`.
    Field(String, String),
    /// An array element: `(array_name, index_tuple)`.
    Elem(String, Vec<i64>),
}

/// Definition behind a user type name.
#[derive(Debug, Clone, PartialEq)]
pub enum UserType {
    /// Record with ordered, typed fields.
    Record(Vec<(String, TypeSpec)>),
    /// `TYPE T = ^Scalar` alias.
    PointerAlias(ScalarType),
}

impl Value {
    /// Numeric view of the value, when it has one.
    pub(crate) fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(x) => Some(*x),
            _ => None,
        }
    }

    /// Text view of the value: strings and chars only.
    pub(crate) fn as_text(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Char(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable name of the value's type, for error messages.
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Str(_) => "STRING",
            Value::Char(_) => "CHAR",
            Value::Boolean(_) => "BOOLEAN",
            Value::Date(_) => "DATE",
            Value::Record(_) => "a record",
            Value::Array(_) => "an array",
            Value::Pointer(_) => "a pointer",
            Value::Unit => "no value",
        }
    }
}

impl fmt::Display for Value {
    /// The stringification used by `OUTPUT`, `&` and STRING coercion.
    ///
    /// Booleans print the literal words `TRUE`/`FALSE`; numbers use the
    /// host's default formatting; a null date prints as the empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Real(x) => write!(f, "{x}"),
            Value::Str(s) | Value::Char(s) => f.write_str(s),
            Value::Boolean(true) => f.write_str("TRUE"),
            Value::Boolean(false) => f.write_str("FALSE"),
            Value::Date(Some(date)) => write!(f, "{}", date.format("%Y-%m-%d")),
            Value::Date(None) => Ok(()),
            Value::Record(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Array(array) => {
                f.write_str("ARRAY[")?;
                for (i, (l, u)) in array.lowers.iter().zip(&array.uppers).enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{l}:{u}")?;
                }
                write!(f, "] OF {}", array.base)
            }
            Value::Pointer(Some(Referent::Var(name))) => write!(f, "^{name}"),
            Value::Pointer(Some(Referent::Field(record, field))) => {
                write!(f, "^{record}.{field}")
            }
            Value::Pointer(Some(Referent::Elem(name, indices))) => {
                write!(f, "^{name}[")?;
                for (i, index) in indices.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{index}")?;
                }
                f.write_str("]")
            }
            Value::Pointer(None) => f.write_str("NULL"),
            Value::Unit => Ok(()),
        }
    }
}

/// Coerces a value to a declared type.
///
/// Scalar targets convert; user-defined, array and pointer targets pass the
/// value through unchanged. Failure is a type error.
pub fn convert(value: Value, ty: &TypeSpec) -> Result<Value, RuntimeError> {
    let scalar = match ty {
        TypeSpec::Scalar(scalar) => *scalar,
        TypeSpec::Named(_) | TypeSpec::Array { .. } | TypeSpec::Pointer(_) => return Ok(value),
    };
    match scalar {
        ScalarType::Integer => match value {
            Value::Integer(_) => Ok(value),
            Value::Real(x) => Ok(Value::Integer(x.trunc() as i64)),
            Value::Boolean(b) => Ok(Value::Integer(i64::from(b))),
            Value::Str(s) | Value::Char(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(
                |_| RuntimeError::Type(format!("cannot convert '{s}' to INTEGER")),
            ),
            other => Err(RuntimeError::Type(format!(
                "cannot convert {} to INTEGER",
                other.type_name()
            ))),
        },
        ScalarType::Real => match value {
            Value::Real(_) => Ok(value),
            Value::Integer(n) => Ok(Value::Real(n as f64)),
            Value::Boolean(b) => Ok(Value::Real(if b { 1.0 } else { 0.0 })),
            Value::Str(s) | Value::Char(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Real)
                .map_err(|_| RuntimeError::Type(format!("cannot convert '{s}' to REAL"))),
            other => Err(RuntimeError::Type(format!(
                "cannot convert {} to REAL",
                other.type_name()
            ))),
        },
        ScalarType::String => match value {
            Value::Str(_) => Ok(value),
            other => Ok(Value::Str(other.to_string())),
        },
        ScalarType::Char => match value {
            Value::Str(s) | Value::Char(s) => {
                if s.chars().count() == 1 {
                    Ok(Value::Char(s))
                } else {
                    Err(RuntimeError::Type(format!(
                        "CHAR value must be a single character, got '{s}'"
                    )))
                }
            }
            other => Err(RuntimeError::Type(format!(
                "cannot convert {} to CHAR",
                other.type_name()
            ))),
        },
        ScalarType::Boolean => match value {
            Value::Boolean(_) => Ok(value),
            Value::Str(s) | Value::Char(s) => match s.trim() {
                "TRUE" => Ok(Value::Boolean(true)),
                "FALSE" => Ok(Value::Boolean(false)),
                _ => Err(RuntimeError::Type(format!(
                    "BOOLEAN value must be TRUE or FALSE, got '{s}'"
                ))),
            },
            other => Err(RuntimeError::Type(format!(
                "cannot convert {} to BOOLEAN",
                other.type_name()
            ))),
        },
        ScalarType::Date => match value {
            Value::Date(_) => Ok(value),
            Value::Str(s) | Value::Char(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(|date| Value::Date(Some(date)))
                .map_err(|_| {
                    RuntimeError::Type(format!("DATE value must be in YYYY-MM-DD format, got '{s}'"))
                }),
            other => Err(RuntimeError::Type(format!(
                "cannot convert {} to DATE",
                other.type_name()
            ))),
        },
    }
}

/// The value a freshly declared cell of the given type holds.
///
/// Record defaults recurse into their fields; arrays start with an empty
/// element map; pointers and dates start null.
pub fn default_value(
    ty: &TypeSpec,
    user_types: &FxHashMap<String, UserType>,
) -> Result<Value, RuntimeError> {
    match ty {
        TypeSpec::Scalar(ScalarType::Integer) => Ok(Value::Integer(0)),
        TypeSpec::Scalar(ScalarType::Real) => Ok(Value::Real(0.0)),
        TypeSpec::Scalar(ScalarType::String) => Ok(Value::Str(String::new())),
        TypeSpec::Scalar(ScalarType::Char) => Ok(Value::Char(String::new())),
        TypeSpec::Scalar(ScalarType::Boolean) => Ok(Value::Boolean(false)),
        TypeSpec::Scalar(ScalarType::Date) => Ok(Value::Date(None)),
        TypeSpec::Pointer(_) => Ok(Value::Pointer(None)),
        TypeSpec::Array {
            lowers,
            uppers,
            base,
        } => Ok(Value::Array(ArrayValue {
            lowers: lowers.clone(),
            uppers: uppers.clone(),
            base: (**base).clone(),
            data: FxHashMap::default(),
        })),
        TypeSpec::Named(name) => match user_types.get(name) {
            Some(UserType::Record(fields)) => {
                let mut map = IndexMap::with_capacity(fields.len());
                for (field_name, field_type) in fields {
                    map.insert(field_name.clone(), default_value(field_type, user_types)?);
                }
                Ok(Value::Record(map))
            }
            Some(UserType::PointerAlias(_)) => Ok(Value::Pointer(None)),
            None => Err(RuntimeError::Name(format!("unknown type '{name}'"))),
        },
    }
}

/// Applies a binary operator to two evaluated operands.
///
/// `AND`/`OR` reach here only when both sides were already evaluated; the
/// interpreter short-circuits before calling in.
pub(crate) fn binary_op(op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul => numeric_op(op, left, right),
        BinOp::Div => {
            let (a, b) = numeric_pair(op, left, right)?;
            if b == 0.0 {
                return Err(RuntimeError::Type("division by zero".to_string()));
            }
            Ok(Value::Real(a / b))
        }
        BinOp::Concat => Ok(Value::Str(format!("{left}{right}"))),
        BinOp::Eq => Ok(Value::Boolean(values_equal(left, right))),
        BinOp::Neq => Ok(Value::Boolean(!values_equal(left, right))),
        BinOp::Lt | BinOp::Gt | BinOp::Lte | BinOp::Gte => order_op(op, left, right),
        BinOp::And | BinOp::Or => {
            let (a, b) = match (left, right) {
                (Value::Boolean(a), Value::Boolean(b)) => (*a, *b),
                _ => {
                    return Err(RuntimeError::Type(format!(
                        "operator '{op}' requires BOOLEAN operands"
                    )))
                }
            };
            Ok(Value::Boolean(if op == BinOp::And { a && b } else { a || b }))
        }
    }
}

/// `+ - *`: INTEGER stays INTEGER when both operands are, otherwise REAL.
fn numeric_op(op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
        let result = match op {
            BinOp::Add => a.checked_add(*b),
            BinOp::Sub => a.checked_sub(*b),
            BinOp::Mul => a.checked_mul(*b),
            _ => unreachable!("numeric_op only handles + - *"),
        };
        return result
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::Type(format!("INTEGER overflow in '{op}'")));
    }
    let (a, b) = numeric_pair(op, left, right)?;
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        _ => unreachable!("numeric_op only handles + - *"),
    };
    Ok(Value::Real(result))
}

/// Both operands as numbers, or a type error naming the operator.
fn numeric_pair(op: BinOp, left: &Value, right: &Value) -> Result<(f64, f64), RuntimeError> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(RuntimeError::Type(format!(
            "operator '{op}' requires numeric operands, got {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Equality used by `=`, `<>` and CASE label matching.
///
/// Numbers compare across INTEGER/REAL; strings and chars compare as text;
/// mismatched types are simply unequal.
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (left.as_text(), right.as_text()) {
        return a == b;
    }
    left == right
}

/// `< > <= >=` on two numbers, two texts, or two set dates.
fn order_op(op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    let ordering = if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        a.partial_cmp(&b)
    } else if let (Some(a), Some(b)) = (left.as_text(), right.as_text()) {
        Some(a.cmp(b))
    } else if let (Value::Date(Some(a)), Value::Date(Some(b))) = (left, right) {
        Some(a.cmp(b))
    } else {
        return Err(RuntimeError::Type(format!(
            "cannot compare {} and {} with '{op}'",
            left.type_name(),
            right.type_name()
        )));
    };
    let Some(ordering) = ordering else {
        // NaN comparisons
        return Ok(Value::Boolean(false));
    };
    let result = match op {
        BinOp::Lt => ordering.is_lt(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::Lte => ordering.is_le(),
        BinOp::Gte => ordering.is_ge(),
        _ => unreachable!("order_op only handles comparisons"),
    };
    Ok(Value::Boolean(result))
}
