//! Built-in string and numeric intrinsics.
//!
//! Intrinsics are dispatched by case-insensitive name before the user
//! callable table is consulted, so `Right(...)` and `RIGHT(...)` both reach
//! the builtin. String-typed arguments accept CHAR values; positions and
//! lengths are 1-based character counts.

use rand::Rng;

use crate::error::RuntimeError;
use crate::value::Value;

/// True when the (already upper-cased) name is an intrinsic.
pub(crate) fn is_intrinsic(upper_name: &str) -> bool {
    matches!(
        upper_name,
        "RIGHT" | "LENGTH" | "MID" | "LCASE" | "UCASE" | "INT" | "RAND"
    )
}

/// Runs an intrinsic on evaluated arguments.
pub(crate) fn call_intrinsic(upper_name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
    match upper_name {
        "RIGHT" => {
            expect_arity("RIGHT", args, 2)?;
            let s = text_arg("RIGHT", &args[0])?;
            let n = count_arg("RIGHT", &args[1])?;
            let len = s.chars().count() as i64;
            if n >= len {
                return Ok(Value::Str(s.to_string()));
            }
            if n <= 0 {
                return Ok(Value::Str(String::new()));
            }
            Ok(Value::Str(s.chars().skip((len - n) as usize).collect()))
        }
        "LENGTH" => {
            expect_arity("LENGTH", args, 1)?;
            let s = text_arg("LENGTH", &args[0])?;
            Ok(Value::Integer(s.chars().count() as i64))
        }
        "MID" => {
            expect_arity("MID", args, 3)?;
            let s = text_arg("MID", &args[0])?;
            let start = count_arg("MID", &args[1])?;
            let length = count_arg("MID", &args[2])?;
            if start < 1 {
                return Err(RuntimeError::Type("MID start must be at least 1".to_string()));
            }
            if length < 0 {
                return Err(RuntimeError::Type(
                    "MID length must not be negative".to_string(),
                ));
            }
            Ok(Value::Str(
                s.chars()
                    .skip((start - 1) as usize)
                    .take(length as usize)
                    .collect(),
            ))
        }
        "LCASE" => {
            expect_arity("LCASE", args, 1)?;
            let c = char_arg("LCASE", &args[0])?;
            Ok(Value::Char(c.to_lowercase()))
        }
        "UCASE" => {
            expect_arity("UCASE", args, 1)?;
            let c = char_arg("UCASE", &args[0])?;
            Ok(Value::Char(c.to_uppercase()))
        }
        "INT" => {
            expect_arity("INT", args, 1)?;
            let x = number_arg("INT", &args[0])?;
            Ok(Value::Integer(x.trunc() as i64))
        }
        "RAND" => {
            expect_arity("RAND", args, 1)?;
            let x = number_arg("RAND", &args[0])?;
            Ok(Value::Real(rand::thread_rng().gen::<f64>() * x))
        }
        other => Err(RuntimeError::Name(format!(
            "unknown intrinsic '{other}'"
        ))),
    }
}

fn expect_arity(name: &str, args: &[Value], expected: usize) -> Result<(), RuntimeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::Type(format!(
            "{name} expects {expected} argument(s), {} given",
            args.len()
        )))
    }
}

fn text_arg<'a>(name: &str, value: &'a Value) -> Result<&'a str, RuntimeError> {
    value.as_text().ok_or_else(|| {
        RuntimeError::Type(format!(
            "{name} expects a string argument, got {}",
            value.type_name()
        ))
    })
}

fn char_arg<'a>(name: &str, value: &'a Value) -> Result<&'a str, RuntimeError> {
    let text = text_arg(name, value)?;
    if text.chars().count() == 1 {
        Ok(text)
    } else {
        Err(RuntimeError::Type(format!(
            "{name} expects a single character, got '{text}'"
        )))
    }
}

fn number_arg(name: &str, value: &Value) -> Result<f64, RuntimeError> {
    value.as_number().ok_or_else(|| {
        RuntimeError::Type(format!(
            "{name} expects a numeric argument, got {}",
            value.type_name()
        ))
    })
}

/// A count or position argument: INTEGER, or REAL truncated.
fn count_arg(name: &str, value: &Value) -> Result<i64, RuntimeError> {
    Ok(number_arg(name, value)?.trunc() as i64)
}
