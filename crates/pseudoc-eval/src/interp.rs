//! The tree-walking interpreter.
//!
//! Executes a parsed program statement by statement against the frame-stack
//! [`Environment`]. Control flow out of a call body is an explicit
//! [`Flow`] result rather than an unwinding mechanism: `RETURN` produces
//! `Flow::Return`, which propagates up the walk until the enclosing
//! activation converts it into the call's value (function) or an early
//! exit (procedure).
//!
//! Statements execute in source order; expression operands evaluate left to
//! right; call arguments evaluate left to right before the frame is set up.
//! Frames are popped on every exit path, including error propagation.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use pseudoc_par::ast::{
    Assign, BinOp, Call, CaseOf, Expr, For, FunctionDef, If, ProcedureDef, Program, RepeatUntil,
    ScalarType, Stmt, TypeDefBody, TypeSpec, UnOp, While,
};

use crate::builtins;
use crate::env::{Binding, Environment, Frame, RefTarget};
use crate::error::RuntimeError;
use crate::io::{LineReader, LineWriter};
use crate::value::{
    binary_op, convert, default_value, values_equal, Referent, UserType, Value,
};

/// Result of executing a statement.
enum Flow {
    /// Fall through to the next statement.
    Normal,
    /// A RETURN is unwinding toward the enclosing activation.
    Return(Value),
}

/// A user-defined callable. Procedures and functions share one table; the
/// kind decides what a RETURN means to the caller.
enum Callable {
    Procedure(ProcedureDef),
    Function(FunctionDef),
}

/// Executes a program against the given line reader and writer.
pub fn run(
    program: &Program,
    input: &mut dyn LineReader,
    output: &mut dyn LineWriter,
) -> Result<(), RuntimeError> {
    Interpreter::new(input, output).run(program)
}

/// The evaluator state: environment, user types, callables, and the I/O
/// seam.
pub struct Interpreter<'io> {
    env: Environment,
    user_types: FxHashMap<String, UserType>,
    callables: FxHashMap<String, Rc<Callable>>,
    input: &'io mut dyn LineReader,
    output: &'io mut dyn LineWriter,
}

impl<'io> Interpreter<'io> {
    pub fn new(input: &'io mut dyn LineReader, output: &'io mut dyn LineWriter) -> Self {
        Self {
            env: Environment::new(),
            user_types: FxHashMap::default(),
            callables: FxHashMap::default(),
            input,
            output,
        }
    }

    /// Runs the top-level statement sequence.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for stmt in program {
            if let Flow::Return(_) = self.exec_stmt(stmt)? {
                return Err(RuntimeError::Name(
                    "RETURN outside a procedure or function".to_string(),
                ));
            }
        }
        Ok(())
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn exec_block(&mut self, body: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in body {
            if let Flow::Return(value) = self.exec_stmt(stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Declare(decl) => {
                let value = default_value(&decl.ty, &self.user_types)?;
                self.env.declare(&decl.name, decl.ty.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::TypeDef(def) => {
                let user_type = match &def.body {
                    TypeDefBody::Record(fields) => UserType::Record(fields.clone()),
                    TypeDefBody::PointerAlias(base) => UserType::PointerAlias(*base),
                };
                self.user_types.insert(def.name.clone(), user_type);
                Ok(Flow::Normal)
            }
            Stmt::Assign(assign) => {
                self.exec_assign(assign)?;
                Ok(Flow::Normal)
            }
            Stmt::If(stmt) => self.exec_if(stmt),
            Stmt::While(stmt) => self.exec_while(stmt),
            Stmt::For(stmt) => self.exec_for(stmt),
            Stmt::RepeatUntil(stmt) => self.exec_repeat(stmt),
            Stmt::CaseOf(stmt) => self.exec_case(stmt),
            Stmt::Output(values) => {
                self.exec_output(values)?;
                Ok(Flow::Normal)
            }
            Stmt::Input(name) => {
                self.exec_input(name)?;
                Ok(Flow::Normal)
            }
            Stmt::ProcedureDef(def) => {
                self.define_callable(&def.name, Callable::Procedure(def.clone()))?;
                Ok(Flow::Normal)
            }
            Stmt::FunctionDef(def) => {
                self.define_callable(&def.name, Callable::Function(def.clone()))?;
                Ok(Flow::Normal)
            }
            Stmt::CallStmt(call) => {
                self.eval_call(call)?;
                Ok(Flow::Normal)
            }
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Unit,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    fn exec_if(&mut self, stmt: &If) -> Result<Flow, RuntimeError> {
        let condition = self.eval_expr(&stmt.condition)?;
        if expect_bool(&condition, "IF condition")? {
            self.exec_block(&stmt.then_body)
        } else if let Some(else_body) = &stmt.else_body {
            self.exec_block(else_body)
        } else {
            Ok(Flow::Normal)
        }
    }

    fn exec_while(&mut self, stmt: &While) -> Result<Flow, RuntimeError> {
        loop {
            let condition = self.eval_expr(&stmt.condition)?;
            if !expect_bool(&condition, "WHILE condition")? {
                return Ok(Flow::Normal);
            }
            if let Flow::Return(value) = self.exec_block(&stmt.body)? {
                return Ok(Flow::Return(value));
            }
        }
    }

    /// `FOR var <- a TO b`: inclusive on both ends, an empty range runs the
    /// body zero times and leaves the variable untouched.
    fn exec_for(&mut self, stmt: &For) -> Result<Flow, RuntimeError> {
        let start = self.eval_expr(&stmt.start)?;
        let start = expect_int(&start, "FOR start bound")?;
        let end = self.eval_expr(&stmt.end)?;
        let end = expect_int(&end, "FOR end bound")?;

        for i in start..=end {
            self.set_loop_var(&stmt.var, i)?;
            if let Flow::Return(value) = self.exec_block(&stmt.body)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    /// Assigns the loop counter, establishing the variable as an INTEGER in
    /// the innermost frame when it was not declared.
    fn set_loop_var(&mut self, name: &str, i: i64) -> Result<(), RuntimeError> {
        match self.env.declared_type(name) {
            Some(ty) => {
                let value = convert(Value::Integer(i), &ty)?;
                self.env.set(name, value)
            }
            None => {
                self.env
                    .declare(name, TypeSpec::Scalar(ScalarType::Integer), Value::Integer(i));
                Ok(())
            }
        }
    }

    fn exec_repeat(&mut self, stmt: &RepeatUntil) -> Result<Flow, RuntimeError> {
        loop {
            if let Flow::Return(value) = self.exec_block(&stmt.body)? {
                return Ok(Flow::Return(value));
            }
            let condition = self.eval_expr(&stmt.condition)?;
            if expect_bool(&condition, "UNTIL condition")? {
                return Ok(Flow::Normal);
            }
        }
    }

    /// Tests each arm's label against the scrutinee in source order; the
    /// first match runs, otherwise the OTHERWISE body (when present).
    fn exec_case(&mut self, stmt: &CaseOf) -> Result<Flow, RuntimeError> {
        let scrutinee = self.eval_expr(&stmt.expr)?;
        for (label, body) in &stmt.arms {
            let label_value = self.eval_expr(label)?;
            if values_equal(&label_value, &scrutinee) {
                return self.exec_block(body);
            }
        }
        if let Some(otherwise) = &stmt.otherwise {
            return self.exec_block(otherwise);
        }
        Ok(Flow::Normal)
    }

    /// Stringifies every value and writes them joined by single spaces as
    /// one line.
    fn exec_output(&mut self, values: &[Expr]) -> Result<(), RuntimeError> {
        let mut parts = Vec::with_capacity(values.len());
        for expr in values {
            parts.push(self.eval_expr(expr)?.to_string());
        }
        self.output.write_line(&parts.join(" "))?;
        Ok(())
    }

    /// Prompts, reads one line, coerces it to the declared scalar type, and
    /// stores it.
    fn exec_input(&mut self, name: &str) -> Result<(), RuntimeError> {
        let ty = self.env.declared_type(name).ok_or_else(|| {
            RuntimeError::Name(format!("variable '{name}' has not been declared"))
        })?;
        if !matches!(ty, TypeSpec::Scalar(_)) {
            return Err(RuntimeError::Input(format!(
                "cannot INPUT a value of type {ty}"
            )));
        }

        self.output
            .write_prompt(&format!("Enter value for {name}: "))?;
        let line = self
            .input
            .read_line()?
            .ok_or_else(|| RuntimeError::Input("unexpected end of input".to_string()))?;

        let value = convert(Value::Str(line.clone()), &ty)
            .map_err(|_| RuntimeError::Input(format!("invalid {ty} value: '{line}'")))?;
        self.env.set(name, value)
    }

    // =========================================================================
    // ASSIGNMENT
    // =========================================================================

    /// Resolves the target to a cell, coerces the value to the cell's
    /// declared type, and writes.
    fn exec_assign(&mut self, assign: &Assign) -> Result<(), RuntimeError> {
        let value = self.eval_expr(&assign.value)?;
        self.assign_to(&assign.target, value)
    }

    fn assign_to(&mut self, target: &Expr, value: Value) -> Result<(), RuntimeError> {
        match target {
            Expr::Var(name) => self.write_var(name, value),
            Expr::FieldAccess { record, field } => self.write_field(record, field, value),
            Expr::ArrayAccess { name, indices } => {
                let indices = self.eval_indices(indices)?;
                self.write_element(name, &indices, value)
            }
            Expr::Dereference(pointer) => {
                let pointer_value = self.eval_expr(pointer)?;
                match pointer_value {
                    Value::Pointer(Some(referent)) => self.write_referent(&referent, value),
                    Value::Pointer(None) => Err(RuntimeError::Type(
                        "dereference of a null pointer".to_string(),
                    )),
                    other => Err(RuntimeError::Type(format!(
                        "cannot dereference {}",
                        other.type_name()
                    ))),
                }
            }
            _ => Err(RuntimeError::Type(
                "assignment target is not an lvalue".to_string(),
            )),
        }
    }

    fn write_var(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let ty = self.env.declared_type(name).ok_or_else(|| {
            RuntimeError::Name(format!("variable '{name}' has not been declared"))
        })?;
        let converted = convert(value, &ty)?;
        self.env.set(name, converted)
    }

    fn write_field(&mut self, record: &str, field: &str, value: Value) -> Result<(), RuntimeError> {
        let field_type = self.field_type(record, field)?;
        let converted = convert(value, &field_type)?;

        let (frame, cell_name, pending) = self.env.resolve_named(record)?;
        let slot = self
            .env
            .value_at_mut(frame, &cell_name, pending.as_deref())?;
        match slot {
            Value::Record(map) => {
                map.insert(field.to_string(), converted);
                Ok(())
            }
            _ => Err(RuntimeError::Type(format!("'{record}' is not a record"))),
        }
    }

    /// The declared type of `record.field`, via the record's user type.
    fn field_type(&self, record: &str, field: &str) -> Result<TypeSpec, RuntimeError> {
        let record_type = self.env.declared_type(record).ok_or_else(|| {
            RuntimeError::Name(format!("variable '{record}' has not been declared"))
        })?;
        let type_name = match record_type {
            TypeSpec::Named(name) => name,
            other => {
                return Err(RuntimeError::Type(format!(
                    "'{record}' is not a record (declared {other})"
                )))
            }
        };
        match self.user_types.get(&type_name) {
            Some(UserType::Record(fields)) => fields
                .iter()
                .find(|(name, _)| name == field)
                .map(|(_, ty)| ty.clone())
                .ok_or_else(|| {
                    RuntimeError::Name(format!(
                        "'{field}' is not a field of type '{type_name}'"
                    ))
                }),
            Some(UserType::PointerAlias(_)) => Err(RuntimeError::Type(format!(
                "'{record}' is not a record (declared {type_name})"
            ))),
            None => Err(RuntimeError::Name(format!("unknown type '{type_name}'"))),
        }
    }

    /// Bounds-checks and writes one array element, coerced to the base type.
    fn write_element(
        &mut self,
        name: &str,
        indices: &[i64],
        value: Value,
    ) -> Result<(), RuntimeError> {
        let (frame, cell_name, pending) = self.env.resolve_named(name)?;
        let slot = self
            .env
            .value_at_mut(frame, &cell_name, pending.as_deref())?;
        match slot {
            Value::Array(array) => {
                check_bounds(name, &array.lowers, &array.uppers, indices)?;
                let base = array.base.clone();
                let converted = convert(value, &base)?;
                array.data.insert(indices.to_vec(), converted);
                Ok(())
            }
            _ => Err(RuntimeError::Type(format!("'{name}' is not an array"))),
        }
    }

    /// Writes through a pointer's referent.
    fn write_referent(&mut self, referent: &Referent, value: Value) -> Result<(), RuntimeError> {
        match referent {
            Referent::Var(name) => self.write_var(name, value),
            Referent::Field(record, field) => self.write_field(record, field, value),
            Referent::Elem(name, indices) => self.write_element(name, indices, value),
        }
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Number(text) => eval_number(text),
            Expr::Str(text) => Ok(Value::Str(text.clone())),
            Expr::Var(name) => self.env.get(name),
            Expr::FieldAccess { record, field } => self.read_field(record, field),
            Expr::ArrayAccess { name, indices } => {
                let indices = self.eval_indices(indices)?;
                self.read_element(name, &indices)
            }
            Expr::Call(call) => self.eval_call(call),
            Expr::Binary { left, op, right } => self.eval_binary(*op, left, right),
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                match op {
                    UnOp::Not => Ok(Value::Boolean(!expect_bool(&value, "NOT operand")?)),
                }
            }
            Expr::AddressOf(target) => {
                let referent = self.referent_of(target)?;
                Ok(Value::Pointer(Some(referent)))
            }
            Expr::Dereference(pointer) => {
                let pointer_value = self.eval_expr(pointer)?;
                match pointer_value {
                    Value::Pointer(Some(referent)) => self.read_referent(&referent),
                    Value::Pointer(None) => Err(RuntimeError::Type(
                        "dereference of a null pointer".to_string(),
                    )),
                    other => Err(RuntimeError::Type(format!(
                        "cannot dereference {}",
                        other.type_name()
                    ))),
                }
            }
        }
    }

    /// Binary operators; `AND`/`OR` short-circuit here.
    fn eval_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> Result<Value, RuntimeError> {
        match op {
            BinOp::And => {
                let left = self.eval_expr(left)?;
                if !expect_bool(&left, "AND operand")? {
                    return Ok(Value::Boolean(false));
                }
                let right = self.eval_expr(right)?;
                Ok(Value::Boolean(expect_bool(&right, "AND operand")?))
            }
            BinOp::Or => {
                let left = self.eval_expr(left)?;
                if expect_bool(&left, "OR operand")? {
                    return Ok(Value::Boolean(true));
                }
                let right = self.eval_expr(right)?;
                Ok(Value::Boolean(expect_bool(&right, "OR operand")?))
            }
            _ => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                binary_op(op, &left, &right)
            }
        }
    }

    fn read_field(&mut self, record: &str, field: &str) -> Result<Value, RuntimeError> {
        let (frame, cell_name, pending) = self.env.resolve_named(record)?;
        let value = self.env.value_at(frame, &cell_name, pending.as_deref())?;
        match value {
            Value::Record(map) => map.get(field).cloned().ok_or_else(|| {
                RuntimeError::Name(format!("'{field}' is not a field of '{record}'"))
            }),
            _ => Err(RuntimeError::Type(format!("'{record}' is not a record"))),
        }
    }

    /// Bounds-checked element read; an element never written reads as the
    /// base type's default.
    fn read_element(&mut self, name: &str, indices: &[i64]) -> Result<Value, RuntimeError> {
        let (frame, cell_name, pending) = self.env.resolve_named(name)?;
        let value = self.env.value_at(frame, &cell_name, pending.as_deref())?;
        match value {
            Value::Array(array) => {
                check_bounds(name, &array.lowers, &array.uppers, indices)?;
                match array.data.get(indices) {
                    Some(element) => Ok(element.clone()),
                    None => default_value(&array.base, &self.user_types),
                }
            }
            _ => Err(RuntimeError::Type(format!("'{name}' is not an array"))),
        }
    }

    fn eval_indices(&mut self, indices: &[Expr]) -> Result<Vec<i64>, RuntimeError> {
        indices
            .iter()
            .map(|expr| {
                let value = self.eval_expr(expr)?;
                expect_int(&value, "array index")
            })
            .collect()
    }

    /// The structural referent of an address-of target; the target must be
    /// an addressable lvalue.
    fn referent_of(&mut self, target: &Expr) -> Result<Referent, RuntimeError> {
        match target {
            Expr::Var(name) => {
                self.env.resolve_named(name)?;
                Ok(Referent::Var(name.clone()))
            }
            Expr::FieldAccess { record, field } => {
                // validates both the record and the field
                self.read_field(record, field)?;
                Ok(Referent::Field(record.clone(), field.clone()))
            }
            Expr::ArrayAccess { name, indices } => {
                let indices = self.eval_indices(indices)?;
                self.read_element(name, &indices)?;
                Ok(Referent::Elem(name.clone(), indices))
            }
            _ => Err(RuntimeError::Type(
                "can only take the address of a variable, record field, or array element"
                    .to_string(),
            )),
        }
    }

    /// Follows a referent back to the current value of the named cell.
    fn read_referent(&mut self, referent: &Referent) -> Result<Value, RuntimeError> {
        match referent {
            Referent::Var(name) => self.env.get(name),
            Referent::Field(record, field) => self.read_field(record, field),
            Referent::Elem(name, indices) => self.read_element(name, indices),
        }
    }

    // =========================================================================
    // CALLS
    // =========================================================================

    fn define_callable(&mut self, name: &str, callable: Callable) -> Result<(), RuntimeError> {
        if self.callables.contains_key(name) {
            return Err(RuntimeError::Name(format!(
                "'{name}' is already defined as a procedure or function"
            )));
        }
        self.callables.insert(name.to_string(), Rc::new(callable));
        Ok(())
    }

    /// Dispatches a call: intrinsics by case-insensitive name first, then
    /// the user callable table.
    fn eval_call(&mut self, call: &Call) -> Result<Value, RuntimeError> {
        let upper = call.name.to_ascii_uppercase();
        if builtins::is_intrinsic(&upper) {
            let mut args = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                args.push(self.eval_expr(arg)?);
            }
            return builtins::call_intrinsic(&upper, &args);
        }

        let callable = self.callables.get(&call.name).cloned().ok_or_else(|| {
            RuntimeError::Name(format!(
                "unknown procedure or function '{}'",
                call.name
            ))
        })?;
        let (params, body, is_function) = match &*callable {
            Callable::Procedure(def) => (&def.params, &def.body, false),
            Callable::Function(def) => (&def.params, &def.body, true),
        };

        if call.args.len() != params.len() {
            return Err(RuntimeError::Type(format!(
                "'{}' expects {} argument(s), {} given",
                call.name,
                params.len(),
                call.args.len()
            )));
        }

        // Bind parameters in order: BYVAL receives the evaluated argument,
        // BYREF aliases the caller's cell.
        let mut frame = Frame::new();
        for (param, arg) in params.iter().zip(&call.args) {
            let binding = if param.byref {
                Binding::Reference(self.byref_target(arg)?)
            } else {
                Binding::Value(self.eval_expr(arg)?)
            };
            frame.bind(param.name.clone(), binding, param.ty.clone());
        }

        self.env.push_frame(frame);
        let result = self.exec_block(body);
        self.env.pop_frame();

        match result? {
            Flow::Return(value) if is_function => Ok(value),
            _ => Ok(Value::Unit),
        }
    }

    /// Resolves a BYREF argument to the caller cell it aliases.
    fn byref_target(&mut self, arg: &Expr) -> Result<RefTarget, RuntimeError> {
        match arg {
            Expr::Var(name) => {
                let (frame, cell_name, field) = self.env.resolve_named(name)?;
                Ok(RefTarget {
                    frame,
                    name: cell_name,
                    field,
                })
            }
            Expr::FieldAccess { record, field } => {
                // validates both the record and the field
                self.read_field(record, field)?;
                let (frame, cell_name, pending) = self.env.resolve_named(record)?;
                if pending.is_some() {
                    return Err(RuntimeError::Type(
                        "cannot pass a nested record field by reference".to_string(),
                    ));
                }
                Ok(RefTarget {
                    frame,
                    name: cell_name,
                    field: Some(field.clone()),
                })
            }
            _ => Err(RuntimeError::Type(
                "BYREF argument must be a variable or record field".to_string(),
            )),
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// An integral lexeme evaluates to INTEGER, a fractional one to REAL.
/// Integral literals too large for INTEGER widen to REAL.
fn eval_number(text: &str) -> Result<Value, RuntimeError> {
    if !text.contains('.') {
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Integer(n));
        }
    }
    text.parse::<f64>()
        .map(Value::Real)
        .map_err(|_| RuntimeError::Type(format!("invalid number literal '{text}'")))
}

fn expect_bool(value: &Value, context: &str) -> Result<bool, RuntimeError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        other => Err(RuntimeError::Type(format!(
            "{context} must be a BOOLEAN, got {}",
            other.type_name()
        ))),
    }
}

fn expect_int(value: &Value, context: &str) -> Result<i64, RuntimeError> {
    match value {
        Value::Integer(n) => Ok(*n),
        other => Err(RuntimeError::Type(format!(
            "{context} must be an INTEGER, got {}",
            other.type_name()
        ))),
    }
}

/// Checks index arity and per-dimension bounds.
fn check_bounds(
    name: &str,
    lowers: &[i64],
    uppers: &[i64],
    indices: &[i64],
) -> Result<(), RuntimeError> {
    if indices.len() != lowers.len() {
        return Err(RuntimeError::Range(format!(
            "array '{name}' has {} dimension(s), {} index(es) given",
            lowers.len(),
            indices.len()
        )));
    }
    for (dim, ((index, lower), upper)) in indices.iter().zip(lowers).zip(uppers).enumerate() {
        if index < lower || index > upper {
            return Err(RuntimeError::Range(format!(
                "index {index} out of bounds for dimension {} of array '{name}' ({lower}:{upper})",
                dim + 1
            )));
        }
    }
    Ok(())
}
