//! The environment: a stack of frames with BYREF indirection.
//!
//! Each frame owns value cells and a declared-type table for the names it
//! introduced. A cell is either a direct [`Value`] or a [`RefTarget`] that
//! redirects reads and writes to a cell in an enclosing frame (how BYREF
//! parameters alias their argument). Name lookup searches the innermost
//! frame first and chains outward; reference chains are followed to the
//! owning cell, so BYREF parameters can be forwarded through nested calls.

use rustc_hash::FxHashMap;

use pseudoc_par::ast::TypeSpec;

use crate::error::RuntimeError;
use crate::value::Value;

/// A cell in a frame.
#[derive(Debug, Clone)]
pub(crate) enum Binding {
    /// Directly owned value.
    Value(Value),
    /// Redirection to a cell in an enclosing frame.
    Reference(RefTarget),
}

/// Address of a cell in the frame stack, optionally narrowed to one record
/// field.
#[derive(Debug, Clone)]
pub(crate) struct RefTarget {
    pub frame: usize,
    pub name: String,
    pub field: Option<String>,
}

/// One activation record: parameter bindings plus local declarations.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    cells: FxHashMap<String, Binding>,
    types: FxHashMap<String, TypeSpec>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a binding with its declared type.
    pub fn bind(&mut self, name: String, binding: Binding, ty: TypeSpec) {
        self.cells.insert(name.clone(), binding);
        self.types.insert(name, ty);
    }
}

/// The frame stack. Index 0 is the global frame and is never popped.
#[derive(Debug)]
pub(crate) struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new()],
        }
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) {
        debug_assert!(self.frames.len() > 1, "the global frame is never popped");
        self.frames.pop();
    }

    /// Index of the innermost frame binding `name`, if any.
    pub fn find_frame(&self, name: &str) -> Option<usize> {
        self.frames
            .iter()
            .enumerate()
            .rev()
            .find(|(_, frame)| frame.cells.contains_key(name))
            .map(|(index, _)| index)
    }

    /// Allocates a cell in the innermost frame.
    pub fn declare(&mut self, name: &str, ty: TypeSpec, value: Value) {
        let frame = self.frames.last_mut().expect("frame stack is never empty");
        frame.bind(name.to_string(), Binding::Value(value), ty);
    }

    /// The declared type of the innermost binding of `name`.
    ///
    /// For a BYREF parameter this is the parameter's own declared type, not
    /// the referenced cell's.
    pub fn declared_type(&self, name: &str) -> Option<TypeSpec> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.types.get(name))
            .cloned()
    }

    /// Resolves a name to the coordinates of its owning cell, following any
    /// chain of references.
    ///
    /// The returned field is set when the chain ends in a record field (a
    /// BYREF parameter bound to `record.field`).
    pub fn resolve_named(&self, name: &str) -> Result<(usize, String, Option<String>), RuntimeError> {
        let frame = self.find_frame(name).ok_or_else(|| {
            RuntimeError::Name(format!("variable '{name}' has not been declared"))
        })?;
        self.resolve_from(frame, name.to_string(), None)
    }

    /// Follows reference cells from the given coordinates to the owning
    /// value cell.
    fn resolve_from(
        &self,
        mut frame: usize,
        mut name: String,
        mut field: Option<String>,
    ) -> Result<(usize, String, Option<String>), RuntimeError> {
        loop {
            let binding = self.frames[frame].cells.get(&name).ok_or_else(|| {
                RuntimeError::Name(format!("variable '{name}' has not been declared"))
            })?;
            match binding {
                Binding::Value(_) => return Ok((frame, name, field)),
                Binding::Reference(target) => {
                    field = match (&target.field, field) {
                        (Some(inner), None) => Some(inner.clone()),
                        (None, pending) => pending,
                        (Some(_), Some(_)) => {
                            return Err(RuntimeError::Type(format!(
                                "reference to '{name}' nests record fields too deeply"
                            )))
                        }
                    };
                    frame = target.frame;
                    name = target.name.clone();
                }
            }
        }
    }

    /// The value owned by the cell at resolved coordinates.
    fn value_ref(&self, frame: usize, name: &str) -> Result<&Value, RuntimeError> {
        match self.frames[frame].cells.get(name) {
            Some(Binding::Value(value)) => Ok(value),
            _ => Err(RuntimeError::Name(format!(
                "variable '{name}' has not been declared"
            ))),
        }
    }

    /// Mutable access to the value owned by the cell at resolved
    /// coordinates.
    pub fn value_mut(&mut self, frame: usize, name: &str) -> Result<&mut Value, RuntimeError> {
        match self.frames[frame].cells.get_mut(name) {
            Some(Binding::Value(value)) => Ok(value),
            _ => Err(RuntimeError::Name(format!(
                "variable '{name}' has not been declared"
            ))),
        }
    }

    /// Reads the value at resolved coordinates, descending into the field
    /// when one is set.
    pub fn value_at(
        &self,
        frame: usize,
        name: &str,
        field: Option<&str>,
    ) -> Result<&Value, RuntimeError> {
        let value = self.value_ref(frame, name)?;
        match field {
            None => Ok(value),
            Some(field_name) => match value {
                Value::Record(map) => map.get(field_name).ok_or_else(|| {
                    RuntimeError::Name(format!(
                        "'{field_name}' is not a field of '{name}'"
                    ))
                }),
                _ => Err(RuntimeError::Type(format!(
                    "'{name}' is not a record"
                ))),
            },
        }
    }

    /// Mutable counterpart of [`Environment::value_at`].
    pub fn value_at_mut(
        &mut self,
        frame: usize,
        name: &str,
        field: Option<&str>,
    ) -> Result<&mut Value, RuntimeError> {
        match field {
            None => self.value_mut(frame, name),
            Some(field_name) => {
                let value = self.value_mut(frame, name)?;
                match value {
                    Value::Record(map) => map.get_mut(field_name).ok_or_else(|| {
                        RuntimeError::Name(format!(
                            "'{field_name}' is not a field of '{name}'"
                        ))
                    }),
                    _ => Err(RuntimeError::Type(format!("'{name}' is not a record"))),
                }
            }
        }
    }

    /// Reads the current value of `name`, following references.
    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        let (frame, cell_name, field) = self.resolve_named(name)?;
        Ok(self.value_at(frame, &cell_name, field.as_deref())?.clone())
    }

    /// Writes `value` to the innermost binding of `name`, through any
    /// references. The caller is responsible for coercion; writing to an
    /// unbound name is a name error.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let (frame, cell_name, field) = self.resolve_named(name)?;
        match field {
            None => {
                *self.value_mut(frame, &cell_name)? = value;
                Ok(())
            }
            Some(field_name) => {
                let slot = self.value_at_mut(frame, &cell_name, Some(&field_name))?;
                *slot = value;
                Ok(())
            }
        }
    }
}
