use std::io::{self, Write};

use object::{Heap, HeapCreateInfo, ObjectError, ObjectRef};

use crate::Value;

#[derive(Debug, Clone, Default)]
pub struct RuntimeCreateInfo {
    pub heap: HeapCreateInfo,
}

/// State reachable from running code.
///
/// Passed explicitly to the interpreter and to every primitive; the harness
/// uses the same handle to build objects before or after a run.
pub struct Runtime {
    pub heap: Heap,
    output: Box<dyn Write>,
}

impl Runtime {
    pub fn new(info: RuntimeCreateInfo) -> Self {
        Self::with_output(info, Box::new(io::stdout()))
    }

    pub fn with_output(info: RuntimeCreateInfo, output: Box<dyn Write>) -> Self {
        Self {
            heap: Heap::new(info.heap),
            output,
        }
    }

    pub fn allocate(
        &mut self,
        prototype: Option<ObjectRef>,
    ) -> Result<ObjectRef, ObjectError> {
        self.heap.allocate(prototype)
    }

    /// Wrap a scalar into a boxed object with no prototype. Object
    /// references pass through unchanged.
    pub fn box_value(&mut self, value: &Value) -> Result<Value, crate::RuntimeError> {
        let boxed = match value {
            Value::Object(obj) => return Ok(Value::Object(*obj)),
            Value::Int(v) => self.heap.allocate_integer(None, *v)?,
            Value::Double(v) => self.heap.allocate_double(None, *v)?,
            Value::Str(s) => self.heap.allocate_string(None, s)?,
            Value::Void => {
                return Err(crate::RuntimeError::TypeError {
                    expected: "boxable value",
                    got: "void",
                });
            }
        };
        Ok(boxed.into())
    }

    pub fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("heap", &self.heap)
            .finish_non_exhaustive()
    }
}
