use std::collections::HashMap;

use ir::{
    BinOp, Callee, Constant, Function, FunctionId, Instruction, Module, Operand, Type, ValueId,
};
use object::Heap;

use crate::codegen::ENTRY_POINT;
use crate::primitives::{PrimitiveDesc, find_primitive};
use crate::{Runtime, RuntimeError, Value};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

#[derive(Debug, Clone)]
pub struct InterpreterSettings {
    pub max_call_depth: usize,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Final state of the entry routine: each named cell and what it held.
#[derive(Debug, Clone, PartialEq)]
pub struct Exit {
    pub locals: Vec<(String, Value)>,
}

impl Exit {
    /// The value of the latest cell named `name`.
    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals
            .iter()
            .rev()
            .find_map(|(n, value)| (n == name).then_some(value))
    }

    fn collect(frame: &Frame<'_>) -> Self {
        let locals = frame
            .function
            .instructions()
            .filter_map(|instruction| match instruction {
                Instruction::Alloca { dst, name, .. } => {
                    let value = frame.cells.get(dst).cloned()?;
                    Some((name.clone(), value))
                }
                _ => None,
            })
            .collect();
        Self { locals }
    }
}

/// Runs generated modules against a [`Runtime`].
pub struct Interpreter {
    runtime: Runtime,
    settings: InterpreterSettings,
}

impl Interpreter {
    pub fn new(runtime: Runtime, settings: InterpreterSettings) -> Self {
        Self { runtime, settings }
    }

    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    #[inline]
    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }

    pub fn into_runtime(self) -> Runtime {
        self.runtime
    }

    /// Invoke the entry routine once to completion.
    pub fn run(&mut self, module: &Module) -> Result<Exit, RuntimeError> {
        let entry = module
            .get_function(ENTRY_POINT)
            .ok_or_else(|| RuntimeError::MissingEntry(ENTRY_POINT.to_owned()))?;
        let mut execution = Execution::link(module, &mut self.runtime, &self.settings)?;
        log::info!("running {}", module.name);
        let (_, frame) = execution.execute(entry, Vec::new())?;
        Ok(Exit::collect(&frame))
    }

    /// Call any function of `module` by name.
    pub fn call(
        &mut self,
        module: &Module,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let id = module
            .get_function(name)
            .ok_or_else(|| RuntimeError::UnknownFunction(name.to_owned()))?;
        let mut execution = Execution::link(module, &mut self.runtime, &self.settings)?;
        execution.invoke(id, args)
    }
}

/// Activation of one function. Calls push a new frame instead of recursing,
/// so call depth is bounded by the settings and not by the native stack.
struct Frame<'m> {
    function: &'m Function,
    instructions: &'m [Instruction],
    pc: usize,
    values: Vec<Value>,
    cells: HashMap<ValueId, Value>,
    args: Vec<Value>,
    /// Where the caller wants the result.
    return_to: Option<ValueId>,
}

impl Frame<'_> {
    fn operand(&self, operand: &Operand) -> Value {
        match operand {
            Operand::Value(id) => self.values[id.index()].clone(),
            Operand::Argument(n) => self.args.get(*n as usize).cloned().unwrap_or(Value::Void),
            Operand::Const(constant) => match constant {
                Constant::Int32(v) => Value::Int(i64::from(*v)),
                Constant::Int64(v) => Value::Int(*v),
                Constant::Double(v) => Value::Double(*v),
                Constant::Null => Value::NULL,
                Constant::Str(s) => Value::Str(s.clone()),
            },
        }
    }

    fn malformed(&self, message: &str) -> RuntimeError {
        RuntimeError::Malformed {
            function: self.function.name.clone(),
            message: message.to_owned(),
        }
    }
}

struct Execution<'a> {
    module: &'a Module,
    runtime: &'a mut Runtime,
    primitives: HashMap<FunctionId, PrimitiveDesc>,
    max_call_depth: usize,
}

impl<'a> Execution<'a> {
    /// Resolve every external function against the primitive table.
    fn link(
        module: &'a Module,
        runtime: &'a mut Runtime,
        settings: &InterpreterSettings,
    ) -> Result<Self, RuntimeError> {
        let mut primitives = HashMap::new();
        for (id, function) in module.functions() {
            if !function.is_declaration() {
                continue;
            }
            let primitive = find_primitive(&function.name)
                .ok_or_else(|| RuntimeError::UnknownPrimitive(function.name.clone()))?;
            log::trace!("linked {} to primitive", function.name);
            primitives.insert(id, primitive);
        }
        Ok(Self {
            module,
            runtime,
            primitives,
            max_call_depth: settings.max_call_depth,
        })
    }

    fn invoke(&mut self, id: FunctionId, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if let Some(primitive) = self.primitives.get(&id).copied() {
            log::trace!("calling primitive {}", primitive.name);
            return (primitive.func)(self.runtime, &args);
        }
        self.execute(id, args).map(|(value, _)| value)
    }

    /// A fresh frame for `id`, which becomes frame number `depth`.
    fn enter(
        &self,
        id: FunctionId,
        args: Vec<Value>,
        return_to: Option<ValueId>,
        depth: usize,
    ) -> Result<Frame<'a>, RuntimeError> {
        if depth >= self.max_call_depth {
            return Err(RuntimeError::StackOverflow(self.max_call_depth));
        }
        let function = self.module.function(id);
        if args.len() != function.signature.params.len() {
            return Err(RuntimeError::ArgumentCount {
                function: function.name.clone(),
                expected: function.signature.params.len(),
                found: args.len(),
            });
        }
        let entry = function.entry().ok_or_else(|| RuntimeError::Malformed {
            function: function.name.clone(),
            message: "no body".to_owned(),
        })?;
        Ok(Frame {
            function,
            instructions: &function.block(entry).instructions,
            pc: 0,
            values: vec![Value::Void; function.value_count()],
            cells: HashMap::new(),
            args,
            return_to,
        })
    }

    /// Run `id` to completion. Returns its result and its final frame.
    fn execute(
        &mut self,
        id: FunctionId,
        args: Vec<Value>,
    ) -> Result<(Value, Frame<'a>), RuntimeError> {
        let mut frame = self.enter(id, args, None, 0)?;
        let mut callers: Vec<Frame<'a>> = Vec::new();
        loop {
            let instructions = frame.instructions;
            let Some(instruction) = instructions.get(frame.pc) else {
                return Err(frame.malformed("block ends without a return"));
            };
            frame.pc += 1;
            match instruction {
                Instruction::Alloca { dst, ty, .. } => {
                    frame.cells.insert(*dst, Value::zero(*ty));
                }
                Instruction::Load { dst, cell } => {
                    let value = match frame.cells.get(cell) {
                        Some(value) => value.clone(),
                        None => return Err(frame.malformed("load from a non-cell")),
                    };
                    frame.values[dst.index()] = value;
                }
                Instruction::Store { cell, value } => {
                    let value = frame.operand(value);
                    match frame.cells.get_mut(cell) {
                        Some(slot) => *slot = value,
                        None => return Err(frame.malformed("store to a non-cell")),
                    }
                }
                Instruction::Binary { dst, op, lhs, rhs } => {
                    let lhs = frame.operand(lhs);
                    let rhs = frame.operand(rhs);
                    frame.values[dst.index()] =
                        arithmetic(&self.runtime.heap, *op, &lhs, &rhs)?;
                }
                Instruction::BoxValue { dst, value } => {
                    let value = frame.operand(value);
                    frame.values[dst.index()] = self.runtime.box_value(&value)?;
                }
                Instruction::Convert { dst, value, to } => {
                    let value = frame.operand(value);
                    frame.values[dst.index()] = convert(&self.runtime.heap, &value, *to)?;
                }
                Instruction::Call { dst, callee, args } => {
                    let target = match callee {
                        Callee::Function(target) => *target,
                        Callee::Unresolved(name) => {
                            return Err(RuntimeError::UnresolvedCall(name.clone()));
                        }
                    };
                    let args: Vec<Value> = args.iter().map(|arg| frame.operand(arg)).collect();
                    if let Some(primitive) = self.primitives.get(&target).copied() {
                        log::trace!("calling primitive {}", primitive.name);
                        frame.values[dst.index()] = (primitive.func)(self.runtime, &args)?;
                    } else {
                        let callee = self.enter(target, args, Some(*dst), callers.len() + 1)?;
                        callers.push(std::mem::replace(&mut frame, callee));
                    }
                }
                Instruction::Return { value } => {
                    let value = value
                        .as_ref()
                        .map_or(Value::Void, |value| frame.operand(value));
                    let Some(caller) = callers.pop() else {
                        return Ok((value, frame));
                    };
                    let done = std::mem::replace(&mut frame, caller);
                    if let Some(dst) = done.return_to {
                        frame.values[dst.index()] = value;
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Double(f64),
}

impl Number {
    fn to_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Double(v) => v,
        }
    }
}

fn number(heap: &Heap, value: &Value) -> Result<Number, RuntimeError> {
    match value {
        Value::Int(v) => Ok(Number::Int(*v)),
        Value::Double(v) => Ok(Number::Double(*v)),
        Value::Object(Some(obj)) => {
            let object = heap.get(*obj)?;
            if let Some(v) = object.as_integer() {
                Ok(Number::Int(v))
            } else if let Some(v) = object.as_double() {
                Ok(Number::Double(v))
            } else {
                Err(RuntimeError::TypeError {
                    expected: "number",
                    got: value.type_name(),
                })
            }
        }
        other => Err(RuntimeError::TypeError {
            expected: "number",
            got: other.type_name(),
        }),
    }
}

/// Integer arithmetic is checked; either side being a double makes the
/// operation a double one. Boxed numbers are unboxed first.
fn arithmetic(
    heap: &Heap,
    op: BinOp,
    lhs: &Value,
    rhs: &Value,
) -> Result<Value, RuntimeError> {
    match (number(heap, lhs)?, number(heap, rhs)?) {
        (Number::Int(a), Number::Int(b)) => {
            let result = match op {
                BinOp::Add => a.checked_add(b),
                BinOp::Sub => a.checked_sub(b),
                BinOp::Mul => a.checked_mul(b),
                BinOp::Div if b == 0 => return Err(RuntimeError::DivisionByZero),
                BinOp::Div => a.checked_div(b),
            };
            result.map(Value::Int).ok_or(RuntimeError::IntegerOverflow)
        }
        (a, b) => {
            let (a, b) = (a.to_f64(), b.to_f64());
            Ok(Value::Double(match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
            }))
        }
    }
}

/// Integer to another numeric type. Narrowing to 32 bits must fit.
fn convert(heap: &Heap, value: &Value, to: Type) -> Result<Value, RuntimeError> {
    match (number(heap, value)?, to) {
        (Number::Int(v), Type::Int32) => i32::try_from(v)
            .map(|v| Value::Int(i64::from(v)))
            .map_err(|_| RuntimeError::IntegerOverflow),
        (Number::Int(v), Type::Int64) => Ok(Value::Int(v)),
        (number, Type::Double) => Ok(Value::Double(number.to_f64())),
        _ => Err(RuntimeError::TypeError {
            expected: "integer",
            got: value.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Runtime, RuntimeCreateInfo, compile_source};

    fn run_source(source: &str, settings: InterpreterSettings) -> Result<Exit, RuntimeError> {
        let compiled = compile_source("test", source).unwrap();
        let runtime = Runtime::with_output(RuntimeCreateInfo::default(), Box::new(std::io::sink()));
        Interpreter::new(runtime, settings).run(&compiled.module)
    }

    #[test]
    fn unbounded_recursion_stops_at_the_default_depth() {
        let err = run_source("int f(int n) { f(n) }\nf(1)", InterpreterSettings::default())
            .unwrap_err();
        assert_eq!(err, RuntimeError::StackOverflow(DEFAULT_MAX_CALL_DEPTH));
    }

    #[test]
    fn deep_call_limits_do_not_use_the_native_stack() {
        let settings = InterpreterSettings { max_call_depth: 200_000 };
        let err = run_source("int f(int n) { f(n + 1) }\nf(0)", settings).unwrap_err();
        assert_eq!(err, RuntimeError::StackOverflow(200_000));
    }

    #[test]
    fn nested_calls_return_into_the_caller() {
        let source = "int inc(int n) { n + 1 }\nint twice(int n) { inc(inc(n)) }\nr = twice(40)";
        let exit = run_source(source, InterpreterSettings::default()).unwrap();
        assert_eq!(exit.local("r"), Some(&Value::Int(42)));
    }

    #[test]
    fn zero_depth_refuses_the_entry_routine() {
        let settings = InterpreterSettings { max_call_depth: 0 };
        assert_eq!(run_source("x = 1", settings), Err(RuntimeError::StackOverflow(0)));
    }

    #[test]
    fn conversions_check_the_range() {
        let heap = Heap::default();
        assert_eq!(convert(&heap, &Value::Int(7), Type::Int32), Ok(Value::Int(7)));
        assert_eq!(
            convert(&heap, &Value::Int(1 << 32), Type::Int32),
            Err(RuntimeError::IntegerOverflow)
        );
        assert_eq!(convert(&heap, &Value::Int(2), Type::Double), Ok(Value::Double(2.0)));
        assert!(matches!(
            convert(&heap, &Value::Double(2.5), Type::Int64),
            Err(RuntimeError::TypeError { expected: "integer", .. })
        ));
    }

    #[test]
    fn integer_arithmetic_is_checked() {
        let heap = Heap::default();
        let add = arithmetic(&heap, BinOp::Add, &Value::Int(5), &Value::Int(3));
        assert_eq!(add, Ok(Value::Int(8)));
        assert_eq!(
            arithmetic(&heap, BinOp::Mul, &Value::Int(i64::MAX), &Value::Int(2)),
            Err(RuntimeError::IntegerOverflow)
        );
        assert_eq!(
            arithmetic(&heap, BinOp::Div, &Value::Int(1), &Value::Int(0)),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(
            arithmetic(&heap, BinOp::Div, &Value::Int(i64::MIN), &Value::Int(-1)),
            Err(RuntimeError::IntegerOverflow)
        );
    }

    #[test]
    fn mixed_arithmetic_promotes() {
        let heap = Heap::default();
        let result = arithmetic(&heap, BinOp::Div, &Value::Int(1), &Value::Double(4.0));
        assert_eq!(result, Ok(Value::Double(0.25)));
    }

    #[test]
    fn boxed_numbers_are_unboxed() {
        let mut heap = Heap::default();
        let boxed = heap.allocate_integer(None, 40).unwrap();
        let result = arithmetic(&heap, BinOp::Add, &boxed.into(), &Value::Int(2));
        assert_eq!(result, Ok(Value::Int(42)));
    }

    #[test]
    fn plain_objects_are_not_numbers() {
        let mut heap = Heap::default();
        let obj = heap.allocate(None).unwrap();
        let err = arithmetic(&heap, BinOp::Add, &obj.into(), &Value::Int(2)).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::TypeError {
                expected: "number",
                got: "object"
            }
        );
        let err = arithmetic(&heap, BinOp::Add, &Value::NULL, &Value::Int(2)).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError { got: "null", .. }));
    }

    #[test]
    fn exit_reports_the_latest_binding() {
        let exit = Exit {
            locals: vec![("x".into(), Value::Int(1)), ("x".into(), Value::Int(2))],
        };
        assert_eq!(exit.local("x"), Some(&Value::Int(2)));
        assert_eq!(exit.local("y"), None);
    }
}
