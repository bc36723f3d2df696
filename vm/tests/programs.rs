use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::Arc;

use ir::IrError;
use object::ObjectRef;
use vm::{
    CodegenError, CompileError, Exit, Interpreter, InterpreterSettings, Runtime,
    RuntimeCreateInfo, RuntimeError, Value,
};

#[derive(Clone, Default)]
struct Output(Rc<RefCell<Vec<u8>>>);

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Output {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

struct Run {
    exit: Exit,
    interpreter: Interpreter,
    module: ir::Module,
}

impl Run {
    fn local(&self, name: &str) -> &Value {
        self.exit
            .local(name)
            .unwrap_or_else(|| panic!("no local {name}"))
    }

    fn object(&self, name: &str) -> ObjectRef {
        self.local(name).as_object().unwrap().expect("non-null")
    }

    fn slots(&self, name: &str) -> Vec<String> {
        let heap = &self.interpreter.runtime().heap;
        heap.own_slot_names(self.object(name))
            .unwrap()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

fn run_with(source: &str, settings: InterpreterSettings, output: Output) -> Result<Run, RuntimeError> {
    let compiled = vm::compile_source("test", source).unwrap();
    let runtime = Runtime::with_output(RuntimeCreateInfo::default(), Box::new(output));
    let mut interpreter = Interpreter::new(runtime, settings);
    let exit = interpreter.run(&compiled.module)?;
    Ok(Run {
        exit,
        interpreter,
        module: compiled.module,
    })
}

fn run(source: &str) -> Run {
    run_with(source, InterpreterSettings::default(), Output::default()).unwrap()
}

fn str_value(s: &str) -> Value {
    Value::Str(Arc::from(s))
}

#[test]
fn integer_assignment_and_addition() {
    let run = run("x = 5; y = x + 3");
    assert_eq!(run.local("x"), &Value::Int(5));
    assert_eq!(run.local("y"), &Value::Int(8));
}

#[test]
fn null_prototype_lookup_is_null() {
    let mut run = run("p = null; o = newobj(p); r = o.anything");
    assert_eq!(run.local("p"), &Value::NULL);
    assert_eq!(run.local("r"), &Value::NULL);

    let o = run.local("o").clone();
    let heap = &run.interpreter.runtime().heap;
    assert_eq!(heap.prototype_of(o.as_object().unwrap().unwrap()), Ok(None));

    let looked_up = run
        .interpreter
        .call(&run.module, "getSlot", vec![o, str_value("anything"), Value::Int(1)])
        .unwrap();
    assert_eq!(looked_up, Value::NULL);
}

const CHAIN: &str = r#"
root = newobj(null)
root.greet = "hello"
mid = newobj(root)
leaf = newobj(mid)
found = getSlot(leaf, "greet", 1)
own = getSlot(leaf, "greet", 0)
dotted = leaf.greet
"#;

#[test]
fn delegation_through_three_levels() {
    let run = run(CHAIN);
    let heap = &run.interpreter.runtime().heap;
    let found = run.object("found");
    assert_eq!(heap.get(found).unwrap().as_str(), Some("hello"));
    assert_eq!(run.local("own"), &Value::NULL);
    assert_eq!(run.local("dotted"), run.local("found"));
}

#[test]
fn closest_ancestor_wins() {
    let source = format!("{CHAIN}\nmid.greet = 7\nafter = leaf.greet\nstill = root.greet");
    let run = run(&source);
    let heap = &run.interpreter.runtime().heap;
    assert_eq!(heap.get(run.object("after")).unwrap().as_integer(), Some(7));
    assert_eq!(heap.get(run.object("still")).unwrap().as_str(), Some("hello"));
    assert!(run.slots("leaf").is_empty());
}

#[test]
fn chain_assignment_writes_only_the_container() {
    let run = run("a.b = newobj(null)\na.b.c = 1\nb = a.b");
    assert_eq!(run.slots("a"), ["b"]);
    assert_eq!(run.slots("b"), ["c"]);
}

#[test]
fn first_reference_allocates_exactly_once() {
    let run = run("x; x");
    assert_eq!(run.interpreter.runtime().heap.len(), 1);
    assert!(run.slots("x").is_empty());
}

#[test]
fn parameters_receive_arguments() {
    let run = run("int add(int a, int b) { a + b }\nr = add(2, 40)");
    assert_eq!(run.local("r"), &Value::Int(42));
}

#[test]
fn object_parameters() {
    let run = run(
        "object make(object proto) { newobj(proto) }
         base = newobj(null)
         base.kind = 1
         child = make(base)
         k = child.kind",
    );
    let heap = &run.interpreter.runtime().heap;
    assert_eq!(heap.get(run.object("k")).unwrap().as_integer(), Some(1));
    assert!(run.slots("child").is_empty());
}

#[test]
fn boxed_slot_values_take_part_in_arithmetic() {
    let run = run("o = newobj(null); o.n = 40; r = o.n + 2");
    assert_eq!(run.local("r"), &Value::Int(42));
}

#[test]
fn doubles_and_strings() {
    let run = run("d = 1.5; e = d * 2; s = \"hi\"");
    assert_eq!(run.local("e"), &Value::Double(3.0));
    assert_eq!(run.local("s"), &str_value("hi"));
}

#[test]
fn declared_variables_start_at_zero() {
    let run = run("int x\ny = x + 1\ndouble z = 2");
    assert_eq!(run.local("y"), &Value::Int(1));
    assert_eq!(run.local("z"), &Value::Double(2.0));
}

#[test]
fn echo_prints_lines() {
    let output = Output::default();
    run_with("x = 6; echo(x * 7); echo(1)", InterpreterSettings::default(), output.clone()).unwrap();
    assert_eq!(output.text(), "42\n1\n");
}

#[test]
fn runaway_recursion_overflows() {
    let settings = InterpreterSettings { max_call_depth: 16 };
    let err = run_with("int f(int n) { f(n) }\nf(1)", settings, Output::default())
        .err()
        .unwrap();
    assert_eq!(err, RuntimeError::StackOverflow(16));
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let err = run_with("x = 0; y = 1 / x", InterpreterSettings::default(), Output::default())
        .err()
        .unwrap();
    assert_eq!(err, RuntimeError::DivisionByZero);
}

#[test]
fn writing_through_null_fails() {
    let err = run_with("p = null; p.x = 1", InterpreterSettings::default(), Output::default())
        .err()
        .unwrap();
    assert_eq!(err, RuntimeError::NullReceiver("x".into()));
}

#[test]
fn unresolved_calls_fail_compilation() {
    let err = vm::compile_source("test", "x = nope(1)").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Codegen(CodegenError::Ir(IrError::UnresolvedCall { callee, .. })) if callee == "nope"
    ));
}

#[test]
fn comparisons_and_unknown_types_are_rejected() {
    assert!(matches!(
        vm::compile_source("test", "b = 1 >= 2").unwrap_err(),
        CompileError::Codegen(CodegenError::UnsupportedOperator { .. })
    ));
    assert!(matches!(
        vm::compile_source("test", "string s").unwrap_err(),
        CompileError::Codegen(CodegenError::UnknownType { .. })
    ));
}

#[test]
fn recursion_overflows_at_the_default_depth() {
    let err = run_with("int f(int n) { f(n) }\nf(1)", InterpreterSettings::default(), Output::default())
        .err()
        .unwrap();
    assert_eq!(err, RuntimeError::StackOverflow(1024));
}

#[test]
fn integers_stored_into_doubles_are_converted() {
    let run = run("double d = 1\ni = 2\nd = i");
    assert_eq!(run.local("d"), &Value::Double(2.0));
}

#[test]
fn doubles_do_not_fit_integer_variables() {
    assert!(matches!(
        vm::compile_source("test", "int x = 1\nx = 2.5").unwrap_err(),
        CompileError::Codegen(CodegenError::TypeMismatch { name, .. }) if name == "x"
    ));
}

#[test]
fn oversized_follow_chain_is_a_compile_error() {
    let source = format!("{CHAIN}\nbad = getSlot(leaf, \"g\", 4294967296)");
    assert!(matches!(
        vm::compile_source("test", &source).unwrap_err(),
        CompileError::Codegen(CodegenError::Ir(IrError::ConstantOutOfRange { value: 4294967296, .. }))
    ));
}

#[test]
fn follow_chain_from_a_variable_is_range_checked() {
    let err = run_with(
        &format!("{CHAIN}\nn = 4294967296\nbad = getSlot(leaf, \"greet\", n)"),
        InterpreterSettings::default(),
        Output::default(),
    )
    .err()
    .unwrap();
    assert_eq!(err, RuntimeError::IntegerOverflow);

    let run = run(&format!("{CHAIN}\nn = 0\nmiss = getSlot(leaf, \"greet\", n)"));
    assert_eq!(run.local("miss"), &Value::NULL);
}

#[test]
fn names_on_their_own_lines_are_separate_statements() {
    let run = run("p\no = newobj(p)");
    assert_eq!(run.interpreter.runtime().heap.len(), 2);
    let heap = &run.interpreter.runtime().heap;
    assert_eq!(heap.prototype_of(run.object("o")), Ok(Some(run.object("p"))));
}
