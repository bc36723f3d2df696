//! # VM
//!
//! Translation of parsed programs into [`ir::Module`]s backed by the
//! prototype object runtime, and an interpreter that runs them.
//!
//! ```text
//!  source ──parser──▶ ast::Block ──CodeGenContext──▶ ir::Module ──Interpreter──▶ Exit
//!                                       │                              │
//!                                  ScopeStack                   Runtime { heap }
//! ```
//!
//! ```rust
//! use vm::{Interpreter, InterpreterSettings, Runtime, RuntimeCreateInfo, Value};
//!
//! let compiled = vm::compile_source("demo", "x = 5; y = x + 3").unwrap();
//! let runtime = Runtime::new(RuntimeCreateInfo::default());
//! let mut interpreter = Interpreter::new(runtime, InterpreterSettings::default());
//! let exit = interpreter.run(&compiled.module).unwrap();
//! assert_eq!(exit.local("y"), Some(&Value::Int(8)));
//! ```

pub mod codegen;
pub mod compile;
pub mod error;
pub mod interpreter;
pub mod primitives;
pub mod runtime;
pub mod scope;
pub mod value;

pub use codegen::{CodeGenContext, Diagnostic};
pub use compile::{Compiled, compile_source};
pub use error::{CodegenError, CompileError, RuntimeError};
pub use interpreter::{Exit, Interpreter, InterpreterSettings};
pub use runtime::{Runtime, RuntimeCreateInfo};
pub use value::Value;
