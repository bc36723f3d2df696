//! # IR
//!
//! A small typed instruction set that the translator emits into.
//!
//! A [`Module`] holds functions looked up by exact name. External functions
//! (the runtime primitives) are declarations without a body; internal
//! functions own basic blocks. A [`Builder`] appends instructions to the
//! block named by an [`InsertPoint`] and tracks the type of every value it
//! creates.
//!
//! ```rust
//! use ir::{Constant, Linkage, Module, Operand, Signature, Type};
//!
//! let mut module = Module::new("main");
//! let (main, entry) = module.add_function("main", Signature::new(vec![], Type::Void)).unwrap();
//! let mut b = module.builder(ir::InsertPoint::new(main, entry));
//! let cell = b.alloca(Type::Int64, "x");
//! b.store(cell, Operand::Const(Constant::Int64(5)));
//! b.ret(None);
//! assert!(module.verify().is_ok());
//! assert_eq!(module.function(main).linkage, Linkage::Internal);
//! ```

mod builder;
mod display;
mod instruction;
mod module;
mod types;
mod verify;

pub use builder::{Builder, InsertPoint};
pub use instruction::{BinOp, Callee, Instruction};
pub use module::{BasicBlock, Function, Linkage, Module, Signature};
pub use types::{BlockId, Constant, FunctionId, Operand, Type, ValueId};
pub use verify::IrError;
