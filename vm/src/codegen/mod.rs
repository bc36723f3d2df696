//! Translation of a parsed program into an [`ir::Module`].
//!
//! [`CodeGenContext`] owns the module under construction and the
//! [`ScopeStack`]. Every runtime primitive is declared up front so calls to
//! `getSlot`/`putSlot`/`allocate` can be emitted by id.

use std::fmt;

use ir::{FunctionId, InsertPoint, IrError, Module, Signature, Type};
use parser::{Block, Span};

use crate::CodegenError;
use crate::primitives::{self, ALLOCATE, GET_SLOT, PUT_SLOT};
use crate::scope::ScopeStack;

mod resolve;
mod translate;
pub mod types;

/// Name of the routine the harness invokes.
pub const ENTRY_POINT: &str = "main";

/// Spelling of the null reference in source.
pub const NULL_NAME: &str = "null";

/// A non-fatal problem found during translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.message)
    }
}

#[derive(Debug, Clone, Copy)]
struct RuntimeDecls {
    allocate: FunctionId,
    get_slot: FunctionId,
    put_slot: FunctionId,
}

pub struct CodeGenContext {
    module: Module,
    scopes: ScopeStack,
    runtime: RuntimeDecls,
    diagnostics: Vec<Diagnostic>,
}

impl CodeGenContext {
    /// Start a module with every runtime primitive declared.
    pub fn new(name: &str) -> Result<Self, CodegenError> {
        let mut module = Module::new(name);
        let runtime = declare_primitives(&mut module)?;
        Ok(Self {
            module,
            scopes: ScopeStack::new(),
            runtime,
            diagnostics: Vec::new(),
        })
    }

    /// Translate `root` as the body of the entry routine and verify the
    /// resulting module.
    pub fn generate_code(&mut self, root: &Block) -> Result<(), CodegenError> {
        log::info!("generating code");
        let (main, entry) = self
            .module
            .add_function(ENTRY_POINT, Signature::new(Vec::new(), Type::Void))?;
        self.scopes.push(InsertPoint::new(main, entry));
        let result = self.gen_block(root).and_then(|_| {
            self.builder()?.ret(None);
            Ok(())
        });
        self.scopes.pop();
        result?;

        self.module.verify()?;
        log::info!("code is generated");
        Ok(())
    }

    #[inline]
    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn into_module(self) -> Module {
        self.module
    }

    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn builder(&mut self) -> Result<ir::Builder<'_>, CodegenError> {
        let at = self.scopes.insert_point()?;
        Ok(self.module.builder(at))
    }
}

fn declare_primitives(module: &mut Module) -> Result<RuntimeDecls, IrError> {
    for primitive in primitives::default_primitives() {
        module.add_external_function(primitive.name, primitive.signature())?;
    }
    let find = |name: &str| {
        module
            .get_function(name)
            .ok_or_else(|| IrError::DuplicateFunction(name.to_owned()))
    };
    Ok(RuntimeDecls {
        allocate: find(ALLOCATE)?,
        get_slot: find(GET_SLOT)?,
        put_slot: find(PUT_SLOT)?,
    })
}
