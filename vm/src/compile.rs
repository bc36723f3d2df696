use ir::Module;

use crate::codegen::{CodeGenContext, Diagnostic};
use crate::CompileError;

/// A verified module and whatever was reported while producing it.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub module: Module,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse `source` and generate the module named `name`.
pub fn compile_source(name: &str, source: &str) -> Result<Compiled, CompileError> {
    let root = parser::parse_program(source)?;
    log::debug!("parsed {} top-level statements", root.statements.len());
    let mut ctx = CodeGenContext::new(name)?;
    if let Err(err) = ctx.generate_code(&root) {
        for diagnostic in ctx.diagnostics() {
            log::warn!("{diagnostic}");
        }
        return Err(err.into());
    }
    let diagnostics = ctx.diagnostics().to_vec();
    Ok(Compiled {
        module: ctx.into_module(),
        diagnostics,
    })
}
