use ir::{Callee, Constant, Operand};
use parser::Reference;

use super::CodeGenContext;
use crate::CodegenError;

impl CodeGenContext {
    /// Walk a dotted chain with `getSlot(.., 1)` lookups.
    ///
    /// With `ignore_last` the final name is not looked up and the value of
    /// the penultimate link is returned, which is the container an
    /// assignment writes into.
    pub(crate) fn resolve_reference(
        &mut self,
        reference: &Reference,
        ignore_last: bool,
    ) -> Result<Operand, CodegenError> {
        let mut current = self.gen_identifier(reference.first())?;
        let rest = reference.rest();
        for (i, segment) in rest.iter().enumerate() {
            if ignore_last && i + 1 == rest.len() {
                break;
            }
            log::debug!("next ident {}", segment.name);
            let get_slot = self.runtime.get_slot;
            current = self.builder()?.call(
                Callee::Function(get_slot),
                vec![
                    current,
                    Constant::Str(segment.name.as_str().into()).into(),
                    Constant::Int32(1).into(),
                ],
            )?;
        }
        Ok(current)
    }
}
