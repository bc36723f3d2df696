use std::collections::HashSet;

use crate::{Callee, Function, Instruction, Module, Operand, Type, ValueId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    #[error("function {0} is already declared")]
    DuplicateFunction(String),
    #[error("{function}: call to undeclared function {callee}")]
    UnresolvedCall { function: String, callee: String },
    #[error("{function}: {callee} expects {expected} arguments, got {found}")]
    ArgumentCount {
        function: String,
        callee: String,
        expected: usize,
        found: usize,
    },
    #[error("{function}: block {block} does not end with a return")]
    MissingTerminator { function: String, block: String },
    #[error("{function}: instructions after return in block {block}")]
    UnreachableInstruction { function: String, block: String },
    #[error("{function}: use of undefined value %{}", .value.0)]
    UndefinedValue { function: String, value: ValueId },
    #[error("{function}: %{} is not a storage cell", .value.0)]
    NotACell { function: String, value: ValueId },
    #[error("{function}: argument {index} out of range")]
    ArgumentOutOfRange { function: String, index: u16 },
    #[error("{function}: return does not match the declared {expected} result")]
    ReturnMismatch { function: String, expected: Type },
    #[error("{function}: expected {expected}, found {found}")]
    TypeMismatch {
        function: String,
        expected: Type,
        found: Type,
    },
    #[error("{function}: constant {value} does not fit in {ty}")]
    ConstantOutOfRange { function: String, value: i64, ty: Type },
}

/// Objects are checked when they are used, so they fit anywhere.
fn compatible(from: Type, to: Type) -> bool {
    from == to || from == Type::Object
}

impl Module {
    /// Check that every defined function is well formed.
    pub fn verify(&self) -> Result<(), IrError> {
        for (_, function) in self.functions() {
            if !function.is_declaration() {
                verify_function(self, function)?;
            }
        }
        Ok(())
    }
}

fn verify_function(module: &Module, function: &Function) -> Result<(), IrError> {
    let name = || function.name.clone();
    let mismatch = |expected: Type, operand: &Operand| {
        let found = function.operand_type(operand);
        if compatible(found, expected) {
            Ok(())
        } else {
            Err(IrError::TypeMismatch {
                function: name(),
                expected,
                found,
            })
        }
    };
    let mut defined: HashSet<ValueId> = HashSet::new();
    let mut cells: HashSet<ValueId> = HashSet::new();

    for block in &function.blocks {
        let Some((last, body)) = block.instructions.split_last() else {
            return Err(IrError::MissingTerminator {
                function: name(),
                block: block.label.clone(),
            });
        };
        if !last.is_terminator() {
            return Err(IrError::MissingTerminator {
                function: name(),
                block: block.label.clone(),
            });
        }
        if body.iter().any(Instruction::is_terminator) {
            return Err(IrError::UnreachableInstruction {
                function: name(),
                block: block.label.clone(),
            });
        }

        for instruction in &block.instructions {
            for operand in instruction.operands() {
                match operand {
                    Operand::Value(id) if !defined.contains(id) => {
                        return Err(IrError::UndefinedValue {
                            function: name(),
                            value: *id,
                        });
                    }
                    Operand::Argument(index)
                        if *index as usize >= function.signature.params.len() =>
                    {
                        return Err(IrError::ArgumentOutOfRange {
                            function: name(),
                            index: *index,
                        });
                    }
                    _ => {}
                }
            }

            match instruction {
                Instruction::Alloca { dst, .. } => {
                    cells.insert(*dst);
                }
                Instruction::Load { cell, .. } => {
                    if !cells.contains(cell) {
                        return Err(IrError::NotACell {
                            function: name(),
                            value: *cell,
                        });
                    }
                }
                Instruction::Store { cell, value } => {
                    if !cells.contains(cell) {
                        return Err(IrError::NotACell {
                            function: name(),
                            value: *cell,
                        });
                    }
                    let ty = function.value_type(*cell).unwrap_or(Type::Void);
                    mismatch(ty, value)?;
                }
                Instruction::Call { callee, args, .. } => match callee {
                    Callee::Unresolved(callee) => {
                        return Err(IrError::UnresolvedCall {
                            function: name(),
                            callee: callee.clone(),
                        });
                    }
                    Callee::Function(id) => {
                        let target = module.function(*id);
                        let expected = target.signature.params.len();
                        if args.len() != expected {
                            return Err(IrError::ArgumentCount {
                                function: name(),
                                callee: target.name.clone(),
                                expected,
                                found: args.len(),
                            });
                        }
                        for (&ty, arg) in target.signature.params.iter().zip(args) {
                            mismatch(ty, arg)?;
                        }
                    }
                },
                Instruction::Return { value } => {
                    let expected = function.signature.ret;
                    if value.is_some() != (expected != Type::Void) {
                        return Err(IrError::ReturnMismatch {
                            function: name(),
                            expected,
                        });
                    }
                    if let Some(value) = value {
                        mismatch(expected, value)?;
                    }
                }
                Instruction::Convert { value, to, .. } => {
                    let found = function.operand_type(value);
                    if !matches!(found, Type::Int32 | Type::Int64)
                        || !to.is_numeric()
                    {
                        return Err(IrError::TypeMismatch {
                            function: name(),
                            expected: *to,
                            found,
                        });
                    }
                }
                Instruction::Binary { .. } | Instruction::BoxValue { .. } => {}
            }

            if let Some(dst) = instruction.result() {
                defined.insert(dst);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Constant, InsertPoint, Signature};

    fn main_module() -> (Module, InsertPoint) {
        let mut module = Module::new("test");
        let (main, entry) = module
            .add_function("main", Signature::new(vec![], Type::Void))
            .unwrap();
        (module, InsertPoint::new(main, entry))
    }

    #[test]
    fn well_formed_module_verifies() {
        let (mut module, at) = main_module();
        let mut b = module.builder(at);
        let cell = b.alloca(Type::Int64, "x");
        b.store(cell, Constant::Int64(1).into());
        let x = b.load(cell);
        b.binary(crate::BinOp::Add, x, Constant::Int64(2).into());
        b.ret(None);
        assert_eq!(module.verify(), Ok(()));
    }

    #[test]
    fn missing_return_is_rejected() {
        let (mut module, at) = main_module();
        module.builder(at).alloca(Type::Object, "o");
        assert!(matches!(
            module.verify(),
            Err(IrError::MissingTerminator { .. })
        ));
    }

    #[test]
    fn unresolved_call_is_rejected() {
        let (mut module, at) = main_module();
        let mut b = module.builder(at);
        b.call(Callee::Unresolved("nope".into()), vec![]).unwrap();
        b.ret(None);
        assert_eq!(
            module.verify(),
            Err(IrError::UnresolvedCall {
                function: "main".into(),
                callee: "nope".into(),
            })
        );
    }

    #[test]
    fn argument_count_is_checked() {
        let (mut module, at) = main_module();
        let newobj = module
            .add_external_function(
                "newobj",
                Signature::new(vec![Type::Object], Type::Object),
            )
            .unwrap();
        let mut b = module.builder(at);
        b.call(Callee::Function(newobj), vec![]).unwrap();
        b.ret(None);
        assert!(matches!(
            module.verify(),
            Err(IrError::ArgumentCount { expected: 1, found: 0, .. })
        ));
    }

    #[test]
    fn store_into_non_cell_is_rejected() {
        let (mut module, at) = main_module();
        let mut b = module.builder(at);
        let boxed = b.box_value(Constant::Int64(1).into());
        b.store(boxed.as_value().unwrap(), Operand::null());
        b.ret(None);
        assert!(matches!(module.verify(), Err(IrError::NotACell { .. })));
    }

    #[test]
    fn return_value_must_match_signature() {
        let mut module = Module::new("test");
        let (f, entry) = module
            .add_function("f", Signature::new(vec![Type::Int64], Type::Int64))
            .unwrap();
        module.builder(InsertPoint::new(f, entry)).ret(None);
        assert!(matches!(
            module.verify(),
            Err(IrError::ReturnMismatch { expected: Type::Int64, .. })
        ));
    }

    #[test]
    fn store_must_match_the_cell_type() {
        let (mut module, at) = main_module();
        let mut b = module.builder(at);
        let cell = b.alloca(Type::Int64, "x");
        b.store(cell, Constant::Double(2.5).into());
        b.ret(None);
        assert_eq!(
            module.verify(),
            Err(IrError::TypeMismatch {
                function: "main".into(),
                expected: Type::Int64,
                found: Type::Double,
            })
        );
    }

    #[test]
    fn objects_may_be_stored_anywhere() {
        let (mut module, at) = main_module();
        let mut b = module.builder(at);
        let cell = b.alloca(Type::Double, "d");
        b.store(cell, Operand::null());
        b.ret(None);
        assert_eq!(module.verify(), Ok(()));
    }

    #[test]
    fn convert_takes_an_integer() {
        let (mut module, at) = main_module();
        let mut b = module.builder(at);
        b.convert(Constant::Double(1.0).into(), Type::Int32);
        b.ret(None);
        assert!(matches!(
            module.verify(),
            Err(IrError::TypeMismatch { expected: Type::Int32, found: Type::Double, .. })
        ));
    }
}
