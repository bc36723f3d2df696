use crate::{
    BinOp, BlockId, Callee, Constant, FunctionId, Instruction, IrError, Module,
    Operand, Type, ValueId,
};

/// Where emitted instructions go: the end of `block` in `function`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertPoint {
    pub function: FunctionId,
    pub block: BlockId,
}

impl InsertPoint {
    pub fn new(function: FunctionId, block: BlockId) -> Self {
        Self { function, block }
    }
}

/// Appends instructions at an [`InsertPoint`].
pub struct Builder<'m> {
    module: &'m mut Module,
    at: InsertPoint,
}

impl<'m> Builder<'m> {
    pub(crate) fn new(module: &'m mut Module, at: InsertPoint) -> Self {
        Self { module, at }
    }

    #[inline]
    pub fn insert_point(&self) -> InsertPoint {
        self.at
    }

    pub fn type_of(&self, operand: &Operand) -> Type {
        self.module.function(self.at.function).operand_type(operand)
    }

    fn function_name(&self) -> String {
        self.module.function(self.at.function).name.clone()
    }

    fn fresh(&mut self, ty: Type) -> ValueId {
        self.module.function_mut(self.at.function).new_value(ty)
    }

    fn push(&mut self, instruction: Instruction) {
        log::trace!("emit {instruction:?}");
        self.module
            .function_mut(self.at.function)
            .block_mut(self.at.block)
            .instructions
            .push(instruction);
    }

    /// A storage cell; loading from it yields a value of type `ty`.
    pub fn alloca(&mut self, ty: Type, name: &str) -> ValueId {
        let dst = self.fresh(ty);
        self.push(Instruction::Alloca {
            dst,
            ty,
            name: name.to_owned(),
        });
        dst
    }

    pub fn load(&mut self, cell: ValueId) -> Operand {
        let ty = self
            .module
            .function(self.at.function)
            .value_type(cell)
            .unwrap_or(Type::Void);
        let dst = self.fresh(ty);
        self.push(Instruction::Load { dst, cell });
        dst.into()
    }

    pub fn store(&mut self, cell: ValueId, value: Operand) {
        self.push(Instruction::Store { cell, value });
    }

    /// Integer arithmetic unless either side is a double.
    pub fn binary(&mut self, op: BinOp, lhs: Operand, rhs: Operand) -> Operand {
        let ty = if self.type_of(&lhs) == Type::Double
            || self.type_of(&rhs) == Type::Double
        {
            Type::Double
        } else {
            Type::Int64
        };
        let dst = self.fresh(ty);
        self.push(Instruction::Binary { dst, op, lhs, rhs });
        dst.into()
    }

    pub fn box_value(&mut self, value: Operand) -> Operand {
        let dst = self.fresh(Type::Object);
        self.push(Instruction::BoxValue { dst, value });
        dst.into()
    }

    /// Integer `value` as a `to`; narrowing is checked when it runs.
    pub fn convert(&mut self, value: Operand, to: Type) -> Operand {
        let dst = self.fresh(to);
        self.push(Instruction::Convert { dst, value, to });
        dst.into()
    }

    /// Convert `value` for a destination expecting `to`.
    ///
    /// Scalars headed for an object position are boxed. Integer constants
    /// are narrowed or widened in place and must fit; other integers get a
    /// [`Instruction::Convert`]. Objects pass through and are checked when
    /// they are used.
    pub fn coerce(&mut self, value: Operand, to: Type) -> Result<Operand, IrError> {
        let from = self.type_of(&value);
        if from == to {
            return Ok(value);
        }
        match (value, to) {
            (Operand::Const(Constant::Int64(v)), Type::Int32) => i32::try_from(v)
                .map(|v| Operand::Const(Constant::Int32(v)))
                .map_err(|_| IrError::ConstantOutOfRange {
                    function: self.function_name(),
                    value: v,
                    ty: to,
                }),
            (Operand::Const(Constant::Int64(v)), Type::Double) => {
                Ok(Operand::Const(Constant::Double(v as f64)))
            }
            (value, Type::Object) if from.is_numeric() || from == Type::CStr => {
                Ok(self.box_value(value))
            }
            (value, Type::Int32 | Type::Int64 | Type::Double)
                if matches!(from, Type::Int32 | Type::Int64) =>
            {
                Ok(self.convert(value, to))
            }
            (value, _) if from == Type::Object => Ok(value),
            _ => Err(IrError::TypeMismatch {
                function: self.function_name(),
                expected: to,
                found: from,
            }),
        }
    }

    /// Emit a call. Arguments are coerced to the callee's parameter types
    /// when the callee is known; the result of an unresolved call is typed
    /// as an object.
    pub fn call(
        &mut self,
        callee: Callee,
        args: Vec<Operand>,
    ) -> Result<Operand, IrError> {
        let (args, ret) = match &callee {
            Callee::Function(id) => {
                let signature = self.module.function(*id).signature.clone();
                let args = args
                    .into_iter()
                    .enumerate()
                    .map(|(i, arg)| match signature.params.get(i) {
                        Some(&ty) => self.coerce(arg, ty),
                        None => Ok(arg),
                    })
                    .collect::<Result<_, _>>()?;
                (args, signature.ret)
            }
            Callee::Unresolved(_) => (args, Type::Object),
        };
        let dst = self.fresh(ret);
        self.push(Instruction::Call { dst, callee, args });
        Ok(dst.into())
    }

    pub fn ret(&mut self, value: Option<Operand>) {
        self.push(Instruction::Return { value });
    }
}
