use std::collections::HashMap;

use crate::{
    BlockId, Builder, FunctionId, InsertPoint, Instruction, IrError, Operand,
    Type, ValueId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    /// Provided by whoever runs the module, resolved by name.
    External,
    /// Defined in this module.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Type>,
    pub ret: Type,
}

impl Signature {
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        Self { params, ret }
    }
}

#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|i| i.is_terminator())
    }
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub linkage: Linkage,
    pub signature: Signature,
    pub blocks: Vec<BasicBlock>,
    value_types: Vec<Type>,
}

impl Function {
    fn new(name: &str, linkage: Linkage, signature: Signature) -> Self {
        Self {
            name: name.to_owned(),
            linkage,
            signature,
            blocks: Vec::new(),
            value_types: Vec::new(),
        }
    }

    /// Declarations have no body.
    #[inline]
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn entry(&self) -> Option<BlockId> {
        (!self.blocks.is_empty()).then_some(BlockId(0))
    }

    #[inline]
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index()]
    }

    #[inline]
    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.index()]
    }

    pub fn add_block(&mut self, label: &str) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock {
            label: label.to_owned(),
            instructions: Vec::new(),
        });
        id
    }

    /// Type of a value defined in this function. For storage cells this is
    /// the type of the cell's contents.
    #[inline]
    pub fn value_type(&self, id: ValueId) -> Option<Type> {
        self.value_types.get(id.index()).copied()
    }

    /// Static type of an operand used inside this function.
    pub fn operand_type(&self, operand: &Operand) -> Type {
        match operand {
            Operand::Const(constant) => constant.ty(),
            Operand::Value(id) => self.value_type(*id).unwrap_or(Type::Void),
            Operand::Argument(n) => self
                .signature
                .params
                .get(*n as usize)
                .copied()
                .unwrap_or(Type::Void),
        }
    }

    #[inline]
    pub fn value_count(&self) -> usize {
        self.value_types.len()
    }

    pub(crate) fn new_value(&mut self, ty: Type) -> ValueId {
        let id = ValueId(self.value_types.len() as u32);
        self.value_types.push(ty);
        id
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }
}

/// A unit of emitted code.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    functions: Vec<Function>,
    by_name: HashMap<String, FunctionId>,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            functions: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    fn insert(&mut self, function: Function) -> Result<FunctionId, IrError> {
        if self.by_name.contains_key(&function.name) {
            return Err(IrError::DuplicateFunction(function.name));
        }
        let id = FunctionId(self.functions.len() as u32);
        log::debug!("declaring {:?} function {}", function.linkage, function.name);
        self.by_name.insert(function.name.clone(), id);
        self.functions.push(function);
        Ok(id)
    }

    /// Declare a function whose body is supplied by the execution harness.
    pub fn add_external_function(
        &mut self,
        name: &str,
        signature: Signature,
    ) -> Result<FunctionId, IrError> {
        self.insert(Function::new(name, Linkage::External, signature))
    }

    /// Define a function with an empty `entry` block.
    pub fn add_function(
        &mut self,
        name: &str,
        signature: Signature,
    ) -> Result<(FunctionId, BlockId), IrError> {
        let mut function = Function::new(name, Linkage::Internal, signature);
        let entry = function.add_block("entry");
        let id = self.insert(function)?;
        Ok((id, entry))
    }

    /// Exact-name lookup.
    #[inline]
    pub fn get_function(&self, name: &str) -> Option<FunctionId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FunctionId(i as u32), f))
    }

    pub fn builder(&mut self, at: InsertPoint) -> Builder<'_> {
        Builder::new(self, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn functions_are_found_by_exact_name() {
        let mut module = Module::new("test");
        let get_slot = module
            .add_external_function(
                "getSlot",
                Signature::new(
                    vec![Type::Object, Type::CStr, Type::Int32],
                    Type::Object,
                ),
            )
            .unwrap();
        let (main, entry) = module
            .add_function("main", Signature::new(vec![], Type::Void))
            .unwrap();

        assert_eq!(module.get_function("getSlot"), Some(get_slot));
        assert_eq!(module.get_function("getslot"), None);
        assert!(module.function(get_slot).is_declaration());
        assert_eq!(module.function(main).entry(), Some(entry));
        assert_eq!(module.function(main).block(entry).label, "entry");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut module = Module::new("test");
        let sig = Signature::new(vec![], Type::Void);
        module.add_function("f", sig.clone()).unwrap();
        assert_eq!(
            module.add_external_function("f", sig),
            Err(IrError::DuplicateFunction("f".into()))
        );
    }
}
