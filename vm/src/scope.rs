use std::collections::HashMap;

use ir::{InsertPoint, Type, ValueId};

use crate::CodegenError;

/// A named storage cell in the function being emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub slot: ValueId,
    pub ty: Type,
}

#[derive(Debug)]
pub struct Frame {
    pub insert_point: InsertPoint,
    locals: HashMap<String, Cell>,
}

impl Frame {
    pub fn locals(&self) -> impl Iterator<Item = (&str, Cell)> {
        self.locals.iter().map(|(name, cell)| (name.as_str(), *cell))
    }
}

/// Name bindings during translation, one frame per function being emitted.
///
/// Lookups only consult the innermost frame: a function body never sees the
/// names of the code around its declaration.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, insert_point: InsertPoint) {
        log::trace!("push scope at {insert_point:?}");
        self.frames.push(Frame {
            insert_point,
            locals: HashMap::new(),
        });
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in the innermost frame, replacing any earlier binding.
    pub fn bind(&mut self, name: &str, cell: Cell) -> Result<(), CodegenError> {
        let frame = self.frames.last_mut().ok_or(CodegenError::NoActiveScope)?;
        frame.locals.insert(name.to_owned(), cell);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Cell> {
        self.frames.last()?.locals.get(name).copied()
    }

    #[inline]
    pub fn insert_point(&self) -> Result<InsertPoint, CodegenError> {
        self.frames
            .last()
            .map(|frame| frame.insert_point)
            .ok_or(CodegenError::NoActiveScope)
    }
}
