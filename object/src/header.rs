use crate::{ObjectRef, SlotMap};

/// The part of every Runtime Object that does not depend on its kind.
///
/// The prototype is not owned: many objects may share it, and it always
/// outlives them (objects are never freed).
#[derive(Debug, Clone, Default)]
pub struct Header {
    pub prototype: Option<ObjectRef>,
    pub slots: SlotMap,
}

impl Header {
    pub fn new(prototype: Option<ObjectRef>) -> Self {
        Self {
            prototype,
            slots: SlotMap::new(),
        }
    }
}
