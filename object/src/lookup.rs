use crate::{Heap, ObjectError, ObjectRef, Symbol};

/// The result of a delegation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupResult {
    /// No object on the chain owns the slot.
    None,
    Found {
        /// The object owning the slot (the receiver or one of its ancestors).
        holder: ObjectRef,
        /// The slot's value, which may be null.
        value: Option<ObjectRef>,
        /// Number of prototype links followed to reach `holder`.
        depth: usize,
    },
}

/// Look up `name` starting at `receiver` and walking prototype links.
///
/// The first object owning the slot decides the result.
pub fn lookup(
    heap: &Heap,
    receiver: ObjectRef,
    name: Symbol,
) -> Result<LookupResult, ObjectError> {
    let mut current = Some(receiver);
    let mut depth = 0;
    while let Some(obj) = current {
        let header = heap.get(obj)?.header();
        if let Some(value) = header.slots.get(name) {
            return Ok(LookupResult::Found {
                holder: obj,
                value,
                depth,
            });
        }
        current = header.prototype;
        depth += 1;
    }
    Ok(LookupResult::None)
}
