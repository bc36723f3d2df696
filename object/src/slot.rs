use std::collections::HashMap;

use ahash::RandomState;

use crate::{ObjectRef, Symbol};

/// Own slots of a single object.
///
/// Keys are unique, the last write wins. A slot may hold null, which is
/// still an existing slot as far as delegation lookup is concerned.
#[derive(Debug, Clone, Default)]
pub struct SlotMap {
    entries: HashMap<Symbol, Option<ObjectRef>, RandomState>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` if the slot does not exist, `Some(None)` if it holds null.
    #[inline]
    pub fn get(&self, name: Symbol) -> Option<Option<ObjectRef>> {
        self.entries.get(&name).copied()
    }

    /// Define or overwrite `name`, returning the previous value if any.
    #[inline]
    pub fn insert(
        &mut self,
        name: Symbol,
        value: Option<ObjectRef>,
    ) -> Option<Option<ObjectRef>> {
        self.entries.insert(name, value)
    }

    #[inline]
    pub fn contains(&self, name: Symbol) -> bool {
        self.entries.contains_key(&name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, Option<ObjectRef>)> {
        self.entries.iter().map(|(&name, &value)| (name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbols;

    #[test]
    fn last_insert_wins() {
        let symbols = Symbols::new();
        let x = symbols.intern("x");
        let mut slots = SlotMap::new();

        assert_eq!(slots.insert(x, None), None);
        assert_eq!(slots.insert(x, Some(ObjectRef::from_index(3))), Some(None));
        assert_eq!(slots.get(x), Some(Some(ObjectRef::from_index(3))));
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn null_slot_is_present() {
        let symbols = Symbols::new();
        let x = symbols.intern("x");
        let y = symbols.intern("y");
        let mut slots = SlotMap::new();
        slots.insert(x, None);

        assert!(slots.contains(x));
        assert_eq!(slots.get(x), Some(None));
        assert_eq!(slots.get(y), None);
    }
}
