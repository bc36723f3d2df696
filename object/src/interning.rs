use std::{collections::HashMap, sync::Arc};

use ahash::RandomState;
use parking_lot::RwLock;

/// An interned slot name. Two symbols are equal iff their names are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

#[derive(Debug)]
struct SymbolsImpl {
    table: Vec<Arc<str>>,
    mappings: HashMap<Arc<str>, Symbol, RandomState>,
}

/// Shared symbol table. Clones refer to the same storage.
#[derive(Debug, Clone)]
pub struct Symbols(Arc<RwLock<SymbolsImpl>>);

impl SymbolsImpl {
    fn new() -> Self {
        Self {
            table: Vec::new(),
            mappings: HashMap::default(),
        }
    }

    fn get_or_add(&mut self, value: &str) -> Symbol {
        if let Some(&id) = self.mappings.get(value) {
            return id;
        }
        let id = Symbol(self.table.len() as u32);
        let interned = Arc::<str>::from(value);
        self.table.push(interned.clone());
        self.mappings.insert(interned, id);
        id
    }

    fn find(&self, value: &str) -> Option<Symbol> {
        self.mappings.get(value).copied()
    }

    fn get(&self, id: Symbol) -> Option<Arc<str>> {
        self.table.get(id.0 as usize).cloned()
    }
}

impl Symbols {
    pub fn new() -> Self {
        Self(Arc::new(RwLock::new(SymbolsImpl::new())))
    }

    pub fn intern(&self, value: &str) -> Symbol {
        // fast path: most names are already interned
        if let Some(id) = self.0.read().find(value) {
            return id;
        }
        self.0.write().get_or_add(value)
    }

    /// Look a name up without interning it.
    pub fn find(&self, value: &str) -> Option<Symbol> {
        self.0.read().find(value)
    }

    pub fn resolve(&self, id: Symbol) -> Option<Arc<str>> {
        self.0.read().get(id)
    }

    pub fn len(&self) -> usize {
        self.0.read().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Symbols {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let symbols = Symbols::new();
        let a = symbols.intern("greet");
        let b = symbols.intern("greet");
        let c = symbols.intern("init");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols.resolve(a).as_deref(), Some("greet"));
    }

    #[test]
    fn find_does_not_intern() {
        let symbols = Symbols::new();
        assert_eq!(symbols.find("missing"), None);
        assert!(symbols.is_empty());
    }

    #[test]
    fn clones_share_storage() {
        let symbols = Symbols::new();
        let other = symbols.clone();
        let id = other.intern("x");
        assert_eq!(symbols.find("x"), Some(id));
    }
}
