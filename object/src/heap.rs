use std::{fmt, sync::Arc};

use crate::{INIT_SLOT, LookupResult, Object, Symbol, Symbols, lookup};

/// Handle to an object living in a [`Heap`]. Identity is by allocation:
/// two handles are equal only if they name the same allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef(u32);

impl ObjectRef {
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    #[error("dangling object reference {0}")]
    Dangling(ObjectRef),
    #[error("heap exhausted after {0} objects")]
    Exhausted(usize),
}

#[derive(Debug, Clone)]
pub struct HeapCreateInfo {
    /// Number of objects to reserve room for up front.
    pub capacity: usize,
}

impl Default for HeapCreateInfo {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Arena owning every Runtime Object of a program run.
///
/// Objects are never freed. A prototype is always allocated before any
/// object that refers to it, so prototype chains cannot form cycles.
#[derive(Debug)]
pub struct Heap {
    objects: Vec<Object>,
    symbols: Symbols,
}

impl Heap {
    pub fn new(info: HeapCreateInfo) -> Self {
        Self::with_symbols(info, Symbols::new())
    }

    pub fn with_symbols(info: HeapCreateInfo, symbols: Symbols) -> Self {
        Self {
            objects: Vec::with_capacity(info.capacity),
            symbols,
        }
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[inline]
    pub fn get(&self, obj: ObjectRef) -> Result<&Object, ObjectError> {
        self.objects
            .get(obj.index())
            .ok_or(ObjectError::Dangling(obj))
    }

    #[inline]
    fn get_mut(&mut self, obj: ObjectRef) -> Result<&mut Object, ObjectError> {
        self.objects
            .get_mut(obj.index())
            .ok_or(ObjectError::Dangling(obj))
    }

    fn insert(&mut self, object: Object) -> Result<ObjectRef, ObjectError> {
        if let Some(proto) = object.prototype() {
            self.get(proto)?;
        }
        let index = self.objects.len();
        if index >= u32::MAX as usize {
            return Err(ObjectError::Exhausted(index));
        }
        self.objects.push(object);
        Ok(ObjectRef::from_index(index))
    }

    /// Create a blank object delegating to `prototype`.
    ///
    /// The prototype chain is searched for an `init` slot, but the result is
    /// not invoked.
    pub fn allocate(
        &mut self,
        prototype: Option<ObjectRef>,
    ) -> Result<ObjectRef, ObjectError> {
        if let Some(proto) = prototype {
            if let Some(init) = self.get_slot(proto, INIT_SLOT, true)? {
                log::trace!("prototype {proto} provides init {init}");
            }
        }
        let obj = self.insert(Object::plain(prototype))?;
        log::trace!("allocated {obj} (prototype {prototype:?})");
        Ok(obj)
    }

    pub fn allocate_integer(
        &mut self,
        prototype: Option<ObjectRef>,
        value: i64,
    ) -> Result<ObjectRef, ObjectError> {
        self.insert(Object::integer(prototype, value))
    }

    pub fn allocate_double(
        &mut self,
        prototype: Option<ObjectRef>,
        value: f64,
    ) -> Result<ObjectRef, ObjectError> {
        self.insert(Object::double(prototype, value))
    }

    pub fn allocate_string(
        &mut self,
        prototype: Option<ObjectRef>,
        value: &str,
    ) -> Result<ObjectRef, ObjectError> {
        self.insert(Object::string(prototype, value))
    }

    pub fn prototype_of(
        &self,
        obj: ObjectRef,
    ) -> Result<Option<ObjectRef>, ObjectError> {
        Ok(self.get(obj)?.prototype())
    }

    /// Read slot `name` of `obj`.
    ///
    /// Without `follow_chain` only the object's own slots are consulted.
    /// With it, the closest object on the prototype chain owning the slot
    /// decides the result. An absent slot is `Ok(None)`, not an error.
    pub fn get_slot(
        &self,
        obj: ObjectRef,
        name: &str,
        follow_chain: bool,
    ) -> Result<Option<ObjectRef>, ObjectError> {
        log::trace!("getting slot {name} of {obj} (follow chain: {follow_chain})");
        match self.symbols.find(name) {
            Some(symbol) => self.get_slot_symbol(obj, symbol, follow_chain),
            // never interned, so no object can own it
            None => self.get(obj).map(|_| None),
        }
    }

    pub fn get_slot_symbol(
        &self,
        obj: ObjectRef,
        name: Symbol,
        follow_chain: bool,
    ) -> Result<Option<ObjectRef>, ObjectError> {
        if !follow_chain {
            return Ok(self.get(obj)?.header().slots.get(name).flatten());
        }
        match lookup(self, obj, name)? {
            LookupResult::Found { value, .. } => Ok(value),
            LookupResult::None => Ok(None),
        }
    }

    /// Define `name` directly on `obj`, shadowing any ancestor's slot of the
    /// same name. Never walks the chain.
    pub fn put_slot(
        &mut self,
        obj: ObjectRef,
        name: &str,
        value: Option<ObjectRef>,
    ) -> Result<(), ObjectError> {
        log::trace!("putting slot {name} of {obj}");
        let symbol = self.symbols.intern(name);
        self.put_slot_symbol(obj, symbol, value)
    }

    pub fn put_slot_symbol(
        &mut self,
        obj: ObjectRef,
        name: Symbol,
        value: Option<ObjectRef>,
    ) -> Result<(), ObjectError> {
        self.get_mut(obj)?.header_mut().slots.insert(name, value);
        Ok(())
    }

    /// Names of the slots `obj` owns itself, sorted.
    pub fn own_slot_names(
        &self,
        obj: ObjectRef,
    ) -> Result<Vec<Arc<str>>, ObjectError> {
        let mut names: Vec<_> = self
            .get(obj)?
            .header()
            .slots
            .iter()
            .filter_map(|(name, _)| self.symbols.resolve(name))
            .collect();
        names.sort();
        Ok(names)
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new(HeapCreateInfo::default())
    }
}
