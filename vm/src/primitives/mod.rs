use ir::{Signature, Type};

use crate::{Runtime, RuntimeError, Value};

pub mod io;
pub mod slots;

pub const ALLOCATE: &str = "allocate";
pub const NEWOBJ: &str = "newobj";
pub const GET_SLOT: &str = "getSlot";
pub const PUT_SLOT: &str = "putSlot";
pub const ECHO: &str = "echo";

pub type PrimitiveFn =
    fn(&mut Runtime, &[Value]) -> Result<Value, RuntimeError>;

/// A host function callable from generated code by name.
#[derive(Clone, Copy)]
pub struct PrimitiveDesc {
    pub name: &'static str,
    pub params: &'static [Type],
    pub ret: Type,
    pub func: PrimitiveFn,
}

impl PrimitiveDesc {
    pub const fn new(
        name: &'static str,
        params: &'static [Type],
        ret: Type,
        func: PrimitiveFn,
    ) -> Self {
        Self {
            name,
            params,
            ret,
            func,
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn signature(&self) -> Signature {
        Signature::new(self.params.to_vec(), self.ret)
    }
}

impl std::fmt::Debug for PrimitiveDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveDesc")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("ret", &self.ret)
            .finish_non_exhaustive()
    }
}

pub fn default_primitives() -> Vec<PrimitiveDesc> {
    vec![
        PrimitiveDesc::new(ALLOCATE, &[], Type::Object, slots::allocate),
        PrimitiveDesc::new(NEWOBJ, &[Type::Object], Type::Object, slots::newobj),
        PrimitiveDesc::new(
            GET_SLOT,
            &[Type::Object, Type::CStr, Type::Int32],
            Type::Object,
            slots::get_slot,
        ),
        PrimitiveDesc::new(
            PUT_SLOT,
            &[Type::Object, Type::CStr, Type::Object],
            Type::Void,
            slots::put_slot,
        ),
        PrimitiveDesc::new(ECHO, &[Type::Int64], Type::Void, io::echo),
    ]
}

pub fn find_primitive(name: &str) -> Option<PrimitiveDesc> {
    default_primitives().into_iter().find(|p| p.name == name)
}

pub(crate) fn expect_args<'a, const N: usize>(
    name: &str,
    args: &'a [Value],
) -> Result<&'a [Value; N], RuntimeError> {
    args.try_into().map_err(|_| RuntimeError::ArgumentCount {
        function: name.to_owned(),
        expected: N,
        found: args.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_unique() {
        let prims = default_primitives();
        for (i, p) in prims.iter().enumerate() {
            assert!(prims[i + 1..].iter().all(|q| q.name != p.name), "{}", p.name);
        }
    }

    #[test]
    fn finds_by_name() {
        let get_slot = find_primitive("getSlot").unwrap();
        assert_eq!(get_slot.arity(), 3);
        assert_eq!(get_slot.ret, Type::Object);
        assert!(find_primitive("get_slot").is_none());
    }

    #[test]
    fn wrong_arity_is_reported() {
        let err = expect_args::<2>("putSlot", &[Value::NULL]).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ArgumentCount {
                function: "putSlot".into(),
                expected: 2,
                found: 1
            }
        );
    }
}
