use crate::{Header, ObjectRef};

/// A specialized object: the common header plus a trailing payload.
#[derive(Debug, Clone)]
pub struct Boxed<T> {
    pub header: Header,
    pub value: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Plain,
    Integer,
    Double,
    String,
}

/// A Runtime Object. Every kind can be queried for its prototype and slots
/// through [`Object::header`] without knowing which kind it is.
#[derive(Debug, Clone)]
pub enum Object {
    Plain(Header),
    Integer(Boxed<i64>),
    Double(Boxed<f64>),
    String(Boxed<Box<str>>),
}

impl Object {
    pub fn plain(prototype: Option<ObjectRef>) -> Self {
        Self::Plain(Header::new(prototype))
    }

    pub fn integer(prototype: Option<ObjectRef>, value: i64) -> Self {
        Self::Integer(Boxed {
            header: Header::new(prototype),
            value,
        })
    }

    pub fn double(prototype: Option<ObjectRef>, value: f64) -> Self {
        Self::Double(Boxed {
            header: Header::new(prototype),
            value,
        })
    }

    pub fn string(prototype: Option<ObjectRef>, value: &str) -> Self {
        Self::String(Boxed {
            header: Header::new(prototype),
            value: value.into(),
        })
    }

    #[inline]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Plain(_) => ObjectKind::Plain,
            Self::Integer(_) => ObjectKind::Integer,
            Self::Double(_) => ObjectKind::Double,
            Self::String(_) => ObjectKind::String,
        }
    }

    #[inline]
    pub fn header(&self) -> &Header {
        match self {
            Self::Plain(header) => header,
            Self::Integer(boxed) => &boxed.header,
            Self::Double(boxed) => &boxed.header,
            Self::String(boxed) => &boxed.header,
        }
    }

    #[inline]
    pub fn header_mut(&mut self) -> &mut Header {
        match self {
            Self::Plain(header) => header,
            Self::Integer(boxed) => &mut boxed.header,
            Self::Double(boxed) => &mut boxed.header,
            Self::String(boxed) => &mut boxed.header,
        }
    }

    #[inline]
    pub fn prototype(&self) -> Option<ObjectRef> {
        self.header().prototype
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(boxed) => Some(boxed.value),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(boxed) => Some(boxed.value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(boxed) => Some(&*boxed.value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbols;

    #[test]
    fn boxed_kinds_expose_header() {
        let symbols = Symbols::new();
        let name = symbols.intern("x");
        let proto = Some(ObjectRef::from_index(0));

        let mut objects = [
            Object::plain(proto),
            Object::integer(proto, 7),
            Object::double(proto, 1.5),
            Object::string(proto, "hi"),
        ];

        for object in objects.iter_mut() {
            assert_eq!(object.prototype(), proto);
            object.header_mut().slots.insert(name, None);
            assert!(object.header().slots.contains(name));
        }
    }

    #[test]
    fn payload_accessors_match_kind() {
        let int = Object::integer(None, 42);
        assert_eq!(int.kind(), ObjectKind::Integer);
        assert_eq!(int.as_integer(), Some(42));
        assert_eq!(int.as_double(), None);

        let string = Object::string(None, "hello");
        assert_eq!(string.as_str(), Some("hello"));
        assert_eq!(string.as_integer(), None);

        assert_eq!(Object::plain(None).kind(), ObjectKind::Plain);
    }
}
