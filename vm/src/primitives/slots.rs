use crate::primitives::{GET_SLOT, NEWOBJ, PUT_SLOT, expect_args};
use crate::{Runtime, RuntimeError, Value};

/// Fresh object with no prototype.
pub fn allocate(
    runtime: &mut Runtime,
    _args: &[Value],
) -> Result<Value, RuntimeError> {
    Ok(runtime.allocate(None)?.into())
}

pub fn newobj(
    runtime: &mut Runtime,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let [prototype] = expect_args::<1>(NEWOBJ, args)?;
    let prototype = prototype.as_object()?;
    Ok(runtime.allocate(prototype)?.into())
}

/// `getSlot(obj, name, followChain)`. Reading through null yields null.
pub fn get_slot(
    runtime: &mut Runtime,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let [receiver, name, follow_chain] = expect_args::<3>(GET_SLOT, args)?;
    let name = name.as_str()?;
    let follow_chain = follow_chain.as_int()? != 0;
    let Some(receiver) = receiver.as_object()? else {
        log::trace!("getting slot {name} of null");
        return Ok(Value::NULL);
    };
    let value = runtime.heap.get_slot(receiver, name, follow_chain)?;
    Ok(Value::Object(value))
}

/// `putSlot(obj, name, value)`. Scalars are boxed before they are stored.
pub fn put_slot(
    runtime: &mut Runtime,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let [receiver, name, value] = expect_args::<3>(PUT_SLOT, args)?;
    let name = name.as_str()?;
    let receiver = receiver
        .as_object()?
        .ok_or_else(|| RuntimeError::NullReceiver(name.to_owned()))?;
    let value = runtime.box_value(value)?.as_object()?;
    runtime.heap.put_slot(receiver, name, value)?;
    Ok(Value::Void)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::RuntimeCreateInfo;

    fn name(s: &str) -> Value {
        Value::Str(Arc::from(s))
    }

    #[test]
    fn newobj_delegates_to_its_argument() {
        let mut rt = Runtime::with_output(RuntimeCreateInfo::default(), Box::new(std::io::sink()));
        let proto = allocate(&mut rt, &[]).unwrap();
        let child = newobj(&mut rt, &[proto.clone()]).unwrap();
        let child = child.as_object().unwrap().unwrap();
        assert_eq!(rt.heap.prototype_of(child).unwrap(), proto.as_object().unwrap());
    }

    #[test]
    fn put_then_get_through_chain() {
        let mut rt = Runtime::with_output(RuntimeCreateInfo::default(), Box::new(std::io::sink()));
        let proto = allocate(&mut rt, &[]).unwrap();
        let greeting = allocate(&mut rt, &[]).unwrap();
        put_slot(&mut rt, &[proto.clone(), name("greet"), greeting.clone()]).unwrap();
        let child = newobj(&mut rt, &[proto]).unwrap();

        let own = get_slot(&mut rt, &[child.clone(), name("greet"), Value::Int(0)]).unwrap();
        let chained = get_slot(&mut rt, &[child, name("greet"), Value::Int(1)]).unwrap();
        assert_eq!(own, Value::NULL);
        assert_eq!(chained, greeting);
    }

    #[test]
    fn reading_through_null_is_null() {
        let mut rt = Runtime::with_output(RuntimeCreateInfo::default(), Box::new(std::io::sink()));
        let value = get_slot(&mut rt, &[Value::NULL, name("x"), Value::Int(1)]).unwrap();
        assert_eq!(value, Value::NULL);
    }

    #[test]
    fn writing_to_null_fails() {
        let mut rt = Runtime::with_output(RuntimeCreateInfo::default(), Box::new(std::io::sink()));
        let err = put_slot(&mut rt, &[Value::NULL, name("x"), Value::NULL]).unwrap_err();
        assert_eq!(err, RuntimeError::NullReceiver("x".into()));
    }

    #[test]
    fn scalar_slot_values_are_boxed() {
        let mut rt = Runtime::with_output(RuntimeCreateInfo::default(), Box::new(std::io::sink()));
        let obj = allocate(&mut rt, &[]).unwrap();
        put_slot(&mut rt, &[obj.clone(), name("n"), Value::Int(7)]).unwrap();
        let boxed = get_slot(&mut rt, &[obj, name("n"), Value::Int(0)]).unwrap();
        let boxed = boxed.as_object().unwrap().unwrap();
        assert_eq!(rt.heap.get(boxed).unwrap().as_integer(), Some(7));
    }
}
