use crate::primitives::{ECHO, expect_args};
use crate::{Runtime, RuntimeError, Value};

/// Print a value on its own line. Boxed numbers print as their contents.
pub fn echo(runtime: &mut Runtime, args: &[Value]) -> Result<Value, RuntimeError> {
    let [value] = expect_args::<1>(ECHO, args)?;
    let text = match value {
        Value::Object(Some(obj)) => {
            let object = runtime.heap.get(*obj)?;
            match (object.as_integer(), object.as_double(), object.as_str()) {
                (Some(v), _, _) => v.to_string(),
                (_, Some(v), _) => v.to_string(),
                (_, _, Some(s)) => s.to_owned(),
                _ => value.to_string(),
            }
        }
        other => other.to_string(),
    };
    writeln!(runtime.output(), "{text}")
        .map_err(|err| RuntimeError::Output(err.to_string()))?;
    Ok(Value::Void)
}
