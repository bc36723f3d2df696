use ir::Type;
use parser::Identifier;

use crate::CodegenError;

/// Map a declared type name to its emitted type.
pub fn type_of(name: &Identifier) -> Result<Type, CodegenError> {
    match name.name.as_str() {
        "int" => Ok(Type::Int64),
        "double" => Ok(Type::Double),
        "object" => Ok(Type::Object),
        "void" => Ok(Type::Void),
        _ => Err(CodegenError::UnknownType {
            name: name.name.clone(),
            span: name.span,
        }),
    }
}

/// Like [`type_of`], for things that need storage.
pub fn storage_type(ty: &Identifier, name: &Identifier) -> Result<Type, CodegenError> {
    match type_of(ty)? {
        Type::Void => Err(CodegenError::VoidVariable {
            name: name.name.clone(),
            span: name.span,
        }),
        ty => Ok(ty),
    }
}
