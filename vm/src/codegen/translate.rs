use ir::{BinOp, Callee, Constant, InsertPoint, IrError, Operand, Signature, Type};
use parser::{
    BinaryOperator, Block, Expr, FunctionDeclaration, Identifier, Reference, Span,
    Stmt, VariableDeclaration,
};

use super::types::{storage_type, type_of};
use super::{CodeGenContext, Diagnostic, NULL_NAME};
use crate::CodegenError;
use crate::scope::Cell;

impl CodeGenContext {
    /// Statements in order. The value of the last one is the block's value.
    pub(crate) fn gen_block(
        &mut self,
        block: &Block,
    ) -> Result<Option<Operand>, CodegenError> {
        let mut last = None;
        for stmt in &block.statements {
            last = self.gen_stmt(stmt)?;
        }
        log::debug!("creating block");
        Ok(last)
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> Result<Option<Operand>, CodegenError> {
        match stmt {
            Stmt::Expression(expr) => self.gen_expr(expr).map(Some),
            Stmt::VariableDeclaration(decl) => self.gen_variable_declaration(decl),
            Stmt::FunctionDeclaration(decl) => {
                self.gen_function_declaration(decl)?;
                Ok(None)
            }
            Stmt::Block(block) => self.gen_block(block),
        }
    }

    pub(crate) fn gen_expr(&mut self, expr: &Expr) -> Result<Operand, CodegenError> {
        match expr {
            Expr::Integer(value) => {
                log::debug!("creating integer: {value}");
                Ok(Constant::Int64(*value).into())
            }
            Expr::Double(value) => {
                log::debug!("creating double: {value}");
                Ok(Constant::Double(*value).into())
            }
            Expr::String(value) => Ok(Constant::Str(value.as_str().into()).into()),
            Expr::Identifier(ident) => self.gen_identifier(ident),
            Expr::Reference(reference) => self.gen_reference(reference),
            Expr::Binary { op, lhs, rhs, span } => {
                self.gen_binary(*op, lhs, rhs, *span)
            }
            Expr::Assignment { target, value } => self.gen_assignment(target, value),
            Expr::Call { callee, arguments } => self.gen_call(callee, arguments),
        }
    }

    /// Load a bound name, or bind a fresh object to an unbound one.
    pub(crate) fn gen_identifier(
        &mut self,
        ident: &Identifier,
    ) -> Result<Operand, CodegenError> {
        if ident.name == NULL_NAME {
            return Ok(Operand::null());
        }
        if let Some(cell) = self.scopes.lookup(&ident.name) {
            log::debug!("creating identifier reference: {}", ident.name);
            return Ok(self.builder()?.load(cell.slot));
        }

        log::debug!("instantiating object {}", ident.name);
        let allocate = self.runtime.allocate;
        let mut b = self.builder()?;
        let slot = b.alloca(Type::Object, &ident.name);
        let obj = b.call(Callee::Function(allocate), Vec::new())?;
        b.store(slot, obj.clone());
        self.scopes.bind(
            &ident.name,
            Cell {
                slot,
                ty: Type::Object,
            },
        )?;
        Ok(obj)
    }

    fn gen_reference(&mut self, reference: &Reference) -> Result<Operand, CodegenError> {
        if reference.is_single() {
            return self.gen_identifier(reference.first());
        }
        log::debug!("creating reference: {reference}");
        self.resolve_reference(reference, false)
    }

    fn gen_binary(
        &mut self,
        op: BinaryOperator,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
    ) -> Result<Operand, CodegenError> {
        let op = match op {
            BinaryOperator::Add => BinOp::Add,
            BinaryOperator::Sub => BinOp::Sub,
            BinaryOperator::Mul => BinOp::Mul,
            BinaryOperator::Div => BinOp::Div,
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::Less
            | BinaryOperator::LessEqual
            | BinaryOperator::Greater
            | BinaryOperator::GreaterEqual => {
                return Err(CodegenError::UnsupportedOperator { op, span });
            }
        };
        log::debug!("creating binary operation {}", op.mnemonic());
        let lhs = self.gen_expr(lhs)?;
        let rhs = self.gen_expr(rhs)?;
        Ok(self.builder()?.binary(op, lhs, rhs))
    }

    fn gen_assignment(
        &mut self,
        target: &Reference,
        value: &Expr,
    ) -> Result<Operand, CodegenError> {
        log::debug!("creating assignment {target}");
        if target.is_single() {
            return self.gen_store(target.first(), value);
        }

        let container = self.resolve_reference(target, true)?;
        let name = Constant::Str(target.last().name.as_str().into());
        let value = self.gen_expr(value)?;
        let put_slot = self.runtime.put_slot;
        self.builder()?.call(
            Callee::Function(put_slot),
            vec![container, name.into(), value.clone()],
        )?;
        Ok(value)
    }

    /// Plain variable rebind. An unbound name gets a cell typed after the
    /// value stored into it; a bound one keeps its type and only takes values
    /// that convert to it.
    fn gen_store(
        &mut self,
        name: &Identifier,
        value: &Expr,
    ) -> Result<Operand, CodegenError> {
        if name.name == NULL_NAME {
            return Err(CodegenError::InvalidAssignment {
                target: name.name.clone(),
                span: name.span,
            });
        }
        let value = self.gen_expr(value)?;
        let cell = match self.scopes.lookup(&name.name) {
            Some(cell) => cell,
            None => {
                let mut b = self.builder()?;
                let ty = b.type_of(&value);
                let cell = Cell {
                    slot: b.alloca(ty, &name.name),
                    ty,
                };
                self.scopes.bind(&name.name, cell)?;
                cell
            }
        };
        let mut b = self.builder()?;
        let value = b.coerce(value, cell.ty).map_err(|err| match err {
            IrError::TypeMismatch { expected, found, .. } => {
                CodegenError::TypeMismatch {
                    name: name.name.clone(),
                    expected,
                    found,
                    span: name.span,
                }
            }
            err => err.into(),
        })?;
        b.store(cell.slot, value.clone());
        Ok(value)
    }

    fn gen_variable_declaration(
        &mut self,
        decl: &VariableDeclaration,
    ) -> Result<Option<Operand>, CodegenError> {
        log::debug!("creating variable declaration {} {}", decl.ty.name, decl.name.name);
        let ty = storage_type(&decl.ty, &decl.name)?;
        let slot = self.builder()?.alloca(ty, &decl.name.name);
        self.scopes.bind(&decl.name.name, Cell { slot, ty })?;
        match &decl.initializer {
            Some(init) => self.gen_store(&decl.name, init).map(Some),
            None => Ok(None),
        }
    }

    fn gen_function_declaration(
        &mut self,
        decl: &FunctionDeclaration,
    ) -> Result<(), CodegenError> {
        let params = decl
            .parameters
            .iter()
            .map(|param| storage_type(&param.ty, &param.name))
            .collect::<Result<Vec<_>, _>>()?;
        let ret = type_of(&decl.return_type)?;
        let name = &decl.name;
        let (function, entry) = self
            .module
            .add_function(&name.name, Signature::new(params.clone(), ret))
            .map_err(|_| CodegenError::DuplicateFunction {
                name: name.name.clone(),
                span: name.span,
            })?;

        self.scopes.push(InsertPoint::new(function, entry));
        let result = self.gen_function_body(decl, &params, ret);
        self.scopes.pop();
        result?;
        log::debug!("creating function: {}", name.name);
        Ok(())
    }

    fn gen_function_body(
        &mut self,
        decl: &FunctionDeclaration,
        params: &[Type],
        ret: Type,
    ) -> Result<(), CodegenError> {
        for (index, (param, &ty)) in decl.parameters.iter().zip(params).enumerate() {
            let mut b = self.builder()?;
            let slot = b.alloca(ty, &param.name.name);
            b.store(slot, Operand::Argument(index as u16));
            self.scopes.bind(&param.name.name, Cell { slot, ty })?;
        }

        let value = self.gen_block(&decl.body)?;
        let mut b = self.builder()?;
        match (ret, value) {
            (Type::Void, _) => b.ret(None),
            (ty, Some(value)) => {
                let value = b.coerce(value, ty)?;
                b.ret(Some(value));
            }
            (ty, None) => {
                return Err(CodegenError::MissingReturnValue {
                    name: decl.name.name.clone(),
                    ty,
                    span: decl.name.span,
                });
            }
        }
        Ok(())
    }

    fn gen_call(
        &mut self,
        callee: &Identifier,
        arguments: &[Expr],
    ) -> Result<Operand, CodegenError> {
        let target = match self.module.get_function(&callee.name) {
            Some(id) => Callee::Function(id),
            None => {
                log::error!("no such function {}", callee.name);
                self.diagnostics.push(Diagnostic {
                    message: format!("no such function `{}`", callee.name),
                    span: callee.span,
                });
                Callee::Unresolved(callee.name.clone())
            }
        };
        let args = arguments
            .iter()
            .map(|arg| self.gen_expr(arg))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("creating method call: {}", callee.name);
        Ok(self.builder()?.call(target, args)?)
    }
}
