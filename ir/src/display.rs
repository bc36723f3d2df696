use std::fmt;

use crate::{
    Callee, Constant, Function, Instruction, Linkage, Module, Operand,
};

struct OperandDisplay<'a>(&'a Function, &'a Operand);

impl fmt::Display for OperandDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let OperandDisplay(function, operand) = self;
        match operand {
            Operand::Value(id) => {
                write!(f, "{} %{}", function.operand_type(operand), id.0)
            }
            Operand::Argument(n) => {
                write!(f, "{} %arg{n}", function.operand_type(operand))
            }
            Operand::Const(constant) => {
                let ty = constant.ty();
                match constant {
                    Constant::Int32(v) => write!(f, "{ty} {v}"),
                    Constant::Int64(v) => write!(f, "{ty} {v}"),
                    Constant::Double(v) => write!(f, "{ty} {v:?}"),
                    Constant::Null => write!(f, "{ty} null"),
                    Constant::Str(s) => write!(f, "{ty} {s:?}"),
                }
            }
        }
    }
}

fn write_instruction(
    f: &mut fmt::Formatter<'_>,
    module: &Module,
    function: &Function,
    instruction: &Instruction,
) -> fmt::Result {
    match instruction {
        Instruction::Alloca { dst, ty, name } => {
            write!(f, "%{} = alloca {ty} ; {name}", dst.0)
        }
        Instruction::Load { dst, cell } => {
            let ty = function.value_type(*dst).unwrap_or(crate::Type::Void);
            write!(f, "%{} = load {ty}, %{}", dst.0, cell.0)
        }
        Instruction::Store { cell, value } => {
            write!(f, "store {}, %{}", OperandDisplay(function, value), cell.0)
        }
        Instruction::Binary { dst, op, lhs, rhs } => {
            write!(
                f,
                "%{} = {} {}, {}",
                dst.0,
                op.mnemonic(),
                OperandDisplay(function, lhs),
                OperandDisplay(function, rhs)
            )
        }
        Instruction::BoxValue { dst, value } => {
            write!(f, "%{} = box {}", dst.0, OperandDisplay(function, value))
        }
        Instruction::Convert { dst, value, to } => {
            write!(
                f,
                "%{} = convert {} to {to}",
                dst.0,
                OperandDisplay(function, value)
            )
        }
        Instruction::Call { dst, callee, args } => {
            let ty = function.value_type(*dst).unwrap_or(crate::Type::Void);
            let name = match callee {
                Callee::Function(id) => module.function(*id).name.as_str(),
                Callee::Unresolved(name) => name.as_str(),
            };
            write!(f, "%{} = call {ty} @{name}(", dst.0)?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", OperandDisplay(function, arg))?;
            }
            f.write_str(")")
        }
        Instruction::Return { value: Some(value) } => {
            write!(f, "ret {}", OperandDisplay(function, value))
        }
        Instruction::Return { value: None } => f.write_str("ret void"),
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; module {}", self.name)?;
        for (_, function) in self.functions() {
            let params = function
                .signature
                .params
                .iter()
                .map(|ty| ty.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let ret = function.signature.ret;
            if function.is_declaration() {
                writeln!(f, "declare {ret} @{}({params})", function.name)?;
                continue;
            }
            let linkage = match function.linkage {
                Linkage::Internal => "internal ",
                Linkage::External => "",
            };
            writeln!(f, "define {linkage}{ret} @{}({params}) {{", function.name)?;
            for block in &function.blocks {
                writeln!(f, "{}:", block.label)?;
                for instruction in &block.instructions {
                    f.write_str("  ")?;
                    write_instruction(f, self, function, instruction)?;
                    writeln!(f)?;
                }
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}
