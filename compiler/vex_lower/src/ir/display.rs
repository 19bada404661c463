//! Textual listing of an [`IrModule`].

use std::fmt::{self, Write};

use vex_ir::{BlockId, ValueId};

use super::{Inst, IrFunction, IrModule, Op, ValueKind};

impl IrModule {
    /// The bare name of a value: `%N`, a constant, or `@symbol`.
    fn repr(&self, id: ValueId) -> String {
        match self.value(id).map(|v| &v.kind) {
            Some(ValueKind::Const(c)) => c.to_string(),
            Some(ValueKind::Global(symbol)) => format!("@{symbol}"),
            Some(ValueKind::Str(index)) => format!("@.str.{index}"),
            Some(ValueKind::Param { .. } | ValueKind::Inst) => format!("%{}", id.raw()),
            None => "<none>".to_owned(),
        }
    }

    /// A typed operand, `ty name`.
    fn operand(&self, id: ValueId) -> String {
        format!("{} {}", self.value_type(id), self.repr(id))
    }

    fn label(&self, id: BlockId) -> String {
        match self.block(id) {
            Some(block) => format!("{}{}", block.name, id.raw()),
            None => format!("bb{}", id.raw()),
        }
    }

    fn write_inst(&self, out: &mut String, inst: &Inst) -> fmt::Result {
        out.push_str("  ");
        if let Some(result) = inst.result {
            write!(out, "%{} = ", result.raw())?;
        }
        match &inst.op {
            Op::Alloca(ty) => write!(out, "alloca {ty}")?,
            Op::Load { ty, ptr } => write!(out, "load {ty}, {}", self.operand(*ptr))?,
            Op::Store { value, ptr } => {
                write!(out, "store {}, {}", self.operand(*value), self.operand(*ptr))?;
            }
            Op::Gep { base, ptr, indices } => {
                write!(out, "getelementptr {base}, {}", self.operand(*ptr))?;
                for index in indices {
                    write!(out, ", {}", self.operand(*index))?;
                }
            }
            Op::StructGep { base, ptr, index } => {
                write!(
                    out,
                    "getelementptr {base}, {}, i32 0, i32 {index}",
                    self.operand(*ptr)
                )?;
            }
            Op::Memcpy { dst, src, bytes } => {
                write!(
                    out,
                    "memcpy {}, {}, {bytes}",
                    self.operand(*dst),
                    self.operand(*src)
                )?;
            }
            Op::Binary { op, lhs, rhs } => {
                write!(
                    out,
                    "{} {}, {}",
                    op.name(),
                    self.operand(*lhs),
                    self.repr(*rhs)
                )?;
            }
            Op::Compare { pred, lhs, rhs } => {
                let family = if pred.is_float() { "fcmp" } else { "icmp" };
                write!(
                    out,
                    "{family} {} {}, {}",
                    pred.name(),
                    self.operand(*lhs),
                    self.repr(*rhs)
                )?;
            }
            Op::Convert { op, value, to } => {
                write!(out, "{} {} to {to}", op.name(), self.operand(*value))?;
            }
            Op::Call { callee, args } => {
                let (ret, symbol) = self
                    .functions
                    .get(callee.index())
                    .map_or(("void".to_owned(), "<none>"), |f| {
                        (f.sig.ret.to_string(), f.symbol.as_str())
                    });
                write!(out, "call {ret} @{symbol}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&self.operand(*arg));
                }
                out.push(')');
            }
            Op::Phi { incoming } => {
                let ty = inst
                    .result
                    .map(|r| self.value_type(r).to_string())
                    .unwrap_or_default();
                write!(out, "phi {ty}")?;
                for (i, (value, block)) in incoming.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(out, "{sep}[{}, %{}]", self.repr(*value), self.label(*block))?;
                }
            }
            Op::Br(dest) => write!(out, "br label %{}", self.label(*dest))?,
            Op::CondBr {
                cond,
                then_block,
                else_block,
            } => {
                write!(
                    out,
                    "br {}, label %{}, label %{}",
                    self.operand(*cond),
                    self.label(*then_block),
                    self.label(*else_block)
                )?;
            }
            Op::Ret(None) => out.push_str("ret void"),
            Op::Ret(Some(value)) => write!(out, "ret {}", self.operand(*value))?,
            Op::Unreachable => out.push_str("unreachable"),
        }
        out.push('\n');
        Ok(())
    }

    fn write_function(&self, out: &mut String, func: &IrFunction) -> fmt::Result {
        let keyword = if func.is_definition() {
            "define"
        } else {
            "declare"
        };
        write!(out, "{keyword} {} @{}(", func.sig.ret, func.symbol)?;
        for (i, param) in func.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if func.is_definition() {
                out.push_str(&self.operand(*param));
            } else {
                write!(out, "{}", self.value_type(*param))?;
            }
        }
        if func.sig.variadic {
            out.push_str(if func.params.is_empty() { "..." } else { ", ..." });
        }
        out.push(')');
        if !func.is_definition() {
            out.push('\n');
            return Ok(());
        }
        out.push_str(" {\n");
        for &block in &func.blocks {
            writeln!(out, "{}:", self.label(block))?;
            if let Some(b) = self.block(block) {
                for inst in &b.insts {
                    self.write_inst(out, inst)?;
                }
            }
        }
        out.push_str("}\n");
        Ok(())
    }

    fn listing(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        writeln!(out, "; module {}", self.name)?;
        for global in &self.globals {
            if global.external {
                writeln!(out, "@{} = external global {}", global.symbol, global.ty)?;
            } else {
                let init = global
                    .init
                    .map_or_else(|| "zeroinitializer".to_owned(), |c| c.to_string());
                writeln!(out, "@{} = global {} {init}", global.symbol, global.ty)?;
            }
        }
        for (i, text) in self.strings.iter().enumerate() {
            writeln!(out, "@.str.{i} = constant {text:?}")?;
        }
        for func in &self.functions {
            out.push('\n');
            self.write_function(&mut out, func)?;
        }
        Ok(out)
    }
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.listing()?)
    }
}
