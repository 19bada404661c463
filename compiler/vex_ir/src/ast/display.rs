//! S-expression printer for the AST, used by `--emit-ast` and tests.

use std::fmt::{self, Write};

use super::{IfLink, LoopCtrl, Node, NodeKind, NumValue, OffsetKind, SizeofArg};

fn qualified(f: &mut fmt::Formatter<'_>, module: &[String], name: &str) -> fmt::Result {
    for seg in module {
        write!(f, "{seg}::")?;
    }
    f.write_str(name)
}

fn list(f: &mut fmt::Formatter<'_>, items: &[Node]) -> fmt::Result {
    for item in items {
        write!(f, " {item}")?;
    }
    Ok(())
}

fn chain(f: &mut fmt::Formatter<'_>, link: &IfLink) -> fmt::Result {
    match link {
        IfLink::Arm { cond, body, next } => {
            write!(f, " {cond} {body}")?;
            chain(f, next)
        }
        IfLink::Else(body) => write!(f, " else {body}"),
        IfLink::Fi => Ok(()),
    }
}

impl fmt::Display for NumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumValue::Int(v) => write!(f, "{v}"),
            NumValue::Float(v) => write!(f, "{v:?}"),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Num(v) => write!(f, "{v}"),
            NodeKind::Boolean(b) => write!(f, "{b}"),
            NodeKind::Str(s) => write!(f, "{s:?}"),
            NodeKind::Variable {
                module,
                name,
                offsets,
            } => {
                qualified(f, module, name)?;
                for op in offsets {
                    match &op.kind {
                        OffsetKind::Index(idx) => write!(f, "[{idx}]")?,
                        OffsetKind::Member(m) => write!(f, ".{m}")?,
                        OffsetKind::MethodCall { name, args } => {
                            write!(f, ".{name}(")?;
                            let mut sep = "";
                            for arg in args {
                                write!(f, "{sep}{arg}")?;
                                sep = " ";
                            }
                            f.write_char(')')?;
                        }
                    }
                }
                Ok(())
            }
            NodeKind::BinOp { op, lhs, rhs } => write!(f, "({} {lhs} {rhs})", op.as_symbol()),
            NodeKind::UnaryOp { op, operand } => write!(f, "({} {operand})", op.as_symbol()),
            NodeKind::TypeTrans { expr, target } => write!(f, "(as {expr} {target})"),
            NodeKind::Sizeof(SizeofArg::Type(ty)) => write!(f, "(sizeof {ty})"),
            NodeKind::Sizeof(SizeofArg::Expr(e)) => write!(f, "(sizeof {e})"),
            NodeKind::FunctionCall { module, name, args } => {
                f.write_str("(call ")?;
                qualified(f, module, name)?;
                list(f, args)?;
                f.write_char(')')
            }
            NodeKind::Object { module, name, args } => {
                f.write_str("(object ")?;
                qualified(f, module, name)?;
                list(f, args)?;
                f.write_char(')')
            }
            NodeKind::ArrayInit(items) => {
                f.write_str("(array")?;
                list(f, items)?;
                f.write_char(')')
            }
            NodeKind::BlockExpr { stmts, value } => {
                f.write_str("(block")?;
                list(f, stmts)?;
                write!(f, " {value})")
            }
            NodeKind::Compound(stmts) => {
                f.write_str("(do")?;
                list(f, stmts)?;
                f.write_char(')')
            }
            NodeKind::Assign {
                target,
                declared,
                value,
            } => {
                match declared {
                    Some(ty) => write!(f, "(let {target} {ty}")?,
                    None => write!(f, "(= {target}")?,
                }
                if let Some(value) = value {
                    write!(f, " {value}")?;
                }
                f.write_char(')')
            }
            NodeKind::If { chain: link, .. } => {
                f.write_str("(if")?;
                chain(f, link)?;
                f.write_char(')')
            }
            NodeKind::While { cond, body } => write!(f, "(while {cond} {body})"),
            NodeKind::For {
                init,
                cond,
                step,
                body,
            } => write!(f, "(for {init} {cond} {step} {body})"),
            NodeKind::LoopCtrl(LoopCtrl::Break) => f.write_str("(break)"),
            NodeKind::LoopCtrl(LoopCtrl::Continue) => f.write_str("(continue)"),
            NodeKind::Return(None) => f.write_str("(return)"),
            NodeKind::Return(Some(e)) => write!(f, "(return {e})"),
            NodeKind::FunctionDecl(decl) => {
                write!(f, "(fn {} (", decl.name)?;
                let mut sep = "";
                for p in &decl.params {
                    write!(f, "{sep}{p}")?;
                    sep = " ";
                }
                if decl.variadic {
                    write!(f, "{sep}...")?;
                }
                write!(f, ") {}", decl.ret)?;
                if let Some(body) = &decl.body {
                    write!(f, " {body}")?;
                }
                f.write_char(')')
            }
            NodeKind::Param { name, ty } => write!(f, "({name} {ty})"),
            NodeKind::Generic(decl) => {
                write!(f, "(generic {} {}", decl.name, decl.index)?;
                for (ty, target) in &decl.entries {
                    write!(f, " ({ty} {target})")?;
                }
                if let Some(target) = &decl.default {
                    write!(f, " (default {target})")?;
                }
                f.write_char(')')
            }
            NodeKind::Global { name, ty, value } => {
                write!(f, "(global {name} {ty}")?;
                if let Some(value) = value {
                    write!(f, " {value}")?;
                }
                f.write_char(')')
            }
            NodeKind::Import { path, rename } => {
                write!(f, "(import {}", path.join("::"))?;
                if let Some(alias) = rename {
                    write!(f, " as {alias}")?;
                }
                f.write_char(')')
            }
            NodeKind::StructDecl(decl) => {
                write!(f, "(struct {}", decl.name)?;
                for (name, ty) in &decl.members {
                    write!(f, " ({name} {ty})")?;
                }
                f.write_char(')')
            }
            NodeKind::ModuleDecl(path) => write!(f, "(module {})", path.join("::")),
            NodeKind::NoneAst => f.write_str("()"),
        }
    }
}
