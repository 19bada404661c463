//! Declarations: `module`, `import`, `struct`, `global`, `generic`, `fn`.

use tracing::{debug, trace};
use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{
    FunctionDecl, GenericDecl, ModulePath, Node, NodeKind, QualifiedName, StructDecl, Token,
    TokenKind, TokenValue, Type,
};

use crate::Parser;

impl Parser<'_, '_> {
    /// A module path spelled as one (possibly qualified) identifier.
    fn module_path(&mut self, what: &str) -> CompileResult<(Token, Vec<String>)> {
        let (tok, mut segments, last) = self.expect_path(what)?;
        segments.push(last);
        Ok((tok, segments))
    }

    /// `module a::b;`
    pub(crate) fn module_decl(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        let (_, path) = self.module_path("a module path")?;
        self.end_statement(kw.pos())?;
        self.resolver.set_current(ModulePath::new(path.clone()));
        Ok(Node::new(NodeKind::ModuleDecl(path), kw))
    }

    /// `import a::b;` or `import a::b as c;`
    pub(crate) fn import(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        let (_, path) = self.module_path("a module path")?;
        let rename = if self.eat(TokenKind::As) {
            Some(self.expect_name("an import alias")?.1)
        } else {
            None
        };
        self.end_statement(kw.pos())?;
        // Lowering reports unknown modules; here only struct lookup cares.
        let _ = self.resolver.resolve_import(&path, rename.as_deref());
        Ok(Node::new(NodeKind::Import { path, rename }, kw))
    }

    /// `struct Name { member: type, ... }`
    ///
    /// Registered in the type registry immediately, so later code in the
    /// unit can construct it.
    pub(crate) fn struct_decl(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        let (name_tok, name) = self.expect_name("a struct name")?;
        let qualified = QualifiedName::new(self.current_module().clone(), name.clone());
        self.expect(TokenKind::LBrace)?;

        let outer = self.declaring.replace(qualified.clone());
        let members = self.struct_members();
        self.declaring = outer;
        let members = members?;

        self.registry
            .register_struct(qualified, members.clone())
            .map_err(|err| err.at(name_tok.pos()))?;
        debug!(name = %name, members = members.len(), "struct");
        Ok(Node::new(
            NodeKind::StructDecl(Box::new(StructDecl { name, members })),
            kw,
        ))
    }

    fn struct_members(&mut self) -> CompileResult<Vec<(String, Type)>> {
        let mut members: Vec<(String, Type)> = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let (tok, member) = self.expect_name("a member name")?;
            if members.iter().any(|(m, _)| *m == member) {
                return Err(CompileError::logic(
                    tok.pos(),
                    format!("member `{member}` is declared twice"),
                ));
            }
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            members.push((member, ty));
            if !self.eat(TokenKind::Comma) && !self.eat(TokenKind::Semi) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(members)
    }

    /// `global name: type [= value];`
    pub(crate) fn global(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        let (_, name) = self.expect_name("a global name")?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let value = if self.eat(TokenKind::Eq) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.end_statement(kw.pos())?;
        Ok(Node::new(NodeKind::Global { name, ty, value }, kw))
    }

    /// `generic name(index) { type: function, ..., default: function }`
    pub(crate) fn generic(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        let (_, name) = self.expect_name("a generic name")?;
        self.expect(TokenKind::LParen)?;
        let index_tok = self.expect(TokenKind::Int)?;
        let index = match index_tok.value {
            TokenValue::Int(v) => usize::try_from(v).map_err(|_| {
                CompileError::syntax(index_tok.pos(), "argument index is too large")
            })?,
            _ => 0,
        };
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;

        let mut entries = Vec::new();
        let mut default = None;
        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Default) {
                let tok = self.bump();
                self.expect(TokenKind::Colon)?;
                if default.is_some() {
                    return Err(CompileError::logic(
                        tok.pos(),
                        format!("generic `{name}` has two defaults"),
                    ));
                }
                default = Some(self.target_function()?);
            } else {
                let ty = self.parse_type()?;
                self.expect(TokenKind::Colon)?;
                entries.push((ty, self.target_function()?));
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        trace!(name = %name, entries = entries.len(), "generic");
        Ok(Node::new(
            NodeKind::Generic(Box::new(GenericDecl {
                name,
                index,
                entries,
                default,
            })),
            kw,
        ))
    }

    /// A dispatch target, qualified as written.
    fn target_function(&mut self) -> CompileResult<QualifiedName> {
        let (_, module, name) = self.expect_path("a function name")?;
        Ok(QualifiedName::new(ModulePath::new(module), name))
    }

    /// `fn name(params) [-> type] { body }` or a bodyless `...;` declaration.
    pub(crate) fn function(&mut self) -> CompileResult<Node> {
        let kw = self.bump();
        let (_, name) = self.expect_name("a function name")?;
        self.expect(TokenKind::LParen)?;

        let mut params = Vec::new();
        let mut variadic = false;
        while !self.check(TokenKind::RParen) {
            if self.check(TokenKind::Ellipsis) {
                let tok = self.bump();
                variadic = true;
                if !self.check(TokenKind::RParen) {
                    return Err(CompileError::syntax(
                        tok.pos(),
                        "`...` must be the last parameter",
                    ));
                }
                break;
            }
            let (tok, pname) = self.expect_name("a parameter name")?;
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            params.push(Node::new(NodeKind::Param { name: pname, ty }, tok));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let ret = if self.eat(TokenKind::Arrow) {
            self.parse_type()?
        } else {
            Type::Void
        };
        let body = if self.eat(TokenKind::Semi) {
            None
        } else {
            Some(Box::new(self.block()?))
        };
        debug!(name = %name, params = params.len(), "fn");
        Ok(Node::new(
            NodeKind::FunctionDecl(Box::new(FunctionDecl {
                name,
                params,
                ret,
                variadic,
                body,
            })),
            kw,
        ))
    }
}
