//! Type sub-grammar.
//!
//! ```text
//! type   = base { "[" INT "]" | "*" }
//! base   = scalar | "void" | "vec" "<" scalar "," INT ">" | struct-name
//! ```

use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{Scalar, TokenKind, TokenValue, Type};
use vex_types::TypeError;

use crate::recovery::TokenSet;
use crate::Parser;

/// After `as T*`, a `*` followed by one of these is multiplication.
const OPERAND_START: TokenSet = TokenSet::new()
    .with(TokenKind::Int)
    .with(TokenKind::Float)
    .with(TokenKind::Char)
    .with(TokenKind::Str)
    .with(TokenKind::Ident)
    .with(TokenKind::True)
    .with(TokenKind::False)
    .with(TokenKind::LParen)
    .with(TokenKind::LBracket)
    .with(TokenKind::Sizeof)
    .with(TokenKind::Grad)
    .with(TokenKind::Bang)
    .with(TokenKind::Tilde);

impl Parser<'_, '_> {
    pub(crate) fn parse_type(&mut self) -> CompileResult<Type> {
        self.type_with_suffixes(false)
    }

    /// Target type of `as`: stops before a `*` that multiplies.
    pub(crate) fn parse_cast_type(&mut self) -> CompileResult<Type> {
        self.type_with_suffixes(true)
    }

    fn type_with_suffixes(&mut self, in_cast: bool) -> CompileResult<Type> {
        let start = self.pos();
        let mut ty = self.base_type()?;
        loop {
            if self.check(TokenKind::LBracket) {
                if ty.is_void() {
                    return Err(TypeError::VoidValue.at(start));
                }
                self.bump();
                let len = self.array_length()?;
                self.expect(TokenKind::RBracket)?;
                ty = Type::Array(Box::new(ty), len);
            } else if self.check(TokenKind::Star) {
                if in_cast && OPERAND_START.contains(self.cursor.peek_kind()) {
                    break;
                }
                self.bump();
                ty = ty.pointer_to();
            } else {
                break;
            }
        }
        Ok(ty)
    }

    fn array_length(&mut self) -> CompileResult<u64> {
        let tok = self.current().clone();
        match tok.value {
            TokenValue::Int(n) if tok.is(TokenKind::Int) => {
                self.bump();
                u64::try_from(n)
                    .map_err(|_| CompileError::syntax(tok.pos(), "array length is too large"))
            }
            _ => Err(CompileError::syntax(
                tok.pos(),
                format!("array length must be an integer constant, found {tok}"),
            )),
        }
    }

    fn base_type(&mut self) -> CompileResult<Type> {
        let tok = self.current().clone();
        let Some(name) = tok.ident() else {
            return Err(self.unexpected("a type"));
        };
        if tok.module_path.is_empty() {
            if let Some(scalar) = Scalar::from_name(name) {
                self.bump();
                return Ok(Type::Scalar(scalar));
            }
            match name {
                "void" => {
                    self.bump();
                    return Ok(Type::Void);
                }
                "vec" if self.cursor.peek_kind() == TokenKind::Lt => {
                    self.bump();
                    return self.vector_type();
                }
                _ => {}
            }
            if let Some(own) = self.declaring.as_ref().filter(|q| q.name == name) {
                let ty = Type::Struct(own.clone());
                self.bump();
                return Ok(ty);
            }
        }
        match self.lookup_struct(&tok.module_path, name) {
            Some(qualified) => {
                self.bump();
                Ok(Type::Struct(qualified))
            }
            None => Err(CompileError::missing(
                tok.pos(),
                format!("undefined type {tok}"),
            )),
        }
    }

    /// `vec<scalar, N>`, after `vec`.
    fn vector_type(&mut self) -> CompileResult<Type> {
        self.expect(TokenKind::Lt)?;
        let elem_pos = self.pos();
        let elem = self.parse_type()?;
        let Some(scalar) = elem.as_scalar() else {
            return Err(TypeError::VectorElement(elem).at(elem_pos));
        };
        self.expect(TokenKind::Comma)?;
        let len_pos = self.pos();
        let len = u32::try_from(self.array_length()?)
            .map_err(|_| CompileError::syntax(len_pos, "vector length is too large"))?;
        self.expect(TokenKind::Gt)?;
        Ok(Type::Vector(scalar, len))
    }
}
