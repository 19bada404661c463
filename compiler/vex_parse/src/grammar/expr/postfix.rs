//! Offset chains: `[index]`, `.member`, `.method(args)`.

use smallvec::SmallVec;
use vex_diagnostic::CompileResult;
use vex_ir::{OffsetKind, OffsetOp, TokenKind};

use crate::Parser;

impl Parser<'_, '_> {
    /// Offsets after a variable name, in source order.
    pub(crate) fn offsets(&mut self) -> CompileResult<SmallVec<[OffsetOp; 2]>> {
        let mut offsets = SmallVec::new();
        loop {
            match self.cursor.kind() {
                TokenKind::LBracket => {
                    let token = self.bump();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    offsets.push(OffsetOp {
                        kind: OffsetKind::Index(Box::new(index)),
                        token,
                    });
                }
                TokenKind::Dot => {
                    self.bump();
                    let (token, name) = self.expect_name("a member name")?;
                    let kind = if self.eat(TokenKind::LParen) {
                        let args = self.comma_list(TokenKind::RParen)?;
                        OffsetKind::MethodCall { name, args }
                    } else {
                        OffsetKind::Member(name)
                    };
                    offsets.push(OffsetOp { kind, token });
                }
                _ => return Ok(offsets),
            }
        }
    }
}
