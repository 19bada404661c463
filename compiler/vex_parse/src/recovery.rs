//! Panic-mode recovery.
//!
//! Token sets are `u128` bitsets indexed by `TokenKind` discriminant, so
//! membership is one AND.

use vex_ir::TokenKind;

use crate::cursor::Cursor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TokenSet(u128);

impl TokenSet {
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | (1u128 << kind.discriminant_index()))
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, kind: TokenKind) -> bool {
        (self.0 & (1u128 << kind.discriminant_index())) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Tokens a statement can start with.
pub const STMT_FIRST: TokenSet = TokenSet::new()
    .with(TokenKind::Fn)
    .with(TokenKind::Return)
    .with(TokenKind::If)
    .with(TokenKind::While)
    .with(TokenKind::For)
    .with(TokenKind::Break)
    .with(TokenKind::Continue)
    .with(TokenKind::Import)
    .with(TokenKind::Struct)
    .with(TokenKind::Global)
    .with(TokenKind::Generic)
    .with(TokenKind::Module)
    .with(TokenKind::LBrace)
    .with(TokenKind::Ident)
    .with(TokenKind::Star);

/// Tokens that only ever start a statement.
pub const STMT_KEYWORDS: TokenSet = TokenSet::new()
    .with(TokenKind::Fn)
    .with(TokenKind::Return)
    .with(TokenKind::If)
    .with(TokenKind::While)
    .with(TokenKind::For)
    .with(TokenKind::Break)
    .with(TokenKind::Continue)
    .with(TokenKind::Import)
    .with(TokenKind::Struct)
    .with(TokenKind::Global)
    .with(TokenKind::Generic)
    .with(TokenKind::Module);

/// Where statement recovery stops: a statement keyword, or the end of the
/// enclosing block.
pub const STMT_RECOVERY: TokenSet = STMT_KEYWORDS.with(TokenKind::RBrace);

/// Skip tokens until one in `recovery` outside any nested braces, or just
/// past a `;` or a brace group at that level. Returns `false` if input
/// ran out.
pub(crate) fn synchronize(cursor: &mut Cursor<'_>, recovery: TokenSet) -> bool {
    let mut depth = 0usize;
    while !cursor.is_at_end() {
        let kind = cursor.kind();
        if depth == 0 {
            if recovery.contains(kind) {
                return true;
            }
            if kind == TokenKind::Semi {
                cursor.bump();
                return true;
            }
        }
        cursor.bump();
        match kind {
            TokenKind::LBrace => depth += 1,
            // A closed group ends the broken statement.
            TokenKind::RBrace if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests;
