//! Tokens produced by the lexer.

use std::fmt;

use crate::Position;

/// Token kinds for Vex.
///
/// Fieldless so a kind fits a `u128` bitset (see `TokenSet` in the parser).
/// Literal payloads live in [`TokenValue`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum TokenKind {
    /// End of input. Returned forever once reached.
    End,

    Int,
    Float,
    Char,
    Str,
    Ident,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Colon,
    Dot,
    Ellipsis,
    Arrow,
    FatArrow,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    AmpAmp,
    PipePipe,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,

    // Keywords
    Fn,
    Return,
    If,
    Elif,
    Else,
    While,
    For,
    Break,
    Continue,
    Import,
    As,
    Struct,
    Global,
    Generic,
    Sizeof,
    True,
    False,
    Module,
    Default,
    Grad,
}

impl TokenKind {
    /// Highest discriminant, for bitset width checks.
    pub const MAX_DISCRIMINANT: u8 = TokenKind::Grad as u8;

    /// Reserved keyword lookup. Only called for unqualified identifiers.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "fn" => TokenKind::Fn,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "import" => TokenKind::Import,
            "as" => TokenKind::As,
            "struct" => TokenKind::Struct,
            "global" => TokenKind::Global,
            "generic" => TokenKind::Generic,
            "sizeof" => TokenKind::Sizeof,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "module" => TokenKind::Module,
            "default" => TokenKind::Default,
            "grad" => TokenKind::Grad,
            _ => return None,
        };
        Some(kind)
    }

    /// Bit index used by token sets.
    #[inline]
    pub const fn discriminant_index(self) -> u8 {
        self as u8
    }

    /// Source spelling (or a description for literal kinds), for messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::End => "end of input",
            TokenKind::Int => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::Char => "char literal",
            TokenKind::Str => "string literal",
            TokenKind::Ident => "identifier",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Ellipsis => "...",
            TokenKind::Arrow => "->",
            TokenKind::FatArrow => "=>",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Bang => "!",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::Fn => "fn",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Import => "import",
            TokenKind::As => "as",
            TokenKind::Struct => "struct",
            TokenKind::Global => "global",
            TokenKind::Generic => "generic",
            TokenKind::Sizeof => "sizeof",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Module => "module",
            TokenKind::Default => "default",
            TokenKind::Grad => "grad",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::End
            | TokenKind::Int
            | TokenKind::Float
            | TokenKind::Char
            | TokenKind::Str
            | TokenKind::Ident => f.write_str(self.describe()),
            _ => write!(f, "`{}`", self.describe()),
        }
    }
}

/// Literal payload of a token.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum TokenValue {
    #[default]
    None,
    Int(u128),
    Float(f64),
    Char(u8),
    Str(String),
    Ident(String),
}

/// A positioned token.
///
/// `module_path` holds the leading segments of a `::`-qualified identifier
/// (`a::b::c` has `module_path = ["a", "b"]` and value `Ident("c")`); it is
/// empty for every other token.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub line: u32,
    pub column: u32,
    pub module_path: Vec<String>,
}

impl Token {
    /// A token without payload.
    pub fn new(kind: TokenKind, pos: Position) -> Self {
        Token {
            kind,
            value: TokenValue::None,
            line: pos.line,
            column: pos.column,
            module_path: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: TokenValue) -> Self {
        self.value = value;
        self
    }

    /// Placeholder token for synthesized nodes.
    pub fn synthetic(kind: TokenKind) -> Self {
        Token::new(kind, Position::START)
    }

    #[inline]
    pub fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Identifier text (also for keywords mis-used as names: returns `None`).
    pub fn ident(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Ident(name) => Some(name),
            _ => None,
        }
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TokenValue::None => write!(f, "{}", self.kind),
            TokenValue::Int(v) => write!(f, "`{v}`"),
            TokenValue::Float(v) => write!(f, "`{v}`"),
            TokenValue::Char(c) => write!(f, "`'{}'`", char::from(*c).escape_default()),
            TokenValue::Str(s) => write!(f, "`{s:?}`"),
            TokenValue::Ident(name) => {
                f.write_str("`")?;
                for seg in &self.module_path {
                    write!(f, "{seg}::")?;
                }
                write!(f, "{name}`")
            }
        }
    }
}

#[cfg(test)]
mod tests;
