//! Import discovery without a full parse.
//!
//! The build graph needs each unit's imports before any unit is compiled,
//! and before the structs those units declare exist. This scans top-level
//! tokens only; anything inside braces is ignored.

use vex_ir::{Position, Token, TokenKind};
use vex_lexer::Lexer;

/// One `import` found by [`scan_imports`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannedImport {
    pub path: Vec<String>,
    pub rename: Option<String>,
    pub pos: Position,
}

/// Top-level `module` and `import` statements of a unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportScan {
    /// The last `module` declaration, if any.
    pub module: Option<Vec<String>>,
    pub imports: Vec<ScannedImport>,
}

fn path_of(tok: &Token) -> Option<Vec<String>> {
    let last = tok.ident()?;
    let mut path = tok.module_path.clone();
    path.push(last.to_owned());
    Some(path)
}

/// Best effort: lexical errors are skipped, malformed statements ignored.
pub fn scan_imports(source: &str) -> ImportScan {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        match lexer.next_token() {
            Ok(tok) if tok.is(TokenKind::End) => break,
            Ok(tok) => tokens.push(tok),
            Err(_) => {}
        }
    }

    let mut scan = ImportScan::default();
    let mut depth = 0usize;
    let mut i = 0;
    while i < tokens.len() {
        let tok = &tokens[i];
        match tok.kind {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => depth = depth.saturating_sub(1),
            TokenKind::Module if depth == 0 => {
                if let Some(path) = tokens.get(i + 1).and_then(path_of) {
                    scan.module = Some(path);
                    i += 1;
                }
            }
            TokenKind::Import if depth == 0 => {
                if let Some(path) = tokens.get(i + 1).and_then(path_of) {
                    let rename = match (tokens.get(i + 2), tokens.get(i + 3)) {
                        (Some(kw), Some(alias)) if kw.is(TokenKind::As) => {
                            alias.ident().map(str::to_owned)
                        }
                        _ => None,
                    };
                    i += if rename.is_some() { 3 } else { 1 };
                    scan.imports.push(ScannedImport {
                        path,
                        rename,
                        pos: tok.pos(),
                    });
                }
            }
            _ => {}
        }
        i += 1;
    }
    scan
}
