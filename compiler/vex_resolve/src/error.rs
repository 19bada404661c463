use vex_diagnostic::{CompileError, ErrorKind};
use vex_ir::Position;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("undefined module `{0}`")]
    UnknownModule(String),

    #[error("generic `{0}` is already defined")]
    GenericRedefinition(String),

    #[error("generic `{generic}` has no implementation for type `{ty}`")]
    NoGenericMatch { generic: String, ty: String },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::UnknownModule(_) | ResolveError::NoGenericMatch { .. } => {
                ErrorKind::Missing
            }
            ResolveError::GenericRedefinition(_) => ErrorKind::Logic,
        }
    }

    pub fn at(self, pos: Position) -> CompileError {
        CompileError::new(self.kind(), pos, self.to_string())
    }
}
