use crate::types::{Cardinality, EfxType, ExpressionKind};
use core::fmt;

/// A fragment of emitted target-language text together with its EFX type.
///
/// Immutable once constructed; retagging produces a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    script: String,
    kind: ExpressionKind,
}

const EMPTY_SEQUENCE: &str = "()";

impl Expression {
    pub fn new(script: impl Into<String>, kind: ExpressionKind) -> Self {
        Self { script: script.into(), kind }
    }

    pub fn scalar(script: impl Into<String>, ty: EfxType) -> Self {
        Self::new(script, ty.scalar())
    }

    pub fn sequence(script: impl Into<String>, ty: EfxType) -> Self {
        Self::new(script, ty.sequence())
    }

    pub fn path(script: impl Into<String>) -> Self {
        Self::new(script, ExpressionKind::PATH)
    }

    /// The empty sequence. Its element type is unknown, so it is tagged as a
    /// path sequence and retagged to whatever sequence kind consumes it.
    pub fn empty_sequence() -> Self {
        Self::new(EMPTY_SEQUENCE, ExpressionKind::PATH_SEQUENCE)
    }

    pub fn is_empty_sequence(&self) -> bool {
        self.kind.cardinality == Cardinality::Sequence && self.script == EMPTY_SEQUENCE
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn kind(&self) -> ExpressionKind {
        self.kind
    }

    pub fn ty(&self) -> EfxType {
        self.kind.ty
    }

    pub fn into_script(self) -> String {
        self.script
    }

    #[must_use]
    pub fn with_kind(self, kind: ExpressionKind) -> Self {
        Self { script: self.script, kind }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.script)
    }
}
