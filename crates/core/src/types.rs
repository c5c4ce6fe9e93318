//! EFX static types.
//!
//! Every translated expression carries a [`ExpressionKind`]: one of the EFX
//! value types combined with a cardinality. The set is closed; consumers match
//! on it exhaustively.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EfxType {
    Boolean,
    Numeric,
    String,
    Date,
    Time,
    Duration,
    /// Untyped node locations (section/node references, iterator clauses).
    Path,
}

impl EfxType {
    /// Map a data-model type name (as declared in the field metadata) to its EFX type.
    pub fn from_data_type(data_type: &str) -> Option<Self> {
        match data_type {
            "text" | "text-multilingual" | "code" | "internal-code" | "id" | "id-ref" | "url"
            | "email" | "phone" => Some(EfxType::String),
            "number" | "integer" | "amount" => Some(EfxType::Numeric),
            "date" => Some(EfxType::Date),
            "time" => Some(EfxType::Time),
            "measure" => Some(EfxType::Duration),
            "indicator" => Some(EfxType::Boolean),
            _ => None,
        }
    }

    /// Name used by EFX type casts and iterator declarations, e.g. `(text)`.
    pub fn cast_name(self) -> Option<&'static str> {
        match self {
            EfxType::Boolean => Some("indicator"),
            EfxType::Numeric => Some("number"),
            EfxType::String => Some("text"),
            EfxType::Date => Some("date"),
            EfxType::Time => Some("time"),
            EfxType::Duration => Some("measure"),
            EfxType::Path => None,
        }
    }

    pub fn from_cast_name(name: &str) -> Option<Self> {
        match name {
            "indicator" => Some(EfxType::Boolean),
            "number" => Some(EfxType::Numeric),
            "text" => Some(EfxType::String),
            "date" => Some(EfxType::Date),
            "time" => Some(EfxType::Time),
            "measure" => Some(EfxType::Duration),
            _ => None,
        }
    }

    pub const fn scalar(self) -> ExpressionKind {
        ExpressionKind { ty: self, cardinality: Cardinality::Scalar }
    }

    pub const fn sequence(self) -> ExpressionKind {
        ExpressionKind { ty: self, cardinality: Cardinality::Sequence }
    }
}

impl fmt::Display for EfxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EfxType::Boolean => "boolean",
            EfxType::Numeric => "numeric",
            EfxType::String => "string",
            EfxType::Date => "date",
            EfxType::Time => "time",
            EfxType::Duration => "duration",
            EfxType::Path => "path",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Scalar,
    Sequence,
}

/// The type tag of a translated expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpressionKind {
    pub ty: EfxType,
    pub cardinality: Cardinality,
}

impl ExpressionKind {
    pub const BOOLEAN: Self = EfxType::Boolean.scalar();
    pub const NUMERIC: Self = EfxType::Numeric.scalar();
    pub const STRING: Self = EfxType::String.scalar();
    pub const DATE: Self = EfxType::Date.scalar();
    pub const TIME: Self = EfxType::Time.scalar();
    pub const DURATION: Self = EfxType::Duration.scalar();
    pub const PATH: Self = EfxType::Path.scalar();
    pub const PATH_SEQUENCE: Self = EfxType::Path.sequence();

    pub fn is_sequence(self) -> bool {
        self.cardinality == Cardinality::Sequence
    }

    pub fn is_path(self) -> bool {
        self.ty == EfxType::Path
    }

    /// Same type, sequence cardinality.
    #[must_use]
    pub fn as_sequence(self) -> Self {
        self.ty.sequence()
    }

    /// Same type, scalar cardinality.
    #[must_use]
    pub fn as_scalar(self) -> Self {
        self.ty.scalar()
    }

    /// A value of `self` may be used where `expected` is required: identical
    /// tags, or a scalar standing in for a sequence of the same type.
    pub fn is_assignable_to(self, expected: ExpressionKind) -> bool {
        self == expected
            || (self.ty == expected.ty
                && self.cardinality == Cardinality::Scalar
                && expected.cardinality == Cardinality::Sequence)
    }
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cardinality {
            Cardinality::Scalar => write!(f, "{}", self.ty),
            Cardinality::Sequence => write!(f, "{} sequence", self.ty),
        }
    }
}
