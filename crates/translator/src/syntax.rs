//! Owned syntax tree produced by the front end and the enter/exit walk the
//! translation passes are driven by.

use core::ops::Range;
use efx_core::{EfxType, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonOperator {
    pub(crate) fn from_token(token: &str) -> Option<Self> {
        match token {
            "==" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            "<" => Some(Self::Less),
            "<=" => Some(Self::LessOrEqual),
            ">" => Some(Self::Greater),
            ">=" => Some(Self::GreaterOrEqual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOperator {
    pub(crate) fn from_token(token: &str) -> Option<Self> {
        match token {
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "*" => Some(Self::Multiply),
            "/" | "div" => Some(Self::Divide),
            "%" | "mod" => Some(Self::Modulo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Some,
    Every,
}

/// Built-in EFX functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Not,
    Contains,
    StartsWith,
    EndsWith,
    Count,
    Sum,
    Min,
    Max,
    Number,
    StringLength,
    String,
    Substring,
    Concat,
    FormatNumber,
    UpperCase,
    LowerCase,
    StringJoin,
    DistinctValues,
    Date,
    Time,
    DayTimeDuration,
    YearMonthDuration,
}

impl Function {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "not" => Self::Not,
            "contains" => Self::Contains,
            "starts-with" => Self::StartsWith,
            "ends-with" => Self::EndsWith,
            "count" => Self::Count,
            "sum" => Self::Sum,
            "min" => Self::Min,
            "max" => Self::Max,
            "number" => Self::Number,
            "string-length" => Self::StringLength,
            "string" => Self::String,
            "substring" => Self::Substring,
            "concat" => Self::Concat,
            "format-number" => Self::FormatNumber,
            "upper-case" => Self::UpperCase,
            "lower-case" => Self::LowerCase,
            "string-join" => Self::StringJoin,
            "distinct-values" => Self::DistinctValues,
            "date" => Self::Date,
            "time" => Self::Time,
            "day-time-duration" => Self::DayTimeDuration,
            "year-month-duration" => Self::YearMonthDuration,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Not => "not",
            Self::Contains => "contains",
            Self::StartsWith => "starts-with",
            Self::EndsWith => "ends-with",
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Number => "number",
            Self::StringLength => "string-length",
            Self::String => "string",
            Self::Substring => "substring",
            Self::Concat => "concat",
            Self::FormatNumber => "format-number",
            Self::UpperCase => "upper-case",
            Self::LowerCase => "lower-case",
            Self::StringJoin => "string-join",
            Self::DistinctValues => "distinct-values",
            Self::Date => "date",
            Self::Time => "time",
            Self::DayTimeDuration => "day-time-duration",
            Self::YearMonthDuration => "year-month-duration",
        }
    }
}

/// Grammar production of a [`SyntaxNode`].
///
/// Identifiers are stored without sigils (`$`, `#`); binary chains are already
/// folded into nested left-associative nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Production {
    Logical(LogicalOperator),
    Comparison(ComparisonOperator),
    Presence { negated: bool },
    Emptiness { negated: bool },
    InList { negated: bool },
    Like { negated: bool },
    UniqueIn { negated: bool },
    Arithmetic(ArithmeticOperator),
    Negation,
    Parenthesized,
    Conditional,
    List,
    Codelist(String),
    Iteration,
    Quantified(Quantifier),
    IteratorList,
    Iterator { ty: EfxType, variable: String },
    ContextIterator { variable: String },
    FunctionCall(Function),
    LateBoundValue,
    TypeCast(EfxType),
    ReferenceSequence,
    NoticeReference(String),
    ContextOverride,
    AxisReference(String),
    AttributeReference(String),
    PredicatedReference,
    Predicate,
    FieldContext(String),
    NodeContext(String),
    VariableContext(String),
    FieldReference(String),
    NodeReference(String),
    Variable(String),
    StringLiteral,
    NumericLiteral,
    BooleanLiteral(bool),
    DateLiteral,
    TimeLiteral,
    DurationLiteral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub production: Production,
    /// Byte range in the parsed source.
    pub span: Range<usize>,
    pub text: String,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn child(&self, index: usize) -> Option<&SyntaxNode> {
        self.children.get(index)
    }

    pub fn type_cast(&self) -> Option<EfxType> {
        self.children.iter().find_map(|child| match child.production {
            Production::TypeCast(ty) => Some(ty),
            _ => None,
        })
    }

    /// The field, node or attribute a reference path ultimately points at.
    pub fn reference_target(&self) -> Option<ReferenceTarget<'_>> {
        match &self.production {
            Production::FieldReference(id) | Production::FieldContext(id) => Some(ReferenceTarget::Field(id)),
            Production::NodeReference(id) | Production::NodeContext(id) => Some(ReferenceTarget::Node(id)),
            Production::Variable(name) => Some(ReferenceTarget::Variable(name)),
            Production::AttributeReference(name) => Some(ReferenceTarget::Attribute(name)),
            Production::PredicatedReference
            | Production::AxisReference(_)
            | Production::ReferenceSequence => self.children.first()?.reference_target(),
            Production::LateBoundValue
            | Production::ContextOverride
            | Production::NoticeReference(_) => self.children.last()?.reference_target(),
            _ => None,
        }
    }

    /// The plain field or node reference a predicate on `self` qualifies.
    pub fn simple_reference(&self) -> Option<&SyntaxNode> {
        match self.production {
            Production::FieldReference(_) | Production::NodeReference(_) => Some(self),
            Production::PredicatedReference => self.children.first()?.simple_reference(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTarget<'a> {
    Field(&'a str),
    Node(&'a str),
    Attribute(&'a str),
    Variable(&'a str),
}

/// Receives enter/exit events for every node, depth first, left to right.
pub trait Listener {
    fn enter(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) -> Result<()> {
        Ok(())
    }

    fn exit(&mut self, _node: &SyntaxNode, _parent: Option<&SyntaxNode>) -> Result<()> {
        Ok(())
    }
}

pub fn walk<L: Listener + ?Sized>(listener: &mut L, root: &SyntaxNode) -> Result<()> {
    walk_node(listener, root, None)
}

fn walk_node<L: Listener + ?Sized>(listener: &mut L, node: &SyntaxNode, parent: Option<&SyntaxNode>) -> Result<()> {
    listener.enter(node, parent)?;
    for child in &node.children {
        walk_node(listener, child, Some(node))?;
    }
    listener.exit(node, parent)
}
