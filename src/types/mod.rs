//! # Value Codecs
//!
//! Every Rust type that can be stored in a property implements
//! [`PropertyValue`]: a string codec, a total order used to sort UI tables,
//! an optional arithmetic capability and the conversion to and from the
//! type-erased [`Value`](crate::model::Value).
//!
//! Which operators a value supports is decided at runtime through
//! [`ValueKind`], consulted first by every wrapper operator:
//!
//! | Kind | Ordering | Arithmetic | Types |
//! |------|----------|------------|-------|
//! | `Numeric` | yes | yes | `i32`, `f64`, `Color`, `Vec3f` |
//! | `Scalar` | yes | no | `bool`, `String`, graph reference |
//! | `Collection` | no | no | `Vec<T>`, edge sets |

pub mod scalar;
pub mod vector;

use std::cmp::Ordering;
use std::fmt;

use crate::model::Value;

pub use vector::{join_vector, tokenize};

// ============================================================================
// Capabilities
// ============================================================================

/// Operator capability class of a value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Ordered and closed under `+ - * /`.
    Numeric,
    /// Ordered, no arithmetic.
    Scalar,
    /// Vectors and sets: equality only.
    Collection,
}

impl ValueKind {
    pub fn allows_ordering(self) -> bool {
        !matches!(self, ValueKind::Collection)
    }

    pub fn allows_arithmetic(self) -> bool {
        matches!(self, ValueKind::Numeric)
    }
}

/// The four wrapper arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// PropertyValue
// ============================================================================

/// A type storable as a node or edge value.
pub trait PropertyValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Name used in diagnostics (`"double"`, `"vector<int>"`, ...).
    const TYPE_NAME: &'static str;
    const KIND: ValueKind;

    /// Canonical text form; `parse(&v.to_text())` gives back `v`.
    fn to_text(&self) -> String;

    /// Parses the canonical form (and lenient variants); `None` if malformed.
    fn parse(text: &str) -> Option<Self>;

    /// Total order. Floats use IEEE `totalOrder`.
    fn total_cmp(&self, other: &Self) -> Ordering;

    /// `self op rhs`; `None` when the type has no arithmetic or the
    /// operation overflows or divides an integral value by zero.
    fn apply(&self, _op: ArithOp, _rhs: &Self) -> Option<Self> {
        None
    }

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Option<Self>;
}

/// A scalar usable as a vector element.
pub trait VectorElement: PropertyValue {
    /// Type name of `Vec<Self>`.
    const VECTOR_TYPE_NAME: &'static str;

    /// Text of the element inside a vector literal.
    fn element_to_text(&self) -> String {
        self.to_text()
    }

    fn parse_element(token: &str) -> Option<Self> {
        Self::parse(token)
    }

    fn wrap_vector(values: Vec<Self>) -> Value;

    fn unwrap_vector(value: Value) -> Option<Vec<Self>>;
}
