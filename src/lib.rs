//! # talipot-core: Typed Graph Properties
//!
//! The attribute layer of a graph visualization framework: every node and
//! every edge of a graph carries values of named, typed properties (layout
//! coordinates, colors, sizes, labels, metrics, ...).
//!
//! ## Design Principles
//!
//! 1. **Default plus overrides**: a property stores one default value and a
//!    sparse map of explicit values, so untouched elements cost nothing
//! 2. **Typed core, erased edge**: `Property<K>` is fully typed; generic
//!    tooling works through the object-safe `PropertyInterface`
//! 3. **Observable**: every mutation is announced before and after, with
//!    batching while observers are held
//! 4. **Undoable**: `push`/`pop` checkpoints revert values, defaults and
//!    structure
//!
//! ## Quick Start
//!
//! ```rust
//! use talipot_core::{DoubleKind, Graph, PropertyInterface};
//!
//! # fn main() -> talipot_core::Result<()> {
//! let graph = Graph::new();
//! let n = graph.add_node()?;
//! let weight = graph.typed_property::<DoubleKind>("weight")?;
//!
//! graph.push();
//! weight.set_all_node_value(1.0);
//! assert_eq!(weight.node_value(n), 1.0);
//! graph.pop()?;
//!
//! assert_eq!(weight.node_value(n), 0.0);
//! assert!(!weight.set_node_string_value(n, "not-a-number"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Property Types
//!
//! | Type name | Kind | Node value | Edge value |
//! |-----------|------|------------|------------|
//! | `bool` | `BooleanKind` | `bool` | `bool` |
//! | `int` | `IntegerKind` | `i32` | `i32` |
//! | `double` | `DoubleKind` | `f64` | `f64` |
//! | `string` | `StringKind` | `String` | `String` |
//! | `color` | `ColorKind` | `Color` | `Color` |
//! | `size` | `SizeKind` | `Vec3f` | `Vec3f` |
//! | `layout` | `LayoutKind` | `Vec3f` | `Vec<Vec3f>` |
//! | `graph` | `GraphKind` | `Option<GraphId>` | `BTreeSet<EdgeId>` |
//! | `vector<T>` | `*VectorKind` | `Vec<T>` | `Vec<T>` |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod types;
pub mod storage;
pub mod property;
pub mod observe;
pub mod graph;
pub mod config;
pub mod import;
pub mod export;

mod undo;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Color, Coord, EdgeId, Element, ElementKind, GraphId, NodeId, PropertyId,
    PropertyType, Size, Value, Vec3f,
};

// ============================================================================
// Re-exports: Properties
// ============================================================================

pub use property::{
    EdgeValue, NodeValue, Operand, Property, PropertyInterface, PropertyKind,
    VectorKind, VectorPropertyInterface,
    BooleanKind, IntegerKind, DoubleKind, StringKind, ColorKind, SizeKind,
    LayoutKind, GraphKind,
    BooleanVectorKind, IntegerVectorKind, DoubleVectorKind, StringVectorKind,
    ColorVectorKind, SizeVectorKind, CoordVectorKind,
    BooleanProperty, IntegerProperty, DoubleProperty, StringProperty,
    ColorProperty, SizeProperty, LayoutProperty, GraphProperty,
    BooleanVectorProperty, IntegerVectorProperty, DoubleVectorProperty,
    StringVectorProperty, ColorVectorProperty, SizeVectorProperty,
    CoordVectorProperty,
};

// ============================================================================
// Re-exports: Graph, events, configuration
// ============================================================================

pub use graph::Graph;
pub use observe::{
    Event, EventTarget, GraphEvent, GraphEventKind, HoldGuard, Phase,
    PropertyEvent, Subject, Subscription,
};
pub use config::GraphConfig;
pub use import::ValueImporter;
pub use export::{export_json, to_json};
pub use types::{ArithOp, PropertyValue, ValueKind, VectorElement};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Operator {op} not available for {type_name}")]
    OperatorNotAvailable { op: &'static str, type_name: &'static str },

    #[error("Type mismatch: {lhs} {op} {rhs}")]
    TypeMismatch { op: &'static str, lhs: &'static str, rhs: &'static str },

    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    #[error("Cannot parse {input:?} as {type_name}")]
    Parse { input: String, type_name: &'static str },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Property {name} is a {found} property, not {expected}")]
    PropertyType { name: String, expected: &'static str, found: &'static str },

    #[error("Unknown property type: {0}")]
    UnknownType(String),

    #[error("Index {index} out of range for a vector of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
