//! # Properties
//!
//! A property maps every node and every edge of a graph to a value of one
//! fixed type. [`Property<K>`] is the generic implementation, parameterized
//! by a [`PropertyKind`] marker that fixes the node and edge value types.
//!
//! Generic tooling (import pipelines, table models, export) works through
//! the object-safe [`PropertyInterface`]: string round-trip, total order
//! over elements, type-erased values. Vector-valued properties additionally
//! expose [`VectorPropertyInterface`].
//!
//! ```rust
//! use talipot_core::{DoubleKind, Graph, PropertyInterface};
//!
//! # fn main() -> talipot_core::Result<()> {
//! let graph = Graph::new();
//! let n = graph.add_node()?;
//! let weight = graph.typed_property::<DoubleKind>("weight")?;
//! weight.set_node_value(n, 4.5);
//! assert_eq!(weight.node_string_value(n), "4.5");
//! # Ok(())
//! # }
//! ```

pub mod typed;
pub mod vector;
pub mod wrapper;

use std::any::Any;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::graph::Graph;
use crate::model::{Color, EdgeId, GraphId, NodeId, PropertyId, PropertyType, Value, Vec3f};
use crate::types::{PropertyValue, VectorElement};
use crate::undo::Journal;
use crate::Result;

pub use typed::Property;
pub use wrapper::{EdgeValue, NodeValue, Operand};

// ============================================================================
// Kinds
// ============================================================================

/// Static description of a property type.
pub trait PropertyKind: Send + Sync + Sized + 'static {
    type Node: PropertyValue;
    type Edge: PropertyValue;

    const TYPE: PropertyType;

    fn node_default() -> Self::Node;
    fn edge_default() -> Self::Edge;

    /// Vector capability; only vector kinds return `Some`.
    fn as_vector(_property: &Property<Self>) -> Option<&dyn VectorPropertyInterface> {
        None
    }
}

/// A kind whose node and edge values are both `Vec<Elt>`.
pub trait VectorKind: PropertyKind<Node = Vec<Self::Elt>, Edge = Vec<Self::Elt>> {
    type Elt: VectorElement;
}

macro_rules! scalar_kind {
    ($(#[$meta:meta])* $kind:ident, $alias:ident, $tag:ident, $node:ty = $nd:expr, $edge:ty = $ed:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $kind;

        impl PropertyKind for $kind {
            type Node = $node;
            type Edge = $edge;
            const TYPE: PropertyType = PropertyType::$tag;

            fn node_default() -> $node {
                $nd
            }

            fn edge_default() -> $edge {
                $ed
            }
        }

        pub type $alias = Property<$kind>;
    };
}

macro_rules! vector_kind {
    ($(#[$meta:meta])* $kind:ident, $alias:ident, $tag:ident, $elt:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $kind;

        impl PropertyKind for $kind {
            type Node = Vec<$elt>;
            type Edge = Vec<$elt>;
            const TYPE: PropertyType = PropertyType::$tag;

            fn node_default() -> Vec<$elt> {
                Vec::new()
            }

            fn edge_default() -> Vec<$elt> {
                Vec::new()
            }

            fn as_vector(property: &Property<Self>) -> Option<&dyn VectorPropertyInterface> {
                Some(property)
            }
        }

        impl VectorKind for $kind {
            type Elt = $elt;
        }

        pub type $alias = Property<$kind>;
    };
}

scalar_kind!(BooleanKind, BooleanProperty, Boolean, bool = false, bool = false);
scalar_kind!(IntegerKind, IntegerProperty, Integer, i32 = 0, i32 = 0);
scalar_kind!(DoubleKind, DoubleProperty, Double, f64 = 0.0, f64 = 0.0);
scalar_kind!(StringKind, StringProperty, String, String = String::new(), String = String::new());
scalar_kind!(ColorKind, ColorProperty, Color, Color = Color::BLACK, Color = Color::BLACK);
scalar_kind!(
    /// Node and edge sizes; defaults to `(1,1,0)`.
    SizeKind, SizeProperty, Size,
    Vec3f = Vec3f::new(1.0, 1.0, 0.0), Vec3f = Vec3f::new(1.0, 1.0, 0.0)
);
scalar_kind!(
    /// Node positions and edge bend points.
    LayoutKind, LayoutProperty, Layout,
    Vec3f = Vec3f::ZERO, Vec<Vec3f> = Vec::new()
);
scalar_kind!(
    /// Meta-node sub-graphs and meta-edge edge sets.
    GraphKind, GraphProperty, Graph,
    Option<GraphId> = None, BTreeSet<EdgeId> = BTreeSet::new()
);

vector_kind!(BooleanVectorKind, BooleanVectorProperty, BooleanVector, bool);
vector_kind!(IntegerVectorKind, IntegerVectorProperty, IntegerVector, i32);
vector_kind!(DoubleVectorKind, DoubleVectorProperty, DoubleVector, f64);
vector_kind!(StringVectorKind, StringVectorProperty, StringVector, String);
vector_kind!(ColorVectorKind, ColorVectorProperty, ColorVector, Color);
vector_kind!(SizeVectorKind, SizeVectorProperty, SizeVector, Vec3f);
vector_kind!(CoordVectorKind, CoordVectorProperty, CoordVector, Vec3f);

// ============================================================================
// PropertyInterface
// ============================================================================

/// Type-erased view of any property.
pub trait PropertyInterface: Send + Sync + 'static {
    fn id(&self) -> PropertyId;
    fn name(&self) -> String;
    fn property_type(&self) -> PropertyType;

    fn typename(&self) -> &'static str {
        self.property_type().typename()
    }

    /// Owning graph; `None` for detached properties or once the graph is gone.
    fn graph(&self) -> Option<Graph>;

    /// Renames the property. Fails if the owning graph already has a local
    /// property with that name.
    fn rename(&self, new_name: &str) -> bool;

    // --- strings -----------------------------------------------------------

    fn node_string_value(&self, n: NodeId) -> String;
    fn edge_string_value(&self, e: EdgeId) -> String;

    /// `false` (value unchanged) if `text` does not parse.
    fn set_node_string_value(&self, n: NodeId, text: &str) -> bool;
    fn set_edge_string_value(&self, e: EdgeId, text: &str) -> bool;

    fn node_default_string_value(&self) -> String;
    fn edge_default_string_value(&self) -> String;

    /// Changes the default, existing values are kept.
    fn set_node_default_string_value(&self, text: &str) -> bool;
    fn set_edge_default_string_value(&self, text: &str) -> bool;

    fn set_all_node_string_value(&self, text: &str) -> bool;
    fn set_all_edge_string_value(&self, text: &str) -> bool;

    // --- ordering ----------------------------------------------------------

    fn compare_nodes(&self, a: NodeId, b: NodeId) -> Ordering;
    fn compare_edges(&self, a: EdgeId, b: EdgeId) -> Ordering;

    // --- erased values -----------------------------------------------------

    fn node_value_erased(&self, n: NodeId) -> Value;
    fn edge_value_erased(&self, e: EdgeId) -> Value;
    fn node_default_value_erased(&self) -> Value;
    fn edge_default_value_erased(&self) -> Value;

    /// `Error::TypeMismatch` if `value` is not of the node value type.
    fn set_node_value_erased(&self, n: NodeId, value: Value) -> Result<()>;
    fn set_edge_value_erased(&self, e: EdgeId, value: Value) -> Result<()>;
    fn set_all_node_value_erased(&self, value: Value) -> Result<()>;
    fn set_all_edge_value_erased(&self, value: Value) -> Result<()>;
    fn set_node_default_value_erased(&self, value: Value) -> Result<()>;
    fn set_edge_default_value_erased(&self, value: Value) -> Result<()>;

    // --- element sets ------------------------------------------------------

    /// Graph elements with an explicit value, sorted.
    fn non_default_nodes(&self) -> Vec<NodeId>;
    fn non_default_edges(&self) -> Vec<EdgeId>;
    fn number_of_non_default_nodes(&self) -> usize;
    fn number_of_non_default_edges(&self) -> usize;

    /// Resets the element to the default value.
    fn erase_node(&self, n: NodeId);
    fn erase_edge(&self, e: EdgeId);

    /// Copies `from`'s value of `src` to `dst`. Fails when `from` is of
    /// another type, or when `if_not_default` and `src` has the default.
    fn copy_node(&self, dst: NodeId, src: NodeId, from: &dyn PropertyInterface, if_not_default: bool) -> bool;
    fn copy_edge(&self, dst: EdgeId, src: EdgeId, from: &dyn PropertyInterface, if_not_default: bool) -> bool;

    // --- capabilities ------------------------------------------------------

    fn as_vector(&self) -> Option<&dyn VectorPropertyInterface>;

    fn is_vector(&self) -> bool {
        self.as_vector().is_some()
    }

    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl std::fmt::Debug for dyn PropertyInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyInterface")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("type", &self.typename())
            .finish()
    }
}

/// Extra surface of vector-valued properties, used by import pipelines.
pub trait VectorPropertyInterface: PropertyInterface {
    /// Splits `text` into element tokens. `None` if malformed or if a token
    /// is not a valid element.
    fn tokenize(&self, text: &str, open: Option<char>, sep: char, close: Option<char>) -> Option<Vec<String>>;

    fn set_node_string_value_as_vector(&self, n: NodeId, tokens: &[String]) -> bool;
    fn set_edge_string_value_as_vector(&self, e: EdgeId, tokens: &[String]) -> bool;

    fn set_node_string_value_as_vector_with(
        &self,
        n: NodeId,
        text: &str,
        open: Option<char>,
        sep: char,
        close: Option<char>,
    ) -> bool {
        self.tokenize(text, open, sep, close)
            .is_some_and(|tokens| self.set_node_string_value_as_vector(n, &tokens))
    }

    fn set_edge_string_value_as_vector_with(
        &self,
        e: EdgeId,
        text: &str,
        open: Option<char>,
        sep: char,
        close: Option<char>,
    ) -> bool {
        self.tokenize(text, open, sep, close)
            .is_some_and(|tokens| self.set_edge_string_value_as_vector(e, &tokens))
    }

    fn node_vector_size(&self, n: NodeId) -> usize;
    fn edge_vector_size(&self, e: EdgeId) -> usize;
}

// ============================================================================
// Registry handle + factory
// ============================================================================

/// A registered property: its public face and its undo face.
#[derive(Clone)]
pub(crate) struct PropertyHandle {
    pub property: Arc<dyn PropertyInterface>,
    pub journal: Arc<dyn Journal>,
}

impl PropertyHandle {
    pub fn of<K: PropertyKind>(property: Arc<Property<K>>) -> Self {
        Self { property: Arc::clone(&property) as Arc<dyn PropertyInterface>, journal: property }
    }
}

/// Calls `$make::<Kind>(...)` for the kind matching a `PropertyType`.
macro_rules! dispatch_kind {
    ($ty:expr, $make:ident ( $($arg:expr),* )) => {
        match $ty {
            PropertyType::Boolean => $make::<BooleanKind>($($arg),*),
            PropertyType::Integer => $make::<IntegerKind>($($arg),*),
            PropertyType::Double => $make::<DoubleKind>($($arg),*),
            PropertyType::String => $make::<StringKind>($($arg),*),
            PropertyType::Color => $make::<ColorKind>($($arg),*),
            PropertyType::Size => $make::<SizeKind>($($arg),*),
            PropertyType::Layout => $make::<LayoutKind>($($arg),*),
            PropertyType::Graph => $make::<GraphKind>($($arg),*),
            PropertyType::BooleanVector => $make::<BooleanVectorKind>($($arg),*),
            PropertyType::IntegerVector => $make::<IntegerVectorKind>($($arg),*),
            PropertyType::DoubleVector => $make::<DoubleVectorKind>($($arg),*),
            PropertyType::StringVector => $make::<StringVectorKind>($($arg),*),
            PropertyType::ColorVector => $make::<ColorVectorKind>($($arg),*),
            PropertyType::SizeVector => $make::<SizeVectorKind>($($arg),*),
            PropertyType::CoordVector => $make::<CoordVectorKind>($($arg),*),
        }
    };
}

pub(crate) use dispatch_kind;

fn make_detached<K: PropertyKind>(name: &str) -> Arc<dyn PropertyInterface> {
    Property::<K>::detached(name)
}

/// A property of the given type that belongs to no graph.
pub fn new_detached(ty: PropertyType, name: &str) -> Arc<dyn PropertyInterface> {
    dispatch_kind!(ty, make_detached(name))
}

/// Same as [`new_detached`], by type name (`"double"`, `"vector<int>"`, ...).
pub fn new_detached_by_typename(typename: &str, name: &str) -> Result<Arc<dyn PropertyInterface>> {
    Ok(new_detached(typename.parse()?, name))
}

/// Downcasts a registry entry to a typed property.
pub fn downcast<K: PropertyKind>(property: Arc<dyn PropertyInterface>) -> Option<Arc<Property<K>>> {
    property.into_any().downcast::<Property<K>>().ok()
}
