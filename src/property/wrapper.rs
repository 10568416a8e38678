//! # Value Wrappers
//!
//! [`NodeValue`] and [`EdgeValue`] bind a property to one element so that
//! values can be read, written, compared and combined with operators:
//!
//! ```rust
//! use talipot_core::{DoubleKind, Graph};
//!
//! # fn main() -> talipot_core::Result<()> {
//! let graph = Graph::new();
//! let (a, b) = (graph.add_node()?, graph.add_node()?);
//! let weight = graph.typed_property::<DoubleKind>("weight")?;
//! weight.node(a).set(1.5);
//! weight.node(b).set(2.0);
//! assert_eq!((weight.node(a) + weight.node(b))?, 3.5);
//! assert!(weight.node(a).lt(&weight.node(b))?);
//! # Ok(())
//! # }
//! ```
//!
//! Operators check the value kind before anything else: collections have
//! no ordering, only numeric kinds have arithmetic. Both sides must then
//! carry the same underlying type, which is checked at run time since
//! wrappers of different kinds are freely mixed.

use std::any::Any;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use super::{Property, PropertyInterface, PropertyKind};
use crate::model::{Color, EdgeId, GraphId, NodeId, Vec3f};
use crate::types::{ArithOp, PropertyValue, VectorElement};
use crate::{Error, Result};

// ============================================================================
// Operands
// ============================================================================

/// Anything that can stand on the right of a wrapper operator.
pub trait Operand {
    type Value: PropertyValue;

    fn operand_value(&self) -> Self::Value;

    /// Type name used in diagnostics.
    fn operand_type_name(&self) -> &'static str {
        <Self::Value as PropertyValue>::TYPE_NAME
    }
}

macro_rules! plain_operand {
    ($($ty:ty),*) => {
        $(
            impl Operand for $ty {
                type Value = $ty;

                fn operand_value(&self) -> $ty {
                    self.clone()
                }
            }
        )*
    };
}

plain_operand!(bool, i32, f64, String, Color, Vec3f, Option<GraphId>, BTreeSet<EdgeId>);

impl Operand for &str {
    type Value = String;

    fn operand_value(&self) -> String {
        (*self).to_owned()
    }
}

impl<T: VectorElement> Operand for Vec<T> {
    type Value = Vec<T>;

    fn operand_value(&self) -> Vec<T> {
        self.clone()
    }
}

// ============================================================================
// Checks
// ============================================================================

/// A value together with the type name it is reported under.
struct Named<T> {
    value: T,
    name: &'static str,
}

impl<T: PropertyValue> Named<T> {
    fn raw(value: T) -> Self {
        Self { value, name: T::TYPE_NAME }
    }

    fn of<O: Operand<Value = T>>(operand: &O) -> Self {
        Self { value: operand.operand_value(), name: operand.operand_type_name() }
    }
}

/// `rhs` as an `L`, or a type mismatch naming `op`.
fn cast<L: PropertyValue, R: PropertyValue>(op: &'static str, lhs: &'static str, rhs: Named<R>) -> Result<L> {
    let boxed: Box<dyn Any> = Box::new(rhs.value);
    boxed.downcast::<L>().map(|v| *v).map_err(|_| Error::TypeMismatch { op, lhs, rhs: rhs.name })
}

fn compare<L: PropertyValue, R: PropertyValue>(lhs: &Named<L>, rhs: Named<R>) -> Result<Ordering> {
    if !L::KIND.allows_ordering() {
        return Err(Error::OperatorNotAvailable { op: "<", type_name: lhs.name });
    }
    let rhs: L = cast("<", lhs.name, rhs)?;
    Ok(lhs.value.total_cmp(&rhs))
}

fn arith<L: PropertyValue, R: PropertyValue>(op: ArithOp, lhs: Named<L>, rhs: Named<R>) -> Result<L> {
    if !L::KIND.allows_arithmetic() {
        return Err(Error::OperatorNotAvailable { op: op.symbol(), type_name: lhs.name });
    }
    let rhs: L = cast(op.symbol(), lhs.name, rhs)?;
    let Named { value: lhs, name } = lhs;
    lhs.apply(op, &rhs)
        .ok_or_else(|| Error::Arithmetic(format!("{} {} {} on {}", lhs.to_text(), op, rhs.to_text(), name)))
}

// ============================================================================
// Wrappers
// ============================================================================

macro_rules! value_wrapper {
    (@ops $name:ident, $value:ident, $($trait:ident $method:ident),*) => {
        $(
            impl<K: PropertyKind, O: Operand> $trait<O> for $name<'_, K> {
                type Output = Result<K::$value>;

                fn $method(self, rhs: O) -> Self::Output {
                    arith(ArithOp::$trait, Named::of(&self), Named::of(&rhs))
                }
            }
        )*
    };

    (
        $(#[$meta:meta])*
        $name:ident, $id:ty, $field:ident, $value:ident,
        get = $get:ident, set = $set:ident, set_str = $set_str:ident
    ) => {
        $(#[$meta])*
        pub struct $name<'a, K: PropertyKind> {
            prop: &'a Property<K>,
            $field: $id,
        }

        impl<K: PropertyKind> Clone for $name<'_, K> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<K: PropertyKind> Copy for $name<'_, K> {}

        impl<'a, K: PropertyKind> $name<'a, K> {
            pub(crate) fn new(prop: &'a Property<K>, $field: $id) -> Self {
                Self { prop, $field }
            }

            pub fn $field(&self) -> $id {
                self.$field
            }

            pub fn property(&self) -> &'a Property<K> {
                self.prop
            }

            pub fn get(&self) -> K::$value {
                self.prop.$get(self.$field)
            }

            pub fn set(&self, value: K::$value) {
                self.prop.$set(self.$field, value);
            }

            /// Writes the value of any operand of the same underlying type.
            pub fn assign<O: Operand>(&self, rhs: &O) -> Result<()> {
                let value = cast("=", K::TYPE.typename(), Named::of(rhs))?;
                self.set(value);
                Ok(())
            }

            /// Parses and writes `text`; a malformed string is ignored.
            pub fn set_str(&self, text: &str) {
                let _ = self.prop.$set_str(self.$field, text);
            }

            pub fn try_set_str(&self, text: &str) -> Result<()> {
                if self.prop.$set_str(self.$field, text) {
                    Ok(())
                } else {
                    Err(Error::Parse { input: text.to_owned(), type_name: K::TYPE.typename() })
                }
            }

            pub fn try_cmp<O: Operand>(&self, rhs: &O) -> Result<Ordering> {
                compare(&Named::of(self), Named::of(rhs))
            }

            pub fn lt<O: Operand>(&self, rhs: &O) -> Result<bool> {
                Ok(self.try_cmp(rhs)?.is_lt())
            }

            pub fn le<O: Operand>(&self, rhs: &O) -> Result<bool> {
                Ok(self.try_cmp(rhs)?.is_le())
            }

            pub fn gt<O: Operand>(&self, rhs: &O) -> Result<bool> {
                Ok(self.try_cmp(rhs)?.is_gt())
            }

            pub fn ge<O: Operand>(&self, rhs: &O) -> Result<bool> {
                Ok(self.try_cmp(rhs)?.is_ge())
            }
        }

        impl<K: PropertyKind> Operand for $name<'_, K> {
            type Value = K::$value;

            fn operand_value(&self) -> K::$value {
                self.get()
            }

            fn operand_type_name(&self) -> &'static str {
                K::TYPE.typename()
            }
        }

        impl<K: PropertyKind, O: Operand<Value = K::$value>> PartialEq<O> for $name<'_, K> {
            fn eq(&self, other: &O) -> bool {
                self.get() == other.operand_value()
            }
        }

        impl<K: PropertyKind> fmt::Debug for $name<'_, K> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("property", &self.prop.name())
                    .field(stringify!($field), &self.$field)
                    .field("value", &self.get())
                    .finish()
            }
        }

        impl<K: PropertyKind> fmt::Display for $name<'_, K> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.get().to_text())
            }
        }

        value_wrapper!(@ops $name, $value, Add add, Sub sub, Mul mul, Div div);
    };
}

value_wrapper!(
    /// Accessor bound to one node of a property.
    NodeValue, NodeId, node, Node,
    get = node_value, set = set_node_value, set_str = set_node_string_value
);

value_wrapper!(
    /// Accessor bound to one edge of a property.
    EdgeValue, EdgeId, edge, Edge,
    get = edge_value, set = set_edge_value, set_str = set_edge_string_value
);

// ============================================================================
// Raw values on the left
// ============================================================================

macro_rules! raw_left {
    (@ops $raw:ty, $wrapper:ident, $($trait:ident $method:ident),*) => {
        $(
            impl<'a, K: PropertyKind> $trait<$wrapper<'a, K>> for $raw {
                type Output = Result<$raw>;

                fn $method(self, rhs: $wrapper<'a, K>) -> Self::Output {
                    arith(ArithOp::$trait, Named::raw(self), Named::of(&rhs))
                }
            }
        )*
    };

    ($($raw:ty),*) => {
        $(
            raw_left!(@ops $raw, NodeValue, Add add, Sub sub, Mul mul, Div div);
            raw_left!(@ops $raw, EdgeValue, Add add, Sub sub, Mul mul, Div div);
        )*
    };
}

raw_left!(f64, i32, Color, Vec3f);

macro_rules! raw_eq {
    ($($raw:ty),*) => {
        $(
            impl<'a, K: PropertyKind<Node = $raw>> PartialEq<NodeValue<'a, K>> for $raw {
                fn eq(&self, other: &NodeValue<'a, K>) -> bool {
                    *self == other.get()
                }
            }

            impl<'a, K: PropertyKind<Edge = $raw>> PartialEq<EdgeValue<'a, K>> for $raw {
                fn eq(&self, other: &EdgeValue<'a, K>) -> bool {
                    *self == other.get()
                }
            }
        )*
    };
}

raw_eq!(bool, i32, f64, String, Color, Vec3f);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{
        BooleanKind, DoubleKind, DoubleVectorKind, IntegerKind, LayoutKind, SizeKind, StringKind,
    };

    #[test]
    fn test_read_after_write() {
        let p = Property::<IntegerKind>::detached("deg");
        let w = p.node(NodeId(2));
        w.set(41);
        assert_eq!(w.get(), 41);
        assert_eq!(p.node_value(NodeId(2)), 41);
        assert!(w == 41);
        assert!(41_i32 == w);
    }

    #[test]
    fn test_arithmetic_with_raw_and_wrapper() {
        let p = Property::<DoubleKind>::detached("w");
        p.node(NodeId(0)).set(3.0);
        p.node(NodeId(1)).set(1.5);
        assert_eq!((p.node(NodeId(0)) - p.node(NodeId(1))).unwrap(), 1.5);
        assert_eq!((2.0_f64 * p.node(NodeId(0))).unwrap(), 6.0);
        assert_eq!((p.node(NodeId(0)) / 2.0).unwrap(), 1.5);
    }

    #[test]
    fn test_boolean_arithmetic_unavailable() {
        let p = Property::<BooleanKind>::detached("flag");
        let err = (p.node(NodeId(0)) + p.node(NodeId(1))).unwrap_err();
        assert!(matches!(err, Error::OperatorNotAvailable { op: "+", type_name: "bool" }));
    }

    #[test]
    fn test_collection_ordering_unavailable() {
        let p = Property::<DoubleVectorKind>::detached("v");
        let err = p.node(NodeId(0)).lt(&p.node(NodeId(1))).unwrap_err();
        assert!(matches!(err, Error::OperatorNotAvailable { type_name: "vector<double>", .. }));

        let layout = Property::<LayoutKind>::detached("layout");
        assert!(layout.node(NodeId(0)).lt(&layout.node(NodeId(1))).is_ok());
        assert!(layout.edge(EdgeId(0)).lt(&layout.edge(EdgeId(1))).is_err());
    }

    #[test]
    fn test_mismatched_types() {
        let d = Property::<DoubleKind>::detached("d");
        let i = Property::<IntegerKind>::detached("i");
        let err = (d.node(NodeId(0)) + i.node(NodeId(0))).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { op: "+", lhs: "double", rhs: "int" }));
        assert!(d.node(NodeId(0)).assign(&i.node(NodeId(0))).is_err());
        assert!(d.node(NodeId(0)).try_cmp(&1).is_err());
    }

    #[test]
    fn test_size_diagnostics_name_the_property_type() {
        let size = Property::<SizeKind>::detached("size");
        let d = Property::<DoubleKind>::detached("d");
        let err = (size.node(NodeId(0)) + d.node(NodeId(0))).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { op: "+", lhs: "size", rhs: "double" }));
        let err = (d.node(NodeId(0)) * size.node(NodeId(0))).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { op: "*", lhs: "double", rhs: "size" }));
        let err = size.node(NodeId(0)).try_set_str("oops").unwrap_err();
        assert!(matches!(err, Error::Parse { type_name: "size", .. }));
        assert!(size.node(NodeId(0)).lt(&Vec3f::new(1.0, 1.0, 1.0)).unwrap());
    }

    #[test]
    fn test_integer_overflow() {
        let p = Property::<IntegerKind>::detached("i");
        p.node(NodeId(0)).set(i32::MAX);
        assert!(matches!(p.node(NodeId(0)) + 1, Err(Error::Arithmetic(_))));
        assert!(matches!(p.node(NodeId(0)) / 0, Err(Error::Arithmetic(_))));
    }

    #[test]
    fn test_string_assignment() {
        let s = Property::<StringKind>::detached("s");
        let d = Property::<DoubleKind>::detached("d");
        s.node(NodeId(0)).assign(&"hello").unwrap();
        assert_eq!(s.node(NodeId(0)).to_string(), "hello");
        assert!(s.node(NodeId(0)).lt(&"world").unwrap());

        d.node(NodeId(0)).set(1.0);
        d.node(NodeId(0)).set_str("oops");
        assert_eq!(d.node_value(NodeId(0)), 1.0);
        assert!(matches!(d.node(NodeId(0)).try_set_str("oops"), Err(Error::Parse { type_name: "double", .. })));
        d.node(NodeId(0)).try_set_str("2.5").unwrap();
        assert_eq!(d.node_value(NodeId(0)), 2.5);
    }
}
