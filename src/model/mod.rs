//! # Property Value Model
//!
//! Plain data types shared by every layer: element identifiers, the
//! composite value types (`Color`, `Vec3f`), the property type tags and the
//! type-erased `Value`.
//!
//! Design rule: this module is pure data. No locks, no events, no graph state.

pub mod color;
pub mod element;
pub mod value;
pub mod vec3;

pub use color::Color;
pub use element::{EdgeId, Element, ElementKind, GraphId, NodeId, PropertyId};
pub use value::{PropertyType, Value};
pub use vec3::{Coord, Size, Vec3f};
