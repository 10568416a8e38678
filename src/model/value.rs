//! Property type tags and the type-erased property value.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Color, EdgeId, GraphId, Vec3f};

// ============================================================================
// PropertyType
// ============================================================================

/// The fixed set of property value types.
///
/// The serialized form is the stable type name (`"double"`, `"vector<int>"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "bool")]
    Boolean,
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "double")]
    Double,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "color")]
    Color,
    #[serde(rename = "size")]
    Size,
    #[serde(rename = "layout")]
    Layout,
    #[serde(rename = "graph")]
    Graph,
    #[serde(rename = "vector<bool>")]
    BooleanVector,
    #[serde(rename = "vector<int>")]
    IntegerVector,
    #[serde(rename = "vector<double>")]
    DoubleVector,
    #[serde(rename = "vector<string>")]
    StringVector,
    #[serde(rename = "vector<color>")]
    ColorVector,
    #[serde(rename = "vector<size>")]
    SizeVector,
    #[serde(rename = "vector<coord>")]
    CoordVector,
}

impl PropertyType {
    pub const ALL: [PropertyType; 15] = [
        PropertyType::Boolean,
        PropertyType::Integer,
        PropertyType::Double,
        PropertyType::String,
        PropertyType::Color,
        PropertyType::Size,
        PropertyType::Layout,
        PropertyType::Graph,
        PropertyType::BooleanVector,
        PropertyType::IntegerVector,
        PropertyType::DoubleVector,
        PropertyType::StringVector,
        PropertyType::ColorVector,
        PropertyType::SizeVector,
        PropertyType::CoordVector,
    ];

    /// Stable type tag.
    pub fn typename(&self) -> &'static str {
        match self {
            PropertyType::Boolean => "bool",
            PropertyType::Integer => "int",
            PropertyType::Double => "double",
            PropertyType::String => "string",
            PropertyType::Color => "color",
            PropertyType::Size => "size",
            PropertyType::Layout => "layout",
            PropertyType::Graph => "graph",
            PropertyType::BooleanVector => "vector<bool>",
            PropertyType::IntegerVector => "vector<int>",
            PropertyType::DoubleVector => "vector<double>",
            PropertyType::StringVector => "vector<string>",
            PropertyType::ColorVector => "vector<color>",
            PropertyType::SizeVector => "vector<size>",
            PropertyType::CoordVector => "vector<coord>",
        }
    }

    pub fn from_typename(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.typename() == name)
    }

    /// Whether node values are vectors (the property exposes `VectorPropertyInterface`).
    pub fn is_vector(&self) -> bool {
        self.typename().starts_with("vector<")
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.typename())
    }
}

impl FromStr for PropertyType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::from_typename(s).ok_or_else(|| crate::Error::UnknownType(s.to_owned()))
    }
}

// ============================================================================
// Value
// ============================================================================

/// Type-erased property value.
///
/// Crosses the `PropertyInterface` boundary for generic tooling (table models,
/// export, copy between properties of unknown static type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Bool(bool),
    Int(i32),
    Double(f64),
    String(String),
    Color(Color),
    Vec3(Vec3f),
    GraphRef(Option<GraphId>),
    EdgeSet(BTreeSet<EdgeId>),
    BoolVec(Vec<bool>),
    IntVec(Vec<i32>),
    DoubleVec(Vec<f64>),
    StringVec(Vec<String>),
    ColorVec(Vec<Color>),
    Vec3Vec(Vec<Vec3f>),
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Color(_) => "color",
            Value::Vec3(_) => "coord",
            Value::GraphRef(_) => "graph",
            Value::EdgeSet(_) => "set<edge>",
            Value::BoolVec(_) => "vector<bool>",
            Value::IntVec(_) => "vector<int>",
            Value::DoubleVec(_) => "vector<double>",
            Value::StringVec(_) => "vector<string>",
            Value::ColorVec(_) => "vector<color>",
            Value::Vec3Vec(_) => "vector<coord>",
        }
    }

    pub fn is_numeric(&self) -> bool { matches!(self, Value::Int(_) | Value::Double(_)) }
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Value::EdgeSet(_)
                | Value::BoolVec(_)
                | Value::IntVec(_)
                | Value::DoubleVec(_)
                | Value::StringVec(_)
                | Value::ColorVec(_)
                | Value::Vec3Vec(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view, as used by metric-like consumers.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(f64::from(*i)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Double(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl From<Color> for Value { fn from(v: Color) -> Self { Value::Color(v) } }
impl From<Vec3f> for Value { fn from(v: Vec3f) -> Self { Value::Vec3(v) } }

// ============================================================================
// Display
// ============================================================================

/// Same text as the property string codec of the matching type.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::types::PropertyValue;
        let text = match self {
            Value::Bool(v) => v.to_text(),
            Value::Int(v) => v.to_text(),
            Value::Double(v) => v.to_text(),
            Value::String(v) => v.to_text(),
            Value::Color(v) => v.to_text(),
            Value::Vec3(v) => v.to_text(),
            Value::GraphRef(v) => v.to_text(),
            Value::EdgeSet(v) => v.to_text(),
            Value::BoolVec(v) => v.to_text(),
            Value::IntVec(v) => v.to_text(),
            Value::DoubleVec(v) => v.to_text(),
            Value::StringVec(v) => v.to_text(),
            Value::ColorVec(v) => v.to_text(),
            Value::Vec3Vec(v) => v.to_text(),
        };
        f.write_str(&text)
    }
}
