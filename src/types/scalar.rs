//! Codecs of the scalar value types.

use std::cmp::Ordering;

use super::{ArithOp, PropertyValue, ValueKind, VectorElement};
use crate::model::{Color, GraphId, Value, Vec3f};

// ============================================================================
// bool
// ============================================================================

impl PropertyValue for bool {
    const TYPE_NAME: &'static str = "bool";
    const KIND: ValueKind = ValueKind::Scalar;

    fn to_text(&self) -> String {
        if *self { "true".into() } else { "false".into() }
    }

    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl VectorElement for bool {
    const VECTOR_TYPE_NAME: &'static str = "vector<bool>";

    fn wrap_vector(values: Vec<Self>) -> Value {
        Value::BoolVec(values)
    }

    fn unwrap_vector(value: Value) -> Option<Vec<Self>> {
        match value {
            Value::BoolVec(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// i32
// ============================================================================

impl PropertyValue for i32 {
    const TYPE_NAME: &'static str = "int";
    const KIND: ValueKind = ValueKind::Numeric;

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn apply(&self, op: ArithOp, rhs: &Self) -> Option<Self> {
        match op {
            ArithOp::Add => self.checked_add(*rhs),
            ArithOp::Sub => self.checked_sub(*rhs),
            ArithOp::Mul => self.checked_mul(*rhs),
            ArithOp::Div => self.checked_div(*rhs),
        }
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_int()
    }
}

impl VectorElement for i32 {
    const VECTOR_TYPE_NAME: &'static str = "vector<int>";

    fn wrap_vector(values: Vec<Self>) -> Value {
        Value::IntVec(values)
    }

    fn unwrap_vector(value: Value) -> Option<Vec<Self>> {
        match value {
            Value::IntVec(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// f64
// ============================================================================

impl PropertyValue for f64 {
    const TYPE_NAME: &'static str = "double";
    const KIND: ValueKind = ValueKind::Numeric;

    /// Shortest representation that parses back to the same bits.
    fn to_text(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }

    fn apply(&self, op: ArithOp, rhs: &Self) -> Option<Self> {
        Some(match op {
            ArithOp::Add => self + rhs,
            ArithOp::Sub => self - rhs,
            ArithOp::Mul => self * rhs,
            ArithOp::Div => self / rhs,
        })
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Double(d) => Some(d),
            _ => None,
        }
    }
}

impl VectorElement for f64 {
    const VECTOR_TYPE_NAME: &'static str = "vector<double>";

    fn wrap_vector(values: Vec<Self>) -> Value {
        Value::DoubleVec(values)
    }

    fn unwrap_vector(value: Value) -> Option<Vec<Self>> {
        match value {
            Value::DoubleVec(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// String
// ============================================================================

impl PropertyValue for String {
    const TYPE_NAME: &'static str = "string";
    const KIND: ValueKind = ValueKind::Scalar;

    fn to_text(&self) -> String {
        self.clone()
    }

    /// Any text is a valid string value.
    fn parse(text: &str) -> Option<Self> {
        Some(text.to_owned())
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Inside vectors strings are double-quoted with `\"` and `\\` escapes.
/// Unquoted tokens are accepted as-is.
impl VectorElement for String {
    const VECTOR_TYPE_NAME: &'static str = "vector<string>";

    fn element_to_text(&self) -> String {
        let mut out = String::with_capacity(self.len() + 2);
        out.push('"');
        for c in self.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
        out
    }

    fn parse_element(token: &str) -> Option<Self> {
        let token = token.trim();
        let Some(inner) = token.strip_prefix('"') else {
            return Some(token.to_owned());
        };
        let inner = inner.strip_suffix('"')?;
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                out.push(chars.next()?);
            } else if c == '"' {
                return None;
            } else {
                out.push(c);
            }
        }
        Some(out)
    }

    fn wrap_vector(values: Vec<Self>) -> Value {
        Value::StringVec(values)
    }

    fn unwrap_vector(value: Value) -> Option<Vec<Self>> {
        match value {
            Value::StringVec(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// Color
// ============================================================================

impl PropertyValue for Color {
    const TYPE_NAME: &'static str = "color";
    const KIND: ValueKind = ValueKind::Numeric;

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    /// Lexicographic on `(r, g, b, a)`.
    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// Channel-wise with overflow and division by zero rejected.
    fn apply(&self, op: ArithOp, rhs: &Self) -> Option<Self> {
        let (l, r) = (self.channels(), rhs.channels());
        let mut out = [0u8; 4];
        for i in 0..4 {
            out[i] = match op {
                ArithOp::Add => l[i].checked_add(r[i])?,
                ArithOp::Sub => l[i].checked_sub(r[i])?,
                ArithOp::Mul => l[i].checked_mul(r[i])?,
                ArithOp::Div => l[i].checked_div(r[i])?,
            };
        }
        Some(Color::from_channels(out))
    }

    fn into_value(self) -> Value {
        Value::Color(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Color(c) => Some(c),
            _ => None,
        }
    }
}

impl VectorElement for Color {
    const VECTOR_TYPE_NAME: &'static str = "vector<color>";

    fn wrap_vector(values: Vec<Self>) -> Value {
        Value::ColorVec(values)
    }

    fn unwrap_vector(value: Value) -> Option<Vec<Self>> {
        match value {
            Value::ColorVec(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// Vec3f
// ============================================================================

impl PropertyValue for Vec3f {
    const TYPE_NAME: &'static str = "coord";
    const KIND: ValueKind = ValueKind::Numeric;

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        Vec3f::total_cmp(self, other)
    }

    fn apply(&self, op: ArithOp, rhs: &Self) -> Option<Self> {
        Some(match op {
            ArithOp::Add => *self + *rhs,
            ArithOp::Sub => *self - *rhs,
            ArithOp::Mul => *self * *rhs,
            ArithOp::Div => *self / *rhs,
        })
    }

    fn into_value(self) -> Value {
        Value::Vec3(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Vec3(v) => Some(v),
            _ => None,
        }
    }
}

impl VectorElement for Vec3f {
    const VECTOR_TYPE_NAME: &'static str = "vector<coord>";

    fn wrap_vector(values: Vec<Self>) -> Value {
        Value::Vec3Vec(values)
    }

    fn unwrap_vector(value: Value) -> Option<Vec<Self>> {
        match value {
            Value::Vec3Vec(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// Graph reference
// ============================================================================

/// Node value of a graph property: the sub-graph a meta-node stands for.
/// The empty string is "no graph".
impl PropertyValue for Option<GraphId> {
    const TYPE_NAME: &'static str = "graph";
    const KIND: ValueKind = ValueKind::Scalar;

    fn to_text(&self) -> String {
        self.map(|g| g.0.to_string()).unwrap_or_default()
    }

    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Some(None);
        }
        text.parse().ok().map(|id| Some(GraphId(id)))
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn into_value(self) -> Value {
        Value::GraphRef(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::GraphRef(g) => Some(g),
            _ => None,
        }
    }
}
