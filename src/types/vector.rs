//! Vector literals: tokenizer, writer and the collection codecs.
//!
//! The canonical vector form is `(e1, e2, e3)`. Elements may themselves be
//! parenthesized (`vector<color>`, `vector<coord>`) or quoted
//! (`vector<string>`); separators inside those are not split on.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::{PropertyValue, ValueKind, VectorElement};
use crate::model::{EdgeId, Value};

// ============================================================================
// Tokenizer
// ============================================================================

/// Splits `text` into trimmed element tokens.
///
/// `open` and `close` are the optional outer delimiters, `sep` the element
/// separator. Returns `None` when the text is malformed: missing open or close
/// character, empty element (leading, double or trailing separator),
/// unbalanced nesting or quotes, or anything but whitespace after `close`.
/// Without `open`, a `close` character at the top level is rejected too.
/// An empty literal such as `()` yields no tokens.
pub fn tokenize(text: &str, open: Option<char>, sep: char, close: Option<char>) -> Option<Vec<String>> {
    let mut chars = text.trim_start().chars();
    if let Some(open) = open {
        if chars.next() != Some(open) {
            return None;
        }
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;
    let mut closed = false;
    let mut separated = false;

    for c in chars.by_ref() {
        if quoted {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                quoted = false;
            }
            continue;
        }
        if depth == 0 && Some(c) == close {
            if open.is_none() {
                return None;
            }
            closed = true;
            break;
        }
        if depth == 0 && c == sep {
            let token = current.trim();
            if token.is_empty() {
                return None;
            }
            tokens.push(token.to_owned());
            current.clear();
            separated = true;
            continue;
        }
        match c {
            '"' => quoted = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.checked_sub(1)?,
            _ => {}
        }
        current.push(c);
    }

    if quoted || depth > 0 || (open.is_some() && close.is_some() && !closed) {
        return None;
    }
    if chars.any(|c| !c.is_whitespace()) {
        return None;
    }

    let last = current.trim();
    if last.is_empty() {
        if separated {
            return None;
        }
    } else {
        tokens.push(last.to_owned());
    }
    Some(tokens)
}

/// Writes `(e1, e2, ...)`.
pub fn join_vector<I>(items: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut out = String::from("(");
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&item);
    }
    out.push(')');
    out
}

fn lexicographic<T, F>(a: &[T], b: &[T], cmp: F) -> Ordering
where
    F: Fn(&T, &T) -> Ordering,
{
    for (x, y) in a.iter().zip(b) {
        match cmp(x, y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

// ============================================================================
// Vec<T>
// ============================================================================

impl<T: VectorElement> PropertyValue for Vec<T> {
    const TYPE_NAME: &'static str = T::VECTOR_TYPE_NAME;
    const KIND: ValueKind = ValueKind::Collection;

    fn to_text(&self) -> String {
        join_vector(self.iter().map(VectorElement::element_to_text))
    }

    fn parse(text: &str) -> Option<Self> {
        tokenize(text, Some('('), ',', Some(')'))?
            .iter()
            .map(|token| T::parse_element(token))
            .collect()
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        lexicographic(self, other, T::total_cmp)
    }

    fn into_value(self) -> Value {
        T::wrap_vector(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        T::unwrap_vector(value)
    }
}

// ============================================================================
// Edge sets
// ============================================================================

/// Edge value of a graph property: the edges a meta-edge stands for.
impl PropertyValue for BTreeSet<EdgeId> {
    const TYPE_NAME: &'static str = "set<edge>";
    const KIND: ValueKind = ValueKind::Collection;

    fn to_text(&self) -> String {
        join_vector(self.iter().map(|e| e.0.to_string()))
    }

    fn parse(text: &str) -> Option<Self> {
        tokenize(text, Some('('), ',', Some(')'))?
            .iter()
            .map(|token| token.parse().ok().map(EdgeId))
            .collect()
    }

    fn total_cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }

    fn into_value(self) -> Value {
        Value::EdgeSet(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::EdgeSet(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Color, Vec3f};

    fn toks(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(tokenize("(1.0,2.0,3.0)", Some('('), ',', Some(')')), toks(&["1.0", "2.0", "3.0"]));
        assert_eq!(tokenize("  ( a ; b )  ", Some('('), ';', Some(')')), toks(&["a", "b"]));
        assert_eq!(tokenize("()", Some('('), ',', Some(')')), toks(&[]));
        assert_eq!(tokenize("1|2", None, '|', None), toks(&["1", "2"]));
    }

    #[test]
    fn test_tokenize_malformed() {
        assert_eq!(tokenize("1,2)", Some('('), ',', Some(')')), None);
        assert_eq!(tokenize("(1,,2)", Some('('), ',', Some(')')), None);
        assert_eq!(tokenize("(1,2,)", Some('('), ',', Some(')')), None);
        assert_eq!(tokenize("(,1)", Some('('), ',', Some(')')), None);
        assert_eq!(tokenize("(1,2", Some('('), ',', Some(')')), None);
        assert_eq!(tokenize("(1,2) x", Some('('), ',', Some(')')), None);
        assert_eq!(tokenize("1,", None, ',', None), None);
        assert_eq!(tokenize("1,2)", None, ',', Some(')')), None);
        assert_eq!(tokenize("1,2", None, ',', Some(')')), toks(&["1", "2"]));
    }

    #[test]
    fn test_tokenize_nested_and_quoted() {
        assert_eq!(
            tokenize("((1,2,3,4), (5,6,7,8))", Some('('), ',', Some(')')),
            toks(&["(1,2,3,4)", "(5,6,7,8)"])
        );
        assert_eq!(
            tokenize(r#"("a, b", "c\")")"#, Some('('), ',', Some(')')),
            toks(&[r#""a, b""#, r#""c\")""#])
        );
    }

    #[test]
    fn test_vector_text() {
        let v = vec![1.0, 2.5, -3.0];
        assert_eq!(v.to_text(), "(1, 2.5, -3)");
        assert_eq!(Vec::<f64>::parse("(1.0,2.0,3.0)"), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(Vec::<f64>::parse("(1.0,abc)"), None);
        assert_eq!(Vec::<i32>::parse("()"), Some(vec![]));

        let colors = vec![Color::RED, Color::rgba(1, 2, 3, 4)];
        assert_eq!(Vec::<Color>::parse(&colors.to_text()), Some(colors));

        let coords = vec![Vec3f::new(1.0, 2.0, 3.0)];
        assert_eq!(coords.to_text(), "((1,2,3))");

        let strings = vec!["a, b".to_string(), String::new()];
        assert_eq!(Vec::<String>::parse(&strings.to_text()), Some(strings));
    }

    #[test]
    fn test_vector_order() {
        assert_eq!(vec![1, 2].total_cmp(&vec![1, 3]), Ordering::Less);
        assert_eq!(vec![1, 2].total_cmp(&vec![1]), Ordering::Greater);
        assert_eq!(Vec::<i32>::new().total_cmp(&vec![]), Ordering::Equal);
    }

    #[test]
    fn test_edge_set_codec() {
        let set: BTreeSet<EdgeId> = [EdgeId(3), EdgeId(1)].into_iter().collect();
        assert_eq!(set.to_text(), "(1, 3)");
        assert_eq!(BTreeSet::<EdgeId>::parse("(3, 1)"), Some(set));
        assert_eq!(BTreeSet::<EdgeId>::parse("(x)"), None);
    }
}
