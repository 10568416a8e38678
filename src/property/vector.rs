//! Element-level access on vector properties.

use tracing::trace;

use super::{Property, PropertyInterface, VectorKind, VectorPropertyInterface};
use crate::model::{EdgeId, NodeId};
use crate::types::{tokenize, VectorElement};
use crate::{Error, Result};

fn out_of_range(index: usize, len: usize) -> Error {
    Error::IndexOutOfRange { index, len }
}

impl<K: VectorKind> Property<K> {
    // ========================================================================
    // Nodes
    // ========================================================================

    /// Element `i` of the node's vector.
    pub fn node_elt_value(&self, n: NodeId, i: usize) -> Option<K::Elt> {
        self.node_value(n).get(i).cloned()
    }

    pub fn set_node_elt_value(&self, n: NodeId, i: usize, value: K::Elt) -> Result<()> {
        let mut values = self.node_value(n);
        let len = values.len();
        let slot = values.get_mut(i).ok_or_else(|| out_of_range(i, len))?;
        *slot = value;
        self.set_node_value(n, values);
        Ok(())
    }

    pub fn push_back_node_elt_value(&self, n: NodeId, value: K::Elt) {
        let mut values = self.node_value(n);
        values.push(value);
        self.set_node_value(n, values);
    }

    /// Removes and returns the last element; `None` (no write) if empty.
    pub fn pop_back_node_elt_value(&self, n: NodeId) -> Option<K::Elt> {
        let mut values = self.node_value(n);
        let last = values.pop()?;
        self.set_node_value(n, values);
        Some(last)
    }

    /// Truncates or pads with `fill`.
    pub fn resize_node_value(&self, n: NodeId, len: usize, fill: K::Elt) {
        let mut values = self.node_value(n);
        values.resize(len, fill);
        self.set_node_value(n, values);
    }

    // ========================================================================
    // Edges
    // ========================================================================

    pub fn edge_elt_value(&self, e: EdgeId, i: usize) -> Option<K::Elt> {
        self.edge_value(e).get(i).cloned()
    }

    pub fn set_edge_elt_value(&self, e: EdgeId, i: usize, value: K::Elt) -> Result<()> {
        let mut values = self.edge_value(e);
        let len = values.len();
        let slot = values.get_mut(i).ok_or_else(|| out_of_range(i, len))?;
        *slot = value;
        self.set_edge_value(e, values);
        Ok(())
    }

    pub fn push_back_edge_elt_value(&self, e: EdgeId, value: K::Elt) {
        let mut values = self.edge_value(e);
        values.push(value);
        self.set_edge_value(e, values);
    }

    pub fn pop_back_edge_elt_value(&self, e: EdgeId) -> Option<K::Elt> {
        let mut values = self.edge_value(e);
        let last = values.pop()?;
        self.set_edge_value(e, values);
        Some(last)
    }

    pub fn resize_edge_value(&self, e: EdgeId, len: usize, fill: K::Elt) {
        let mut values = self.edge_value(e);
        values.resize(len, fill);
        self.set_edge_value(e, values);
    }

    fn parse_tokens(&self, tokens: &[String]) -> Option<Vec<K::Elt>> {
        let parsed: Option<Vec<K::Elt>> = tokens.iter().map(|t| K::Elt::parse_element(t)).collect();
        if parsed.is_none() {
            trace!(property = %self.name(), type_name = K::TYPE.typename(), "vector token rejected");
        }
        parsed
    }
}

impl<K: VectorKind> VectorPropertyInterface for Property<K> {
    fn tokenize(&self, text: &str, open: Option<char>, sep: char, close: Option<char>) -> Option<Vec<String>> {
        let tokens = tokenize(text, open, sep, close)?;
        self.parse_tokens(&tokens)?;
        Some(tokens)
    }

    fn set_node_string_value_as_vector(&self, n: NodeId, tokens: &[String]) -> bool {
        match self.parse_tokens(tokens) {
            Some(values) => {
                self.set_node_value(n, values);
                true
            }
            None => false,
        }
    }

    fn set_edge_string_value_as_vector(&self, e: EdgeId, tokens: &[String]) -> bool {
        match self.parse_tokens(tokens) {
            Some(values) => {
                self.set_edge_value(e, values);
                true
            }
            None => false,
        }
    }

    fn node_vector_size(&self, n: NodeId) -> usize {
        self.node_value(n).len()
    }

    fn edge_vector_size(&self, e: EdgeId) -> usize {
        self.edge_value(e).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{DoubleVectorKind, IntegerVectorKind, StringVectorKind};

    #[test]
    fn test_element_ops() {
        let p = Property::<IntegerVectorKind>::detached("v");
        let n = NodeId(1);
        p.push_back_node_elt_value(n, 1);
        p.push_back_node_elt_value(n, 2);
        assert_eq!(p.node_value(n), vec![1, 2]);
        p.set_node_elt_value(n, 0, 7).unwrap();
        assert_eq!(p.node_elt_value(n, 0), Some(7));
        assert!(matches!(p.set_node_elt_value(n, 5, 0), Err(Error::IndexOutOfRange { index: 5, len: 2 })));
        assert_eq!(p.pop_back_node_elt_value(n), Some(2));
        p.resize_node_value(n, 3, 9);
        assert_eq!(p.node_value(n), vec![7, 9, 9]);
        assert_eq!(p.pop_back_node_elt_value(NodeId(5)), None);
    }

    #[test]
    fn test_tokenize_validates_elements() {
        let p = Property::<DoubleVectorKind>::detached("v");
        assert_eq!(p.tokenize("(1, 2.5)", Some('('), ',', Some(')')), Some(vec!["1".into(), "2.5".into()]));
        assert_eq!(p.tokenize("(1, x)", Some('('), ',', Some(')')), None);
        assert_eq!(p.tokenize("1;2", None, ';', None), Some(vec!["1".into(), "2".into()]));
    }

    #[test]
    fn test_set_as_vector() {
        let p = Property::<StringVectorKind>::detached("v");
        assert!(p.set_edge_string_value_as_vector_with(EdgeId(0), "[a|b c]", Some('['), '|', Some(']')));
        assert_eq!(p.edge_value(EdgeId(0)), vec!["a".to_string(), "b c".to_string()]);
        assert_eq!(p.edge_vector_size(EdgeId(0)), 2);
        assert_eq!(p.edge_string_value(EdgeId(0)), "(\"a\", \"b c\")");
    }
}
