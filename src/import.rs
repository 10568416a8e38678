//! Token assignment for import pipelines.
//!
//! Importers (CSV, GML, ...) hand over raw text tokens and a target
//! property known only through [`PropertyInterface`]. [`ValueImporter`]
//! routes each token to the right setter, splitting vector tokens first,
//! and keeps count of the tokens that could not be assigned.

use tracing::warn;

use crate::model::{EdgeId, Element, NodeId};
use crate::property::PropertyInterface;

/// Assigns text tokens to node and edge values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueImporter {
    /// Separator between vector elements.
    pub separator: char,
    /// Optional character opening a vector token.
    pub open: Option<char>,
    /// Optional character closing a vector token.
    pub close: Option<char>,
    failures: usize,
}

impl Default for ValueImporter {
    fn default() -> Self {
        Self::new(',', Some('('), Some(')'))
    }
}

impl ValueImporter {
    pub fn new(separator: char, open: Option<char>, close: Option<char>) -> Self {
        Self { separator, open, close, failures: 0 }
    }

    /// Tokens rejected so far.
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn assign_node(&mut self, property: &dyn PropertyInterface, n: NodeId, token: &str, row: usize) -> bool {
        self.assign(property, Element::Node(n), token, row)
    }

    pub fn assign_edge(&mut self, property: &dyn PropertyInterface, e: EdgeId, token: &str, row: usize) -> bool {
        self.assign(property, Element::Edge(e), token, row)
    }

    fn assign(&mut self, property: &dyn PropertyInterface, element: Element, token: &str, row: usize) -> bool {
        let assigned = match property.as_vector() {
            Some(vector) => {
                let body = self.strip_delimiters(token);
                match vector.tokenize(body, None, self.separator, None) {
                    Some(tokens) => match element {
                        Element::Node(n) => vector.set_node_string_value_as_vector(n, &tokens),
                        Element::Edge(e) => vector.set_edge_string_value_as_vector(e, &tokens),
                    },
                    None => false,
                }
            }
            None => match element {
                Element::Node(n) => property.set_node_string_value(n, token),
                Element::Edge(e) => property.set_edge_string_value(e, token),
            },
        };

        if !assigned {
            self.failures += 1;
            warn!(
                token,
                property = %property.name(),
                type_name = property.typename(),
                row,
                element = %element,
                "unable to assign value"
            );
        }
        assigned
    }

    fn strip_delimiters<'a>(&self, token: &'a str) -> &'a str {
        let mut body = token.trim();
        if let Some(open) = self.open {
            body = body.strip_prefix(open).unwrap_or(body);
        }
        if let Some(close) = self.close {
            body = body.strip_suffix(close).unwrap_or(body);
        }
        body
    }
}
