//! JSON export: dump a graph with every property visible from it.
//!
//! ```text
//! Graph → export_json() → { "nodes": [...], "edges": [...], "properties": [...] }
//! ```
//!
//! Values are written in their canonical text form, the same form the
//! string setters accept, so an importer can feed them straight back.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::model::{EdgeId, GraphId, NodeId};
use crate::property::PropertyInterface;
use crate::Result;

/// Serialized form of one graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub graph: GraphId,
    pub name: String,
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeRecord>,
    pub properties: Vec<PropertyRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Defined on this graph rather than inherited.
    pub local: bool,
    pub node_default: String,
    pub edge_default: String,
    pub nodes: BTreeMap<u32, String>,
    pub edges: BTreeMap<u32, String>,
}

impl PropertyRecord {
    fn of(property: &dyn PropertyInterface, local: bool) -> Self {
        Self {
            name: property.name(),
            type_name: property.typename().to_owned(),
            local,
            node_default: property.node_default_string_value(),
            edge_default: property.edge_default_string_value(),
            nodes: property
                .non_default_nodes()
                .into_iter()
                .map(|n| (n.0, property.node_string_value(n)))
                .collect(),
            edges: property
                .non_default_edges()
                .into_iter()
                .map(|e| (e.0, property.edge_string_value(e)))
                .collect(),
        }
    }
}

/// Builds the document of `graph`.
pub fn document(graph: &Graph) -> GraphDocument {
    let edges = graph
        .edges()
        .into_iter()
        .filter_map(|id| {
            let (source, target) = graph.ends(id)?;
            Some(EdgeRecord { id, source, target })
        })
        .collect();

    let mut properties: Vec<PropertyRecord> =
        graph.local_properties().iter().map(|p| PropertyRecord::of(&**p, true)).collect();
    properties.extend(graph.inherited_properties().iter().map(|p| PropertyRecord::of(&**p, false)));

    GraphDocument { graph: graph.id(), name: graph.name(), nodes: graph.nodes(), edges, properties }
}

/// Writes `graph` as pretty-printed JSON.
pub fn export_json(graph: &Graph, writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &document(graph))?;
    writeln!(writer)?;
    Ok(())
}

pub fn to_json(graph: &Graph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&document(graph))?)
}
