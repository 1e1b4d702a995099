//! Attributed graph sink the mapper writes into.
//!
//! The host graph store is abstracted behind [`NetworkSink`]: three tables
//! (network, node, edge) with typed columns, plus node/edge creation.
//! [`MemoryNetwork`] is the in-process implementation used by the CLI and
//! the tests.

use std::collections::HashMap;
use std::fmt;

use crate::error::SinkError;

/// Column present on every table from creation, like a display name.
pub const NAME_COLUMN: &str = "name";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    Network,
    Node,
    Edge,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Network => "network",
            Table::Node => "node",
            Table::Edge => "edge",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    TextList,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Text => f.write_str("text"),
            ColumnType::TextList => f.write_str("text list"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    List(Vec<String>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Text(_) => ColumnType::Text,
            Value::List(_) => ColumnType::TextList,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            Value::Text(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// Addresses one row of one table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Row {
    Network,
    Node(NodeId),
    Edge(EdgeId),
}

impl Row {
    pub fn table(self) -> Table {
        match self {
            Row::Network => Table::Network,
            Row::Node(_) => Table::Node,
            Row::Edge(_) => Table::Edge,
        }
    }
}

pub trait NetworkSink {
    /// Declare a column if it is absent. Redeclaring with the same type is a
    /// no-op; redeclaring with another type is a [`SinkError::ColumnConflict`].
    fn create_column(
        &mut self,
        table: Table,
        name: &str,
        column_type: ColumnType,
    ) -> Result<(), SinkError>;

    fn has_column(&self, table: Table, name: &str) -> bool;

    fn add_node(&mut self) -> NodeId;

    fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        directed: bool,
    ) -> Result<EdgeId, SinkError>;

    fn set(&mut self, row: Row, column: &str, value: Value) -> Result<(), SinkError>;

    fn get(&self, row: Row, column: &str) -> Result<Option<Value>, SinkError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    pub directed: bool,
}

#[derive(Debug)]
struct AttributeTable {
    table: Table,
    columns: Vec<(String, ColumnType)>,
    rows: Vec<HashMap<String, Value>>,
}

impl AttributeTable {
    fn new(table: Table) -> Self {
        Self {
            table,
            columns: vec![(NAME_COLUMN.to_string(), ColumnType::Text)],
            rows: Vec::new(),
        }
    }

    fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, column_type)| *column_type)
    }

    fn declare(&mut self, name: &str, requested: ColumnType) -> Result<(), SinkError> {
        match self.column_type(name) {
            Some(existing) if existing == requested => Ok(()),
            Some(existing) => Err(SinkError::ColumnConflict {
                table: self.table,
                name: name.to_string(),
                existing,
                requested,
            }),
            None => {
                self.columns.push((name.to_string(), requested));
                Ok(())
            }
        }
    }

    fn push_row(&mut self) -> usize {
        self.rows.push(HashMap::new());
        self.rows.len() - 1
    }

    fn check_column(&self, name: &str) -> Result<ColumnType, SinkError> {
        self.column_type(name).ok_or_else(|| SinkError::MissingColumn {
            table: self.table,
            name: name.to_string(),
        })
    }

    fn row(&self, index: usize) -> Result<&HashMap<String, Value>, SinkError> {
        self.rows.get(index).ok_or(SinkError::UnknownRow {
            table: self.table,
            index,
        })
    }

    fn set(&mut self, index: usize, name: &str, value: Value) -> Result<(), SinkError> {
        let expected = self.check_column(name)?;
        if value.column_type() != expected {
            return Err(SinkError::TypeMismatch {
                table: self.table,
                name: name.to_string(),
                expected,
            });
        }
        let table = self.table;
        let row = self
            .rows
            .get_mut(index)
            .ok_or(SinkError::UnknownRow { table, index })?;
        row.insert(name.to_string(), value);
        Ok(())
    }

    fn get(&self, index: usize, name: &str) -> Result<Option<&Value>, SinkError> {
        self.check_column(name)?;
        Ok(self.row(index)?.get(name))
    }
}

/// In-memory attributed multigraph.
#[derive(Debug)]
pub struct MemoryNetwork {
    network: AttributeTable,
    nodes: AttributeTable,
    edges: AttributeTable,
    edge_ends: Vec<EdgeRecord>,
}

impl Default for MemoryNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNetwork {
    pub fn new() -> Self {
        let mut network = AttributeTable::new(Table::Network);
        network.push_row();
        Self {
            network,
            nodes: AttributeTable::new(Table::Node),
            edges: AttributeTable::new(Table::Edge),
            edge_ends: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.rows.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_ends.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.node_count()).map(NodeId)
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, EdgeRecord)> + '_ {
        self.edge_ends
            .iter()
            .enumerate()
            .map(|(index, record)| (EdgeId(index), *record))
    }

    pub fn edge(&self, edge: EdgeId) -> Option<EdgeRecord> {
        self.edge_ends.get(edge.0).copied()
    }

    /// Columns of a table in declaration order.
    pub fn columns(&self, table: Table) -> Vec<(&str, ColumnType)> {
        self.table(table)
            .columns
            .iter()
            .map(|(name, column_type)| (name.as_str(), *column_type))
            .collect()
    }

    /// Text value of a cell, or `None` when unset, missing or list-typed.
    pub fn text(&self, row: Row, column: &str) -> Option<&str> {
        self.value(row, column).and_then(Value::as_text)
    }

    pub fn list(&self, row: Row, column: &str) -> Option<&[String]> {
        self.value(row, column).and_then(Value::as_list)
    }

    fn value(&self, row: Row, column: &str) -> Option<&Value> {
        let (table, index) = self.locate(row);
        table.get(index, column).ok().flatten()
    }

    fn table(&self, table: Table) -> &AttributeTable {
        match table {
            Table::Network => &self.network,
            Table::Node => &self.nodes,
            Table::Edge => &self.edges,
        }
    }

    fn table_mut(&mut self, table: Table) -> &mut AttributeTable {
        match table {
            Table::Network => &mut self.network,
            Table::Node => &mut self.nodes,
            Table::Edge => &mut self.edges,
        }
    }

    fn locate(&self, row: Row) -> (&AttributeTable, usize) {
        (self.table(row.table()), row_index(row))
    }
}

fn row_index(row: Row) -> usize {
    match row {
        Row::Network => 0,
        Row::Node(NodeId(index)) | Row::Edge(EdgeId(index)) => index,
    }
}

impl NetworkSink for MemoryNetwork {
    fn create_column(
        &mut self,
        table: Table,
        name: &str,
        column_type: ColumnType,
    ) -> Result<(), SinkError> {
        self.table_mut(table).declare(name, column_type)
    }

    fn has_column(&self, table: Table, name: &str) -> bool {
        self.table(table).column_type(name).is_some()
    }

    fn add_node(&mut self) -> NodeId {
        NodeId(self.nodes.push_row())
    }

    fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        directed: bool,
    ) -> Result<EdgeId, SinkError> {
        for node in [source, target] {
            self.nodes.row(node.0)?;
        }
        self.edge_ends.push(EdgeRecord {
            source,
            target,
            directed,
        });
        Ok(EdgeId(self.edges.push_row()))
    }

    fn set(&mut self, row: Row, column: &str, value: Value) -> Result<(), SinkError> {
        self.table_mut(row.table())
            .set(row_index(row), column, value)
    }

    fn get(&self, row: Row, column: &str) -> Result<Option<Value>, SinkError> {
        let (table, index) = self.locate(row);
        Ok(table.get(index, column)?.cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaring_a_column_is_a_no_op() {
        let mut network = MemoryNetwork::new();
        network
            .create_column(Table::Node, "KEGG_NODE_X", ColumnType::Text)
            .unwrap();
        network
            .create_column(Table::Node, "KEGG_NODE_X", ColumnType::Text)
            .unwrap();
        assert_eq!(
            network.columns(Table::Node),
            vec![("name", ColumnType::Text), ("KEGG_NODE_X", ColumnType::Text)]
        );
    }

    #[test]
    fn redeclaring_with_another_type_conflicts() {
        let mut network = MemoryNetwork::new();
        network
            .create_column(Table::Edge, "ids", ColumnType::Text)
            .unwrap();
        let err = network
            .create_column(Table::Edge, "ids", ColumnType::TextList)
            .unwrap_err();
        assert!(matches!(err, SinkError::ColumnConflict { .. }));
    }

    #[test]
    fn writes_require_a_declared_column_of_matching_type() {
        let mut network = MemoryNetwork::new();
        let node = network.add_node();
        let err = network
            .set(Row::Node(node), "missing", Value::text("x"))
            .unwrap_err();
        assert!(matches!(err, SinkError::MissingColumn { table: Table::Node, .. }));

        let err = network
            .set(Row::Node(node), NAME_COLUMN, Value::List(vec![]))
            .unwrap_err();
        assert!(matches!(err, SinkError::TypeMismatch { .. }));

        network
            .set(Row::Node(node), NAME_COLUMN, Value::text("7"))
            .unwrap();
        assert_eq!(network.text(Row::Node(node), NAME_COLUMN), Some("7"));
    }

    #[test]
    fn edges_need_existing_endpoints() {
        let mut network = MemoryNetwork::new();
        let a = network.add_node();
        let err = network.add_edge(a, NodeId(5), true).unwrap_err();
        assert_eq!(
            err,
            SinkError::UnknownRow {
                table: Table::Node,
                index: 5
            }
        );
        assert_eq!(network.edge_count(), 0);

        let b = network.add_node();
        let edge = network.add_edge(a, b, true).unwrap();
        assert_eq!(
            network.edge(edge),
            Some(EdgeRecord {
                source: a,
                target: b,
                directed: true
            })
        );
    }

    #[test]
    fn network_table_has_a_single_row() {
        let mut network = MemoryNetwork::new();
        network
            .set(Row::Network, NAME_COLUMN, Value::text("Glycolysis"))
            .unwrap();
        assert_eq!(
            network.get(Row::Network, NAME_COLUMN).unwrap(),
            Some(Value::text("Glycolysis"))
        );
    }
}
