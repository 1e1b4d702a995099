//! Column names and declare-if-absent creation of the KEGG attribute schema.

use crate::error::SinkError;
use crate::network::{ColumnType, NetworkSink, Table};

pub const KEGG_PATHWAY_ID: &str = "KEGG_PATHWAY_ID";
pub const KEGG_PATHWAY_IMAGE: &str = "KEGG_PATHWAY_IMAGE";
pub const KEGG_PATHWAY_LINK: &str = "KEGG_PATHWAY_LINK";

pub const KEGG_NODE_X: &str = "KEGG_NODE_X";
pub const KEGG_NODE_Y: &str = "KEGG_NODE_Y";
pub const KEGG_NODE_WIDTH: &str = "KEGG_NODE_WIDTH";
pub const KEGG_NODE_HEIGHT: &str = "KEGG_NODE_HEIGHT";
pub const KEGG_NODE_LABEL: &str = "KEGG_NODE_LABEL";
pub const KEGG_NODE_LABEL_LIST: &str = "KEGG_NODE_LABEL_LIST";
pub const KEGG_NODE_LABEL_LIST_FIRST: &str = "KEGG_NODE_LABEL_LIST_FIRST";
pub const KEGG_ID: &str = "KEGG_ID";
pub const KEGG_NODE_LABEL_COLOR: &str = "KEGG_NODE_LABEL_COLOR";
pub const KEGG_NODE_FILL_COLOR: &str = "KEGG_NODE_FILL_COLOR";
pub const KEGG_NODE_REACTIONID: &str = "KEGG_NODE_REACTIONID";
pub const KEGG_NODE_TYPE: &str = "KEGG_NODE_TYPE";
pub const KEGG_NODE_SHAPE: &str = "KEGG_NODE_SHAPE";

pub const KEGG_RELATION_TYPE: &str = "KEGG_RELATION_TYPE";
pub const KEGG_REACTION_TYPE: &str = "KEGG_REACTION_TYPE";
pub const KEGG_EDGE_COLOR: &str = "KEGG_EDGE_COLOR";

/// Suffix of the optional column holding the first element of a list column.
pub const FIRST_SUFFIX: &str = "_FIRST";

const NETWORK_COLUMNS: &[(&str, ColumnType)] = &[
    (KEGG_PATHWAY_ID, ColumnType::Text),
    (KEGG_PATHWAY_IMAGE, ColumnType::Text),
    (KEGG_PATHWAY_LINK, ColumnType::Text),
];

const NODE_COLUMNS: &[(&str, ColumnType)] = &[
    (KEGG_NODE_X, ColumnType::Text),
    (KEGG_NODE_Y, ColumnType::Text),
    (KEGG_NODE_WIDTH, ColumnType::Text),
    (KEGG_NODE_HEIGHT, ColumnType::Text),
    (KEGG_NODE_LABEL, ColumnType::Text),
    (KEGG_NODE_LABEL_LIST_FIRST, ColumnType::Text),
    (KEGG_NODE_LABEL_LIST, ColumnType::TextList),
    (KEGG_ID, ColumnType::TextList),
    (KEGG_NODE_LABEL_COLOR, ColumnType::Text),
    (KEGG_NODE_FILL_COLOR, ColumnType::Text),
    (KEGG_NODE_REACTIONID, ColumnType::Text),
    (KEGG_NODE_TYPE, ColumnType::Text),
    (KEGG_NODE_SHAPE, ColumnType::Text),
];

const EDGE_COLUMNS: &[(&str, ColumnType)] = &[
    (KEGG_RELATION_TYPE, ColumnType::Text),
    (KEGG_REACTION_TYPE, ColumnType::Text),
    (KEGG_EDGE_COLOR, ColumnType::Text),
];

fn declare<N: NetworkSink + ?Sized>(
    network: &mut N,
    table: Table,
    columns: &[(&str, ColumnType)],
) -> Result<(), SinkError> {
    for (name, column_type) in columns {
        network.create_column(table, name, *column_type)?;
    }
    Ok(())
}

pub fn create_network_columns<N: NetworkSink + ?Sized>(network: &mut N) -> Result<(), SinkError> {
    declare(network, Table::Network, NETWORK_COLUMNS)
}

pub fn create_node_columns<N: NetworkSink + ?Sized>(network: &mut N) -> Result<(), SinkError> {
    declare(network, Table::Node, NODE_COLUMNS)
}

pub fn create_edge_columns<N: NetworkSink + ?Sized>(network: &mut N) -> Result<(), SinkError> {
    declare(network, Table::Edge, EDGE_COLUMNS)
}

/// Declare every KEGG column on all three tables. Safe to call repeatedly.
pub fn create_kegg_columns<N: NetworkSink + ?Sized>(network: &mut N) -> Result<(), SinkError> {
    create_network_columns(network)?;
    create_node_columns(network)?;
    create_edge_columns(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::MemoryNetwork;

    #[test]
    fn schema_setup_is_idempotent() {
        let mut once = MemoryNetwork::new();
        create_kegg_columns(&mut once).unwrap();

        let mut twice = MemoryNetwork::new();
        create_kegg_columns(&mut twice).unwrap();
        create_kegg_columns(&mut twice).unwrap();

        for table in [Table::Network, Table::Node, Table::Edge] {
            assert_eq!(once.columns(table), twice.columns(table));
        }
        assert_eq!(once.columns(Table::Node).len(), NODE_COLUMNS.len() + 1);
    }

    #[test]
    fn id_and_label_lists_are_list_typed() {
        let mut network = MemoryNetwork::new();
        create_node_columns(&mut network).unwrap();
        let columns = network.columns(Table::Node);
        assert!(columns.contains(&(KEGG_ID, ColumnType::TextList)));
        assert!(columns.contains(&(KEGG_NODE_LABEL_LIST, ColumnType::TextList)));
        assert!(columns.contains(&(KEGG_NODE_SHAPE, ColumnType::Text)));
    }
}
