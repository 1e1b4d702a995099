//! Walks a [`Pathway`] and writes nodes, edges and KEGG attributes into a
//! [`NetworkSink`].
//!
//! A mapper is single-use: [`KgmlMapper::new`] writes the pathway metadata,
//! [`KgmlMapper::do_mapping`] declares the schema, builds every node and
//! then every edge. Any unresolved entry reference aborts the pass; the
//! mapper is then left in [`MappingState::Failed`] and the sink holds a
//! partial graph.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, error, info, warn};

use crate::error::MappingError;
use crate::model::{Entry, Graphics, Pathway, Reaction};
use crate::network::{NetworkSink, NodeId, Row, Value, NAME_COLUMN};
use crate::rules::MappingMode;
use crate::schema::{self, *};

const NAME_DELIMITER: &str = ", ";
const ID_DELIMITER: &str = " ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappingState {
    Initialized,
    MetadataWritten,
    SchemaCreated,
    NodesBuilt,
    EdgesBuilt,
    Failed,
}

impl fmt::Display for MappingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MappingState::Initialized => "initialized",
            MappingState::MetadataWritten => "metadata written",
            MappingState::SchemaCreated => "schema created",
            MappingState::NodesBuilt => "nodes built",
            MappingState::EdgesBuilt => "edges built",
            MappingState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Initial visual placement of one node: x, y, width, height, label,
/// label color and fill color, all as text.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeGraphics {
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
    pub label: String,
    pub label_color: String,
    pub fill_color: String,
}

/// Entry id to node lookup, scoped to one mapping pass.
#[derive(Debug, Default)]
struct IdentifierIndex {
    nodes: HashMap<String, NodeId>,
}

impl IdentifierIndex {
    fn register(&mut self, id: &str, node: NodeId) {
        if self.nodes.insert(id.to_string(), node).is_some() {
            warn!(entry = id, "duplicate entry id, later entry wins");
        }
    }

    fn lookup(&self, id: &str) -> Option<NodeId> {
        self.nodes.get(id).copied()
    }
}

/// Copy pathway-level fields onto the network row. Declares the network
/// columns first, so it can run on a fresh sink.
pub fn write_pathway_metadata<N: NetworkSink + ?Sized>(
    pathway: &Pathway,
    network: &mut N,
) -> Result<(), MappingError> {
    schema::create_network_columns(network)?;
    network.set(Row::Network, NAME_COLUMN, Value::text(&pathway.title))?;
    network.set(Row::Network, KEGG_PATHWAY_LINK, Value::text(&pathway.link))?;
    network.set(Row::Network, KEGG_PATHWAY_IMAGE, Value::text(&pathway.image))?;
    network.set(Row::Network, KEGG_PATHWAY_ID, Value::text(&pathway.name))?;
    Ok(())
}

pub struct KgmlMapper<'a, N: NetworkSink> {
    pathway: &'a Pathway,
    network: &'a mut N,
    mode: MappingMode,
    state: MappingState,
    node_graphics: Vec<(NodeId, NodeGraphics)>,
}

impl<'a, N: NetworkSink> KgmlMapper<'a, N> {
    pub fn new(pathway: &'a Pathway, network: &'a mut N) -> Result<Self, MappingError> {
        let mut mapper = Self {
            pathway,
            network,
            mode: MappingMode::for_pathway_number(&pathway.number),
            state: MappingState::Initialized,
            node_graphics: Vec::new(),
        };
        write_pathway_metadata(mapper.pathway, &mut *mapper.network)?;
        mapper.state = MappingState::MetadataWritten;
        Ok(mapper)
    }

    pub fn mode(&self) -> MappingMode {
        self.mode
    }

    pub fn state(&self) -> MappingState {
        self.state
    }

    pub fn pathway_id(&self) -> &str {
        &self.pathway.name
    }

    /// Per-node view seeds in node creation order.
    pub fn node_graphics(&self) -> &[(NodeId, NodeGraphics)] {
        &self.node_graphics
    }

    pub fn into_node_graphics(self) -> Vec<(NodeId, NodeGraphics)> {
        self.node_graphics
    }

    /// Run the pass. Calling this a second time fails with
    /// [`MappingError::AlreadyMapped`], whatever the first call returned.
    pub fn do_mapping(&mut self) -> Result<(), MappingError> {
        if self.state != MappingState::MetadataWritten {
            return Err(MappingError::AlreadyMapped(self.state));
        }
        let result = self.run();
        if result.is_err() {
            self.state = MappingState::Failed;
        }
        result
    }

    fn run(&mut self) -> Result<(), MappingError> {
        schema::create_node_columns(&mut *self.network)?;
        schema::create_edge_columns(&mut *self.network)?;
        self.state = MappingState::SchemaCreated;

        info!(
            pathway = %self.pathway.name,
            mode = %self.mode,
            entries = self.pathway.entries.len(),
            "mapping pathway"
        );
        let index = self.map_entries()?;
        self.state = MappingState::NodesBuilt;

        match self.mode {
            MappingMode::Standard => {
                self.map_relations(&index)?;
                self.map_reactions(&index)?;
            }
            MappingMode::Global => self.map_global_reactions(&index)?,
        }
        self.state = MappingState::EdgesBuilt;
        Ok(())
    }

    fn map_entries(&mut self) -> Result<IdentifierIndex, MappingError> {
        let pathway = self.pathway;
        let mut index = IdentifierIndex::default();
        for entry in &pathway.entries {
            let node = self.map_entry(entry)?;
            index.register(&entry.id, node);
        }
        debug!(nodes = index.nodes.len(), "entries mapped");
        Ok(index)
    }

    fn map_entry(&mut self, entry: &Entry) -> Result<NodeId, MappingError> {
        let graphics = entry
            .primary_graphics()
            .ok_or_else(|| MappingError::MissingGraphics {
                entry: entry.id.clone(),
            })?;
        if entry.graphics.len() > 1 {
            warn!(
                entry = %entry.id,
                records = entry.graphics.len(),
                "using the first graphics record only"
            );
        }
        check_geometry(entry, graphics)?;

        let node = self.network.add_node();
        let row = Row::Node(node);
        self.network.set(row, NAME_COLUMN, Value::text(&entry.id))?;
        self.network.set(
            row,
            KEGG_NODE_REACTIONID,
            Value::text(entry.reaction.clone().unwrap_or_default()),
        )?;
        self.network.set(row, KEGG_NODE_TYPE, Value::text(&entry.entry_type))?;
        self.set_list(row, KEGG_ID, split_list(&entry.name, ID_DELIMITER))?;
        self.set_list(
            row,
            KEGG_NODE_LABEL_LIST,
            split_list(&graphics.name, NAME_DELIMITER),
        )?;
        for (column, value) in [
            (KEGG_NODE_X, &graphics.x),
            (KEGG_NODE_Y, &graphics.y),
            (KEGG_NODE_WIDTH, &graphics.width),
            (KEGG_NODE_HEIGHT, &graphics.height),
            (KEGG_NODE_LABEL, &graphics.name),
            (KEGG_NODE_SHAPE, &graphics.shape),
        ] {
            self.network.set(row, column, Value::text(value))?;
        }

        let colors = self.mode.node_colors(&entry.entry_type, graphics);
        self.network.set(row, KEGG_NODE_LABEL_COLOR, Value::text(&colors.label))?;
        self.network.set(row, KEGG_NODE_FILL_COLOR, Value::text(&colors.fill))?;

        self.node_graphics.push((
            node,
            NodeGraphics {
                x: graphics.x.clone(),
                y: graphics.y.clone(),
                width: graphics.width.clone(),
                height: graphics.height.clone(),
                label: graphics.name.clone(),
                label_color: colors.label,
                fill_color: colors.fill,
            },
        ));
        Ok(node)
    }

    /// Write a list column, and its `_FIRST` companion when the table has one.
    fn set_list(
        &mut self,
        row: Row,
        column: &str,
        items: Vec<String>,
    ) -> Result<(), MappingError> {
        let first = items.first().cloned();
        self.network.set(row, column, Value::List(items))?;
        let first_column = format!("{column}{FIRST_SUFFIX}");
        if let Some(first) = first {
            if self.network.has_column(row.table(), &first_column) {
                self.network.set(row, &first_column, Value::Text(first))?;
            }
        }
        Ok(())
    }

    fn map_relations(&mut self, index: &IdentifierIndex) -> Result<(), MappingError> {
        let pathway = self.pathway;
        info!(relations = pathway.relations.len(), "mapping relations");
        for relation in &pathway.relations {
            let resolve = |id: &str| {
                index.lookup(id).ok_or_else(|| {
                    error!(
                        entry1 = %relation.entry1,
                        entry2 = %relation.entry2,
                        missing = id,
                        "relation references an unknown entry"
                    );
                    MappingError::UnresolvedRelation {
                        entry1: relation.entry1.clone(),
                        entry2: relation.entry2.clone(),
                        missing: id.to_string(),
                    }
                })
            };
            let source = resolve(relation.entry1.as_str())?;
            let target = resolve(relation.entry2.as_str())?;
            let edge = self.network.add_edge(source, target, true)?;
            self.network.set(
                Row::Edge(edge),
                KEGG_RELATION_TYPE,
                Value::text(&relation.relation_type),
            )?;
        }
        Ok(())
    }

    fn map_reactions(&mut self, index: &IdentifierIndex) -> Result<(), MappingError> {
        let pathway = self.pathway;
        info!(reactions = pathway.reactions.len(), "mapping reactions");
        for reaction in &pathway.reactions {
            let reaction_node = resolve_participant(index, reaction, &reaction.id)?;
            for substrate in &reaction.substrates {
                let source = resolve_participant(index, reaction, &substrate.id)?;
                self.add_reaction_edge(source, reaction_node, reaction)?;
            }
            for product in &reaction.products {
                let target = resolve_participant(index, reaction, &product.id)?;
                self.add_reaction_edge(reaction_node, target, reaction)?;
            }
        }
        Ok(())
    }

    fn add_reaction_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        reaction: &Reaction,
    ) -> Result<(), MappingError> {
        let edge = self.network.add_edge(source, target, true)?;
        self.network.set(
            Row::Edge(edge),
            KEGG_REACTION_TYPE,
            Value::text(&reaction.reaction_type),
        )?;
        Ok(())
    }

    fn map_global_reactions(&mut self, index: &IdentifierIndex) -> Result<(), MappingError> {
        let pathway = self.pathway;
        info!(
            reactions = pathway.reactions.len(),
            "mapping global map reactions"
        );
        for reaction in &pathway.reactions {
            for substrate in &reaction.substrates {
                let source = resolve_participant(index, reaction, &substrate.id)?;
                let color = self.network.get(Row::Node(source), KEGG_NODE_FILL_COLOR)?;
                for product in &reaction.products {
                    let target = resolve_participant(index, reaction, &product.id)?;
                    let edge = self.network.add_edge(source, target, true)?;
                    if let Some(color) = &color {
                        self.network
                            .set(Row::Edge(edge), KEGG_EDGE_COLOR, color.clone())?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn resolve_participant(
    index: &IdentifierIndex,
    reaction: &Reaction,
    id: &str,
) -> Result<NodeId, MappingError> {
    index.lookup(id).ok_or_else(|| {
        error!(
            reaction = %reaction.id,
            missing = id,
            "reaction references an unknown entry"
        );
        MappingError::UnresolvedReaction {
            reaction: reaction.id.clone(),
            missing: id.to_string(),
        }
    })
}

fn check_geometry(entry: &Entry, graphics: &Graphics) -> Result<(), MappingError> {
    for (field, value) in [
        ("x", &graphics.x),
        ("y", &graphics.y),
        ("width", &graphics.width),
        ("height", &graphics.height),
    ] {
        if !value.parse::<f64>().is_ok_and(f64::is_finite) {
            return Err(MappingError::InvalidNumber {
                entry: entry.id.clone(),
                field,
                value: value.clone(),
            });
        }
    }
    Ok(())
}

/// Split on `delimiter`, dropping empty segments.
fn split_list(text: &str, delimiter: &str) -> Vec<String> {
    text.split(delimiter)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Map `pathway` into `network` in one pass and return the view seeds.
pub fn map_pathway<N: NetworkSink>(
    pathway: &Pathway,
    network: &mut N,
) -> Result<Vec<(NodeId, NodeGraphics)>, MappingError> {
    let mut mapper = KgmlMapper::new(pathway, network)?;
    mapper.do_mapping()?;
    Ok(mapper.into_node_graphics())
}
