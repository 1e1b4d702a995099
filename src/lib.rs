//! Map KEGG KGML pathway descriptions onto a directed, attributed graph.
//!
//! The pipeline is: [`kgml::parse_kgml`] produces a [`model::Pathway`],
//! [`mapper::KgmlMapper`] writes it into any [`network::NetworkSink`], and
//! [`render::draw_network`] draws a preview from the resulting view seeds.

pub mod error;
pub mod kgml;
pub mod mapper;
pub mod model;
pub mod network;
pub mod render;
pub mod rules;
pub mod schema;

pub use error::{MappingError, SinkError};
pub use mapper::{KgmlMapper, MappingState, NodeGraphics};
pub use model::Pathway;
pub use network::{MemoryNetwork, NetworkSink};
