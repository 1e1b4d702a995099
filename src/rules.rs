//! Color and mode classification for KEGG pathways.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use crate::model::Graphics;

pub const MAP_COLOR: &str = "#6999AE";
pub const TITLE_COLOR: &str = "#32CCB6";
pub const TITLE_MARKER: &str = "TITLE";
pub const MAP_ENTRY_TYPE: &str = "map";

/// Pathway number of the KEGG global metabolic map.
pub const GLOBAL_PATHWAY_NUMBER: &str = "01100";

pub const GLYCAN_LABEL_COLOR: &str = "#99CCFF";
pub const XENOBIOTIC_LABEL_COLOR: &str = "#DA8E82";
pub const GLOBAL_HIGHLIGHT_FILL: &str = "#FFFFFF";

const GLYCAN_PATHWAYS: [&str; 14] = [
    "Other types of O-glycan biosynthesis",
    "Lipopolysaccharide biosynthesis",
    "Glycosaminoglycan biosynthesis - chondroitin sulfate / dermatan sulfate",
    "Glycosphingolipid biosynthesis - ganglio series",
    "Glycosphingolipid biosynthesis - globo series",
    "Glycosphingolipid biosynthesis - lacto and neolacto series",
    "Glycosylphosphatidylinositol(GPI)-anchor biosynthesis",
    "Glycosaminoglycan degradation",
    "Various types of N-glycan biosynthesis",
    "Glycosaminoglycan biosynthesis - keratan sulfate",
    "Mucin type O-Glycan biosynthesis",
    "N-Glycan biosynthesis",
    "Glycosaminoglycan biosynthesis - heparan sulfate / heparin",
    "Other glycan degradation",
];

const XENOBIOTIC_PATHWAYS: [&str; 19] = [
    "Aminobenzoate degradation",
    "Atrazine degradation",
    "Benzoate degradation",
    "Bisphenol degradation",
    "Caprolactam degradation",
    "Chlorocyclohexane and chlorobenzene degradation",
    "DDT degradation",
    "Dioxin degradation",
    "Drug metabolism - cytochrome P450",
    "Drug metabolism - other enzymes",
    "Ethylbenzene degradation",
    "Fluorobenzoate degradation",
    "Metabolism of xenobiotics by cytochrome P450",
    "Naphthalene degradation",
    "Polycyclic aromatic hydrocarbon degradation",
    "Steroid degradation",
    "Styrene degradation",
    "Toluene degradation",
    "Xylene degradation",
];

fn glycan_pathways() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| GLYCAN_PATHWAYS.into_iter().collect())
}

fn xenobiotic_pathways() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| XENOBIOTIC_PATHWAYS.into_iter().collect())
}

pub fn is_glycan_pathway(name: &str) -> bool {
    glycan_pathways().contains(name)
}

pub fn is_xenobiotic_pathway(name: &str) -> bool {
    xenobiotic_pathways().contains(name)
}

/// How a pathway's nodes are colored and its reactions turned into edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappingMode {
    /// Relations become edges; reactions route through their reaction node.
    Standard,
    /// Global map: no relation edges, one edge per substrate/product pair.
    Global,
}

impl MappingMode {
    pub fn for_pathway_number(number: &str) -> Self {
        if number == GLOBAL_PATHWAY_NUMBER {
            MappingMode::Global
        } else {
            MappingMode::Standard
        }
    }

    pub fn node_colors(self, entry_type: &str, graphics: &Graphics) -> NodeColors {
        match self {
            MappingMode::Standard => standard_colors(entry_type, graphics),
            MappingMode::Global => global_colors(entry_type, graphics),
        }
    }
}

impl fmt::Display for MappingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingMode::Standard => f.write_str("standard"),
            MappingMode::Global => f.write_str("global"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeColors {
    pub label: String,
    pub fill: String,
}

fn standard_colors(entry_type: &str, graphics: &Graphics) -> NodeColors {
    let fill = if graphics.name.starts_with(TITLE_MARKER) {
        TITLE_COLOR
    } else if entry_type == MAP_ENTRY_TYPE {
        MAP_COLOR
    } else {
        graphics.bgcolor.as_str()
    };
    NodeColors {
        label: graphics.fgcolor.clone(),
        fill: fill.to_string(),
    }
}

fn global_colors(entry_type: &str, graphics: &Graphics) -> NodeColors {
    let is_map = entry_type == MAP_ENTRY_TYPE;
    let (label, fill) = if is_map && is_glycan_pathway(&graphics.name) {
        (GLYCAN_LABEL_COLOR, GLOBAL_HIGHLIGHT_FILL)
    } else if is_map && is_xenobiotic_pathway(&graphics.name) {
        (XENOBIOTIC_LABEL_COLOR, GLOBAL_HIGHLIGHT_FILL)
    } else {
        (graphics.fgcolor.as_str(), graphics.bgcolor.as_str())
    };
    NodeColors {
        label: label.to_string(),
        fill: fill.to_string(),
    }
}
