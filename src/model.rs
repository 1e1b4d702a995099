//! Pathway description as read from a KGML document.

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pathway {
    /// External pathway id, e.g. `path:hsa00010`.
    pub name: String,
    pub org: String,
    /// Category code, e.g. `00010`.
    pub number: String,
    pub title: String,
    pub image: String,
    pub link: String,
    pub entries: Vec<Entry>,
    pub relations: Vec<Relation>,
    pub reactions: Vec<Reaction>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entry {
    pub id: String,
    /// Space separated list of KEGG identifiers.
    pub name: String,
    pub entry_type: String,
    pub reaction: Option<String>,
    pub graphics: Vec<Graphics>,
}

impl Entry {
    /// The graphics record used for mapping. Only the first one counts.
    pub fn primary_graphics(&self) -> Option<&Graphics> {
        self.graphics.first()
    }
}

/// Visual metadata of an entry. Numeric fields are kept as text, the way
/// KGML carries them.
#[derive(Clone, Debug, PartialEq)]
pub struct Graphics {
    pub name: String,
    pub fgcolor: String,
    pub bgcolor: String,
    pub shape: String,
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
}

impl Default for Graphics {
    fn default() -> Self {
        Self {
            name: String::new(),
            fgcolor: "#000000".to_string(),
            bgcolor: "#FFFFFF".to_string(),
            shape: "rectangle".to_string(),
            x: "0".to_string(),
            y: "0".to_string(),
            width: "0".to_string(),
            height: "0".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Relation {
    pub entry1: String,
    pub entry2: String,
    pub relation_type: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reaction {
    /// Matches the id of the entry the reaction is drawn as.
    pub id: String,
    /// KEGG reaction identifiers, e.g. `rn:R01786`.
    pub name: String,
    pub reaction_type: String,
    pub substrates: Vec<ReactionParticipant>,
    pub products: Vec<ReactionParticipant>,
}

/// Substrate or product reference; `id` points at an entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReactionParticipant {
    pub id: String,
    pub name: String,
}
