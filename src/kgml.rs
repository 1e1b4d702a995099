//! KGML (KEGG Markup Language) reader.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use roxmltree::{Document, Node, ParsingOptions};

use crate::model::{Entry, Graphics, Pathway, Reaction, ReactionParticipant, Relation};

pub fn read_kgml_file(input: &Path) -> Result<Pathway> {
    let xml = fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))?;
    parse_kgml(&xml).with_context(|| format!("Failed to parse KGML {:?}", input))
}

pub fn parse_kgml(xml: &str) -> Result<Pathway> {
    // KEGG downloads carry a DOCTYPE pointing at the KGML DTD.
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options).context("Failed to parse KGML XML")?;
    let root = doc.root_element();
    if !root.has_tag_name("pathway") {
        return Err(anyhow!("KGML file missing pathway element"));
    }

    let mut pathway = Pathway {
        name: attr_or_empty(&root, "name"),
        org: attr_or_empty(&root, "org"),
        number: attr_or_empty(&root, "number"),
        title: attr_or_empty(&root, "title"),
        image: attr_or_empty(&root, "image"),
        link: attr_or_empty(&root, "link"),
        ..Pathway::default()
    };

    for child in root.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "entry" => pathway.entries.push(parse_entry(&child)?),
            "relation" => pathway.relations.push(parse_relation(&child)?),
            "reaction" => pathway.reactions.push(parse_reaction(&child)?),
            _ => {}
        }
    }
    Ok(pathway)
}

fn parse_entry(node: &Node) -> Result<Entry> {
    let id = required_attr(node, "entry", "id")?;
    let graphics = node
        .children()
        .filter(|child| child.has_tag_name("graphics"))
        .map(|child| parse_graphics(&child))
        .collect();
    Ok(Entry {
        id,
        name: attr_or_empty(node, "name"),
        entry_type: attr_or_empty(node, "type"),
        reaction: node.attribute("reaction").map(str::to_string),
        graphics,
    })
}

fn parse_graphics(node: &Node) -> Graphics {
    let defaults = Graphics::default();
    let attr = |name: &str, default: String| {
        node.attribute(name).map(str::to_string).unwrap_or(default)
    };
    Graphics {
        name: attr("name", defaults.name),
        fgcolor: attr("fgcolor", defaults.fgcolor),
        bgcolor: attr("bgcolor", defaults.bgcolor),
        shape: attr("type", defaults.shape),
        x: attr("x", defaults.x),
        y: attr("y", defaults.y),
        width: attr("width", defaults.width),
        height: attr("height", defaults.height),
    }
}

fn parse_relation(node: &Node) -> Result<Relation> {
    Ok(Relation {
        entry1: required_attr(node, "relation", "entry1")?,
        entry2: required_attr(node, "relation", "entry2")?,
        relation_type: required_attr(node, "relation", "type")?,
    })
}

fn parse_reaction(node: &Node) -> Result<Reaction> {
    let id = required_attr(node, "reaction", "id")?;
    let participants = |tag: &str| -> Result<Vec<ReactionParticipant>> {
        node.children()
            .filter(|child| child.has_tag_name(tag))
            .map(|child| {
                Ok::<_, anyhow::Error>(ReactionParticipant {
                    id: required_attr(&child, tag, "id")
                        .with_context(|| format!("Reaction {id} has a bad {tag}"))?,
                    name: attr_or_empty(&child, "name"),
                })
            })
            .collect()
    };
    Ok(Reaction {
        substrates: participants("substrate")?,
        products: participants("product")?,
        name: attr_or_empty(node, "name"),
        reaction_type: attr_or_empty(node, "type"),
        id,
    })
}

fn required_attr(node: &Node, element: &str, name: &str) -> Result<String> {
    node.attribute(name)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("KGML {element} missing {name} attribute"))
}

fn attr_or_empty(node: &Node, name: &str) -> String {
    node.attribute(name).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLYCOLYSIS: &str = r##"<?xml version="1.0"?>
<pathway name="path:hsa00010" org="hsa" number="00010"
         title="Glycolysis / Gluconeogenesis"
         image="https://www.kegg.jp/kegg/pathway/hsa/hsa00010.png"
         link="https://www.kegg.jp/kegg-bin/show_pathway?hsa00010">
    <entry id="18" name="hsa:3098 hsa:3099" type="gene" reaction="rn:R01786"
        link="https://www.kegg.jp/dbget-bin/www_bget?hsa:3098">
        <graphics name="HK1, HK2" fgcolor="#000000" bgcolor="#BFFFBF"
             type="rectangle" x="483" y="407" width="46" height="17"/>
    </entry>
    <entry id="31" name="cpd:C00031" type="compound">
        <graphics name="C00031" type="circle" x="483" y="360" width="8" height="8"/>
    </entry>
    <relation entry1="18" entry2="31" type="ECrel">
        <subtype name="compound" value="31"/>
    </relation>
    <reaction id="18" name="rn:R01786" type="irreversible">
        <substrate id="31" name="cpd:C00031"/>
        <product id="32" name="cpd:C00668"/>
    </reaction>
</pathway>
"##;

    #[test]
    fn parses_pathway_entries_relations_and_reactions() {
        let pathway = parse_kgml(GLYCOLYSIS).unwrap();
        assert_eq!(pathway.name, "path:hsa00010");
        assert_eq!(pathway.org, "hsa");
        assert_eq!(pathway.number, "00010");
        assert_eq!(pathway.title, "Glycolysis / Gluconeogenesis");
        assert_eq!(pathway.entries.len(), 2);

        let gene = &pathway.entries[0];
        assert_eq!(gene.id, "18");
        assert_eq!(gene.name, "hsa:3098 hsa:3099");
        assert_eq!(gene.entry_type, "gene");
        assert_eq!(gene.reaction.as_deref(), Some("rn:R01786"));
        let graphics = gene.primary_graphics().unwrap();
        assert_eq!(graphics.name, "HK1, HK2");
        assert_eq!(graphics.bgcolor, "#BFFFBF");
        assert_eq!(graphics.x, "483");
        assert_eq!(graphics.height, "17");

        assert_eq!(
            pathway.relations,
            vec![Relation {
                entry1: "18".to_string(),
                entry2: "31".to_string(),
                relation_type: "ECrel".to_string(),
            }]
        );

        let reaction = &pathway.reactions[0];
        assert_eq!(reaction.id, "18");
        assert_eq!(reaction.reaction_type, "irreversible");
        assert_eq!(reaction.name, "rn:R01786");
        assert_eq!(reaction.substrates[0].id, "31");
        assert_eq!(reaction.substrates[0].name, "cpd:C00031");
        assert_eq!(reaction.products[0].id, "32");
        assert_eq!(reaction.products[0].name, "cpd:C00668");
    }

    #[test]
    fn graphics_attributes_fall_back_to_kgml_defaults() {
        let pathway = parse_kgml(GLYCOLYSIS).unwrap();
        let compound = pathway.entries[1].primary_graphics().unwrap();
        assert_eq!(compound.fgcolor, "#000000");
        assert_eq!(compound.bgcolor, "#FFFFFF");
        assert_eq!(compound.shape, "circle");
        assert!(pathway.entries[1].reaction.is_none());
    }

    #[test]
    fn accepts_the_kgml_doctype_prolog() {
        let xml = r##"<?xml version="1.0"?>
<!DOCTYPE pathway SYSTEM "https://www.kegg.jp/kegg/xml/KGML_v0.7.2_.dtd">
<!-- Creation date: Jan 10, 2024 -->
<pathway name="path:hsa00010" org="hsa" number="00010" title="Glycolysis / Gluconeogenesis">
    <entry id="18" name="hsa:3098" type="gene">
        <graphics name="HK1" x="483" y="407" width="46" height="17"/>
    </entry>
</pathway>
"##;
        let pathway = parse_kgml(xml).unwrap();
        assert_eq!(pathway.name, "path:hsa00010");
        assert_eq!(pathway.entries.len(), 1);
        assert_eq!(pathway.entries[0].id, "18");
    }

    #[test]
    fn rejects_non_pathway_root() {
        let err = parse_kgml("<sbgn/>").unwrap_err();
        assert!(err.to_string().contains("missing pathway element"));
    }

    #[test]
    fn reports_missing_required_attributes() {
        let err = parse_kgml(r#"<pathway><relation entry1="1" type="PPrel"/></pathway>"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "KGML relation missing entry2 attribute");
    }

    #[test]
    fn entries_without_graphics_are_kept() {
        let pathway = parse_kgml(r#"<pathway><entry id="1" type="group"/></pathway>"#).unwrap();
        assert!(pathway.entries[0].graphics.is_empty());
    }
}
