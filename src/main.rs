use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;

use kgml_graph::kgml::read_kgml_file;
use kgml_graph::network::{Row, Table, NAME_COLUMN};
use kgml_graph::render::{default_svg_output_path, draw_network, DEFAULT_PADDING_PX};
use kgml_graph::schema::{KEGG_PATHWAY_ID, KEGG_PATHWAY_IMAGE, KEGG_PATHWAY_LINK};
use kgml_graph::{KgmlMapper, MemoryNetwork};

#[derive(Parser)]
#[command(author, version, about = "Map KEGG KGML pathways to attributed graphs", long_about = None)]
struct Cli {
    /// Log per-phase progress.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(name = "draw_kgml")]
    DrawKgml {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "kgml.png")]
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_PADDING_PX)]
        padding: f64,
    },
    #[command(name = "summarize_kgml")]
    SummarizeKgml {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::DrawKgml {
            input,
            output,
            padding,
        } => {
            let svg_path = default_svg_output_path(&output);
            draw_kgml(&input, &output, padding, &svg_path)
        }
        Command::SummarizeKgml { input } => summarize_kgml(&input),
    }
}

fn draw_kgml(input: &Path, output: &Path, padding: f64, svg_output: &Path) -> Result<()> {
    let pathway = read_kgml_file(input)?;
    let mut network = MemoryNetwork::new();
    let mut mapper = KgmlMapper::new(&pathway, &mut network)?;
    mapper
        .do_mapping()
        .with_context(|| format!("Failed to map {}", pathway.name))?;
    let node_graphics = mapper.into_node_graphics();
    draw_network(&network, &node_graphics, output, svg_output, padding)
}

fn summarize_kgml(input: &Path) -> Result<()> {
    let pathway = read_kgml_file(input)?;
    let mut network = MemoryNetwork::new();
    let mut mapper = KgmlMapper::new(&pathway, &mut network)?;
    mapper
        .do_mapping()
        .with_context(|| format!("Failed to map {}", pathway.name))?;
    let mode = mapper.mode();

    let text = |column: &str| network.text(Row::Network, column).unwrap_or_default();
    println!("title:    {}", text(NAME_COLUMN));
    println!("pathway:  {}", text(KEGG_PATHWAY_ID));
    println!("organism: {}", pathway.org);
    println!("image:    {}", text(KEGG_PATHWAY_IMAGE));
    println!("link:     {}", text(KEGG_PATHWAY_LINK));
    println!("mode:     {mode}");
    println!("nodes:    {}", network.node_count());
    println!("edges:    {}", network.edge_count());
    println!(
        "columns:  {} node, {} edge",
        network.columns(Table::Node).len(),
        network.columns(Table::Edge).len()
    );
    Ok(())
}
