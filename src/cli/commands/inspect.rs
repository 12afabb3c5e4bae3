//! Inspect command implementation.
//!
//! Prints a store's decoded tree, or only the bar the locator picks from it.

use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use crate::codec;
use crate::config;
use crate::error::Result;
use crate::locate::{locate_with, BarOrigin, MatchRule};
use crate::model::{BookmarkNode, IdGenerator, NodeKind, Store, Tally};

#[derive(Serialize)]
struct InspectOutput<'a> {
    store: Store,
    path: &'a PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<&'a BarOrigin>,
    tally: Tally,
    roots: &'a [BookmarkNode],
}

/// Execute the inspect command.
///
/// # Errors
///
/// Returns an error if the store cannot be found or decoded.
pub fn execute(
    store: Store,
    bar_only: bool,
    edge: Option<&PathBuf>,
    safari: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let config = config::load_config()?;
    let path = super::resolve_one(store, edge, safari, &config)?;
    let forest = codec::decode_file(store, &path)?;

    let (roots, origin) = if bar_only {
        let located = locate_with(forest, &MatchRule::for_source(store), &IdGenerator::default());
        (vec![located.node], Some(located.origin))
    } else {
        (forest, None)
    };

    let tally = roots.iter().fold(Tally::default(), |acc, node| {
        let t = node.tally();
        Tally {
            folders: acc.folders + t.folders,
            links: acc.links + t.links,
        }
    });

    if json {
        let output = InspectOutput {
            store,
            path: &path,
            origin: origin.as_ref(),
            tally,
            roots: &roots,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} ({})", store.document_label().bold(), path.display());
    if let Some(origin) = &origin {
        match origin {
            BarOrigin::Matched { index, title } => {
                println!("Bar: root {index} \"{title}\"");
            }
            BarOrigin::Wrapped { roots } => println!(
                "{}",
                format!("Bar: none found, sync would wrap all {roots} root folders").yellow()
            ),
        }
    }
    println!();
    for node in &roots {
        print_node(node, 0);
    }
    println!();
    println!("{} folders, {} links", tally.folders, tally.links);
    Ok(())
}

fn print_node(node: &BookmarkNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match &node.kind {
        NodeKind::Folder { children } => {
            println!("{indent}{} {}", node.title.bold(), format!("[{}]", children.len()).dimmed());
            for child in children {
                print_node(child, depth + 1);
            }
        }
        NodeKind::Link { address } => {
            println!("{indent}{} {}", node.title, address.dimmed());
        }
    }
}
