//! List command - prints the resolved install set without building.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use mkinitrd::build::resolve_install_set;
use mkinitrd::config::Config;
use mkinitrd::install_set::Entity;

#[derive(Serialize)]
struct ListedEntry<'a> {
    path: &'a Path,
    #[serde(flatten)]
    entity: &'a Entity,
}

/// Execute the list command.
pub fn cmd_list(catalog: Option<PathBuf>, json: bool, config: &Config) -> Result<()> {
    let catalog = super::load_catalog(catalog.as_deref(), config)?;
    let (set, _) = resolve_install_set(&catalog, &super::resolver(config))
        .context("Failed to resolve install set")?;

    let ordered = set.apply_order();

    if json {
        let entries: Vec<_> = ordered
            .into_iter()
            .map(|(path, entity)| ListedEntry { path, entity })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (path, entity) in ordered {
        match entity {
            Entity::Directory => println!("dir      {}", path.display()),
            Entity::File { source } if source == path => println!("file     {}", path.display()),
            Entity::File { source } => {
                println!("file     {} (from {})", path.display(), source.display())
            }
            Entity::Symlink { target } => {
                println!("symlink  {} -> {}", path.display(), target.display())
            }
        }
    }

    let counts = set.counts();
    println!(
        "\n{} entries: {} directories, {} files, {} symlinks",
        set.len(),
        counts.directories,
        counts.files,
        counts.symlinks
    );
    Ok(())
}
