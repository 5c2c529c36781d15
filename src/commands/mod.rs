//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `build` - Build the initrd image
//! - `list` - Print the resolved install set
//! - `show` - Display information
//! - `preflight` - Run preflight checks

pub mod build;
pub mod list;
mod preflight;
pub mod show;

pub use build::cmd_build;
pub use list::cmd_list;
pub use preflight::cmd_preflight;
pub use show::cmd_show;

use anyhow::{Context, Result};
use std::path::Path;

use mkinitrd::catalog::Catalog;
use mkinitrd::config::Config;
use mkinitrd::libdeps::{DependencyResolver, Ldd};

/// Catalog from the flag, then the config, then the built-in one.
fn load_catalog(flag: Option<&Path>, config: &Config) -> Result<Catalog> {
    let path = flag.or(config.catalog.as_deref());
    Catalog::load_or_builtin(path).context("Failed to load catalog")
}

/// Resolver configured from the environment.
fn resolver(config: &Config) -> DependencyResolver<Ldd> {
    DependencyResolver::new(Ldd::new(&config.ldd)).with_skip_prefixes(config.ldd_skip.clone())
}
