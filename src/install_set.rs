//! The install set: every filesystem node the image will contain.
//!
//! Keys are absolute destination paths inside the image. Registering a path
//! again replaces whatever was there, so a library first discovered through
//! `ldd` can later be registered explicitly (or vice versa) without any
//! duplicate handling.

use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How to produce one node in the staging root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Entity {
    /// An empty directory.
    Directory,
    /// A copy of `source`, keeping its mode and timestamps.
    File { source: PathBuf },
    /// A symlink whose link text is exactly `target`.
    Symlink { target: PathBuf },
}

impl Entity {
    pub fn is_symlink(&self) -> bool {
        matches!(self, Entity::Symlink { .. })
    }
}

/// Per-variant tally of an install set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub directories: usize,
    pub files: usize,
    pub symlinks: usize,
}

/// Path-keyed registry of entities, in registration order.
///
/// Equality compares contents only, not registration order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallSet {
    entries: IndexMap<PathBuf, Entity>,
}

impl InstallSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entity at `path`.
    pub fn register(&mut self, path: impl Into<PathBuf>, entity: Entity) {
        self.entries.insert(path.into(), entity);
    }

    pub fn register_directory(&mut self, path: impl Into<PathBuf>) {
        self.register(path, Entity::Directory);
    }

    pub fn register_file(&mut self, path: impl Into<PathBuf>, source: impl Into<PathBuf>) {
        self.register(
            path,
            Entity::File {
                source: source.into(),
            },
        );
    }

    /// Register a file that is copied from the same path on the host.
    pub fn register_config(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.register_file(path, path);
    }

    pub fn register_symlink(&mut self, path: impl Into<PathBuf>, target: impl Into<PathBuf>) {
        self.register(
            path,
            Entity::Symlink {
                target: target.into(),
            },
        );
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&Entity> {
        self.entries.get(path.as_ref())
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.entries.contains_key(path.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Entity)> {
        self.entries.iter().map(|(p, e)| (p.as_path(), e))
    }

    pub fn counts(&self) -> EntityCounts {
        let mut counts = EntityCounts::default();
        for entity in self.entries.values() {
            match entity {
                Entity::Directory => counts.directories += 1,
                Entity::File { .. } => counts.files += 1,
                Entity::Symlink { .. } => counts.symlinks += 1,
            }
        }
        counts
    }

    /// Entries in the order they must be materialized.
    ///
    /// Sorted by `(is_symlink, path)`: every directory and file comes before
    /// every symlink, and within each group paths sort component-wise, so a
    /// directory always precedes anything below it.
    pub fn apply_order(&self) -> Vec<(&Path, &Entity)> {
        let mut ordered: Vec<_> = self.iter().collect();
        ordered.sort_by(|(a_path, a), (b_path, b)| {
            (a.is_symlink(), a_path).cmp(&(b.is_symlink(), b_path))
        });
        ordered
    }
}
