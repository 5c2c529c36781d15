//! Writing an install set into a staging root.
//!
//! Entries are applied in [`InstallSet::apply_order`]: all directories and
//! files first, then all symlinks. Missing parent directories are created on
//! demand, so a file never depends on its directory being registered.

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::error::{Error, Result};
use crate::install_set::{Entity, EntityCounts, InstallSet};

/// Map an image path (`/lib64/libc.so.6`) to its place under `staging_root`.
pub fn staging_path(staging_root: &Path, path: &Path) -> PathBuf {
    let relative = path.strip_prefix("/").unwrap_or(path);
    staging_root.join(relative)
}

/// Materialize every entry of `set` under `staging_root`.
///
/// The first failure aborts; the staging root must then be discarded, never
/// packaged. With `verbose`, each image path is printed as it is written.
pub fn materialize(set: &InstallSet, staging_root: &Path, verbose: bool) -> Result<EntityCounts> {
    let mut counts = EntityCounts::default();

    for (path, entity) in set.apply_order() {
        if verbose {
            println!("{}", path.display());
        }
        let dest = staging_path(staging_root, path);
        install_entity(entity, &dest).map_err(|source| Error::Materialization {
            path: path.to_path_buf(),
            source,
        })?;

        match entity {
            Entity::Directory => counts.directories += 1,
            Entity::File { .. } => counts.files += 1,
            Entity::Symlink { .. } => counts.symlinks += 1,
        }
    }

    Ok(counts)
}

fn install_entity(entity: &Entity, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    match entity {
        Entity::Directory => fs::create_dir_all(dest),
        Entity::File { source } => copy_preserving(source, dest),
        Entity::Symlink { target } => symlink(target, dest),
    }
}

/// Copy contents, permission bits and timestamps from `source` to `dest`.
fn copy_preserving(source: &Path, dest: &Path) -> io::Result<()> {
    // fs::copy carries the permission bits over
    fs::copy(source, dest)?;

    let metadata = fs::metadata(source)?;
    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(dest, atime, mtime)
}
