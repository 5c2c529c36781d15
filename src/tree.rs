//! Registering whole directory trees (udev rules, helpers, hwdb).
//!
//! Symlinks found in a tree are kept as symlinks with their literal link
//! text. udev trees routinely contain masking links such as
//! `80-net-setup-link.rules -> /dev/null`; dereferencing those would copy a
//! device node or fail outright.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::install_set::InstallSet;

/// Register every directory, file and symlink under `root`, `root` included.
///
/// Destination paths equal host paths. Sockets, fifos and device nodes are
/// skipped with a warning. Returns the number of entries registered.
pub fn register_tree(set: &mut InstallSet, root: &Path) -> Result<usize> {
    let mut count = 0;

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::Walk {
                path,
                source: e.into(),
            }
        })?;
        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            set.register_directory(path);
        } else if file_type.is_file() {
            set.register_config(path);
        } else if file_type.is_symlink() {
            let target = fs::read_link(path).map_err(|source| Error::Walk {
                path: path.to_path_buf(),
                source,
            })?;
            set.register_symlink(path, target);
        } else {
            eprintln!(
                "  [WARN] Skipping special file {} (not a file, directory or symlink)",
                path.display()
            );
            continue;
        }
        count += 1;
    }

    Ok(count)
}

/// Like [`register_tree`], but a missing root is not an error.
pub fn register_tree_if_present(set: &mut InstallSet, root: &Path) -> Result<usize> {
    match fs::symlink_metadata(root) {
        Ok(_) => register_tree(set, root),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(source) => Err(Error::Walk {
            path: root.to_path_buf(),
            source,
        }),
    }
}
