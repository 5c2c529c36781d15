//! What goes into the image.
//!
//! The catalog is plain data: directories to create, binaries whose library
//! closure is pulled in, configuration files, symlinks and whole trees. The
//! built-in catalog targets a udev + md + LVM host that boots from a
//! (possibly md/LVM backed) root with an optional separate `/usr`. A TOML
//! file with the same shape can replace it:
//!
//! ```toml
//! [[entry]]
//! kind = "dir"
//! path = "/newroot"
//!
//! [[entry]]
//! kind = "binary-glob"
//! pattern = "/sbin/fsck*"
//!
//! [[entry]]
//! kind = "symlink"
//! path = "/sbin/vgchange"
//! target = "lvm"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::install_set::InstallSet;
use crate::libdeps::{DependencyLister, DependencyResolver};
use crate::tree;

/// LVM tools that are all the `lvm` multi-call binary.
const LVM_TOOLS: &[&str] = &[
    "lvchange", "lvconvert", "lvcreate", "lvdisplay", "lvextend", "lvmchange", "lvmdiskscan",
    "lvmsadc", "lvmsar", "lvreduce", "lvremove", "lvrename", "lvresize", "lvs", "lvscan",
    "pvchange", "pvck", "pvcreate", "pvdisplay", "pvmove", "pvremove", "pvresize", "pvs",
    "pvscan", "vgcfgbackup", "vgcfgrestore", "vgchange", "vgck", "vgconvert", "vgcreate",
    "vgdisplay", "vgexport", "vgextend", "vgimport", "vgmerge", "vgmknodes", "vgreduce",
    "vgremove", "vgrename", "vgs", "vgscan", "vgsplit",
];

/// Mount points and pseudo filesystem roots the init script expects.
const DIRECTORIES: &[&str] = &["/newroot", "/sys", "/proc", "/dev", "/run"];

/// Userland the init script calls, plus a rescue shell and editor.
const BINARIES: &[&str] = &[
    "/bin/bash",
    "/sbin/udevd",
    "/sbin/udevadm",
    "/sbin/mdadm",
    "/sbin/dmsetup",
    "/sbin/blkid",
    "/sbin/lvm",
    "/usr/bin/cat",
    "/usr/bin/ls",
    "/usr/bin/ln",
    "/usr/bin/ed",
    "/usr/bin/less",
    "/usr/bin/mkdir",
    "/bin/pidof",
    "/bin/mount",
    "/bin/umount",
    "/sbin/switch_root",
];

/// One catalog line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CatalogEntry {
    /// Empty directory.
    Dir { path: PathBuf },
    /// File copied from the same path on the host.
    Config { path: PathBuf },
    /// Executable plus its shared library closure.
    Binary { path: PathBuf },
    /// Every host path matching `pattern`, each as a binary.
    BinaryGlob { pattern: String },
    /// Symlink with literal link text.
    Symlink { path: PathBuf, target: PathBuf },
    /// Directory tree copied as-is; missing trees are skipped.
    Tree { path: PathBuf },
}

impl CatalogEntry {
    /// The path (or glob) this entry places in the image.
    fn image_path(&self) -> &Path {
        match self {
            CatalogEntry::Dir { path }
            | CatalogEntry::Config { path }
            | CatalogEntry::Binary { path }
            | CatalogEntry::Symlink { path, .. }
            | CatalogEntry::Tree { path } => path.as_path(),
            CatalogEntry::BinaryGlob { pattern } => Path::new(pattern),
        }
    }
}

/// Image paths must stay inside the staging root.
fn image_path_problem(path: &Path) -> Option<&'static str> {
    if !path.is_absolute() {
        Some("path must be absolute")
    } else if path.components().any(|c| c == Component::ParentDir) {
        Some("path must not contain '..'")
    } else {
        None
    }
}

/// Tally of what a catalog registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSummary {
    pub binaries: usize,
    pub libraries: usize,
    pub tree_entries: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    #[serde(rename = "entry", default)]
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// The catalog used when no file is given.
    pub fn builtin() -> Self {
        let mut entries: Vec<CatalogEntry> = DIRECTORIES
            .iter()
            .map(|d| CatalogEntry::Dir { path: d.into() })
            .collect();

        entries.push(CatalogEntry::Symlink {
            path: "/lib".into(),
            target: "lib64".into(),
        });
        entries.push(CatalogEntry::Config {
            path: "/etc/mdadm.conf".into(),
        });
        entries.push(CatalogEntry::BinaryGlob {
            pattern: "/sbin/fsck*".to_string(),
        });
        entries.extend(
            BINARIES
                .iter()
                .map(|b| CatalogEntry::Binary { path: b.into() }),
        );
        entries.extend(LVM_TOOLS.iter().map(|tool| CatalogEntry::Symlink {
            path: Path::new("/sbin").join(tool),
            target: "lvm".into(),
        }));
        entries.push(CatalogEntry::Tree {
            path: "/lib64/udev".into(),
        });
        entries.push(CatalogEntry::Tree {
            path: "/etc/udev".into(),
        });

        Self { entries }
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        let catalog: Self = toml::from_str(content).map_err(|e| Error::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        for entry in &catalog.entries {
            let image_path = entry.image_path();
            if let Some(reason) = image_path_problem(image_path) {
                return Err(Error::Catalog {
                    path: path.to_path_buf(),
                    message: format!("entry {}: {}", image_path.display(), reason),
                });
            }
        }
        Ok(catalog)
    }

    /// The file given, or the built-in catalog.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Apply every entry to `set`, in catalog order.
    pub fn register_all<L: DependencyLister>(
        &self,
        set: &mut InstallSet,
        resolver: &DependencyResolver<L>,
    ) -> Result<RegisterSummary> {
        let mut summary = RegisterSummary::default();

        for entry in &self.entries {
            match entry {
                CatalogEntry::Dir { path } => set.register_directory(path),
                CatalogEntry::Config { path } => set.register_config(path),
                CatalogEntry::Symlink { path, target } => set.register_symlink(path, target),
                CatalogEntry::Binary { path } => {
                    summary.libraries += resolver.register_binary(set, path)?;
                    summary.binaries += 1;
                }
                CatalogEntry::BinaryGlob { pattern } => {
                    for path in expand_glob(pattern)? {
                        summary.libraries += resolver.register_binary(set, &path)?;
                        summary.binaries += 1;
                    }
                }
                CatalogEntry::Tree { path } => {
                    let count = tree::register_tree_if_present(set, path)?;
                    if count == 0 {
                        eprintln!("  [WARN] Tree {} not found, skipping", path.display());
                    }
                    summary.tree_entries += count;
                }
            }
        }

        Ok(summary)
    }
}

/// Matches of `pattern`, sorted. No matches is not an error.
fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| Error::Catalog {
        path: PathBuf::from(pattern),
        message: e.to_string(),
    })?;

    paths
        .map(|entry| {
            entry.map_err(|e| Error::Walk {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })
        })
        .collect()
}
