//! Shared library closure for binaries, from `ldd` output.
//!
//! `ldd` asks the host dynamic linker to load the binary, so its report is
//! already the full transitive closure: one query per binary is enough and
//! there is no recursion here. Each reported library is registered at its
//! canonical path; if the reported path was a symlink (`libc.so.6 ->
//! libc-2.17.so`), the link itself is registered too, with its literal link
//! text, so the soname keeps resolving inside the image.
//!
//! Example `ldd` output:
//! ```text
//!     linux-vdso.so.1 (0x00007ffee9bfe000)
//!     libtinfo.so.6 => /lib64/libtinfo.so.6 (0x00007f1234100000)
//!     libc.so.6 => /lib64/libc.so.6 (0x00007f1234000000)
//!     /lib64/ld-linux-x86-64.so.2 (0x00007f1234500000)
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::install_set::InstallSet;
use crate::process;

/// Kernel-provided pseudo-libraries. They have no backing file.
pub const DEFAULT_SKIP_PREFIXES: &[&str] = &["linux-vdso.so", "linux-gate.so"];

/// Source of dependency reports for a binary.
pub trait DependencyLister {
    /// Return the raw dependency report for `binary`.
    fn list(&self, binary: &Path) -> Result<String>;
}

/// Runs the host's `ldd` (or a compatible program).
#[derive(Debug, Clone)]
pub struct Ldd {
    program: String,
}

impl Ldd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Ldd {
    fn default() -> Self {
        Self::new("ldd")
    }
}

impl DependencyLister for Ldd {
    fn list(&self, binary: &Path) -> Result<String> {
        process::run(&self.program, [binary.to_string_lossy()])
    }
}

/// One classified line of a dependency report.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReportLine {
    Blank,
    Virtual,
    Library(PathBuf),
}

/// Classify a single report line. `None` means the line is not understood.
fn parse_line(line: &str, skip_prefixes: &[String]) -> Option<ReportLine> {
    let line = line.trim();
    if line.is_empty() {
        return Some(ReportLine::Blank);
    }

    let first = line.split_whitespace().next()?;
    if skip_prefixes.iter().any(|p| first.starts_with(p.as_str())) {
        return Some(ReportLine::Virtual);
    }

    // Both forms end in " (0xADDR)"
    let (head, addr) = line.rsplit_once('(')?;
    if !head.ends_with(char::is_whitespace) || !is_load_address(addr) {
        return None;
    }

    let location = match head.split_once("=>") {
        Some((_name, resolved)) => resolved.trim(),
        None => head.trim(),
    };

    if !location.starts_with('/') || location.contains(char::is_whitespace) {
        return None;
    }
    Some(ReportLine::Library(PathBuf::from(location)))
}

/// `0x7f1234000000)`
fn is_load_address(s: &str) -> bool {
    let Some(hex) = s.strip_prefix("0x").and_then(|s| s.strip_suffix(')')) else {
        return false;
    };
    !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse a whole dependency report into library locations, in report order.
///
/// Fails on the first line that matches neither grammar. `name => not found`
/// is such a line: skipping it would produce an image that cannot load the
/// binary.
pub fn parse_ldd_output(
    binary: &Path,
    output: &str,
    skip_prefixes: &[String],
) -> Result<Vec<PathBuf>> {
    let mut libs = Vec::new();

    for line in output.lines() {
        match parse_line(line, skip_prefixes) {
            Some(ReportLine::Library(path)) => libs.push(path),
            Some(ReportLine::Blank) | Some(ReportLine::Virtual) => {}
            None => {
                return Err(Error::DependencyParse {
                    binary: binary.to_path_buf(),
                    line: line.trim().to_string(),
                })
            }
        }
    }

    Ok(libs)
}

/// A symlink that must be recreated next to a resolved library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryAlias {
    /// Canonical parent directory joined with the link's basename.
    pub path: PathBuf,
    /// Link text exactly as read from the host.
    pub target: PathBuf,
}

/// A reported library location, resolved against the live filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLibrary {
    pub canonical: PathBuf,
    /// Every symlink hop from the reported location to `canonical`.
    pub aliases: Vec<LibraryAlias>,
}

/// Same bound the kernel puts on symlink resolution (ELOOP).
const MAX_SYMLINK_HOPS: usize = 40;

/// Resolve a library location to its real file and the symlink chain needed
/// to reach it (`libfoo.so.1 -> libfoo.so.1.2 -> libfoo.so.1.2.3`).
pub fn resolve_library(location: &Path) -> Result<ResolvedLibrary> {
    let fail = |source: io::Error| Error::LibraryResolution {
        path: location.to_path_buf(),
        source,
    };

    let canonical = fs::canonicalize(location).map_err(fail)?;
    let mut aliases = Vec::new();
    let mut current = location.to_path_buf();

    for _ in 0..MAX_SYMLINK_HOPS {
        if !fs::symlink_metadata(&current).map_err(fail)?.file_type().is_symlink() {
            return Ok(ResolvedLibrary { canonical, aliases });
        }

        let target = fs::read_link(&current).map_err(fail)?;
        let name = current.file_name().ok_or_else(|| {
            fail(io::Error::new(
                io::ErrorKind::InvalidInput,
                "library path has no file name",
            ))
        })?;
        let parent = current.parent().unwrap_or_else(|| Path::new("/"));
        let dir = fs::canonicalize(parent).map_err(fail)?;
        let path = dir.join(name);

        if path != canonical && !aliases.iter().any(|a: &LibraryAlias| a.path == path) {
            aliases.push(LibraryAlias {
                path,
                target: target.clone(),
            });
        }
        // Relative link text is relative to the directory holding the link
        current = dir.join(target);
    }

    Err(fail(io::Error::new(
        io::ErrorKind::InvalidInput,
        "too many levels of symbolic links",
    )))
}

/// Registers binaries together with their shared library closure.
pub struct DependencyResolver<L = Ldd> {
    lister: L,
    skip_prefixes: Vec<String>,
}

impl<L: DependencyLister> DependencyResolver<L> {
    pub fn new(lister: L) -> Self {
        Self {
            lister,
            skip_prefixes: DEFAULT_SKIP_PREFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Add prefixes of report entries that have no backing file.
    pub fn with_skip_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_prefixes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    pub fn skip_prefixes(&self) -> &[String] {
        &self.skip_prefixes
    }

    /// Query, parse and resolve the closure of `binary` without registering.
    pub fn resolve(&self, binary: &Path) -> Result<Vec<ResolvedLibrary>> {
        let report = self.lister.list(binary)?;
        parse_ldd_output(binary, &report, &self.skip_prefixes)?
            .iter()
            .map(|location| resolve_library(location))
            .collect()
    }

    /// Register `binary` and every library it loads.
    ///
    /// The whole report is parsed and resolved before anything is inserted,
    /// so on error `set` is untouched. Returns the number of libraries.
    pub fn register_binary(&self, set: &mut InstallSet, binary: &Path) -> Result<usize> {
        let libraries = self.resolve(binary)?;

        set.register_config(binary);
        for lib in &libraries {
            set.register_file(&lib.canonical, &lib.canonical);
            for alias in &lib.aliases {
                set.register_symlink(&alias.path, &alias.target);
            }
        }

        Ok(libraries.len())
    }
}

impl Default for DependencyResolver<Ldd> {
    fn default() -> Self {
        Self::new(Ldd::default())
    }
}
