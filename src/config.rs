//! Configuration management for mkinitrd.
//!
//! Values come from the environment (a `.env` file is loaded into it first by
//! `main`). Command-line flags override whatever is set here.

use std::collections::HashMap;
use std::path::PathBuf;

/// Where the image is written when nothing else is configured.
pub const DEFAULT_OUTPUT: &str = "/boot/initramfs.img";

/// Maximum compression; the image is built rarely and read on every boot.
pub const DEFAULT_GZIP_LEVEL: u32 = 9;

/// mkinitrd configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Output image path (MKINITRD_OUTPUT)
    pub output: PathBuf,
    /// gzip level 1-9 (MKINITRD_GZIP_LEVEL)
    pub gzip_level: u32,
    /// Dependency lister program (MKINITRD_LDD)
    pub ldd: String,
    /// Extra skip prefixes for virtual ldd entries (MKINITRD_LDD_SKIP, comma separated)
    pub ldd_skip: Vec<String>,
    /// Catalog file; the built-in catalog when unset (MKINITRD_CATALOG)
    pub catalog: Option<PathBuf>,
    /// Parent directory of the staging root (MKINITRD_TMPDIR)
    pub tmpdir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            gzip_level: DEFAULT_GZIP_LEVEL,
            ldd: "ldd".to_string(),
            ldd_skip: Vec::new(),
            catalog: None,
            tmpdir: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Self {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build configuration from an explicit variable map.
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let gzip_level = match get("MKINITRD_GZIP_LEVEL").map(str::parse::<u32>) {
            Some(Ok(level)) => level.clamp(1, 9),
            Some(Err(_)) => {
                eprintln!(
                    "  [WARN] Ignoring invalid MKINITRD_GZIP_LEVEL, using {}",
                    DEFAULT_GZIP_LEVEL
                );
                DEFAULT_GZIP_LEVEL
            }
            None => defaults.gzip_level,
        };

        let ldd_skip = get("MKINITRD_LDD_SKIP")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            output: get("MKINITRD_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output),
            gzip_level,
            ldd: get("MKINITRD_LDD")
                .map(String::from)
                .unwrap_or(defaults.ldd),
            ldd_skip,
            catalog: get("MKINITRD_CATALOG").map(PathBuf::from),
            tmpdir: get("MKINITRD_TMPDIR").map(PathBuf::from),
        }
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  MKINITRD_OUTPUT: {}", self.output.display());
        println!("  MKINITRD_GZIP_LEVEL: {}", self.gzip_level);
        println!("  MKINITRD_LDD: {}", self.ldd);
        if self.ldd_skip.is_empty() {
            println!("  MKINITRD_LDD_SKIP: (none)");
        } else {
            println!("  MKINITRD_LDD_SKIP: {}", self.ldd_skip.join(","));
        }
        match &self.catalog {
            Some(path) => println!("  MKINITRD_CATALOG: {}", path.display()),
            None => println!("  MKINITRD_CATALOG: (built-in)"),
        }
        match &self.tmpdir {
            Some(path) => println!("  MKINITRD_TMPDIR: {}", path.display()),
            None => println!("  MKINITRD_TMPDIR: {}", std::env::temp_dir().display()),
        }
    }
}
