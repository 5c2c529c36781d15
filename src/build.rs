//! The build pipeline: catalog → install set → staging root → image.
//!
//! ```text
//! 1. Register every catalog entry (binaries pull in their ldd closure)
//! 2. Create a fresh staging root (mkinitrdXXXXXX under the temp dir)
//! 3. Materialize the install set into it, symlinks last
//! 4. Write /init
//! 5. find | cpio -H newc | gzip into <output>.tmp, rename to <output>
//! 6. Remove the staging root (also on failure)
//! ```

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::archive;
use crate::catalog::{Catalog, RegisterSummary};
use crate::error::{Error, Result};
use crate::init_script;
use crate::install_set::{EntityCounts, InstallSet};
use crate::libdeps::{DependencyLister, DependencyResolver};
use crate::materialize;
use crate::timing::Timer;

/// Everything one build needs besides the resolver.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub catalog: Catalog,
    pub output: PathBuf,
    pub gzip_level: u32,
    /// Parent of the staging root; the system temp dir when `None`.
    pub tmpdir: Option<PathBuf>,
    /// Print every image path while materializing.
    pub verbose: bool,
}

/// What a finished build produced.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub registered: RegisterSummary,
    pub materialized: EntityCounts,
    pub output: PathBuf,
    pub size: u64,
}

/// Run the catalog against a fresh install set.
pub fn resolve_install_set<L: DependencyLister>(
    catalog: &Catalog,
    resolver: &DependencyResolver<L>,
) -> Result<(InstallSet, RegisterSummary)> {
    let mut set = InstallSet::new();
    let summary = catalog.register_all(&mut set, resolver)?;
    Ok((set, summary))
}

/// Create the uniquely named staging root. It is removed when dropped.
pub fn create_staging_root(tmpdir: Option<&Path>) -> Result<TempDir> {
    let parent = tmpdir
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir);
    tempfile::Builder::new()
        .prefix("mkinitrd")
        .tempdir_in(&parent)
        .map_err(|source| Error::Staging { parent, source })
}

/// Fill `staging_root` with the install set and the init script.
pub fn populate_staging_root(
    set: &InstallSet,
    staging_root: &Path,
    verbose: bool,
) -> Result<EntityCounts> {
    let counts = materialize::materialize(set, staging_root, verbose)?;
    init_script::write_init_script(staging_root)?;
    Ok(counts)
}

/// Build the image described by `options`.
pub fn build_image<L: DependencyLister>(
    options: &BuildOptions,
    resolver: &DependencyResolver<L>,
) -> Result<BuildReport> {
    println!("Resolving install set...");
    let timer = Timer::start("Resolve install set");
    let (set, registered) = resolve_install_set(&options.catalog, resolver)?;
    timer.finish();
    println!(
        "  {} entries ({} binaries, {} libraries)",
        set.len(),
        registered.binaries,
        registered.libraries
    );

    let staging = create_staging_root(options.tmpdir.as_deref())?;
    println!("Building initrd in {} ...", staging.path().display());

    let timer = Timer::start("Materialize staging root");
    let materialized = populate_staging_root(&set, staging.path(), options.verbose)?;
    timer.finish();

    println!("Writing image to {}", options.output.display());
    let timer = Timer::start("Pack cpio archive");
    let size = archive::build_cpio(staging.path(), &options.output, options.gzip_level)?;
    timer.finish();

    // Removal errors are reported, not fatal
    let staging_path = staging.path().to_path_buf();
    if let Err(e) = staging.close() {
        eprintln!(
            "  [WARN] Failed to remove staging root {}: {}",
            staging_path.display(),
            e
        );
    }

    Ok(BuildReport {
        registered,
        materialized,
        output: options.output.clone(),
        size,
    })
}
