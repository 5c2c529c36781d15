//! Build command - builds the initrd image.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;

use mkinitrd::build::{build_image, BuildOptions};
use mkinitrd::config::Config;

/// Command-line overrides for a build.
pub struct BuildArgs {
    pub output: Option<PathBuf>,
    pub gzip_level: Option<u32>,
    pub catalog: Option<PathBuf>,
    pub quiet: bool,
}

/// Execute the build command.
pub fn cmd_build(args: BuildArgs, config: &Config) -> Result<()> {
    println!("=== Building initrd ===\n");
    let build_start = Instant::now();

    let options = BuildOptions {
        catalog: super::load_catalog(args.catalog.as_deref(), config)?,
        output: args.output.unwrap_or_else(|| config.output.clone()),
        gzip_level: args.gzip_level.unwrap_or(config.gzip_level).clamp(1, 9),
        tmpdir: config.tmpdir.clone(),
        verbose: !args.quiet,
    };

    let report = build_image(&options, &super::resolver(config))
        .with_context(|| format!("Failed to build {}", options.output.display()))?;

    let counts = report.materialized;
    println!("\n=== initrd Complete ===");
    println!("  Output: {}", report.output.display());
    println!("  Size: {} KB", report.size / 1024);
    println!(
        "  Contents: {} directories, {} files, {} symlinks",
        counts.directories, counts.files, counts.symlinks
    );
    println!("  Total time: {:.1}s", build_start.elapsed().as_secs_f64());

    Ok(())
}
