//! Preflight command - runs preflight checks.

use anyhow::{bail, Result};
use std::path::PathBuf;

use mkinitrd::catalog::Catalog;
use mkinitrd::config::Config;
use mkinitrd::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(catalog: Option<PathBuf>, strict: bool, config: &Config) -> Result<()> {
    let catalog = super::load_catalog(catalog.as_deref(), config)?;
    if strict {
        run_preflight_or_fail(config, &catalog)?;
    } else {
        let report = preflight::run_preflight(config, &catalog);
        report.print();
        if !report.all_passed() {
            println!("Some checks failed. Use --strict to fail with a non-zero exit code.");
        }
    }
    Ok(())
}

/// Run preflight checks and fail if any check fails.
fn run_preflight_or_fail(config: &Config, catalog: &Catalog) -> Result<()> {
    let report = preflight::run_preflight(config, catalog);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed with {} error(s). Fix the issues above before building.",
            report.fail_count()
        );
    }
    Ok(())
}
