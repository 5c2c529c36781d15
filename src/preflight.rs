//! Preflight checks for an initrd build.
//!
//! Verifies host tools and every host path the catalog reads before any
//! work starts. Run with `mkinitrd preflight`.

use std::path::Path;

use crate::catalog::{Catalog, CatalogEntry};
use crate::config::Config;
use crate::process;

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check failed - build will fail.
    Fail,
    /// Check passed but with a warning.
    Warn,
}

impl CheckResult {
    pub fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: None,
        }
    }

    pub fn pass_with(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: Some(details.to_string()),
        }
    }

    pub fn fail(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            details: Some(details.to_string()),
        }
    }

    pub fn warn(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warn,
            details: Some(details.to_string()),
        }
    }
}

/// Results of all preflight checks.
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Returns true if no check failed.
    pub fn all_passed(&self) -> bool {
        self.fail_count() == 0
    }

    pub fn fail_count(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    pub fn warn_count(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let (icon, status_str) = match check.status {
                CheckStatus::Pass => ("✓", "PASS"),
                CheckStatus::Fail => ("✗", "FAIL"),
                CheckStatus::Warn => ("⚠", "WARN"),
            };

            print!("  {} [{}] {}", icon, status_str, check.name);
            if let Some(details) = &check.details {
                println!(": {}", details);
            } else {
                println!();
            }
        }

        println!();
        let total = self.checks.len();
        let passed = self.count(CheckStatus::Pass);
        println!("Summary: {}/{} passed", passed, total);
        if self.fail_count() > 0 {
            println!("         {} FAILED - build will not succeed", self.fail_count());
        }
        if self.warn_count() > 0 {
            println!("         {} warnings", self.warn_count());
        }
    }
}

/// Run all preflight checks.
pub fn run_preflight(config: &Config, catalog: &Catalog) -> PreflightReport {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    println!("Checking host tools...");
    checks.extend(check_host_tools(config));

    println!("Checking catalog sources...");
    checks.extend(check_catalog_sources(catalog));

    println!("Checking output location...");
    checks.push(check_output_dir(&config.output));

    println!();
    PreflightReport { checks }
}

/// Check the programs the build shells out to.
pub fn check_host_tools(config: &Config) -> Vec<CheckResult> {
    let tools = [
        (config.ldd.as_str(), "glibc-common", "Required for library dependency detection"),
        ("bash", "bash", "Required to run the archive pipeline"),
        ("find", "findutils", "Required to list the staging root"),
        ("cpio", "cpio", "Required to create the initrd archive"),
        ("gzip", "gzip", "Required to compress the initrd"),
    ];

    tools
        .into_iter()
        .map(|(tool, package, purpose)| match process::which(tool) {
            Some(path) => CheckResult::pass_with(tool, &path.display().to_string()),
            None => CheckResult::fail(
                tool,
                &format!("Not found. Install '{}' package. {}", package, purpose),
            ),
        })
        .collect()
}

/// Check every host path the catalog copies from.
///
/// Missing binaries and config files fail the build; missing trees are
/// skipped by the build, so they only warn.
pub fn check_catalog_sources(catalog: &Catalog) -> Vec<CheckResult> {
    catalog
        .entries
        .iter()
        .filter_map(|entry| match entry {
            CatalogEntry::Binary { path } | CatalogEntry::Config { path } => {
                Some(check_source(path, true))
            }
            CatalogEntry::Tree { path } => Some(check_source(path, false)),
            _ => None,
        })
        .collect()
}

fn check_source(path: &Path, required: bool) -> CheckResult {
    let name = path.display().to_string();
    if path.exists() {
        CheckResult::pass(&name)
    } else if required {
        CheckResult::fail(&name, "Not found on host")
    } else {
        CheckResult::warn(&name, "Not found on host, will be skipped")
    }
}

fn check_output_dir(output: &Path) -> CheckResult {
    let name = format!("output {}", output.display());
    match output.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) if !parent.is_dir() => CheckResult::warn(
            &name,
            &format!("{} does not exist yet, will be created", parent.display()),
        ),
        _ => CheckResult::pass(&name),
    }
}
