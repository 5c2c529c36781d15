//! Shared test utilities for mkinitrd tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use mkinitrd::libdeps::DependencyLister;
use mkinitrd::Error;

/// Test environment with a fake host tree and a staging root.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Fake host filesystem (source of binaries and libraries)
    pub host: PathBuf,
    /// Staging root (materialization destination)
    pub staging: PathBuf,
    /// Scratch space for outputs
    pub base_dir: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with temporary directories.
    ///
    /// Paths are canonical so they compare equal to what
    /// `fs::canonicalize` returns for files inside them.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = fs::canonicalize(temp_dir.path()).expect("Failed to canonicalize temp dir");

        let host = base.join("host");
        let staging = base.join("staging");

        fs::create_dir_all(&host).expect("Failed to create host dir");
        fs::create_dir_all(&staging).expect("Failed to create staging dir");

        Self {
            _temp_dir: temp_dir,
            host,
            staging,
            base_dir: base,
        }
    }

    /// Path under the fake host root.
    pub fn host_path(&self, rel: &str) -> PathBuf {
        self.host.join(rel)
    }

    /// Where an image path lands in the staging root.
    pub fn staged(&self, image_path: &Path) -> PathBuf {
        mkinitrd::materialize::staging_path(&self.staging, image_path)
    }
}

/// Serves crafted dependency reports instead of running ldd.
#[derive(Default)]
pub struct FixtureLister {
    reports: HashMap<PathBuf, String>,
}

impl FixtureLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_report(mut self, binary: &Path, report: impl Into<String>) -> Self {
        self.reports.insert(binary.to_path_buf(), report.into());
        self
    }
}

impl DependencyLister for FixtureLister {
    fn list(&self, binary: &Path) -> mkinitrd::Result<String> {
        self.reports
            .get(binary)
            .cloned()
            .ok_or_else(|| Error::ExternalProcess {
                command: format!("ldd {}", binary.display()),
                code: 1,
                stderr: "\tnot a dynamic executable".to_string(),
            })
    }
}

/// One `ldd` line for a library found through the search path.
pub fn ldd_line(name: &str, resolved: &Path) -> String {
    format!("\t{} => {} (0x00007f1234000000)\n", name, resolved.display())
}

/// One `ldd` line for the dynamic loader (absolute name, no arrow).
pub fn ldd_loader_line(path: &Path) -> String {
    format!("\t{} (0x00007f1234500000)\n", path.display())
}

/// The vdso line every dynamically linked binary has.
pub const LDD_VDSO_LINE: &str = "\tlinux-vdso.so.1 (0x00007ffee9bfe000)\n";

/// Create a mock executable binary file.
pub fn create_mock_binary(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir for binary");
    }

    fs::write(path, "#!/bin/bash\necho mock\n").expect("Failed to create mock binary");

    let mut perms = fs::metadata(path).expect("Failed to get metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("Failed to set permissions");
}

/// Create a mock shared library file with recognizable content.
pub fn create_mock_library(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir for library");
    }
    let name = path.file_name().unwrap_or_default().to_string_lossy();
    fs::write(path, format!("\x7fELF mock {}\n", name)).expect("Failed to create mock library");
}

/// Create a symlink, creating its parent directory first.
pub fn create_symlink(target: &str, link: &Path) {
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir for symlink");
    }
    std::os::unix::fs::symlink(target, link).expect("Failed to create symlink");
}

/// Assert that a symlink exists and points to the expected target.
pub fn assert_symlink(path: &Path, expected_target: &str) {
    assert!(
        path.is_symlink(),
        "Expected symlink at {}, but it's not a symlink",
        path.display()
    );

    let target = fs::read_link(path).expect("Failed to read symlink");
    assert_eq!(
        target.to_string_lossy(),
        expected_target,
        "Symlink {} points to {:?}, expected {}",
        path.display(),
        target,
        expected_target
    );
}

/// Assert that two files have identical bytes.
pub fn assert_same_content(actual: &Path, expected: &Path) {
    let a = fs::read(actual).unwrap_or_else(|e| panic!("Failed to read {}: {}", actual.display(), e));
    let b =
        fs::read(expected).unwrap_or_else(|e| panic!("Failed to read {}: {}", expected.display(), e));
    assert!(
        a == b,
        "{} differs from {}",
        actual.display(),
        expected.display()
    );
}

/// Assert that a regular file exists (not a symlink).
pub fn assert_file_exists(path: &Path) {
    let meta = fs::symlink_metadata(path)
        .unwrap_or_else(|_| panic!("Expected file to exist: {}", path.display()));
    assert!(meta.is_file(), "Expected regular file: {}", path.display());
}

/// Assert that a directory exists (not a symlink).
pub fn assert_dir_exists(path: &Path) {
    let meta = fs::symlink_metadata(path)
        .unwrap_or_else(|_| panic!("Expected directory to exist: {}", path.display()));
    assert!(meta.is_dir(), "Expected directory: {}", path.display());
}

/// Unix permission bits of a file.
pub fn mode_of(path: &Path) -> u32 {
    fs::metadata(path)
        .expect("Failed to get metadata")
        .permissions()
        .mode()
        & 0o7777
}
