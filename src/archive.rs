//! Packing the staging root into a gzip-compressed newc cpio archive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::process::Cmd;

/// Build `output` from the contents of `root`.
///
/// The archive is streamed to `<output>.tmp` and renamed into place only once
/// the pipeline succeeded, so a failed build never leaves a truncated image
/// where the bootloader expects a good one. Returns the archive size.
pub fn build_cpio(root: &Path, output: &Path, gzip_level: u32) -> Result<u64> {
    let package_err = |source: io::Error| Error::Package {
        output: output.to_path_buf(),
        source,
    };

    // The pipeline runs inside `root`; a relative output must not land there
    let output = &std::path::absolute(output).map_err(package_err)?;
    let temp = temp_output(output);

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(package_err)?;
    }

    // - find . -print0: list everything, null separated
    // - cpio --null -o -H newc: the format the kernel unpacks
    // - pipefail so a cpio failure is not masked by gzip succeeding
    let cmd = format!(
        "set -o pipefail; find . -print0 | cpio --quiet --null -o -H newc | gzip -{} > {}",
        gzip_level.clamp(1, 9),
        shell_quote(&temp)
    );

    if let Err(e) = Cmd::new("bash").args(["-c", &cmd]).dir(root).run() {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }

    fs::rename(&temp, output).map_err(package_err)?;
    let size = fs::metadata(output).map_err(package_err)?.len();
    Ok(size)
}

fn temp_output(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}
