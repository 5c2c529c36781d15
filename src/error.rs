//! Error types for the install-set engine.
//!
//! Every variant is fatal. Nothing in the build retries or degrades: a
//! missing library or a failed copy means there is no image.

use std::io;
use std::path::PathBuf;

/// Result alias used by the library modules.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An external command ran but exited non-zero.
    #[error("'{command}' failed (exit code {code}){}", stderr_suffix(.stderr))]
    ExternalProcess {
        command: String,
        code: i32,
        stderr: String,
    },

    /// An external command could not be started at all.
    #[error("failed to execute '{command}'. Is it installed?")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// A dependency report line matched neither known grammar.
    #[error("unrecognized dependency line for {}: {line:?}", .binary.display())]
    DependencyParse { binary: PathBuf, line: String },

    /// A library named in a dependency report could not be resolved on the host.
    #[error("cannot resolve library {}", .path.display())]
    LibraryResolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Walking a directory tree failed.
    #[error("cannot walk {}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The temporary staging root could not be created.
    #[error("cannot create staging directory in {}", .parent.display())]
    Staging {
        parent: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing an entity into the staging root failed.
    #[error("failed to materialize {}", .path.display())]
    Materialization {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A catalog file could not be read or parsed.
    #[error("invalid catalog {}: {message}", .path.display())]
    Catalog { path: PathBuf, message: String },

    /// The archive could not be finalized.
    #[error("failed to write image {}", .output.display())]
    Package {
        output: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr)
    }
}
