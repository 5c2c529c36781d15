//! mkinitrd library exports.
//!
//! The binary is a thin CLI over these modules; integration tests drive
//! them directly against temporary directories.

pub mod archive;
pub mod build;
pub mod catalog;
pub mod config;
pub mod error;
pub mod init_script;
pub mod install_set;
pub mod libdeps;
pub mod materialize;
pub mod preflight;
pub mod process;
pub mod timing;
pub mod tree;

pub use error::{Error, Result};
pub use install_set::{Entity, InstallSet};
