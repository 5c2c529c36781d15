//! mkinitrd - builds a minimal initrd from the running host.
//!
//! Collects a fixed set of binaries with their shared library closure
//! (resolved through `ldd`), configuration files, udev trees and symlinks,
//! adds an `/init` script that assembles md/LVM and switches to the real
//! root, and packs everything into a gzip-compressed newc cpio archive.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mkinitrd::config::Config;

#[derive(Parser)]
#[command(name = "mkinitrd")]
#[command(about = "Minimal initrd builder")]
#[command(
    after_help = "QUICK START:\n  mkinitrd preflight  Check host tools and catalog sources\n  mkinitrd list       Show what would be installed\n  mkinitrd build      Build /boot/initramfs.img"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the initrd image
    Build {
        /// Output image (default: MKINITRD_OUTPUT or /boot/initramfs.img)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// gzip compression level, 1-9 (default: MKINITRD_GZIP_LEVEL or 9)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=9))]
        gzip_level: Option<u32>,

        /// TOML catalog replacing the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Don't print every installed path
        #[arg(short, long)]
        quiet: bool,
    },

    /// Resolve the install set and print it in apply order
    List {
        /// TOML catalog replacing the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Run preflight checks (host tools, catalog sources)
    Preflight {
        /// TOML catalog replacing the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
    /// Print the /init script
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    let config = Config::load();

    match cli.command {
        Commands::Build {
            output,
            gzip_level,
            catalog,
            quiet,
        } => {
            let args = commands::build::BuildArgs {
                output,
                gzip_level,
                catalog,
                quiet,
            };
            commands::cmd_build(args, &config)?;
        }

        Commands::List { catalog, json } => {
            commands::cmd_list(catalog, json, &config)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Init => commands::show::ShowTarget::Init,
            };
            commands::cmd_show(show_target, &config)?;
        }

        Commands::Preflight { catalog, strict } => {
            commands::cmd_preflight(catalog, strict, &config)?;
        }
    }

    Ok(())
}
