//! Show command - displays information.

use anyhow::Result;

use mkinitrd::config::Config;
use mkinitrd::init_script::INIT_SCRIPT;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config,
    /// Show the /init script
    Init,
}

/// Execute the show command.
pub fn cmd_show(target: ShowTarget, config: &Config) -> Result<()> {
    match target {
        ShowTarget::Config => {
            config.print();
            println!();
            let resolver = super::resolver(config);
            println!("Skipped ldd entries: {}", resolver.skip_prefixes().join(", "));
        }
        ShowTarget::Init => print!("{}", INIT_SCRIPT),
    }
    Ok(())
}
