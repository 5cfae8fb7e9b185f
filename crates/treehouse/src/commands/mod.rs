//! CLI command implementations

pub mod delete;
pub mod github;
pub mod list;

use std::path::Path;

use anyhow::Context;
use treehouse_core::{Config, SystemRunner};

pub use delete::{DeleteArgs, run_delete};
pub use github::run_github;
pub use list::{ListArgs, run_list};

/// Exit code for a config file that cannot be loaded
pub const CONFIG_EXIT_CODE: i32 = 4;

/// Load the config file, falling back to defaults when none exists
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::load(path).with_context(|| match path {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to load config".to_string(),
    })?;
    Ok(config)
}

/// Process runner honoring the configured command timeout
pub fn runner(config: &Config) -> SystemRunner {
    SystemRunner::new(config.scan.command_timeout())
}
