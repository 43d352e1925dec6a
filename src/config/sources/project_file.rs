//! Project config file: `<root>/docket.toml`.

use crate::config::PROJECT_CONFIG_FILE;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = root.join(PROJECT_CONFIG_FILE);
    Ok(builder.add_source(File::from(path).required(false)))
}
