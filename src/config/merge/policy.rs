//! Merge policy: the built-in defaults layer every load starts from.

use crate::config::DocketConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with `DocketConfig::default()` as the lowest-precedence source.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&DocketConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
