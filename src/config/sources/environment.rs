//! Environment variable source: DOCKET_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Keys parsed as comma-separated lists when set from the environment.
const LIST_KEYS: [&str; 2] = ["manifest.extensions", "scanner.fallback"];

/// Build the environment source.
/// Uses DOCKET prefix and __ as separator for nested keys, e.g.
/// `DOCKET__SCANNER__INTERVAL_SECS=10`.
pub fn source() -> Environment {
    let mut env = Environment::with_prefix("DOCKET")
        .separator("__")
        .list_separator(",")
        .try_parsing(true);
    for key in LIST_KEYS {
        env = env.with_list_parse_key(key);
    }
    env
}

/// Add environment variable overlay to builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(source()))
}
