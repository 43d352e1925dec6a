//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::DocketConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the standard sources, resolving relative paths
    /// against `root`.
    pub fn load(root: &Path) -> Result<DocketConfig, ApiError> {
        let mut config = MergeService::load(root)?;
        config.resolve_paths(root);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path, root: &Path) -> Result<DocketConfig, ApiError> {
        let mut config = MergeService::load_from_file(path)?;
        config.resolve_paths(root);
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration rooted at `root`.
    pub fn default_for(root: &Path) -> DocketConfig {
        let mut config = DocketConfig::default();
        config.resolve_paths(root);
        config
    }
}
