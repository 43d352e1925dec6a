//! Source composition for configuration loading.

pub(crate) mod policy;
pub(crate) mod service;
