//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), per-subsystem sections,
//! `AppPaths` for the platform config directory, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    expand_env_var, AiConfig, AppConfig, MapConfig, NavigationConfig, ProviderConfig, SttConfig,
};
