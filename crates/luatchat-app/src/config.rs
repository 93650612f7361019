use std::path::PathBuf;

use luatchat_api::DEFAULT_API_BASE_URL;

use crate::cli::Cli;

/// Default storage directory next to the working directory.
const DEFAULT_DATA_DIR: &str = ".luatchat";

/// Resolved application configuration.
pub struct AppConfig {
    pub api_base_url: String,
    pub data_dir: PathBuf,
}

/// Resolve configuration from CLI flags with their env fallbacks already
/// applied by clap; anything still unset takes the built-in default.
pub fn resolve(cli: &Cli) -> AppConfig {
    AppConfig {
        api_base_url: cli
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        data_dir: cli
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
    }
}
