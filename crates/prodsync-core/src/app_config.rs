use std::path::PathBuf;

/// Runtime settings for a sync run, loaded by [`crate::load_app_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// API root; the products collection lives at `{api_base_url}/products`.
    pub api_base_url: String,
    /// Directory stored asset paths are resolved against.
    pub assets_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3131/api".to_string(),
            assets_dir: PathBuf::from("./scripts"),
            request_timeout_secs: 30,
            user_agent: "prodsync/0.1 (product-images)".to_string(),
            log_level: "info".to_string(),
        }
    }
}
