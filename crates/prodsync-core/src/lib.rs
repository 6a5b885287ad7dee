pub mod app_config;
pub mod asset;
pub mod config;
pub mod error;
pub mod product;

pub use app_config::AppConfig;
pub use asset::{derive_asset_name, encode_asset, resolve_asset_path, AssetRole, EncodedAsset};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use product::{Product, ProductId};
