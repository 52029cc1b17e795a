pub mod app_config;
pub mod config;
pub mod location;
pub mod offers;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use location::{LocationToken, StorefrontId};
pub use offers::{BogoItem, OfferRecord};
