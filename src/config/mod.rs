//! Service configuration: typed settings, TOML loading and env overrides.

mod defaults;
pub mod env;
mod errors;
mod load;
mod types;

pub use errors::ConfigError;
pub use load::{CONFIG_FILE_NAME, CONFIG_PATH_ENV, load, load_from_path};
pub use types::{
    AudioSettings, DevicePreference, LoggingSettings, ModelSettings, ScoreSettings,
    ServiceConfig, UploadSettings,
};
pub(crate) use types::normalize_extension;
