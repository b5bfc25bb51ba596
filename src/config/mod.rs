#[cfg(feature = "cli")]
pub mod cli;
pub mod storage;
pub mod toml_config;

pub use storage::LocalStorage;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
