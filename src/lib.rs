pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{http::HttpFetcher, storage::LocalStorage};
pub use config::{toml_config::TomlConfig, CliConfig};
pub use core::{etl::EtlEngine, StatsPipeline};
pub use utils::error::{EtlError, Result};
