pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod models;
pub mod version;

pub use cache::ReviewCache;
pub use config::Config;
pub use engine::GerritEngine;
pub use error::{Error, Result};
pub use executor::{CommandExecutor, ShellExecutor};
pub use models::{ReviewPage, ReviewRecord};
pub use version::GerritVersion;
