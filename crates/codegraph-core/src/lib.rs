pub mod config;
pub mod error;
pub mod types;

pub use config::ServerConfig;
pub use error::{CodeGraphError, Result};
pub use types::*;
