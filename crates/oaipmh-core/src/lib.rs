pub mod config;
pub mod error;
pub mod namespaces;
pub mod types;

pub use config::OaiConfig;
pub use error::{OaiError, Result};
pub use types::*;
