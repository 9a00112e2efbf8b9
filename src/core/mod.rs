

pub mod config;
pub mod error;

pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
