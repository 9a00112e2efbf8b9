

pub mod core;
pub mod toolkit;
pub mod utils;

pub use utils::safe_truncate_ellipsis;


pub use core::config::CatalogConfig;
pub use core::error::{CatalogError, Result};
pub use toolkit::catalog::dataset::{DatasetSource, FileSource, MemorySource};
pub use toolkit::catalog::index::{CatalogRow, IndexStatus};
pub use toolkit::catalog::query::{QueryIntent, QueryOptions, QueryResult};
pub use toolkit::catalog::CatalogService;


pub const DEFAULT_CACHE_CAPACITY: usize = 100;


pub const DEFAULT_MAX_RESULTS: usize = 10;
