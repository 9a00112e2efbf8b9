pub mod builder;
pub mod inverted;
pub mod models;

pub use builder::{IndexBuilder, IndexStatus};
pub use inverted::{BuildStats, CatalogIndex};
pub use models::{CatalogRecord, CatalogRow, RecordDisplay, RecordId};
