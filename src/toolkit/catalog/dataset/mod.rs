pub mod dates;
pub mod flatten;
pub mod loader;
pub mod models;
pub mod source;

pub use flatten::{FlatRecord, FlattenSkip, flatten_provider};
pub use loader::{ProviderEntry, ProviderStream, RootShape, StreamSummary, detect_root_shape};
pub use models::RawProvider;
pub use source::{DatasetReader, DatasetSource, FileSource, MemorySource};
