pub mod dataset;
pub mod index;
pub mod query;
pub mod search;
pub mod service;
pub mod text;

pub use service::CatalogService;
