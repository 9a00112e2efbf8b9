pub mod aggregate;
pub mod filters;
pub mod models;
pub mod patterns;
pub mod processor;

pub use aggregate::{AggregateOutcome, NumericField, aggregate, parse_numeric, pick_numeric_field};
pub use filters::{RecordFilter, apply_filters, build_filters};
pub use models::{QueryIntent, QueryOptions, QueryResult};
pub use patterns::{detect_intent, is_in_scope};
pub use processor::QueryProcessor;
