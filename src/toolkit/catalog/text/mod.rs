pub mod aliases;
pub mod normalize;

pub use aliases::{ALIASES, STOPWORDS, expand_query, is_stopword, phrase_tags};
pub use normalize::{normalize, normalize_and_tokenize, tokenize};
