use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

use super::normalize::{normalize_and_tokenize, tokenize, normalize};


pub const ALIAS_TABLE: &[(&str, &[&str])] = &[
    ("cs", &["computer science", "computing"]),
    ("ai", &["artificial intelligence"]),
    ("ml", &["machine learning"]),
    ("ds", &["data science"]),
    ("se", &["software engineering"]),
    ("ict", &["information technology"]),
    ("ee", &["electrical engineering", "electronic engineering"]),
    ("mecheng", &["mechanical engineering"]),
    ("civeng", &["civil engineering"]),
    ("cyber", &["cyber security", "cybersecurity"]),
    ("bio", &["biology", "biological sciences"]),
    ("biomed", &["biomedical science"]),
    ("chem", &["chemistry"]),
    ("phys", &["physics"]),
    ("maths", &["mathematics"]),
    ("math", &["mathematics"]),
    ("econ", &["economics"]),
    ("psych", &["psychology"]),
    ("biz", &["business"]),
    ("mgmt", &["management"]),
    ("acc", &["accounting"]),
    ("fin", &["finance"]),
    ("pe", &["physical education"]),
    ("pr", &["public relations"]),
    ("hr", &["human resources", "human resource management"]),
    ("ir", &["international relations"]),
    ("lit", &["literature"]),
    ("eng", &["engineering"]),
];


pub const STOPWORDS: &[&str] = &[
    "course", "courses", "programme", "programmes", "program", "programs",
    "please", "find", "search", "show", "list", "give", "get", "tell", "me",
    "want", "looking", "look", "need", "can", "could", "would", "you", "your",
    "any", "all", "some", "the", "and", "or", "of", "to", "in", "on", "for",
    "at", "by", "with", "from", "about", "what", "which", "who", "where",
    "when", "how", "many", "much", "is", "are", "was", "there", "do", "does",
    "have", "has", "my", "it", "that", "this", "these", "those", "available",
    "offer", "offers", "offered", "options", "option", "study", "studying",
    "start", "starts", "starting", "begin", "begins", "beginning",
    "count", "number", "total", "average", "mean", "avg", "cheapest",
    "lowest", "min", "minimum", "highest", "max", "maximum", "most",
    "least", "expensive", "cheap",
];

lazy_static! {
    pub static ref ALIASES: HashMap<&'static str, &'static [&'static str]> =
        ALIAS_TABLE.iter().copied().collect();

    static ref STOPWORD_SET: HashSet<&'static str> = STOPWORDS.iter().copied().collect();

    /// Multi-word synonyms padded with spaces, paired with the short tag they imply.
    static ref PHRASE_TAGS: Vec<(String, &'static str)> = ALIAS_TABLE
        .iter()
        .flat_map(|(tag, synonyms)| {
            synonyms
                .iter()
                .map(|phrase| normalize(phrase))
                .filter(|phrase| phrase.contains(' '))
                .map(move |phrase| (format!(" {} ", phrase), *tag))
        })
        .collect();
}


pub fn is_stopword(token: &str) -> bool {
    STOPWORD_SET.contains(token)
}


pub fn alias_words(key: &str) -> Option<Vec<String>> {
    ALIASES.get(key).map(|synonyms| {
        synonyms
            .iter()
            .flat_map(|synonym| normalize_and_tokenize(synonym))
            .collect()
    })
}


pub fn expand_query(raw: &str) -> Vec<String> {
    let base: Vec<String> = tokenize(&normalize(raw))
        .into_iter()
        .filter(|token| !is_stopword(token))
        .collect();

    let mut seen = HashSet::new();
    let mut expanded = Vec::with_capacity(base.len());

    for token in base {
        let extra = alias_words(&token).unwrap_or_default();
        for word in std::iter::once(token).chain(extra) {
            if seen.insert(word.clone()) {
                expanded.push(word);
            }
        }
    }

    expanded
}


pub fn phrase_tags(normalized_blob: &str) -> Vec<&'static str> {
    let padded = format!(" {} ", normalized_blob);
    let mut tags: Vec<&'static str> = PHRASE_TAGS
        .iter()
        .filter(|(phrase, _)| padded.contains(phrase.as_str()))
        .map(|(_, tag)| *tag)
        .collect();
    tags.dedup();
    tags
}
