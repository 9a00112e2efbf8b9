use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;

use super::models::QueryIntent;
use crate::toolkit::catalog::dataset::dates::MONTHS;
use crate::toolkit::catalog::text::{ALIASES, normalize, normalize_and_tokenize};


pub const SCOPE_HINTS: &[&str] = &[
    "course", "courses", "degree", "degrees", "programme", "programmes", "program",
    "programs", "university", "universities", "uni", "college", "colleges",
    "campus", "campuses", "study", "studying", "tuition", "fee", "fees",
    "undergraduate", "postgraduate", "graduate", "bachelor", "bachelors",
    "master", "masters", "doctorate", "foundation", "diploma", "certificate",
    "apprenticeship", "ucas", "intake", "qualification", "qualifications",
    "subject", "subjects", "module", "modules", "enrol", "enroll", "apply",
    "application", "institution", "provider", "providers",
    "bsc", "ba", "beng", "llb", "msc", "ma", "meng", "mba", "llm", "mres",
    "mphil", "phd", "pgce", "pgdip", "pgcert", "hnd", "hnc",
];


pub const LEVEL_KEYWORDS: &[(&str, &[&str])] = &[
    ("bsc", &["bsc"]),
    ("ba", &["ba"]),
    ("beng", &["beng"]),
    ("llb", &["llb"]),
    ("msc", &["msc"]),
    ("ma", &["ma"]),
    ("meng", &["meng"]),
    ("mba", &["mba"]),
    ("llm", &["llm"]),
    ("mres", &["mres"]),
    ("mphil", &["mphil"]),
    ("phd", &["phd", "doctor"]),
    ("doctorate", &["phd", "doctor"]),
    ("pgce", &["pgce"]),
    ("pgdip", &["pgdip"]),
    ("pgcert", &["pgcert"]),
    ("hnd", &["hnd"]),
    ("hnc", &["hnc"]),
    ("foundation", &["foundation"]),
    ("undergraduate", &["bsc", "ba", "beng", "llb", "bachelor", "meng", "mmath", "mchem", "mphys"]),
    ("bachelor", &["bsc", "ba", "beng", "llb", "bachelor"]),
    ("bachelors", &["bsc", "ba", "beng", "llb", "bachelor"]),
    ("masters", &["msc", "ma", "mba", "mres", "mphil", "llm", "master"]),
    ("master", &["msc", "ma", "mba", "mres", "mphil", "llm", "master"]),
    ("postgraduate", &[
        "msc", "ma", "mba", "mres", "mphil", "llm", "master", "pgce", "pgdip", "pgcert", "phd", "doctor",
    ]),
];

/// Words after which "may" names the month rather than asking permission.
const MAY_LEADERS: &[&str] = &[
    "in", "from", "during", "until", "start", "starts", "starting", "begin", "begins", "beginning", "intake",
];

pub const CLAUSE_PREPOSITIONS: &[&str] = &["in", "on", "for", "at"];

const MONTH_ABBREVIATIONS: &[(&str, &str)] = &[
    ("jan", "Jan"),
    ("feb", "Feb"),
    ("mar", "Mar"),
    ("apr", "Apr"),
    ("jun", "Jun"),
    ("jul", "Jul"),
    ("aug", "Aug"),
    ("sep", "Sep"),
    ("sept", "Sep"),
    ("oct", "Oct"),
    ("nov", "Nov"),
    ("dec", "Dec"),
];

lazy_static! {
    /// Checked in order; the first family that matches wins.
    pub static ref INTENT_PATTERNS: Vec<(QueryIntent, Regex)> = [
        (QueryIntent::Count, r"\b(how many|count|number of|total number)\b"),
        (QueryIntent::Avg, r"\b(average|mean|avg|typical)\b"),
        (QueryIntent::Max, r"\b(most expensive|highest|max|maximum|longest|priciest|dearest)\b"),
        (QueryIntent::Min, r"\b(cheapest|lowest|min|minimum|least expensive|shortest)\b"),
    ]
    .into_iter()
    .filter_map(|(intent, pattern)| Regex::new(pattern).ok().map(|re| (intent, re)))
    .collect();

    static ref SCOPE_SET: HashSet<&'static str> = SCOPE_HINTS
        .iter()
        .copied()
        .chain(ALIASES.keys().copied())
        .collect();

    pub static ref LEVELS: HashMap<&'static str, &'static [&'static str]> =
        LEVEL_KEYWORDS.iter().copied().collect();

    static ref MONTH_WORDS: HashMap<&'static str, &'static str> = MONTHS
        .iter()
        .filter(|(name, _)| *name != "may")
        .copied()
        .chain(MONTH_ABBREVIATIONS.iter().copied())
        .collect();
}


pub fn is_in_scope(text: &str) -> bool {
    normalize_and_tokenize(text)
        .iter()
        .any(|token| SCOPE_SET.contains(token.as_str()))
}


pub fn detect_intent(text: &str) -> QueryIntent {
    let normalized = normalize(text);
    INTENT_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(&normalized))
        .map(|(intent, _)| *intent)
        .unwrap_or(QueryIntent::List)
}


pub fn level_needles(token: &str) -> Option<&'static [&'static str]> {
    LEVELS.get(token).copied()
}


pub fn is_month_word(token: &str) -> bool {
    token == "may" || MONTH_WORDS.contains_key(token)
}


/// Month codes named in already-normalized text, in order of appearance.
pub fn months_mentioned(normalized: &str) -> Vec<&'static str> {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mut codes: Vec<&'static str> = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        let code = match MONTH_WORDS.get(*token) {
            Some(code) => Some(*code),
            None if *token == "may" && i > 0 && MAY_LEADERS.contains(&tokens[i - 1]) => Some("May"),
            None => None,
        };
        if let Some(code) = code {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    codes
}


/// Words after the last "in/on/for/at" of already-normalized text.
pub fn trailing_clause(normalized: &str) -> Option<Vec<&str>> {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let last = tokens.iter().rposition(|t| CLAUSE_PREPOSITIONS.contains(t))?;
    let clause = tokens[last + 1..].to_vec();
    if clause.is_empty() { None } else { Some(clause) }
}
