use std::fmt;

use super::patterns::{is_month_word, level_needles, months_mentioned, trailing_clause};
use crate::toolkit::catalog::index::{CatalogRow, RecordDisplay};
use crate::toolkit::catalog::text::{ALIASES, is_stopword, normalize, normalize_and_tokenize};


#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    /// Phrase from a trailing "in/on/for/at" clause, matched as whole words
    /// against all display fields.
    Contains { phrase: String, synonyms: Vec<String> },
    Level { keywords: Vec<String>, needles: Vec<&'static str> },
    StartMonth(Vec<&'static str>),
}

impl RecordFilter {
    pub fn matches(&self, display: &RecordDisplay) -> bool {
        match self {
            Self::Contains { phrase, synonyms } => {
                let haystack = format!(" {} ", display.searchable_text());
                std::iter::once(phrase)
                    .chain(synonyms)
                    .any(|p| haystack.contains(&format!(" {} ", p)))
            }
            Self::Level { needles, .. } => {
                let source = display
                    .qualification
                    .as_deref()
                    .or(display.course_title.as_deref())
                    .unwrap_or_default();
                normalize_and_tokenize(source)
                    .iter()
                    .any(|token| needles.contains(&token.as_str()))
            }
            Self::StartMonth(codes) => display
                .start_month
                .as_deref()
                .is_some_and(|month| codes.contains(&month)),
        }
    }
}

impl fmt::Display for RecordFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains { phrase, .. } => write!(f, "matching \"{}\"", phrase),
            Self::Level { keywords, .. } => write!(f, "at level {}", keywords.join("/")),
            Self::StartMonth(codes) => write!(f, "starting in {}", codes.join("/")),
        }
    }
}


/// Containment, then level, then start month. All must hold.
pub fn build_filters(text: &str) -> Vec<RecordFilter> {
    let normalized = normalize(text);
    let mut filters = Vec::new();

    if let Some(clause) = trailing_clause(&normalized) {
        let words: Vec<&str> = clause
            .into_iter()
            .filter(|w| w.chars().count() >= 2)
            .filter(|w| !is_stopword(w) && !is_month_word(w) && level_needles(w).is_none())
            .collect();

        if !words.is_empty() {
            let phrase = words.join(" ");
            let synonyms = ALIASES
                .get(phrase.as_str())
                .map(|list| list.iter().map(|s| normalize(s)).collect())
                .unwrap_or_default();
            filters.push(RecordFilter::Contains { phrase, synonyms });
        }
    }

    let mut keywords = Vec::new();
    let mut needles: Vec<&'static str> = Vec::new();
    for token in normalized.split_whitespace() {
        if let Some(level) = level_needles(token) {
            if keywords.iter().any(|k| k == token) {
                continue;
            }
            keywords.push(token.to_string());
            for needle in level {
                if !needles.contains(needle) {
                    needles.push(*needle);
                }
            }
        }
    }
    if !keywords.is_empty() {
        filters.push(RecordFilter::Level { keywords, needles });
    }

    let months = months_mentioned(&normalized);
    if !months.is_empty() {
        filters.push(RecordFilter::StartMonth(months));
    }

    filters
}


pub fn apply_filters(rows: Vec<CatalogRow>, filters: &[RecordFilter]) -> Vec<CatalogRow> {
    if filters.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| filters.iter().all(|f| f.matches(&row.display)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u32, title: &str, qualification: &str, campus: &str, month: &str) -> CatalogRow {
        CatalogRow {
            id,
            score: 1,
            display: RecordDisplay {
                course_title: Some(title.to_string()),
                qualification: Some(qualification.to_string()),
                campus: Some(campus.to_string()),
                start_month: Some(month.to_string()),
                ..Default::default()
            },
        }
    }

    fn rows() -> Vec<CatalogRow> {
        vec![
            row(0, "Computer Science", "MSc", "Manchester", "Sep"),
            row(1, "Computer Science", "BSc (Hons)", "Manchester", "Sep"),
            row(2, "Data Science", "MSc", "London", "Jan"),
        ]
    }

    #[test]
    fn test_build_filters_for_level_and_location() {
        let filters = build_filters("MSc computer science in Manchester");
        assert_eq!(filters.len(), 2);
        assert_eq!(
            filters[0],
            RecordFilter::Contains { phrase: "manchester".to_string(), synonyms: vec![] }
        );
        assert!(matches!(&filters[1], RecordFilter::Level { needles, .. } if needles == &vec!["msc"]));
    }

    #[test]
    fn test_level_and_location_both_required() {
        let filtered = apply_filters(rows(), &build_filters("msc courses in manchester"));
        let ids: Vec<_> = filtered.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0]);
    }

    #[test]
    fn test_no_filters_returns_everything() {
        let filters = build_filters("computer science");
        assert!(filters.is_empty());
        assert_eq!(apply_filters(rows(), &filters).len(), 3);
    }

    #[test]
    fn test_month_clause_becomes_month_filter_only() {
        let filters = build_filters("how many courses start in january");
        assert_eq!(filters, vec![RecordFilter::StartMonth(vec!["Jan"])]);
        let ids: Vec<_> = apply_filters(rows(), &filters).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_postgraduate_level_expands_to_needles() {
        let filtered = apply_filters(rows(), &build_filters("postgraduate data"));
        let ids: Vec<_> = filtered.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_alias_phrase_matches_synonyms() {
        let filters = build_filters("average fee for cs");
        let filtered = apply_filters(rows(), &filters);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filters[0].to_string(), "matching \"cs\"");
    }
}
