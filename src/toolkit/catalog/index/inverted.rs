use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::models::{CatalogRecord, RecordId};
use crate::toolkit::catalog::dataset::{FlatRecord, RootShape};
use crate::toolkit::catalog::text::{phrase_tags, tokenize};


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildStats {
    pub providers: usize,
    pub malformed_providers: usize,
    pub malformed_courses: usize,
    pub empty_records: usize,
    pub records: usize,
    pub tokens: usize,
    pub elapsed_ms: u64,
}


#[derive(Debug, Default)]
pub struct CatalogIndex {
    records: Vec<Arc<CatalogRecord>>,
    postings: HashMap<String, Vec<RecordId>>,
    stats: BuildStats,
    shape: Option<RootShape>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }


    /// Assigns the next id and appends it to the posting list of every
    /// distinct token, phrase-implied tags included.
    pub fn insert(&mut self, flat: FlatRecord) -> RecordId {
        let id = self.records.len() as RecordId;

        let mut tokens: BTreeSet<String> = tokenize(&flat.blob).into_iter().collect();
        tokens.extend(phrase_tags(&flat.blob).into_iter().map(str::to_string));

        for token in tokens {
            self.postings.entry(token).or_default().push(id);
        }

        self.records.push(Arc::new(CatalogRecord {
            id,
            blob: flat.blob,
            display: flat.display,
        }));
        id
    }


    pub fn postings(&self, token: &str) -> &[RecordId] {
        self.postings.get(token).map(Vec::as_slice).unwrap_or(&[])
    }


    pub fn candidates<'a, I>(&self, tokens: I) -> BTreeSet<RecordId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        tokens
            .into_iter()
            .flat_map(|token| self.postings(token).iter().copied())
            .collect()
    }

    pub fn record(&self, id: RecordId) -> Option<&Arc<CatalogRecord>> {
        self.records.get(id as usize)
    }

    pub fn records(&self) -> &[Arc<CatalogRecord>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn root_shape(&self) -> Option<RootShape> {
        self.shape
    }

    pub(crate) fn stats_mut(&mut self) -> &mut BuildStats {
        &mut self.stats
    }

    pub(crate) fn set_root_shape(&mut self, shape: RootShape) {
        self.shape = Some(shape);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::catalog::index::models::RecordDisplay;

    fn flat(blob: &str) -> FlatRecord {
        FlatRecord {
            blob: blob.to_string(),
            display: RecordDisplay::default(),
        }
    }

    #[test]
    fn test_ids_contiguous_in_insertion_order() {
        let mut index = CatalogIndex::new();
        let ids: Vec<_> = ["history", "law", "physics"]
            .iter()
            .map(|b| index.insert(flat(b)))
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(index.record(1).unwrap().blob(), "law");
    }

    #[test]
    fn test_postings_strictly_ascending_without_duplicates() {
        let mut index = CatalogIndex::new();
        index.insert(flat("data data science"));
        index.insert(flat("law"));
        index.insert(flat("data engineering data"));

        assert_eq!(index.postings("data"), &[0, 2]);
        assert_eq!(index.postings("law"), &[1]);
        assert!(index.postings("missing").is_empty());
    }

    #[test]
    fn test_phrase_tags_indexed() {
        let mut index = CatalogIndex::new();
        index.insert(flat("msc computer science"));
        assert_eq!(index.postings("cs"), &[0]);
        assert_eq!(index.postings("computer"), &[0]);
    }

    #[test]
    fn test_candidates_union() {
        let mut index = CatalogIndex::new();
        index.insert(flat("history"));
        index.insert(flat("law"));
        index.insert(flat("history law"));
        let ids: Vec<_> = index.candidates(["law", "history", "zzz"]).into_iter().collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
