use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use crate::toolkit::catalog::index::CatalogRow;


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryIntent {
    Count,
    Avg,
    Min,
    Max,
    #[default]
    List,
    /// Out of domain; the caller falls back to its own open-ended answer.
    General,
}

impl QueryIntent {
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Avg | Self::Min | Self::Max)
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub intent: QueryIntent,
    pub rows: Vec<CatalogRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_used: Option<String>,
    pub text: String,
}

impl QueryResult {

    pub fn general() -> Self {
        Self {
            intent: QueryIntent::General,
            rows: Vec::new(),
            count: None,
            value: None,
            field_used: None,
            text: String::new(),
        }
    }

    pub fn is_general(&self) -> bool {
        self.intent == QueryIntent::General
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub max: usize,
}

impl QueryOptions {
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max: crate::DEFAULT_MAX_RESULTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_intent_names() {
        assert_eq!(QueryIntent::Avg.as_str(), "AVG");
        assert_eq!(QueryIntent::from_str("COUNT").unwrap(), QueryIntent::Count);
        assert_eq!(serde_json::to_value(QueryIntent::General).unwrap(), "GENERAL");
        assert!(QueryIntent::Min.is_aggregate());
        assert!(!QueryIntent::List.is_aggregate());
        assert_eq!(QueryIntent::default(), QueryIntent::List);
    }

    #[test]
    fn test_general_result_serialization() {
        let json = serde_json::to_value(QueryResult::general()).unwrap();
        assert_eq!(json["intent"], "GENERAL");
        assert_eq!(json["rows"].as_array().unwrap().len(), 0);
        assert!(json.get("count").is_none());
        assert!(json.get("fieldUsed").is_none());
    }
}
