use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use super::models::QueryIntent;
use crate::toolkit::catalog::index::{CatalogRow, RecordDisplay};
use crate::toolkit::catalog::text::normalize_and_tokenize;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NumericField {
    Fee,
    Duration,
}

impl NumericField {
    pub fn raw<'a>(&self, display: &'a RecordDisplay) -> Option<&'a str> {
        match self {
            Self::Fee => display.fee.as_deref(),
            Self::Duration => display.duration.as_deref(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}


/// Highest priority first.
pub const NUMERIC_FIELDS: &[(NumericField, &[&str])] = &[
    (
        NumericField::Fee,
        &[
            "fee", "fees", "cost", "costs", "price", "prices", "tuition", "cheap", "cheapest",
            "expensive", "afford", "affordable", "priciest", "dearest",
        ],
    ),
    (
        NumericField::Duration,
        &["duration", "long", "longest", "length", "shortest", "years", "months", "weeks"],
    ),
];

lazy_static! {
    static ref NUMBER: Option<Regex> = Regex::new(r"-?\d[\d,]*(?:\.\d+)?").ok();
}


pub fn pick_numeric_field(text: &str) -> Option<NumericField> {
    let tokens = normalize_and_tokenize(text);
    NUMERIC_FIELDS
        .iter()
        .find(|(_, keywords)| tokens.iter().any(|t| keywords.contains(&t.as_str())))
        .map(|(field, _)| *field)
}


/// First number in a possibly currency-formatted string: "£12,500" is 12500.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let found = NUMBER.as_ref()?.find(raw)?;
    found.as_str().replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}


#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOutcome {
    pub field: NumericField,
    pub value: f64,
    pub samples: usize,
    /// Contributing rows: extreme first for MIN/MAX, rank order for AVG.
    pub rows: Vec<CatalogRow>,
}


/// None when the intent is not an aggregate or no row parses.
pub fn aggregate(rows: &[CatalogRow], field: NumericField, intent: QueryIntent) -> Option<AggregateOutcome> {
    if !intent.is_aggregate() {
        return None;
    }

    let mut parsed: Vec<(f64, &CatalogRow)> = rows
        .iter()
        .filter_map(|row| field.raw(&row.display).and_then(parse_numeric).map(|v| (v, row)))
        .collect();

    if parsed.is_empty() {
        return None;
    }

    let samples = parsed.len();
    let value = match intent {
        QueryIntent::Avg => parsed.iter().map(|(v, _)| v).sum::<f64>() / samples as f64,
        QueryIntent::Min => {
            parsed.sort_by(|a, b| a.0.total_cmp(&b.0));
            parsed[0].0
        }
        QueryIntent::Max => {
            parsed.sort_by(|a, b| b.0.total_cmp(&a.0));
            parsed[0].0
        }
        _ => return None,
    };

    Some(AggregateOutcome {
        field,
        value,
        samples,
        rows: parsed.into_iter().map(|(_, row)| row.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee_rows(fees: &[&str]) -> Vec<CatalogRow> {
        fees.iter()
            .enumerate()
            .map(|(i, fee)| CatalogRow {
                id: i as u32,
                score: 1,
                display: RecordDisplay {
                    fee: Some(fee.to_string()),
                    ..Default::default()
                },
            })
            .collect()
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("£9000 pcm"), Some(9000.0));
        assert_eq!(parse_numeric("£12,500"), Some(12500.0));
        assert_eq!(parse_numeric("3 Years"), Some(3.0));
        assert_eq!(parse_numeric("€1,250.50 per term"), Some(1250.5));
        assert_eq!(parse_numeric("invalid"), None);
    }

    #[test]
    fn test_average_skips_unparseable() {
        let rows = fee_rows(&["£9000 pcm", "£12,500", "invalid"]);
        let outcome = aggregate(&rows, NumericField::Fee, QueryIntent::Avg).unwrap();
        assert_eq!(outcome.value, 10750.0);
        assert_eq!(outcome.samples, 2);
        assert_eq!(outcome.field.as_str(), "fee");
    }

    #[test]
    fn test_min_max_order_rows() {
        let rows = fee_rows(&["£12,500", "£9,000", "n/a", "£15,000"]);
        let min = aggregate(&rows, NumericField::Fee, QueryIntent::Min).unwrap();
        assert_eq!(min.value, 9000.0);
        assert_eq!(min.rows[0].id, 1);

        let max = aggregate(&rows, NumericField::Fee, QueryIntent::Max).unwrap();
        assert_eq!(max.value, 15000.0);
        assert_eq!(max.rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 0, 1]);
    }

    #[test]
    fn test_nothing_parses() {
        let rows = fee_rows(&["tbc", "free?"]);
        assert!(aggregate(&rows, NumericField::Fee, QueryIntent::Avg).is_none());
        assert!(aggregate(&rows, NumericField::Fee, QueryIntent::List).is_none());
    }

    #[test]
    fn test_pick_numeric_field_by_priority() {
        assert_eq!(pick_numeric_field("cheapest computer science course"), Some(NumericField::Fee));
        assert_eq!(pick_numeric_field("average cost per year"), Some(NumericField::Fee));
        assert_eq!(pick_numeric_field("how long is the shortest law degree"), Some(NumericField::Duration));
        assert_eq!(pick_numeric_field("highest rated history course"), None);
    }
}
