use tracing::debug;

use super::aggregate::{AggregateOutcome, aggregate, pick_numeric_field};
use super::filters::{RecordFilter, apply_filters, build_filters};
use super::models::{QueryIntent, QueryResult};
use super::patterns::detect_intent;
use crate::toolkit::catalog::index::CatalogRow;
use crate::utils::safe_truncate_ellipsis;

const PREVIEW_TITLE_CHARS: usize = 60;


/// Turns ranked candidates for an in-scope question into the final answer:
/// filters, then the requested operation, degrading aggregates to LIST when
/// no numeric field applies or nothing parses.
pub struct QueryProcessor {
    summary_preview: usize,
}

impl QueryProcessor {
    pub fn new(summary_preview: usize) -> Self {
        Self { summary_preview }
    }


    pub fn answer(&self, text: &str, candidates: Vec<CatalogRow>, max: usize) -> QueryResult {
        let filters = build_filters(text);
        let rows = apply_filters(candidates, &filters);
        let intent = detect_intent(text);
        debug!(
            "Answering {:?}: intent {:?}, {} filters, {} rows after filtering",
            text,
            intent,
            filters.len(),
            rows.len()
        );

        match intent {
            QueryIntent::Count => self.count(rows, &filters, max),
            QueryIntent::Avg | QueryIntent::Min | QueryIntent::Max => {
                let outcome = pick_numeric_field(text).and_then(|field| aggregate(&rows, field, intent));
                match outcome {
                    Some(outcome) => self.aggregated(intent, outcome, max),
                    None => {
                        debug!("No numeric field for {:?}, answering as a list", intent);
                        self.list(rows, &filters, max)
                    }
                }
            }
            QueryIntent::List | QueryIntent::General => self.list(rows, &filters, max),
        }
    }

    fn count(&self, mut rows: Vec<CatalogRow>, filters: &[RecordFilter], max: usize) -> QueryResult {
        let count = rows.len();
        rows.truncate(max);
        let noun = if count == 1 { "course option" } else { "course options" };
        let verb = if count == 1 { "is" } else { "are" };

        QueryResult {
            intent: QueryIntent::Count,
            rows,
            count: Some(count),
            value: None,
            field_used: None,
            text: format!("There {} {} matching {}{}.", verb, count, noun, describe_filters(filters)),
        }
    }

    fn aggregated(&self, intent: QueryIntent, outcome: AggregateOutcome, max: usize) -> QueryResult {
        let field = outcome.field.as_str();
        let text = match intent {
            QueryIntent::Avg => format!(
                "The average {} across {} course options is {:.2}.",
                field, outcome.samples, outcome.value
            ),
            _ => {
                let which = if intent == QueryIntent::Min { "lowest" } else { "highest" };
                let title = outcome
                    .rows
                    .first()
                    .map(|row| safe_truncate_ellipsis(row.display.title(), PREVIEW_TITLE_CHARS))
                    .unwrap_or_default();
                format!(
                    "The {} {} is {:.2} ({}), out of {} course options with a {}.",
                    which, field, outcome.value, title, outcome.samples, field
                )
            }
        };

        let mut rows = outcome.rows;
        rows.truncate(max);

        QueryResult {
            intent,
            rows,
            count: Some(outcome.samples),
            value: Some(outcome.value),
            field_used: Some(field.to_string()),
            text,
        }
    }

    fn list(&self, mut rows: Vec<CatalogRow>, filters: &[RecordFilter], max: usize) -> QueryResult {
        let total = rows.len();
        rows.truncate(max);

        let text = if rows.is_empty() {
            format!("No matching courses found{}.", describe_filters(filters))
        } else {
            let preview: Vec<String> = rows
                .iter()
                .take(self.summary_preview)
                .map(|row| safe_truncate_ellipsis(row.display.title(), PREVIEW_TITLE_CHARS))
                .collect();
            format!(
                "Found {} matching course options{}, showing {}: {}.",
                total,
                describe_filters(filters),
                rows.len(),
                preview.join("; ")
            )
        };

        QueryResult {
            intent: QueryIntent::List,
            rows,
            count: None,
            value: None,
            field_used: None,
            text,
        }
    }
}

impl Default for QueryProcessor {
    fn default() -> Self {
        Self::new(3)
    }
}

fn describe_filters(filters: &[RecordFilter]) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = filters.iter().map(ToString::to_string).collect();
    format!(" {}", parts.join(", "))
}
