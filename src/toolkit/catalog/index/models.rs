use std::fmt;

use serde::{Deserialize, Serialize};

use crate::toolkit::catalog::text::normalize;


pub type RecordId = u32;


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDisplay {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
}

impl RecordDisplay {

    pub fn fields(&self) -> [Option<&str>; 12] {
        [
            self.course_title.as_deref(),
            self.qualification.as_deref(),
            self.campus.as_deref(),
            self.town.as_deref(),
            self.provider.as_deref(),
            self.study_mode.as_deref(),
            self.duration.as_deref(),
            self.start_date.as_deref(),
            self.start_month.as_deref(),
            self.application_code.as_deref(),
            self.academic_year.as_deref(),
            self.fee.as_deref(),
        ]
    }


    pub fn searchable_text(&self) -> String {
        let joined = self.fields().iter().flatten().copied().collect::<Vec<_>>().join(" ");
        normalize(&joined)
    }

    pub fn title(&self) -> &str {
        self.course_title.as_deref().unwrap_or("Untitled course")
    }
}


/// One course option with its provider and course context. The blob is the
/// search surface only: crate-private and left out of `Debug`.
#[derive(Clone)]
pub struct CatalogRecord {
    pub id: RecordId,
    pub(crate) blob: String,
    pub display: RecordDisplay,
}

impl CatalogRecord {
    pub(crate) fn blob(&self) -> &str {
        &self.blob
    }

    pub fn to_row(&self, score: u32) -> CatalogRow {
        CatalogRow {
            id: self.id,
            score,
            display: self.display.clone(),
        }
    }
}

impl fmt::Debug for CatalogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogRecord")
            .field("id", &self.id)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub id: RecordId,
    pub score: u32,
    #[serde(flatten)]
    pub display: RecordDisplay,
}
