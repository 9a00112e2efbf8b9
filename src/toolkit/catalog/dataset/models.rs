use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;


#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProvider {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    pub institution_code: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub aliases: Option<Vec<Value>>,
    #[serde(deserialize_with = "lenient")]
    pub address: Option<RawAddress>,
    #[serde(deserialize_with = "lenient")]
    pub website_url: Option<String>,
    /// Kept unparsed so one bad course does not discard its siblings.
    #[serde(deserialize_with = "lenient")]
    pub courses: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAddress {
    #[serde(deserialize_with = "lenient")]
    pub line4: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub country: Option<MappedCaption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCourse {
    #[serde(deserialize_with = "lenient")]
    pub course_title: Option<String>,
    pub application_code: Option<Value>,
    pub academic_year_id: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub routing_data: Option<RoutingData>,
    #[serde(deserialize_with = "lenient")]
    pub outcome_qualification: Option<Caption>,
    #[serde(deserialize_with = "lenient")]
    pub options: Option<Vec<RawOption>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOption {
    #[serde(deserialize_with = "lenient")]
    pub study_mode: Option<MappedCaption>,
    #[serde(deserialize_with = "lenient")]
    pub duration: Option<RawDuration>,
    #[serde(deserialize_with = "lenient")]
    pub location: Option<RawLocation>,
    #[serde(deserialize_with = "lenient")]
    pub start_date: Option<RawDate>,
    #[serde(deserialize_with = "lenient")]
    pub outcome_qualification: Option<Caption>,
    pub fee: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingData {
    #[serde(deserialize_with = "lenient")]
    pub destination: Option<Caption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDuration {
    pub quantity: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    pub duration_type: Option<Caption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLocation {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDate {
    #[serde(deserialize_with = "lenient")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Caption {
    #[serde(deserialize_with = "lenient")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MappedCaption {
    #[serde(deserialize_with = "lenient")]
    pub mapped_caption: Option<String>,
}


/// A present field of the wrong shape reads as absent instead of failing
/// the whole entry.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

impl Caption {
    pub fn text(&self) -> Option<String> {
        self.caption.as_deref().and_then(non_empty)
    }
}

impl MappedCaption {
    pub fn text(&self) -> Option<String> {
        self.mapped_caption.as_deref().and_then(non_empty)
    }
}

impl RawDuration {

    pub fn text(&self) -> Option<String> {
        let quantity = self.quantity.as_ref().and_then(value_text);
        let unit = self.duration_type.as_ref().and_then(Caption::text);
        match (quantity, unit) {
            (Some(q), Some(u)) => Some(format!("{} {}", q, u)),
            (Some(q), None) => Some(q),
            (None, Some(u)) => Some(u),
            (None, None) => None,
        }
    }
}
