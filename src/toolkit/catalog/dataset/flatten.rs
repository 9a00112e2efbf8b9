use serde::Deserialize;

use super::dates::{month_of, parse_start_date};
use super::models::{Caption, MappedCaption, RawCourse, RawOption, RawProvider, non_empty, value_text};
use crate::core::error::CatalogError;
use crate::toolkit::catalog::index::models::RecordDisplay;
use crate::toolkit::catalog::text::normalize;


#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord {
    pub blob: String,
    pub display: RecordDisplay,
}


#[derive(Debug, Clone, PartialEq)]
pub enum FlattenSkip {
    MalformedCourse { course: usize, error: CatalogError },
    EmptyRecord,
}


struct ProviderContext {
    name: Option<String>,
    town: Option<String>,
    text: Vec<String>,
}

impl ProviderContext {
    fn from_provider(provider: &RawProvider) -> Self {
        let name = provider.name.as_deref().and_then(non_empty);
        let town = provider
            .address
            .as_ref()
            .and_then(|a| a.line4.as_deref())
            .and_then(non_empty);
        let country = provider
            .address
            .as_ref()
            .and_then(|a| a.country.as_ref())
            .and_then(MappedCaption::text);

        let mut text: Vec<String> = Vec::new();
        text.extend(name.clone());
        text.extend(provider.institution_code.as_ref().and_then(value_text));
        text.extend(provider.aliases.iter().flatten().filter_map(value_text));
        text.extend(town.clone());
        text.extend(country);

        Self { name, town, text }
    }
}


/// Lazily yields one record per course option; a course without options
/// yields a single record built from course-level fields only.
pub fn flatten_provider(
    provider: &RawProvider,
) -> impl Iterator<Item = Result<FlatRecord, FlattenSkip>> + '_ {
    let context = ProviderContext::from_provider(provider);

    provider
        .courses
        .iter()
        .flatten()
        .enumerate()
        .flat_map(move |(position, raw)| match RawCourse::deserialize(raw) {
            Ok(course) => {
                let placeholder = [RawOption::default()];
                let options: &[RawOption] = match course.options.as_deref() {
                    Some(options) if !options.is_empty() => options,
                    _ => &placeholder,
                };
                options
                    .iter()
                    .map(|option| build_record(&context, &course, option))
                    .collect::<Vec<_>>()
            }
            Err(e) => vec![Err(FlattenSkip::MalformedCourse {
                course: position,
                error: CatalogError::malformed(format!("course #{}: {}", position, e)),
            })],
        })
}


fn build_record(
    context: &ProviderContext,
    course: &RawCourse,
    option: &RawOption,
) -> Result<FlatRecord, FlattenSkip> {
    let start_date = option
        .start_date
        .as_ref()
        .and_then(|d| d.date.as_deref())
        .and_then(non_empty);
    let month = start_date.as_deref().and_then(parse_start_date).map(month_of);

    let qualification = option
        .outcome_qualification
        .as_ref()
        .and_then(Caption::text)
        .or_else(|| course.outcome_qualification.as_ref().and_then(Caption::text));
    let destination = course
        .routing_data
        .as_ref()
        .and_then(|r| r.destination.as_ref())
        .and_then(Caption::text);

    let display = RecordDisplay {
        provider: context.name.clone(),
        town: context.town.clone(),
        course_title: course.course_title.as_deref().and_then(non_empty),
        qualification,
        campus: option.location.as_ref().and_then(|l| l.name.as_deref()).and_then(non_empty),
        study_mode: option.study_mode.as_ref().and_then(MappedCaption::text),
        duration: option.duration.as_ref().and_then(|d| d.text()),
        start_date,
        start_month: month.map(|(_, code)| code.to_string()),
        application_code: course.application_code.as_ref().and_then(value_text),
        academic_year: course.academic_year_id.as_ref().and_then(value_text),
        fee: option.fee.as_ref().and_then(value_text),
    };

    let mut parts: Vec<&str> = context.text.iter().map(String::as_str).collect();
    parts.extend(display.course_title.as_deref());
    parts.extend(display.application_code.as_deref());
    parts.extend(display.academic_year.as_deref());
    parts.extend(destination.as_deref());
    parts.extend(course.outcome_qualification.as_ref().and_then(|q| q.caption.as_deref()));
    parts.extend(display.study_mode.as_deref());
    parts.extend(display.duration.as_deref());
    parts.extend(display.campus.as_deref());
    parts.extend(display.start_date.as_deref());
    parts.extend(display.qualification.as_deref());
    if let Some((name, code)) = month {
        parts.push(name);
        parts.push(code);
    }

    let blob = normalize(&parts.join(" "));
    if blob.is_empty() {
        return Err(FlattenSkip::EmptyRecord);
    }

    Ok(FlatRecord { blob, display })
}
