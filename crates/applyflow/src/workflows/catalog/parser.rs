use crate::workflows::journey::domain::{
    TuitionRange, University, UniversityId, UniversityRequirements,
};
use serde::Deserialize;
use std::io::Read;

const LIST_SEPARATOR: char = ';';

/// One catalogue row as exported by the import job.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogRow {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) country: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) city: Option<String>,
    #[serde(default)]
    pub(crate) ranking: Option<u32>,
    #[serde(default)]
    pub(crate) acceptance_rate: Option<f64>,
    pub(crate) tuition_min: f64,
    pub(crate) tuition_max: f64,
    #[serde(default)]
    pub(crate) min_gpa: Option<f64>,
    #[serde(default)]
    pub(crate) min_test_score: Option<f64>,
    #[serde(default)]
    pub(crate) min_language_score: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) fields: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) programs: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) website: Option<String>,
}

impl CatalogRow {
    /// Check row-level constraints and convert; the error string names the offending field.
    pub(crate) fn into_university(self) -> Result<University, String> {
        if self.name.trim().is_empty() {
            return Err("name is empty".to_string());
        }
        if self.tuition_min < 0.0 || self.tuition_max < 0.0 {
            return Err("tuition must not be negative".to_string());
        }
        if self.tuition_min > self.tuition_max {
            return Err(format!(
                "tuition_min {} exceeds tuition_max {}",
                self.tuition_min, self.tuition_max
            ));
        }
        if let Some(rate) = self.acceptance_rate {
            if !(0.0..=100.0).contains(&rate) {
                return Err(format!("acceptance_rate {rate} is not a percentage"));
            }
        }

        Ok(University {
            id: UniversityId(self.id),
            name: self.name,
            country: self.country,
            city: self.city,
            ranking: self.ranking,
            acceptance_rate: self.acceptance_rate,
            tuition: TuitionRange {
                min: self.tuition_min,
                max: self.tuition_max,
            },
            requirements: UniversityRequirements {
                min_gpa: self.min_gpa,
                min_test_score: self.min_test_score,
                min_language_score: self.min_language_score,
            },
            fields_offered: split_list(self.fields.as_deref()),
            programs: split_list(self.programs.as_deref()),
            description: self.description.unwrap_or_default(),
            website_url: self.website,
        })
    }
}

/// Rows paired with their 1-based data line number.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<(usize, CatalogRow)>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<CatalogRow>()
        .enumerate()
        .map(|(index, record)| record.map(|row| (index + 1, row)))
        .collect()
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(LIST_SEPARATOR)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
pub(crate) fn split_list_for_tests(raw: &str) -> Vec<String> {
    split_list(Some(raw))
}
