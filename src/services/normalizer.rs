use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::reference;
use super::report::{AnalysisReport, BiomarkerEntry, BiomarkerStatus};
use super::sanitize::display_text;

const BIOMARKER_FIELDS: [&str; 4] = ["parameter", "result", "range", "status"];

/// Structural problems in the parsed model output. Any one of these rejects
/// the whole report; partial tables are never produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Model output is not a JSON object")]
    NotAnObject,
    #[error("Model output has no biomarkers field")]
    MissingBiomarkers,
    #[error("Model output has an empty biomarkers list")]
    EmptyBiomarkers,
    #[error("Field {field} has the wrong type")]
    WrongType { field: &'static str },
    #[error("Biomarker {index} is not an object")]
    BiomarkerNotObject { index: usize },
    #[error("Biomarker {index} is missing {field}")]
    MissingField { index: usize, field: &'static str },
    #[error("Biomarker {index} field {field} is not a string")]
    FieldNotString { index: usize, field: &'static str },
    #[error("Biomarker {index} has an empty parameter name")]
    EmptyParameter { index: usize },
    #[error("Item {index} of {field} is not a string")]
    ListItemNotString { field: &'static str, index: usize },
}

/// Validate parsed model output and build the canonical report, stamped now.
pub fn normalize(parsed: &Value) -> Result<AnalysisReport, ValidationError> {
    normalize_at(parsed, Utc::now())
}

/// Same as [`normalize`] with an explicit generation time.
pub fn normalize_at(
    parsed: &Value,
    generated_at: DateTime<Utc>,
) -> Result<AnalysisReport, ValidationError> {
    let object = parsed.as_object().ok_or(ValidationError::NotAnObject)?;

    let biomarkers = biomarkers(object)?;
    let summary_primary = summary(object, "docsNote")?;
    let summary_translated = summary(object, "hindiSummary")?;
    let actionable_steps = string_list(object, "actionableSteps")?;
    let nutrition_plan = string_list(object, "nutritionPlan")?;
    let risk = risk(object)?;

    Ok(AnalysisReport {
        biomarkers,
        summary_primary,
        summary_translated,
        actionable_steps,
        nutrition_plan,
        risk,
        generated_at,
    })
}

fn biomarkers(object: &Map<String, Value>) -> Result<Vec<BiomarkerEntry>, ValidationError> {
    let items = match object.get("biomarkers") {
        None | Some(Value::Null) => return Err(ValidationError::MissingBiomarkers),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ValidationError::WrongType { field: "biomarkers" }),
    };

    if items.is_empty() {
        return Err(ValidationError::EmptyBiomarkers);
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| biomarker(index, item))
        .collect()
}

fn biomarker(index: usize, item: &Value) -> Result<BiomarkerEntry, ValidationError> {
    let fields = item
        .as_object()
        .ok_or(ValidationError::BiomarkerNotObject { index })?;

    let mut values = [""; 4];
    for (slot, field) in values.iter_mut().zip(BIOMARKER_FIELDS) {
        *slot = match fields.get(field) {
            None => return Err(ValidationError::MissingField { index, field }),
            Some(Value::String(text)) => text.as_str(),
            Some(_) => return Err(ValidationError::FieldNotString { index, field }),
        };
    }
    let [parameter, result, range, status] = values;

    let parameter = display_text(parameter);
    if parameter.is_empty() {
        return Err(ValidationError::EmptyParameter { index });
    }

    Ok(BiomarkerEntry {
        description: reference::describe(&parameter),
        parameter,
        result: display_text(result),
        range: display_text(range),
        status: BiomarkerStatus::classify(status),
        status_label: display_text(status),
    })
}

/// Presentation-only text. Missing or null is empty; a list of sentences
/// is joined with spaces.
fn summary(object: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(display_text(text)),
        Some(Value::Array(_)) => {
            let sentences = string_list(object, field)?;
            Ok(sentences.join(" "))
        }
        Some(_) => Err(ValidationError::WrongType { field }),
    }
}

fn string_list(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, ValidationError> {
    let items = match object.get(field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ValidationError::WrongType { field }),
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let text = item
            .as_str()
            .ok_or(ValidationError::ListItemNotString { field, index })?;
        let text = display_text(text);
        if !text.is_empty() {
            out.push(text);
        }
    }
    Ok(out)
}

fn risk(object: &Map<String, Value>) -> Result<Option<String>, ValidationError> {
    match object.get("risk") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            let text = display_text(text);
            Ok((!text.is_empty()).then_some(text))
        }
        Some(_) => Err(ValidationError::WrongType { field: "risk" }),
    }
}
