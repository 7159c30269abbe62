use database::services::coordinator::MutationOutcome;
use models::fields::Fields;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MutationResponse {
    pub action: String,
    pub message: String,
}

impl From<MutationOutcome> for MutationResponse {
    fn from(outcome: MutationOutcome) -> Self {
        Self {
            action: outcome.kind.to_string(),
            message: outcome.message,
        }
    }
}

/// Flattens a JSON object into the text field map the mutation catalog reads.
/// Numbers and booleans are read as their text form; `null` counts as absent.
pub fn fields_from_json(body: HashMap<String, Value>) -> Fields {
    let mut fields = Fields::new();
    for (key, value) in body {
        let text = match value {
            Value::Null => continue,
            Value::String(text) => text,
            Value::Bool(flag) => flag.to_string(),
            other => other.to_string(),
        };
        fields.insert(key, text);
    }
    fields
}
