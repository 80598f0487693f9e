//! Fixed output schema for the extraction service

use crate::state::ExtractedRecord;
use crate::HarvestError;
use serde::Deserialize;
use serde_json::{json, Value};

/// Name of the array field holding extracted records
pub const RECORDS_FIELD: &str = "products";

/// JSON schema sent with every extraction request
///
/// An object with one array of records, each carrying a name, a numeric
/// price, and a description.
pub fn record_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            RECORDS_FIELD: {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "price": { "type": "number" },
                        "description": { "type": "string" }
                    },
                    "required": ["name", "price", "description"],
                    "additionalProperties": false
                }
            }
        },
        "required": [RECORDS_FIELD],
        "additionalProperties": false
    })
}

/// Validates a service response and pulls out its records
///
/// # Returns
///
/// * `Ok(Vec<ExtractedRecord>)` - The records, possibly empty
/// * `Err(HarvestError::MalformedResponse)` - The response is not an object,
///   lacks the records array, or holds records of the wrong shape
pub fn parse_records(response: &Value) -> Result<Vec<ExtractedRecord>, HarvestError> {
    let object = response.as_object().ok_or_else(|| {
        HarvestError::MalformedResponse("expected a JSON object".to_string())
    })?;

    let field = object.get(RECORDS_FIELD).ok_or_else(|| {
        HarvestError::MalformedResponse(format!("missing '{}' field", RECORDS_FIELD))
    })?;

    if !field.is_array() {
        return Err(HarvestError::MalformedResponse(format!(
            "'{}' is not an array",
            RECORDS_FIELD
        )));
    }

    Vec::<ExtractedRecord>::deserialize(field)
        .map_err(|e| HarvestError::MalformedResponse(format!("bad record: {}", e)))
}
