//! Canonical interchange codec for automaton definitions.
//!
//! The durable format is pretty-printed JSON. [`decode`] keeps two failure
//! families apart so callers can tell "not this format at all" from "this
//! format, but invalid content": [`DfaError::Parse`] when the text is not
//! JSON, [`DfaError::Schema`] when the JSON does not satisfy the document
//! schema. Schema messages name the offending field path
//! (`states[2].kind: ...`).
//!
//! The schema walk runs over the parsed value before deserialization, so a
//! bad document never turns into a half-trusted definition.

use dfa_studio_core::DfaDefinition;
use serde_json::Value;

use crate::error::{DfaError, DfaResult};

const STATE_KINDS: [&str; 4] = ["normal", "initial", "accepting", "initial-accepting"];
const METADATA_FIELDS: [&str; 4] = ["name", "description", "createdAt", "modifiedAt"];

/// Encode a definition as canonical pretty-printed text.
pub fn encode(definition: &DfaDefinition) -> DfaResult<String> {
    Ok(serde_json::to_string_pretty(definition)?)
}

/// Decode interchange text into a definition, schema-checking first.
pub fn decode(text: &str) -> DfaResult<DfaDefinition> {
    let value: Value = serde_json::from_str(text).map_err(|e| DfaError::Parse {
        message: e.to_string(),
    })?;

    check_schema(&value)?;

    serde_json::from_value(value).map_err(|e| DfaError::Schema {
        message: e.to_string(),
    })
}

fn schema_error(message: impl Into<String>) -> DfaError {
    DfaError::Schema {
        message: message.into(),
    }
}

fn check_schema(value: &Value) -> DfaResult<()> {
    let root = value
        .as_object()
        .ok_or_else(|| schema_error("document root must be an object"))?;

    let states = root
        .get("states")
        .and_then(Value::as_array)
        .ok_or_else(|| schema_error("states: expected an array"))?;
    for (index, state) in states.iter().enumerate() {
        check_state(index, state)?;
    }

    let transitions = root
        .get("transitions")
        .and_then(Value::as_array)
        .ok_or_else(|| schema_error("transitions: expected an array"))?;
    for (index, transition) in transitions.iter().enumerate() {
        check_transition(index, transition)?;
    }

    let alphabet = root
        .get("alphabet")
        .and_then(Value::as_array)
        .ok_or_else(|| schema_error("alphabet: expected an array"))?;
    if alphabet.is_empty() {
        return Err(schema_error("alphabet: must not be empty"));
    }
    for (index, entry) in alphabet.iter().enumerate() {
        let symbol = entry
            .as_str()
            .ok_or_else(|| schema_error(format!("alphabet[{index}]: expected a string")))?;
        if symbol.chars().count() != 1 {
            return Err(schema_error(format!(
                "alphabet[{index}]: symbols must be single characters, got '{symbol}'"
            )));
        }
    }

    let metadata = root
        .get("metadata")
        .and_then(Value::as_object)
        .ok_or_else(|| schema_error("metadata: expected an object"))?;
    for field in METADATA_FIELDS {
        if !metadata.get(field).map(Value::is_string).unwrap_or(false) {
            return Err(schema_error(format!("metadata.{field}: expected a string")));
        }
    }

    Ok(())
}

fn check_state(index: usize, value: &Value) -> DfaResult<()> {
    let state = value
        .as_object()
        .ok_or_else(|| schema_error(format!("states[{index}]: expected an object")))?;

    for field in ["id", "label"] {
        if !state.get(field).map(Value::is_string).unwrap_or(false) {
            return Err(schema_error(format!(
                "states[{index}].{field}: expected a string"
            )));
        }
    }

    let kind = state
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| schema_error(format!("states[{index}].kind: expected a string")))?;
    if !STATE_KINDS.contains(&kind) {
        return Err(schema_error(format!(
            "states[{index}].kind: must be one of {}, got '{kind}'",
            STATE_KINDS.join(", ")
        )));
    }

    let position = state
        .get("position")
        .and_then(Value::as_object)
        .ok_or_else(|| schema_error(format!("states[{index}].position: expected an object")))?;
    for axis in ["x", "y"] {
        if !position.get(axis).map(Value::is_number).unwrap_or(false) {
            return Err(schema_error(format!(
                "states[{index}].position.{axis}: expected a number"
            )));
        }
    }

    Ok(())
}

fn check_transition(index: usize, value: &Value) -> DfaResult<()> {
    let transition = value
        .as_object()
        .ok_or_else(|| schema_error(format!("transitions[{index}]: expected an object")))?;

    for field in ["id", "from", "to"] {
        if !transition.get(field).map(Value::is_string).unwrap_or(false) {
            return Err(schema_error(format!(
                "transitions[{index}].{field}: expected a string"
            )));
        }
    }

    let symbol = transition
        .get("symbol")
        .and_then(Value::as_str)
        .ok_or_else(|| schema_error(format!("transitions[{index}].symbol: expected a string")))?;
    if symbol.chars().count() != 1 {
        return Err(schema_error(format!(
            "transitions[{index}].symbol: must be a single character, got '{symbol}'"
        )));
    }

    Ok(())
}
