//! Structured JSON codec for dynamic values
//!
//! Records encode as JSON objects keyed by logical field name, in declaration
//! order. Timestamps encode as RFC 3339 strings and non-finite floats as `null`.
//!
//! Decoding is shape-directed and lenient the way typical JSON binders are:
//! unknown keys are ignored, missing keys keep the slot's current value, and a
//! `null` only clears optional slots. Keys match a field's logical name exactly
//! first, then case-insensitively.
//!
//! Copyright (c) 2025 Tagmap Team
//! Licensed under the Apache-2.0 license

use crate::record::RecordValue;
use crate::value::{ConversionError, Shape, Value};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number};
use thiserror::Error;

/// Errors decoding serialized text
#[derive(Error, Debug)]
pub enum CodecError {
    /// The text is not well-formed JSON
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// Well-formed JSON that does not fit the target shape
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Render a value as compact JSON text
pub fn encode(value: &Value) -> String {
    to_json(value).to_string()
}

/// Convert a value into a JSON tree
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(flag) => serde_json::Value::Bool(*flag),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::UInt(n) => serde_json::Value::from(*n),
        Value::Float(n) => Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(text) => serde_json::Value::String(text.clone()),
        Value::Timestamp(at) => {
            serde_json::Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        }
        Value::Seq(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Record(record) => {
            let mut object = Map::new();
            for (field, value) in record.descriptor().fields().iter().zip(record.values()) {
                if let Some(name) = field.logical_name() {
                    object.insert(name.to_string(), to_json(value));
                }
            }
            serde_json::Value::Object(object)
        }
    }
}

/// Decode JSON text into a fresh value of `shape`
pub fn decode(text: &str, shape: &Shape) -> Result<Value, CodecError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(from_json(&json, shape)?)
}

/// Like [`decode`], treating empty text as the empty serialized form of `shape`
pub(crate) fn decode_or_empty(text: &str, shape: &Shape) -> Result<Value, CodecError> {
    if text.is_empty() {
        return Ok(shape.zero());
    }
    decode(text, shape)
}

/// Decode a JSON object into an existing record, keeping fields the text omits
pub fn merge_json(text: &str, record: &mut RecordValue) -> Result<(), CodecError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    match &json {
        serde_json::Value::Object(object) => merge_object(object, record)?,
        serde_json::Value::Null => {}
        other => {
            return Err(json_mismatch(
                &format!("record {}", record.descriptor().name()),
                other,
            )
            .into())
        }
    }
    Ok(())
}

/// Convert a JSON tree into a value of `shape`
pub fn from_json(json: &serde_json::Value, shape: &Shape) -> Result<Value, ConversionError> {
    use serde_json::Value as Json;

    if json.is_null() {
        return Ok(shape.zero());
    }
    match (shape, json) {
        (Shape::Optional(inner), json) => from_json(json, inner),
        (Shape::Bool, Json::Bool(flag)) => Ok(Value::Bool(*flag)),
        (Shape::Int, Json::Number(n)) => match n.as_i64() {
            Some(n) => Ok(Value::Int(n)),
            None => Err(number_error(n, shape)),
        },
        (Shape::UInt, Json::Number(n)) => match n.as_u64() {
            Some(n) => Ok(Value::UInt(n)),
            None => Err(number_error(n, shape)),
        },
        (Shape::Float, Json::Number(n)) => n
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| number_error(n, shape)),
        (Shape::Text, Json::String(text)) => Ok(Value::Text(text.clone())),
        (Shape::Timestamp, Json::String(text)) => DateTime::parse_from_rfc3339(text)
            .map(|at| Value::Timestamp(at.with_timezone(&Utc)))
            .map_err(|_| ConversionError::Mismatch {
                expected: "RFC 3339 timestamp".to_string(),
                found: format!("\"{}\"", text),
            }),
        (Shape::Seq(element), Json::Array(items)) => items
            .iter()
            .map(|item| from_json(item, element))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Seq),
        (Shape::Record(descriptor), Json::Object(object)) => {
            let mut record = RecordValue::zero(descriptor());
            merge_object(object, &mut record)?;
            Ok(Value::Record(record))
        }
        (shape, json) => Err(json_mismatch(&shape.to_string(), json)),
    }
}

fn merge_object(
    object: &Map<String, serde_json::Value>,
    record: &mut RecordValue,
) -> Result<(), ConversionError> {
    let descriptor = record.descriptor();
    for (position, field) in descriptor.fields().iter().enumerate() {
        let Some(name) = field.logical_name() else {
            continue;
        };
        let Some(json) = lookup(object, name) else {
            continue;
        };
        let slot = record.slot_mut(position);
        match (field.shape(), json) {
            (shape, serde_json::Value::Null) if !shape.is_optional() => {}
            (Shape::Record(_), serde_json::Value::Object(nested)) => {
                if let Value::Record(existing) = slot {
                    merge_object(nested, existing)?;
                } else {
                    *slot = from_json(json, field.shape())?;
                }
            }
            (shape, json) => *slot = from_json(json, shape)?,
        }
    }
    Ok(())
}

fn lookup<'a>(
    object: &'a Map<String, serde_json::Value>,
    name: &str,
) -> Option<&'a serde_json::Value> {
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn json_mismatch(expected: &str, json: &serde_json::Value) -> ConversionError {
    ConversionError::Mismatch {
        expected: expected.to_string(),
        found: format!("JSON {}", json_kind(json)),
    }
}

fn number_error(n: &Number, shape: &Shape) -> ConversionError {
    if n.is_f64() {
        ConversionError::Mismatch {
            expected: shape.to_string(),
            found: format!("number {}", n),
        }
    } else {
        ConversionError::OutOfRange {
            value: n.to_string(),
            target: match shape {
                Shape::UInt => "uint",
                _ => "int",
            },
        }
    }
}
