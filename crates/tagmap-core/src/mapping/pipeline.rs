//! Validator and transformer pipelines of one record level
//!
//! Pipelines are resolved against the registry before any field of the level is
//! processed, so an unknown name fails the call without touching the destination.
//!
//! Copyright (c) 2025 Tagmap Team
//! Licensed under the Apache-2.0 license

use super::join_path;
use super::tags::{parse_tag, TagEntry};
use crate::record::RecordDescriptor;
use crate::registry::{Registry, TransformerFn, ValidatorFn};
use crate::value::Value;
use crate::{Error, Result};

/// A validator with its parsed argument
#[derive(Clone)]
pub(crate) struct BoundValidator {
    name: String,
    argument: String,
    check: ValidatorFn,
}

/// Resolved pipelines of one source field
pub(crate) struct FieldSpec {
    pub name: &'static str,
    pub position: usize,
    pub validators: Vec<BoundValidator>,
    pub transformers: Vec<TransformerFn>,
}

/// Build the specs of every named field of a source record
pub(crate) fn build_field_specs(
    descriptor: &RecordDescriptor,
    registry: &Registry,
    path: &str,
) -> Result<Vec<FieldSpec>> {
    let mut specs = Vec::with_capacity(descriptor.fields().len());
    for (position, field) in descriptor.fields().iter().enumerate() {
        let Some(name) = field.logical_name() else {
            continue;
        };
        let field_path = join_path(path, name);
        specs.push(FieldSpec {
            name,
            position,
            validators: resolve_validators(registry, &parse_tag(field.validator_tag()), &field_path)?,
            transformers: resolve_transformers(
                registry,
                &parse_tag(field.transformer_tag()),
                &field_path,
            )?,
        });
    }
    Ok(specs)
}

pub(crate) fn resolve_validators(
    registry: &Registry,
    entries: &[TagEntry],
    field: &str,
) -> Result<Vec<BoundValidator>> {
    entries
        .iter()
        .map(|entry| {
            let check = registry
                .validator(&entry.name)
                .ok_or_else(|| Error::ValidatorNotFound {
                    name: entry.name.clone(),
                    field: field.to_string(),
                })?;
            Ok(BoundValidator {
                name: entry.name.clone(),
                argument: entry.argument.clone(),
                check,
            })
        })
        .collect()
}

pub(crate) fn resolve_transformers(
    registry: &Registry,
    entries: &[TagEntry],
    field: &str,
) -> Result<Vec<TransformerFn>> {
    entries
        .iter()
        .map(|entry| {
            if !entry.argument.is_empty() {
                log::warn!(
                    "transformer '{}' on '{}' takes no argument; ignoring '{}'",
                    entry.name,
                    field,
                    entry.argument
                );
            }
            registry
                .transformer(&entry.name)
                .ok_or_else(|| Error::TransformerNotFound {
                    name: entry.name.clone(),
                    field: field.to_string(),
                })
        })
        .collect()
}

/// Run validators in order against the untransformed value; the first failure wins
pub(crate) fn run_validators(validators: &[BoundValidator], value: &Value, field: &str) -> Result<()> {
    for validator in validators {
        (validator.check)(value, &validator.argument).map_err(|source| {
            log::debug!("'{}' rejected by '{}': {}", field, validator.name, source);
            Error::Validation {
                field: field.to_string(),
                validator: validator.name.clone(),
                source,
            }
        })?;
    }
    Ok(())
}

/// Thread a value through the transformers in order
pub(crate) fn run_transformers(transformers: &[TransformerFn], value: Value) -> Value {
    transformers
        .iter()
        .fold(value, |value, transform| transform(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_validator("nonEmpty", |value: &Value, _: &str| match value.as_str() {
            Some("") | None => Err(anyhow::anyhow!("must be non-empty text")),
            Some(_) => Ok(()),
        });
        registry.register_validator("maxLen", |value: &Value, arg: &str| {
            let limit: usize = arg.parse()?;
            anyhow::ensure!(value.as_str().map_or(0, str::len) <= limit, "longer than {}", limit);
            Ok(())
        });
        registry.register_transformer("exclaim", |value| match value {
            Value::Text(text) => Value::Text(format!("{}!", text)),
            other => other,
        });
        registry.register_transformer("double", |value| match value {
            Value::Text(text) => Value::Text(format!("{} {}", text, text)),
            other => other,
        });
        registry
    }

    #[test]
    fn test_validators_receive_parsed_arguments() {
        let registry = registry();
        let validators =
            resolve_validators(&registry, &parse_tag("nonEmpty,maxLen:3"), "code").unwrap();

        assert!(run_validators(&validators, &Value::from("abc"), "code").is_ok());
        let err = run_validators(&validators, &Value::from("abcd"), "code").unwrap_err();
        match err {
            Error::Validation { field, validator, source } => {
                assert_eq!(field, "code");
                assert_eq!(validator, "maxLen");
                assert_eq!(source.to_string(), "longer than 3");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_first_failure_stops_the_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = registry();
        let counter = Arc::clone(&calls);
        registry.register_validator("count", move |_: &Value, _: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let validators = resolve_validators(&registry, &parse_tag("nonEmpty,count"), "x").unwrap();
        assert!(run_validators(&validators, &Value::from(""), "x").is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_transformers_chain_in_tag_order() {
        let registry = registry();
        let forward = resolve_transformers(&registry, &parse_tag("exclaim,double"), "x").unwrap();
        let backward = resolve_transformers(&registry, &parse_tag("double,exclaim"), "x").unwrap();

        assert_eq!(run_transformers(&forward, Value::from("hi")), Value::from("hi! hi!"));
        assert_eq!(run_transformers(&backward, Value::from("hi")), Value::from("hi hi!"));
        // unknown shapes pass through
        assert_eq!(run_transformers(&forward, Value::Int(3)), Value::Int(3));
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let registry = registry();
        let err = resolve_transformers(&registry, &parse_tag("exclaim,missing"), "x").err().unwrap();
        assert_eq!(err.to_string(), "transformer 'missing' not found");

        let err = resolve_validators(&registry, &parse_tag("nope:1"), "y").err().unwrap();
        assert_eq!(err.to_string(), "validator 'nope' not found");
        assert_eq!(err.field(), Some("y"));
    }
}
