//! Tag-driven record mapping
//!
//! [`Mapper`] copies every like-named field of a source record into a destination
//! record. Each source field runs through its own pipeline:
//!
//! 1. validators from its `validators` tag, against the untransformed value
//! 2. transformers from its `transformers` tag, chained in tag order
//! 3. coercion into the destination shape (optionals, nested records,
//!    sequences and serialized text)
//!
//! Nested records and sequences repeat the whole pipeline at their own level.
//! The first failure stops the call; fields written before it stay written.
//!
//! Copyright (c) 2025 Tagmap Team
//! Licensed under the Apache-2.0 license

mod coerce;
mod index;
mod inline;
mod orchestrator;
mod pipeline;
mod tags;


pub use coerce::{join_text_sequence, select_rule, split_text_sequence, Rule};
pub use index::FieldNameIndex;
pub use inline::{parse_inline_spec, InlineSpec};
pub use tags::{parse_tag, TagEntry};

use crate::codec;
use crate::config::{self, MapperConfig};
use crate::record::{Record, RecordDescriptor, RecordValue};
use crate::registry::{self, Registry, SharedRegistry, TransformerFn, ValidatorFn};
use crate::value::{Mappable, Value};
use crate::{Error, Result};
use orchestrator::Run;
use pipeline::{resolve_transformers, resolve_validators, run_transformers, run_validators};
use std::sync::{Arc, RwLock};

/// Field name used for errors of the single-value helpers
const VALUE_FIELD: &str = "value";

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

/// Maps records through a validator/transformer registry
#[derive(Debug, Clone)]
pub struct Mapper {
    registry: SharedRegistry,
    config: MapperConfig,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper {
    /// A mapper over the process-wide registry and environment configuration
    pub fn new() -> Self {
        Self {
            registry: registry::global(),
            config: config::process().clone(),
        }
    }

    /// A mapper owning a private registry
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            config: config::process().clone(),
        }
    }

    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn registry(&self) -> SharedRegistry {
        Arc::clone(&self.registry)
    }

    /// Add or replace a validator in this mapper's registry
    pub fn register_validator<F>(&self, name: impl Into<String>, validator: F)
    where
        F: Fn(&Value, &str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        registry::write(&self.registry).register_validator(name, validator);
    }

    /// Add or replace a transformer in this mapper's registry
    pub fn register_transformer<F>(&self, name: impl Into<String>, transformer: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        registry::write(&self.registry).register_transformer(name, transformer);
    }

    fn run(&self) -> Run<'_> {
        Run {
            registry: &self.registry,
            config: &self.config,
        }
    }

    /// Map `source` into `destination`
    ///
    /// On error, destination fields written before the failing field keep their
    /// new values. If writing them back into `destination` also fails, the mapping
    /// error is the one returned.
    pub fn map<S: Record, D: Record>(&self, source: &S, destination: &mut D) -> Result<()> {
        let source = source.to_record();
        let mut target = destination.to_record();
        let outcome = self.run().map_record(&source, &mut target, "", 0);
        let written = destination.apply_record(target);
        outcome.and(written)
    }

    /// Map between dynamic record values
    pub fn map_values(&self, source: &Value, destination: &mut Value) -> Result<()> {
        let Value::Record(source) = source else {
            return Err(Error::precondition(format!(
                "source must be a record, got {}",
                source.kind()
            )));
        };
        let Value::Record(target) = destination else {
            return Err(Error::precondition(format!(
                "destination must be a record, got {}",
                destination.kind()
            )));
        };
        self.run().map_record(source, target, "", 0)
    }

    /// Map each source element into a fresh destination element, failing fast
    pub fn map_slice<S: Record, D: Record>(&self, source: &[S]) -> Result<Vec<D>> {
        let run = self.run();
        source
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let mut target = RecordValue::zero(D::descriptor());
                run.map_record(&element.to_record(), &mut target, &format!("[{}]", i), 0)?;
                D::from_value(Value::Record(target)).map_err(|source| Error::Conversion {
                    field: format!("[{}]", i),
                    source,
                })
            })
            .collect()
    }

    /// Map a dynamic sequence of records into a sequence of `destination` records
    pub fn map_sequence(&self, source: &Value, destination: &'static RecordDescriptor) -> Result<Value> {
        let items = source.as_seq().ok_or_else(|| {
            Error::precondition(format!("source must be a sequence, got {}", source.kind()))
        })?;

        let run = self.run();
        let mut mapped = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let Value::Record(record) = item else {
                return Err(Error::precondition(format!(
                    "element [{}] must be a record, got {}",
                    i,
                    item.kind()
                )));
            };
            let mut target = RecordValue::zero(destination);
            run.map_record(record, &mut target, &format!("[{}]", i), 0)?;
            mapped.push(Value::Record(target));
        }
        Ok(Value::Seq(mapped))
    }

    /// Decode JSON into `target`, then validate and transform it in place
    ///
    /// Keys absent from the text leave the current field values untouched.
    pub fn map_json<T: Record>(&self, json: &str, target: &mut T) -> Result<()> {
        let mut record = target.to_record();
        codec::merge_json(json, &mut record).map_err(|source| Error::Decode {
            field: T::descriptor().name().to_string(),
            source,
        })?;
        target.apply_record(record)?;
        self.validate_in_place(target)
    }

    /// Run every field's validators and transformers with `target` as both source
    /// and destination
    pub fn validate_in_place<T: Record>(&self, target: &mut T) -> Result<()> {
        let source = target.to_record();
        let mut record = source.clone();
        let outcome = self.run().map_record(&source, &mut record, "", 0);
        let written = target.apply_record(record);
        outcome.and(written)
    }

    /// Validate then transform a single value against an inline specification
    ///
    /// `spec` looks like `validators:'required,email' transformers:'trim,lowercase'`.
    pub fn validate_value(&self, value: Value, spec: &str) -> Result<Value> {
        let spec = parse_inline_spec(spec)?;
        let (validators, transformers) = {
            let registry = registry::read(&self.registry);
            (
                resolve_validators(&registry, &spec.validators, VALUE_FIELD)?,
                resolve_transformers(&registry, &spec.transformers, VALUE_FIELD)?,
            )
        };
        run_validators(&validators, &value, VALUE_FIELD)?;
        Ok(run_transformers(&transformers, value))
    }

    /// Typed form of [`Mapper::validate_value`]
    pub fn validate_single<T: Mappable>(&self, value: T, spec: &str) -> Result<T> {
        let transformed = self.validate_value(value.to_value(), spec)?;
        T::from_value(transformed).map_err(|source| Error::Conversion {
            field: VALUE_FIELD.to_string(),
            source,
        })
    }

    /// Look up a validator by name
    pub fn validator(&self, name: &str) -> Option<ValidatorFn> {
        registry::read(&self.registry).validator(name)
    }

    /// Look up a transformer by name
    pub fn transformer(&self, name: &str) -> Option<TransformerFn> {
        registry::read(&self.registry).transformer(name)
    }
}
