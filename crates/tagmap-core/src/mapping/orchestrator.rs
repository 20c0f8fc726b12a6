//! Record-level mapping orchestration
//!
//! Copyright (c) 2025 Tagmap Team
//! Licensed under the Apache-2.0 license

use super::index::FieldNameIndex;
use super::join_path;
use super::pipeline::{build_field_specs, run_validators};
use crate::config::MapperConfig;
use crate::record::RecordValue;
use crate::registry::{self, Registry};
use crate::{Error, Result};
use std::sync::RwLock;

/// State shared by every record level of one mapping call
pub(crate) struct Run<'a> {
    pub registry: &'a RwLock<Registry>,
    pub config: &'a MapperConfig,
}

impl Run<'_> {
    /// Map one source record level onto a destination record
    ///
    /// Pipelines for the whole level are resolved before any field is processed.
    /// Fields are then handled in declaration order: validators on the raw value,
    /// then transformation and coercion into the like-named destination slot.
    /// The first error stops the level; slots written before it keep their values.
    pub(crate) fn map_record(
        &self,
        source: &RecordValue,
        target: &mut RecordValue,
        path: &str,
        depth: usize,
    ) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(Error::DepthExceeded {
                field: path.to_string(),
                limit: self.config.max_depth,
            });
        }

        let source_descriptor = source.descriptor();
        let target_descriptor = target.descriptor();
        log::debug!(
            "mapping {} -> {} (depth {})",
            source_descriptor.name(),
            target_descriptor.name(),
            depth
        );

        let specs = {
            let registry = registry::read(self.registry);
            build_field_specs(source_descriptor, &registry, path)?
        };
        let index = FieldNameIndex::build(target_descriptor);

        for spec in &specs {
            let field_path = join_path(path, spec.name);
            let value = &source.values()[spec.position];

            run_validators(&spec.validators, value, &field_path)?;

            let Some(slot) = index.get(spec.name) else {
                log::trace!("'{}' has no destination counterpart", field_path);
                continue;
            };
            self.coerce(
                value,
                source_descriptor.fields()[spec.position].shape(),
                target_descriptor.fields()[slot].shape(),
                target.slot_mut(slot),
                &spec.transformers,
                &field_path,
                depth,
            )?;
        }
        Ok(())
    }
}
