//! Destination field index

use crate::record::RecordDescriptor;
use std::collections::HashMap;

/// Logical name to slot position of one destination record
///
/// Built once per destination record level on every mapping call.
#[derive(Debug, Default)]
pub struct FieldNameIndex {
    slots: HashMap<&'static str, usize>,
}

impl FieldNameIndex {
    /// Index every field with a logical name; a later duplicate replaces an earlier one
    pub fn build(descriptor: &'static RecordDescriptor) -> Self {
        let mut slots = HashMap::with_capacity(descriptor.fields().len());
        for (position, field) in descriptor.fields().iter().enumerate() {
            let Some(name) = field.logical_name() else {
                continue;
            };
            if let Some(previous) = slots.insert(name, position) {
                log::debug!(
                    "{} declares '{}' twice; field '{}' shadows field '{}'",
                    descriptor.name(),
                    name,
                    field.ident(),
                    descriptor.fields()[previous].ident()
                );
            }
        }
        Self { slots }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;

    crate::record! {
        #[derive(Debug, Default)]
        struct Target {
            #[field(name = "id")]
            legacy_id: String,
            #[field(skip)]
            cache: u32,
            #[field(name = "id")]
            id: String,
            label: Option<String>,
        }
    }

    #[test]
    fn test_last_duplicate_wins_and_skipped_fields_are_absent() {
        let index = FieldNameIndex::build(Target::descriptor());
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("id"), Some(2));
        assert_eq!(index.get("label"), Some(3));
        assert_eq!(index.get("cache"), None);
        assert_eq!(index.get("legacy_id"), None);
    }
}
