//! Type coercion between name-aligned source and destination fields
//!
//! Exactly one [`Rule`] fires per value, chosen in priority order once optional
//! layers have been unwrapped. Nested records and sequences re-enter the full
//! orchestrator, so every nested level runs its own validators and transformers.
//!
//! Text into any sequence is always decoded, so delimited text such as `"a,b"`
//! fails as malformed. [`split_text_sequence`] and [`join_text_sequence`] are
//! available for callers that store delimited lists.
//!
//! Copyright (c) 2025 Tagmap Team
//! Licensed under the Apache-2.0 license

use super::orchestrator::Run;
use super::pipeline::run_transformers;
use crate::codec;
use crate::registry::TransformerFn;
use crate::value::{ConversionError, Shape, Value};
use crate::{Error, Result};

/// Coercion rule selected for one value once optionals are unwrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Both sides are records: map them field by field
    RecordToRecord,
    /// Both sides are sequences: coerce element by element
    SequenceToSequence,
    /// Text holding a serialized record or sequence
    DecodeText,
    /// A record or sequence rendered as canonical text
    EncodeText,
    /// Transform and assign as-is
    Assign,
}

/// Pick the coercion rule for shapes with optional layers already removed
pub fn select_rule(source_shape: &Shape, target_shape: &Shape) -> Rule {
    match (source_shape, target_shape) {
        (Shape::Record(_), Shape::Record(_)) => Rule::RecordToRecord,
        (Shape::Seq(_), Shape::Seq(_)) => Rule::SequenceToSequence,
        (Shape::Text, target) if target.is_composite() => Rule::DecodeText,
        (source, Shape::Text) if source.is_composite() => Rule::EncodeText,
        _ => Rule::Assign,
    }
}

/// Split delimited text into trimmed pieces
pub fn split_text_sequence(text: &str, separator: char) -> Vec<String> {
    text.split(separator)
        .map(|piece| piece.trim().to_string())
        .collect()
}

/// Join strings with a separator; the inverse of [`split_text_sequence`] for
/// pieces without separators or surrounding whitespace
pub fn join_text_sequence<I, S>(items: I, separator: char) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            joined.push(separator);
        }
        joined.push_str(item.as_ref());
    }
    joined
}

fn element_shape(shape: &Shape) -> &Shape {
    match shape {
        Shape::Seq(element) => &**element,
        other => other,
    }
}

fn mismatch(path: &str, expected: &Shape, found: &Value) -> Error {
    Error::Conversion {
        field: path.to_string(),
        source: ConversionError::mismatch(expected, found),
    }
}

impl Run<'_> {
    /// Write `source` into `slot`, resolving shape differences
    ///
    /// An unset optional slot is only filled once the rule succeeds.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn coerce(
        &self,
        source: &Value,
        source_shape: &Shape,
        target_shape: &Shape,
        slot: &mut Value,
        transformers: &[TransformerFn],
        path: &str,
        depth: usize,
    ) -> Result<()> {
        let mut source_shape = source_shape;
        while let Shape::Optional(inner) = source_shape {
            source_shape = &**inner;
        }
        if source.is_null() {
            log::trace!("'{}': empty optional, writing zero {}", path, target_shape);
            *slot = target_shape.zero();
            return Ok(());
        }

        let mut target_shape = target_shape;
        while let Shape::Optional(inner) = target_shape {
            target_shape = &**inner;
        }

        let rule = select_rule(source_shape, target_shape);
        log::trace!("'{}': {:?} ({} -> {})", path, rule, source_shape, target_shape);

        if slot.is_null() {
            let mut staged = target_shape.zero();
            self.apply(rule, source, source_shape, target_shape, &mut staged, transformers, path, depth)?;
            *slot = staged;
            return Ok(());
        }
        self.apply(rule, source, source_shape, target_shape, slot, transformers, path, depth)
    }

    #[allow(clippy::too_many_arguments)]
    fn apply(
        &self,
        rule: Rule,
        source: &Value,
        source_shape: &Shape,
        target_shape: &Shape,
        slot: &mut Value,
        transformers: &[TransformerFn],
        path: &str,
        depth: usize,
    ) -> Result<()> {
        match rule {
            Rule::RecordToRecord => {
                let nested = source
                    .as_record()
                    .ok_or_else(|| mismatch(path, source_shape, source))?;
                if !target_shape.conforms(slot) {
                    *slot = target_shape.zero();
                }
                match slot {
                    Value::Record(target) => self.map_record(nested, target, path, depth + 1),
                    other => Err(mismatch(path, target_shape, other)),
                }
            }
            Rule::SequenceToSequence => {
                let items = source
                    .as_seq()
                    .ok_or_else(|| mismatch(path, source_shape, source))?;
                let (source_element, target_element) =
                    (element_shape(source_shape), element_shape(target_shape));

                let mut converted = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let mut element = target_element.zero();
                    self.coerce(
                        item,
                        source_element,
                        target_element,
                        &mut element,
                        transformers,
                        &format!("{}[{}]", path, i),
                        depth,
                    )?;
                    converted.push(element);
                }
                *slot = Value::Seq(converted);
                Ok(())
            }
            Rule::DecodeText => {
                let text = source.as_str().unwrap_or_default();
                *slot = codec::decode_or_empty(text, target_shape).map_err(|source| Error::Decode {
                    field: path.to_string(),
                    source,
                })?;
                Ok(())
            }
            Rule::EncodeText => {
                *slot = Value::Text(codec::encode(source));
                Ok(())
            }
            Rule::Assign => {
                let value = run_transformers(transformers, source.clone());
                if !target_shape.conforms(&value) {
                    return Err(mismatch(path, target_shape, &value));
                }
                *slot = value;
                Ok(())
            }
        }
    }
}
