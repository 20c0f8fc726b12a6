//! Property-based testing strategies for generating shapes and values
//!
//! Generated values always conform to the shape they were generated for, and
//! floats are restricted to exactly representable quarters so JSON round trips
//! are lossless.

#![cfg(test)]

use crate::value::{Shape, Value};
use chrono::DateTime;
use proptest::collection::vec;
use proptest::prelude::*;

/// Strategy for generating scalar shapes
pub fn scalar_shape_strategy() -> impl Strategy<Value = Shape> {
    prop_oneof![
        Just(Shape::Bool),
        Just(Shape::Int),
        Just(Shape::UInt),
        Just(Shape::Float),
        Just(Shape::Text),
        Just(Shape::Timestamp),
    ]
}

/// Strategy for generating shapes nested through optionals and sequences
pub fn shape_strategy() -> impl Strategy<Value = Shape> {
    scalar_shape_strategy().prop_recursive(3, 8, 1, |inner| {
        prop_oneof![
            inner.clone().prop_map(|shape| Shape::Optional(Box::new(shape))),
            inner.prop_map(|shape| Shape::Seq(Box::new(shape))),
        ]
    })
}

/// Strategy for generating a value of `shape`
pub fn value_strategy(shape: &Shape) -> BoxedStrategy<Value> {
    match shape {
        Shape::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        Shape::Int => any::<i64>().prop_map(Value::Int).boxed(),
        Shape::UInt => any::<u64>().prop_map(Value::UInt).boxed(),
        Shape::Float => (-4_000_000i32..4_000_000)
            .prop_map(|quarters| Value::Float(f64::from(quarters) / 4.0))
            .boxed(),
        Shape::Text => "[a-zA-Z0-9 .,!?\"\\\\]{0,40}".prop_map(Value::Text).boxed(),
        Shape::Timestamp => (0i64..4_102_444_800)
            .prop_filter_map("representable timestamp", |secs| {
                DateTime::from_timestamp(secs, 0).map(Value::Timestamp)
            })
            .boxed(),
        Shape::Optional(inner) => prop_oneof![
            1 => Just(Value::Null),
            3 => value_strategy(inner),
        ]
        .boxed(),
        Shape::Seq(element) => vec(value_strategy(element), 0..5).prop_map(Value::Seq).boxed(),
        Shape::Record(descriptor) => Just(Value::Record(crate::RecordValue::zero(descriptor()))).boxed(),
    }
}

/// Strategy for generating a shape together with a conforming value
pub fn shaped_value_strategy() -> impl Strategy<Value = (Shape, Value)> {
    shape_strategy().prop_flat_map(|shape| {
        let values = value_strategy(&shape);
        (Just(shape), values)
    })
}

/// Strategy for generating comma-free, untrimmed-safe string sequences
pub fn text_sequence_strategy() -> impl Strategy<Value = Vec<String>> {
    vec("[a-zA-Z0-9]([a-zA-Z0-9 ._-]{0,10}[a-zA-Z0-9])?", 1..6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::mapping::{join_text_sequence, split_text_sequence};

    proptest! {
        #[test]
        fn generated_values_conform((shape, value) in shaped_value_strategy()) {
            prop_assert!(shape.conforms(&value), "{} does not fit {:?}", shape, value);
        }

        #[test]
        fn codec_round_trip_is_lossless((shape, value) in shaped_value_strategy()) {
            let decoded = codec::decode(&codec::encode(&value), &shape).unwrap();
            prop_assert_eq!(decoded, value);
        }

        #[test]
        fn split_inverts_join(items in text_sequence_strategy()) {
            let joined = join_text_sequence(&items, ',');
            prop_assert_eq!(split_text_sequence(&joined, ','), items);
        }
    }
}
