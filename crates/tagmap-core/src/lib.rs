//! Tagmap - tag-driven record mapping
//!
//! This crate copies data between differently-shaped records. Every field carries
//! an ordered pipeline declared in its tags: validators check the raw source value,
//! transformers rewrite it, and a fixed set of coercion rules bridges structural
//! differences such as optionals, nested records, sequences and serialized text.
//!
//! # Main Components
//!
//! - **Records**: the [`record!`] macro declares a struct together with its field
//!   descriptors and tags
//! - **Mapping**: [`Mapper`] runs validation, transformation and coercion per field
//! - **Registry**: name-keyed validators and transformers, with built-ins preloaded
//! - **Codec**: JSON encoding used for text coercion and [`map_json`]
//! - **Error Handling**: [`Error`] built on `thiserror`, validator causes on `anyhow`
//!
//! # Example
//!
//! ```
//! tagmap::record! {
//!     #[derive(Debug, Default)]
//!     pub struct SignUp {
//!         #[field(validators = "required,email", transformers = "trim,uppercase")]
//!         pub email: String,
//!         pub tags: String,
//!     }
//! }
//!
//! tagmap::record! {
//!     #[derive(Debug, Default)]
//!     pub struct Account {
//!         pub email: String,
//!         pub tags: Vec<String>,
//!     }
//! }
//!
//! fn main() -> tagmap::Result<()> {
//!     let form = SignUp {
//!         email: "ada@example.com".to_string(),
//!         tags: r#"["admin", "beta"]"#.to_string(),
//!     };
//!     let mut account = Account::default();
//!     tagmap::map(&form, &mut account)?;
//!
//!     assert_eq!(account.email, "ADA@EXAMPLE.COM");
//!     assert_eq!(account.tags, ["admin", "beta"]);
//!     Ok(())
//! }
//! ```

mod builtins;
pub mod codec;
pub mod config;
pub mod error;
pub mod mapping;
pub mod record;
pub mod registry;
pub mod value;

#[cfg(test)]
mod proptest_strategies;

// Re-export main types for convenience
pub use codec::CodecError;
pub use config::MapperConfig;
pub use error::{Error, Result};
pub use mapping::{
    join_text_sequence, parse_inline_spec, parse_tag, split_text_sequence, InlineSpec, Mapper,
    TagEntry,
};
pub use record::{FieldDef, Record, RecordDescriptor, RecordValue};
pub use registry::{
    register_transformer, register_validator, Registry, SharedRegistry, TransformerFn, ValidatorFn,
};
pub use value::{ConversionError, Mappable, Shape, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Map `source` into `destination` using the process-wide registry
pub fn map<S: Record, D: Record>(source: &S, destination: &mut D) -> Result<()> {
    Mapper::new().map(source, destination)
}

/// Map between dynamic record values using the process-wide registry
pub fn map_values(source: &Value, destination: &mut Value) -> Result<()> {
    Mapper::new().map_values(source, destination)
}

/// Map every element of `source` into a fresh `D`
pub fn map_slice<S: Record, D: Record>(source: &[S]) -> Result<Vec<D>> {
    Mapper::new().map_slice(source)
}

/// Map a dynamic sequence of records into records of `destination`
pub fn map_sequence(source: &Value, destination: &'static RecordDescriptor) -> Result<Value> {
    Mapper::new().map_sequence(source, destination)
}

/// Decode JSON into `target`, then run its pipelines in place
pub fn map_json<T: Record>(json: &str, target: &mut T) -> Result<()> {
    Mapper::new().map_json(json, target)
}

/// Run every field's validators and transformers on `target` itself
pub fn validate_in_place<T: Record>(target: &mut T) -> Result<()> {
    Mapper::new().validate_in_place(target)
}

/// Validate then transform one value against an inline specification
pub fn validate_value(value: Value, spec: &str) -> Result<Value> {
    Mapper::new().validate_value(value, spec)
}

/// Typed form of [`validate_value`]
pub fn validate_single<T: Mappable>(value: T, spec: &str) -> Result<T> {
    Mapper::new().validate_single(value, spec)
}
