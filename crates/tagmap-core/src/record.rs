//! Record descriptors and the `record!` macro
//!
//! A record type exposes a static [`RecordDescriptor`] listing its fields in
//! declaration order together with their shapes and raw tag annotations. The
//! [`record!`](crate::record!) macro generates the descriptor and the [`Record`] /
//! [`Mappable`] implementations at compile time.
//!
//! Copyright (c) 2025 Tagmap Team
//! Licensed under the Apache-2.0 license

use crate::value::{ConversionError, Mappable, Shape, Value};
use crate::Result;

/// Compile-time description of one record field
#[derive(Debug, Clone)]
pub struct FieldDef {
    ident: &'static str,
    shape: Shape,
    rename: Option<&'static str>,
    skip: bool,
    validators: &'static str,
    transformers: &'static str,
}

impl FieldDef {
    /// Create a field named after its Rust identifier
    pub fn new(ident: &'static str, shape: Shape) -> Self {
        Self {
            ident,
            shape,
            rename: None,
            skip: false,
            validators: "",
            transformers: "",
        }
    }

    /// Set the serialization name; `"-"` excludes the field from mapping
    pub fn name(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    /// Exclude the field from mapping
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Set the raw validator tag, e.g. `"required,minLength:4"`
    pub fn validators(mut self, tag: &'static str) -> Self {
        self.validators = tag;
        self
    }

    /// Set the raw transformer tag, e.g. `"trim,lowercase"`
    pub fn transformers(mut self, tag: &'static str) -> Self {
        self.transformers = tag;
        self
    }

    pub fn ident(&self) -> &'static str {
        self.ident
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn validator_tag(&self) -> &'static str {
        self.validators
    }

    pub fn transformer_tag(&self) -> &'static str {
        self.transformers
    }

    /// The name used to correlate source and destination fields
    ///
    /// `None` when the field is skipped or renamed to `""` / `"-"`.
    pub fn logical_name(&self) -> Option<&'static str> {
        if self.skip {
            return None;
        }
        match self.rename {
            Some("") | Some("-") => None,
            Some(name) => Some(name),
            None => Some(self.ident),
        }
    }
}

/// Ordered field list of a record type
#[derive(Debug)]
pub struct RecordDescriptor {
    name: &'static str,
    fields: Vec<FieldDef>,
}

impl RecordDescriptor {
    pub fn new(name: &'static str, fields: Vec<FieldDef>) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Position of the last field carrying `logical` as its logical name
    pub fn position_of(&self, logical: &str) -> Option<usize> {
        self.fields
            .iter()
            .rposition(|field| field.logical_name() == Some(logical))
    }
}

/// Field values of one record instance, in descriptor order
#[derive(Debug, Clone)]
pub struct RecordValue {
    descriptor: &'static RecordDescriptor,
    values: Vec<Value>,
}

impl RecordValue {
    /// Build a record, checking one value per field and that each fits its shape
    pub fn new(
        descriptor: &'static RecordDescriptor,
        values: Vec<Value>,
    ) -> std::result::Result<Self, ConversionError> {
        if values.len() != descriptor.fields.len() {
            return Err(ConversionError::FieldCount {
                record: descriptor.name,
                expected: descriptor.fields.len(),
                found: values.len(),
            });
        }
        if let Some((field, value)) = descriptor
            .fields
            .iter()
            .zip(&values)
            .find(|(field, value)| !field.shape.conforms(value))
        {
            return Err(ConversionError::FieldMismatch {
                record: descriptor.name,
                field: field.ident,
                expected: field.shape.to_string(),
                found: value.kind().to_string(),
            });
        }
        Ok(Self { descriptor, values })
    }

    /// Values produced by [`record!`](crate::record!) from the struct's own fields
    #[doc(hidden)]
    pub fn from_generated(descriptor: &'static RecordDescriptor, values: Vec<Value>) -> Self {
        Self { descriptor, values }
    }

    /// A record with every field at its zero form
    pub fn zero(descriptor: &'static RecordDescriptor) -> Self {
        let values = descriptor.fields.iter().map(|field| field.shape.zero()).collect();
        Self { descriptor, values }
    }

    pub fn descriptor(&self) -> &'static RecordDescriptor {
        self.descriptor
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub(crate) fn slot_mut(&mut self, position: usize) -> &mut Value {
        &mut self.values[position]
    }

    /// Value of the field with the given logical name
    pub fn get(&self, logical: &str) -> Option<&Value> {
        self.descriptor
            .position_of(logical)
            .map(|position| &self.values[position])
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.descriptor, other.descriptor) && self.values == other.values
    }
}

/// A composite record the engine can read from and write into
pub trait Record: Mappable {
    fn descriptor() -> &'static RecordDescriptor;

    /// Snapshot of every field as dynamic values
    fn to_record(&self) -> RecordValue;

    /// Write every slot of `record` back into the fields, in declaration order
    ///
    /// Stops at the first field whose value does not fit; earlier fields stay written.
    fn apply_record(&mut self, record: RecordValue) -> Result<()>;
}

/// Declare a struct together with its mapping descriptor
///
/// Fields accept an optional `#[field(...)]` attribute after their doc comments.
/// Its keys are the [`FieldDef`] builder methods: `name = "..."`,
/// `validators = "..."`, `transformers = "..."` and `skip`.
///
/// ```
/// tagmap::record! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct SignUp {
///         #[field(name = "email", validators = "required,email", transformers = "trim,lowercase")]
///         pub email: String,
///         #[field(skip)]
///         pub attempts: u32,
///     }
/// }
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $doc:literal])*
                $(#[field($($key:ident $(= $arg:literal)?),* $(,)?)])?
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            fn descriptor() -> &'static $crate::RecordDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<$crate::RecordDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    $crate::RecordDescriptor::new(
                        ::std::stringify!($name),
                        ::std::vec![
                            $(
                                $crate::FieldDef::new(
                                    ::std::stringify!($field),
                                    <$ty as $crate::Mappable>::shape(),
                                )
                                $($(.$key($($arg)?))*)?
                            ),*
                        ],
                    )
                })
            }

            fn to_record(&self) -> $crate::RecordValue {
                $crate::RecordValue::from_generated(
                    <Self as $crate::Record>::descriptor(),
                    ::std::vec![$($crate::Mappable::to_value(&self.$field)),*],
                )
            }

            fn apply_record(&mut self, record: $crate::RecordValue) -> $crate::Result<()> {
                let mut values = record.into_values().into_iter();
                $(
                    if let ::std::option::Option::Some(value) = values.next() {
                        self.$field = <$ty as $crate::Mappable>::from_value(value).map_err(|source| {
                            $crate::Error::Conversion {
                                field: ::std::string::String::from(::std::stringify!($field)),
                                source,
                            }
                        })?;
                    }
                )*
                ::std::result::Result::Ok(())
            }
        }

        impl $crate::Mappable for $name {
            fn shape() -> $crate::Shape {
                $crate::Shape::Record(<Self as $crate::Record>::descriptor)
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Record(<Self as $crate::Record>::to_record(self))
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::ConversionError> {
                let record = match value {
                    $crate::Value::Record(record)
                        if ::std::ptr::eq(
                            record.descriptor(),
                            <Self as $crate::Record>::descriptor(),
                        ) =>
                    {
                        record
                    }
                    other => {
                        return ::std::result::Result::Err($crate::ConversionError::Mismatch {
                            expected: <Self as $crate::Mappable>::shape().to_string(),
                            found: ::std::string::String::from(other.kind()),
                        })
                    }
                };
                let mut values = record.into_values().into_iter();
                ::std::result::Result::Ok(Self {
                    $(
                        $field: <$ty as $crate::Mappable>::from_value(values.next().ok_or(
                            $crate::ConversionError::MissingField {
                                record: ::std::stringify!($name),
                                field: ::std::stringify!($field),
                            },
                        )?)?,
                    )*
                })
            }
        }
    };
}
