//! Validators and transformers every registry created with
//! [`Registry::with_builtins`] starts with

mod transformers;
mod validators;

use crate::registry::Registry;

pub(crate) fn register_all(registry: &mut Registry) {
    validators::register(registry);
    transformers::register(registry);
}
