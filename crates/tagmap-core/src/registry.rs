//! Validator and transformer registries
//!
//! Tags reference validators and transformers by name. Names resolve against a
//! [`Registry`]; the process-wide one is created on first use with every built-in
//! registered and is guarded by a read-mostly lock. Mapping calls only ever take
//! the read lock, once per record level, and release it before any registered
//! function runs.
//!
//! Copyright (c) 2025 Tagmap Team
//! Licensed under the Apache-2.0 license

use crate::builtins;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A named rule checking one value against an optional string argument
pub type ValidatorFn = Arc<dyn Fn(&Value, &str) -> anyhow::Result<()> + Send + Sync>;

/// A named value-to-value function, identity on shapes it does not handle
pub type TransformerFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// A registry shared between mappers
pub type SharedRegistry = Arc<RwLock<Registry>>;

/// Name-keyed validator and transformer functions
#[derive(Clone, Default)]
pub struct Registry {
    validators: HashMap<String, ValidatorFn>,
    transformers: HashMap<String, TransformerFn>,
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in validator and transformer
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    /// Add or replace a validator
    pub fn register_validator<F>(&mut self, name: impl Into<String>, validator: F)
    where
        F: Fn(&Value, &str) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        log::debug!("registered validator '{}'", name);
        self.validators.insert(name, Arc::new(validator));
    }

    /// Add or replace a transformer
    pub fn register_transformer<F>(&mut self, name: impl Into<String>, transformer: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        log::debug!("registered transformer '{}'", name);
        self.transformers.insert(name, Arc::new(transformer));
    }

    pub fn validator(&self, name: &str) -> Option<ValidatorFn> {
        self.validators.get(name).cloned()
    }

    pub fn transformer(&self, name: &str) -> Option<TransformerFn> {
        self.transformers.get(name).cloned()
    }

    pub fn has_validator(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    pub fn has_transformer(&self, name: &str) -> bool {
        self.transformers.contains_key(name)
    }

    /// Registered validator names, sorted
    pub fn validator_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered transformer names, sorted
    pub fn transformer_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.transformers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("validators", &self.validator_names())
            .field("transformers", &self.transformer_names())
            .finish()
    }
}

/// The process-wide registry, initialised with the built-ins on first use
pub fn global() -> SharedRegistry {
    static GLOBAL: OnceLock<SharedRegistry> = OnceLock::new();
    GLOBAL
        .get_or_init(|| Arc::new(RwLock::new(Registry::with_builtins())))
        .clone()
}

/// Register a validator in the process-wide registry
pub fn register_validator<F>(name: impl Into<String>, validator: F)
where
    F: Fn(&Value, &str) -> anyhow::Result<()> + Send + Sync + 'static,
{
    write(&global()).register_validator(name, validator);
}

/// Register a transformer in the process-wide registry
pub fn register_transformer<F>(name: impl Into<String>, transformer: F)
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    write(&global()).register_transformer(name, transformer);
}

// A panic while holding the lock cannot leave a half-inserted entry behind.
pub(crate) fn read(registry: &RwLock<Registry>) -> RwLockReadGuard<'_, Registry> {
    registry.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write(registry: &RwLock<Registry>) -> RwLockWriteGuard<'_, Registry> {
    registry.write().unwrap_or_else(PoisonError::into_inner)
}
