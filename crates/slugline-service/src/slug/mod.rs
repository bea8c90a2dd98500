//! Slug engine: generation on save and resolution of slug paths.
//!
//! ## Summary
//! [`SlugEngine`] binds an immutable [`SlugRegistry`] to a [`RecordStore`].
//! The generator half (`before_save`, `save`) keeps slugs unique per scope;
//! the resolver half (`find_by_params`, `to_params`) maps path parameters to
//! records and back.

pub mod generator;
pub mod resolver;

use std::sync::Arc;

use slugline_core::config::SlugConfig;
use slugline_core::constants::DEFAULT_MAX_WRITE_ATTEMPTS;
use slugline_core::record::Record;
use slugline_core::registry::{EntityConfig, SlugRegistry};
use slugline_db::db::query::Condition;
use slugline_db::db::store::RecordStore;

use crate::error::ServiceResult;

#[derive(Clone)]
pub struct SlugEngine {
    registry: Arc<SlugRegistry>,
    store: Arc<dyn RecordStore>,
    max_write_attempts: u32,
}

impl SlugEngine {
    #[must_use]
    pub fn new(registry: Arc<SlugRegistry>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            registry,
            store,
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_settings(self, settings: &SlugConfig) -> Self {
        self.with_max_write_attempts(settings.max_write_attempts)
    }

    /// Caps the write attempts of [`SlugEngine::save`]; at least one write is
    /// always attempted.
    #[must_use]
    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &SlugRegistry {
        &self.registry
    }

    /// ## Summary
    /// Returns the column an entity type is scoped by: the foreign key of an
    /// association scope, the column of a value scope, `None` when unscoped.
    ///
    /// ## Errors
    /// Returns `ConfigurationError` if the entity type is not registered.
    pub fn scope_column(&self, entity: &str) -> ServiceResult<Option<&str>> {
        Ok(self.config(entity)?.scope_column())
    }

    fn config(&self, entity: &str) -> ServiceResult<&EntityConfig> {
        Ok(self.registry.get(entity)?)
    }
}

/// Conditions selecting the scope partition a record belongs to.
fn scope_conditions(config: &EntityConfig, record: &Record) -> Vec<Condition> {
    config
        .scope_column()
        .map(|column| Condition::equals(column, record.get(column).clone()))
        .into_iter()
        .collect()
}
