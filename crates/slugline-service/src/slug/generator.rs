//! Slug generation with scope-qualified uniqueness.
//!
//! ## Summary
//! The candidate is the normalized name. While another record in the same
//! scope holds it, numeric suffixes starting at 2 are appended (`name`,
//! `name2`, `name3`, ...). The lookup excludes the record itself, so saving
//! an unchanged record keeps its slug.
//!
//! The pre-check alone is racy under concurrent writers. [`SlugEngine::save`]
//! relies on the store's `(scope, slug)` unique constraint and, on a
//! conflict, resumes the collision loop after the suffix that lost the race.

use slugline_core::constants::FIRST_COLLISION_SUFFIX;
use slugline_core::record::Record;
use slugline_core::registry::EntityConfig;
use slugline_core::util::slug::{normalize, with_suffix};
use slugline_db::db::query::{Condition, Query};
use slugline_db::error::DbError;

use crate::error::{ServiceError, ServiceResult};

use super::{SlugEngine, scope_conditions};

/// Suffix following `current`; `None` stands for the bare candidate.
fn next_suffix(current: Option<u32>) -> Option<u32> {
    match current {
        None => Some(FIRST_COLLISION_SUFFIX),
        Some(n) => n.checked_add(1),
    }
}

fn candidate_for(config: &EntityConfig, record: &Record) -> String {
    normalize(record.text(config.name_column()).unwrap_or_default())
}

impl SlugEngine {
    /// ## Summary
    /// Pre-save hook: computes a scope-unique slug and stores it in the
    /// record's slug column. Does not persist anything.
    ///
    /// Hosts persisting records themselves must call this immediately before
    /// every insert and update, and should still enforce the `(scope, slug)`
    /// unique constraint in storage.
    ///
    /// ## Errors
    /// Returns `ConfigurationError` if the record's entity type is not
    /// registered, or a database error from the collision lookup.
    #[tracing::instrument(skip_all, fields(entity = %record.entity(), id = ?record.id()))]
    pub async fn before_save(&self, record: &mut Record) -> ServiceResult<()> {
        let config = self.config(record.entity().as_str())?;
        let candidate = candidate_for(config, record);
        let (slug, _) = self.next_free_slug(config, record, &candidate, None).await?;
        record.set(config.slug_column(), slug);
        Ok(())
    }

    /// ## Summary
    /// Slugs and writes a record, inserting it when it has no id and updating
    /// it otherwise. Returns the stored record.
    ///
    /// ## Side Effects
    /// - Overwrites the slug column, so renames re-slug
    /// - Retries with the next suffix when the store reports a slug conflict
    ///
    /// ## Errors
    /// Returns `ExhaustedRetries` once the configured number of write attempts
    /// all hit conflicts, `SuffixesExhausted` if no numeric suffix is free,
    /// `ConfigurationError` for an unregistered entity
    /// type, or the store's error for any other failure.
    #[tracing::instrument(skip_all, fields(entity = %record.entity(), id = ?record.id()))]
    pub async fn save(&self, mut record: Record) -> ServiceResult<Record> {
        let config = self.config(record.entity().as_str())?;
        let candidate = candidate_for(config, &record);
        let mut start = None;

        for attempt in 1..=self.max_write_attempts {
            let (slug, suffix) = self
                .next_free_slug(config, &record, &candidate, start)
                .await?;
            record.set(config.slug_column(), slug.as_str());

            match self.store.write(config, &record).await {
                Ok(stored) => {
                    tracing::debug!(slug, attempt, "Record saved");
                    return Ok(stored);
                }
                Err(DbError::SlugConflict { .. }) => {
                    tracing::warn!(slug, attempt, "Slug taken by a concurrent write, retrying");
                    start = Some(next_suffix(suffix).ok_or_else(|| exhausted(config, attempt))?);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(exhausted(config, self.max_write_attempts))
    }

    /// Walks the suffixes from `start` until the store reports the slug free
    /// in the record's scope. Fails with `SuffixesExhausted` past `u32::MAX`.
    async fn next_free_slug(
        &self,
        config: &EntityConfig,
        record: &Record,
        candidate: &str,
        start: Option<u32>,
    ) -> ServiceResult<(String, Option<u32>)> {
        let mut suffix = start;
        loop {
            let slug = suffix.map_or_else(|| candidate.to_string(), |n| with_suffix(candidate, n));
            if !self.slug_taken(config, record, &slug).await? {
                return Ok((slug, suffix));
            }
            tracing::debug!(slug, "Slug collision, trying next suffix");
            suffix = Some(next_suffix(suffix).ok_or_else(|| ServiceError::SuffixesExhausted {
                entity: config.entity().clone(),
                candidate: candidate.to_string(),
            })?);
        }
    }

    async fn slug_taken(
        &self,
        config: &EntityConfig,
        record: &Record,
        slug: &str,
    ) -> ServiceResult<bool> {
        let mut query = Query::new().filter(Condition::equals(config.slug_column(), slug));
        for condition in scope_conditions(config, record) {
            query = query.filter(condition);
        }
        if let Some(id) = record.id() {
            query = query.filter(Condition::IdNe(id));
        }
        Ok(self.store.count(config, &query).await? > 0)
    }
}

fn exhausted(config: &EntityConfig, attempts: u32) -> ServiceError {
    ServiceError::ExhaustedRetries {
        entity: config.entity().clone(),
        attempts,
    }
}
