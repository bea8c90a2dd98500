//! Registration of slugged entity types.
//!
//! ## Summary
//! Hosts opt entity types in explicitly during setup. Each registration binds
//! a [`TableSchema`] to its name column, slug column and scope, validated once
//! and immutable afterwards:
//!
//! ```rust,ignore
//! let registry = SlugRegistry::builder()
//!     .register(item_schema, SlugOptions::default())?
//!     .register(sub_item_schema, SlugOptions::default().scope("item"))?
//!     .build();
//! ```
//!
//! A scope naming a column of the table is a value scope. Otherwise it must
//! name a `belongs_to` association, by parent name or by foreign key, and
//! becomes an association scope.

use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::constants::{DEFAULT_NAME_COLUMN, DEFAULT_SLUG_COLUMN, ID_COLUMN, MAX_IDENTIFIER_LEN};
use crate::error::{CoreError, CoreResult};
use crate::record::EntityType;
use crate::schema::{ColumnKind, TableSchema};

/// Options supplied when registering an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugOptions {
    pub name_column: String,
    pub slug_column: String,
    pub scope: Option<String>,
}

impl Default for SlugOptions {
    fn default() -> Self {
        Self {
            name_column: DEFAULT_NAME_COLUMN.to_string(),
            slug_column: DEFAULT_SLUG_COLUMN.to_string(),
            scope: None,
        }
    }
}

impl SlugOptions {
    #[must_use]
    pub fn name_column(mut self, column: impl Into<String>) -> Self {
        self.name_column = column.into();
        self
    }

    #[must_use]
    pub fn slug_column(mut self, column: impl Into<String>) -> Self {
        self.slug_column = column.into();
        self
    }

    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// Partition within which a slug must be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugScope {
    /// Unique across the whole table.
    Unscoped,
    /// Unique per parent record.
    Association {
        parent: EntityType,
        foreign_key: String,
    },
    /// Unique per distinct value of a column on the same record.
    Value { column: String },
}

/// Resolved, validated configuration of one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityConfig {
    schema: TableSchema,
    name_column: String,
    slug_column: String,
    scope: SlugScope,
}

impl EntityConfig {
    #[must_use]
    pub const fn entity(&self) -> &EntityType {
        &self.schema.entity
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.schema.table
    }

    #[must_use]
    pub const fn schema(&self) -> &TableSchema {
        &self.schema
    }

    #[must_use]
    pub fn name_column(&self) -> &str {
        &self.name_column
    }

    #[must_use]
    pub fn slug_column(&self) -> &str {
        &self.slug_column
    }

    #[must_use]
    pub const fn scope(&self) -> &SlugScope {
        &self.scope
    }

    /// Column holding the scope key: the foreign key for association scopes,
    /// the scope column for value scopes.
    #[must_use]
    pub fn scope_column(&self) -> Option<&str> {
        match &self.scope {
            SlugScope::Unscoped => None,
            SlugScope::Association { foreign_key, .. } => Some(foreign_key),
            SlugScope::Value { column } => Some(column),
        }
    }

    /// Name of the storage-level unique constraint on `(scope, slug)`.
    #[must_use]
    pub fn unique_constraint_name(&self) -> String {
        format!("{}_{}_scope_key", self.schema.table, self.slug_column)
    }
}

/// Immutable map from entity type to its slug configuration.
#[derive(Debug, Default)]
pub struct SlugRegistry {
    entities: BTreeMap<EntityType, EntityConfig>,
}

impl SlugRegistry {
    #[must_use]
    pub fn builder() -> SlugRegistryBuilder {
        SlugRegistryBuilder::default()
    }

    /// ## Summary
    /// Looks up the configuration of a registered entity type.
    ///
    /// ## Errors
    /// Returns `ConfigurationError` if the entity type was never registered.
    pub fn get(&self, entity: &str) -> CoreResult<&EntityConfig> {
        self.entities.get(entity).ok_or_else(|| {
            CoreError::ConfigurationError(format!("entity type '{entity}' is not registered"))
        })
    }

    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityConfig> {
        self.entities.values()
    }
}

#[derive(Debug, Default)]
pub struct SlugRegistryBuilder {
    entities: BTreeMap<EntityType, EntityConfig>,
}

impl SlugRegistryBuilder {
    /// ## Summary
    /// Registers an entity type.
    ///
    /// Parent entity types referenced by an association scope do not need to
    /// be registered first; the chain is checked when it is walked.
    ///
    /// ## Errors
    /// Returns `ConfigurationError` if the entity type is already registered,
    /// an identifier is malformed or duplicated, the name or slug column is
    /// missing or not a text column, or the scope is neither a column nor a
    /// `belongs_to` association.
    pub fn register(mut self, schema: TableSchema, options: SlugOptions) -> CoreResult<Self> {
        if self.entities.contains_key(&schema.entity) {
            return Err(config_error(format!(
                "entity type '{}' is already registered",
                schema.entity
            )));
        }

        validate_schema(&schema)?;
        require_text_column(&schema, &options.name_column, "name")?;
        require_text_column(&schema, &options.slug_column, "slug")?;
        if options.name_column == options.slug_column {
            return Err(config_error(format!(
                "entity type '{}' uses '{}' as both name and slug column",
                schema.entity, options.name_column
            )));
        }

        let scope = resolve_scope(&schema, &options)?;

        tracing::debug!(
            entity = %schema.entity,
            table = %schema.table,
            name_column = %options.name_column,
            slug_column = %options.slug_column,
            scope = ?scope,
            "Registered slugged entity type"
        );

        self.entities.insert(
            schema.entity.clone(),
            EntityConfig {
                schema,
                name_column: options.name_column,
                slug_column: options.slug_column,
                scope,
            },
        );
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> SlugRegistry {
        SlugRegistry {
            entities: self.entities,
        }
    }
}

fn resolve_scope(schema: &TableSchema, options: &SlugOptions) -> CoreResult<SlugScope> {
    let Some(scope) = options.scope.as_deref() else {
        return Ok(SlugScope::Unscoped);
    };

    if let Some(assoc) = schema.find_belongs_to(scope) {
        return Ok(SlugScope::Association {
            parent: assoc.parent.clone(),
            foreign_key: assoc.foreign_key.clone(),
        });
    }

    match schema.find_column(scope) {
        Some(column) if column.name == options.slug_column || column.name == options.name_column => {
            Err(config_error(format!(
                "entity type '{}' cannot be scoped by its own name or slug column '{scope}'",
                schema.entity
            )))
        }
        Some(column) if column.kind == ColumnKind::Text => Ok(SlugScope::Value {
            column: column.name.clone(),
        }),
        Some(column) => Err(config_error(format!(
            "scope column '{}' of entity type '{}' must be a text column, found {:?}",
            column.name, schema.entity, column.kind
        ))),
        None => Err(config_error(format!(
            "scope '{scope}' of entity type '{}' is neither a column nor a belongs_to association",
            schema.entity
        ))),
    }
}

fn validate_schema(schema: &TableSchema) -> CoreResult<()> {
    validate_identifier(schema.entity.as_str())?;
    validate_identifier(&schema.table)?;

    let mut seen = HashSet::new();
    for column in &schema.columns {
        validate_identifier(&column.name)?;
        if column.name == ID_COLUMN {
            return Err(config_error(format!(
                "table '{}' must not declare the implicit '{ID_COLUMN}' column",
                schema.table
            )));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(config_error(format!(
                "table '{}' declares column '{}' twice",
                schema.table, column.name
            )));
        }
    }

    for assoc in &schema.belongs_to {
        validate_identifier(assoc.parent.as_str())?;
        match schema.find_column(&assoc.foreign_key) {
            Some(column) if column.kind == ColumnKind::Uuid => {}
            _ => {
                return Err(config_error(format!(
                    "foreign key '{}' of table '{}' must be a declared uuid column",
                    assoc.foreign_key, schema.table
                )));
            }
        }
    }

    for assoc in &schema.has_many {
        validate_identifier(assoc.child.as_str())?;
        validate_identifier(&assoc.order_by)?;
    }

    Ok(())
}

fn require_text_column(schema: &TableSchema, name: &str, role: &str) -> CoreResult<()> {
    match schema.find_column(name) {
        Some(column) if column.kind == ColumnKind::Text => Ok(()),
        Some(column) => Err(config_error(format!(
            "{role} column '{name}' of entity type '{}' must be a text column, found {:?}",
            schema.entity, column.kind
        ))),
        None => Err(config_error(format!(
            "{role} column '{name}' does not exist on table '{}'",
            schema.table
        ))),
    }
}

/// Identifiers end up quoted in SQL, so only plain lower-case snake case is
/// accepted.
fn validate_identifier(ident: &str) -> CoreResult<()> {
    let mut chars = ident.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid_start && valid_rest && ident.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(config_error(format!("invalid identifier '{ident}'")))
    }
}

fn config_error(message: String) -> CoreError {
    CoreError::ConfigurationError(message)
}
