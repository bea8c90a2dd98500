//! Host table descriptions handed over at registration time.

use serde::{Deserialize, Serialize};

use crate::constants::FOREIGN_KEY_SUFFIX;
use crate::record::EntityType;

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Uuid,
    Integer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnKind,
}

/// A `belongs_to` association: this table references a parent by foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BelongsTo {
    pub parent: EntityType,
    pub foreign_key: String,
}

/// A `has_many` association: children of `child` type point at this table.
///
/// The first child by `order_by` is the parent's default child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasMany {
    pub child: EntityType,
    pub order_by: String,
}

/// Description of a host table.
///
/// ## Summary
/// Every table has an implicit `uuid` primary key named `id`, which must not
/// be declared as a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub entity: EntityType,
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub belongs_to: Vec<BelongsTo>,
    pub has_many: Vec<HasMany>,
}

impl TableSchema {
    #[must_use]
    pub fn new(entity: impl Into<EntityType>, table: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            table: table.into(),
            columns: Vec::new(),
            belongs_to: Vec::new(),
            has_many: Vec::new(),
        }
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            kind,
        });
        self
    }

    /// Declares a parent association with the conventional `<parent>_id`
    /// foreign key, adding the key column when it is not declared yet.
    #[must_use]
    pub fn belongs_to(self, parent: impl Into<EntityType>) -> Self {
        let parent = parent.into();
        let foreign_key = format!("{parent}{FOREIGN_KEY_SUFFIX}");
        self.belongs_to_with_key(parent, foreign_key)
    }

    #[must_use]
    pub fn belongs_to_with_key(
        mut self,
        parent: impl Into<EntityType>,
        foreign_key: impl Into<String>,
    ) -> Self {
        let foreign_key = foreign_key.into();
        if self.find_column(&foreign_key).is_none() {
            self = self.column(foreign_key.clone(), ColumnKind::Uuid);
        }
        self.belongs_to.push(BelongsTo {
            parent: parent.into(),
            foreign_key,
        });
        self
    }

    #[must_use]
    pub fn has_many(mut self, child: impl Into<EntityType>, order_by: impl Into<String>) -> Self {
        self.has_many.push(HasMany {
            child: child.into(),
            order_by: order_by.into(),
        });
        self
    }

    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Finds a parent association by parent name or by foreign key.
    #[must_use]
    pub fn find_belongs_to(&self, name: &str) -> Option<&BelongsTo> {
        self.belongs_to
            .iter()
            .find(|assoc| assoc.parent.as_str() == name || assoc.foreign_key == name)
    }

    #[must_use]
    pub fn find_has_many(&self, child: &EntityType) -> Option<&HasMany> {
        self.has_many.iter().find(|assoc| &assoc.child == child)
    }
}
