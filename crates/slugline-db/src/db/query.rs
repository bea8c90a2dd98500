//! Conjunctive query description shared by all record stores.

use std::cmp::Ordering;

use slugline_core::record::{FieldValue, Record};

/// A single equality, NULL or id condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `column = value`; a `Null` value is treated as `IS NULL`.
    Eq { column: String, value: FieldValue },
    IsNull { column: String },
    IdEq(uuid::Uuid),
    IdNe(uuid::Uuid),
}

impl Condition {
    /// NULL-safe equality: `column IS NULL` for a null value, `column = value`
    /// otherwise.
    #[must_use]
    pub fn equals(column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let column = column.into();
        match value.into() {
            FieldValue::Null => Self::IsNull { column },
            value => Self::Eq { column, value },
        }
    }

    /// Evaluates the condition against an in-memory record.
    #[must_use]
    pub fn is_satisfied_by(&self, record: &Record) -> bool {
        match self {
            Self::Eq { column, value } => record.get(column) == value,
            Self::IsNull { column } => record.get(column).is_null(),
            Self::IdEq(id) => record.id() == Some(*id),
            Self::IdNe(id) => record.id() != Some(*id),
        }
    }
}

/// Conditions joined with `AND`, optionally ordered ascending by a column.
///
/// Ordered queries sort NULLs last, as `PostgreSQL` does for `ASC`, and break
/// ties by creation order. Without an explicit order, stores return rows in
/// creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub conditions: Vec<Condition>,
    pub order_by: Option<String>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    #[must_use]
    pub fn is_satisfied_by(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.is_satisfied_by(record))
    }

    /// Compares two records by the ordering column, NULLs last. Records
    /// compare equal when the query is unordered.
    #[must_use]
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.order_by
            .as_deref()
            .map_or(Ordering::Equal, |column| nulls_last(a.get(column), b.get(column)))
    }
}

fn nulls_last(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.cmp(b),
    }
}
