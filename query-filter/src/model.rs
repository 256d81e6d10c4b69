//! Capability interface the compiler needs from a queryable model.
//!
//! The storage layer owns the actual entity types; the compiler only sees a
//! table name, a list of named fields and the ordered primary key.

use crate::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Float,
    Text,
    Boolean,
    /// Stored as `YYYY-MM-DD HH:MM:SS` text.
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

/// Link from one model to another, joined on `local_column = remote_column`.
#[derive(Clone, Copy)]
pub struct Relation {
    pub target: &'static dyn Model,
    pub local_column: &'static str,
    pub remote_column: &'static str,
    pub cardinality: Cardinality,
}

// Models reference each other in both directions, so only print the target name.
impl std::fmt::Debug for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relation")
            .field("target", &self.target.table())
            .field("local_column", &self.local_column)
            .field("remote_column", &self.remote_column)
            .field("cardinality", &self.cardinality)
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Column {
        column: &'static str,
        field_type: FieldType,
    },
    Relation(Relation),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn column(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            kind: FieldKind::Column {
                column: name,
                field_type,
            },
        }
    }

    pub const fn relation(
        name: &'static str,
        target: &'static dyn Model,
        local_column: &'static str,
        remote_column: &'static str,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Relation(Relation {
                target,
                local_column,
                remote_column,
                cardinality,
            }),
        }
    }

    /// Column name and type, or `None` for relationship fields.
    pub fn as_column(&self) -> Option<(&'static str, FieldType)> {
        match self.kind {
            FieldKind::Column { column, field_type } => Some((column, field_type)),
            FieldKind::Relation(_) => None,
        }
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match &self.kind {
            FieldKind::Relation(relation) => Some(relation),
            FieldKind::Column { .. } => None,
        }
    }
}

pub trait Model: Sync {
    fn table(&self) -> &'static str;

    fn fields(&self) -> &'static [Field];

    /// Primary key field names in declaration order.
    fn primary_key(&self) -> &'static [&'static str];

    fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Resolves the primary key to column names. A key that does not name a
    /// column means the model metadata itself is broken.
    fn primary_key_fields(&self) -> Result<Vec<&'static str>, FilterError> {
        self.primary_key()
            .iter()
            .map(|name| {
                self.field(name)
                    .and_then(Field::as_column)
                    .map(|(column, _)| column)
                    .ok_or_else(|| {
                        FilterError::Internal(format!(
                            "primary key \"{}\" is not a column of {}",
                            name,
                            self.table()
                        ))
                    })
            })
            .collect()
    }

    /// Columns selected when materialising rows, in declaration order.
    fn columns(&self) -> Vec<&'static str> {
        self.fields()
            .iter()
            .filter_map(|f| f.as_column().map(|(column, _)| column))
            .collect()
    }
}

/// Static table metadata, usually declared once per entity.
#[derive(Debug)]
pub struct Schema {
    pub table: &'static str,
    pub fields: &'static [Field],
    pub primary_key: &'static [&'static str],
}

impl Model for Schema {
    fn table(&self) -> &'static str {
        self.table
    }

    fn fields(&self) -> &'static [Field] {
        self.fields
    }

    fn primary_key(&self) -> &'static [&'static str] {
        self.primary_key
    }
}
