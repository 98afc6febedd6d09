//! Column descriptors and shared per-result-set column information.

use chrono_tz::Tz;

use crate::protocol::constants::{SQL_NO_NULLS, SQL_NULLABLE};

use super::decode_type::{DecodeType, ValueKind};
use super::sql_type::SqlType;

/// Tri-state nullability reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    NoNulls,
    Nullable,
    Unknown,
}

impl Nullability {
    pub fn from_raw(raw: i16) -> Self {
        match raw {
            SQL_NO_NULLS => Nullability::NoNulls,
            SQL_NULLABLE => Nullability::Nullable,
            _ => Nullability::Unknown,
        }
    }

    /// `Some(nullable)` when known.
    pub fn known(self) -> Option<bool> {
        match self {
            Nullability::NoNulls => Some(false),
            Nullability::Nullable => Some(true),
            Nullability::Unknown => None,
        }
    }
}

/// Immutable description of one result column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Declared wire type.
    pub sql_type: SqlType,
    /// Declared size in characters or bytes (0 when unknown).
    pub column_size: u64,
    pub nullability: Nullability,
    /// Type the column is retrieved and decoded as.
    pub decode_type: DecodeType,
    /// Zone override applied to date/time values of this column.
    pub timezone: Option<Tz>,
}

impl ColumnDescriptor {
    /// Label of the retrieval type, e.g. `SQL_C_CHAR`.
    pub fn database_type_name(&self) -> &'static str {
        self.decode_type.label()
    }

    /// Kind of value this column decodes to.
    pub fn value_kind(&self) -> ValueKind {
        self.decode_type.value_kind()
    }

    pub fn nullable(&self) -> Option<bool> {
        self.nullability.known()
    }
}

/// Shared column information for all rows in a result set.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    /// Column definitions.
    pub columns: Vec<ColumnDescriptor>,
}

impl ColumnInfo {
    /// Create new column info from descriptors.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get column by index.
    pub fn get(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    /// Find column index by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}
