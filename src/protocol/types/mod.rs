//! Column and value types for decoded result sets.

mod column;
mod decode_type;
mod row;
mod sql_type;
mod value;

pub use column::{ColumnDescriptor, ColumnInfo, Nullability};
pub use decode_type::{DecodeType, ValueKind};
pub use row::Row;
pub use sql_type::SqlType;
pub use value::Value;
