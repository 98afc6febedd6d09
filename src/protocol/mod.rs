//! Backend interface, wire constants, buffers and value decoding.

pub mod backend;
pub mod buffer;
pub mod connect;
pub mod constants;
pub mod decode;
pub mod memory;
pub mod types;

pub use backend::{
    Backend, BackendResult, BindTarget, ColumnDescription, DataStatus, DiagRecord, Diagnostics,
    GetDataResponse, Indicator,
};
pub use buffer::{ReadBuffer, WriteBuffer};
pub use types::{ColumnDescriptor, ColumnInfo, DecodeType, Row, SqlType, Value, ValueKind};
