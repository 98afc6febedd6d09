//! Per-column retrieval strategies.
//!
//! Every result column gets exactly one plan when the result set is opened:
//!
//! - [`BoundColumn`]: fixed-size or narrow columns read from a buffer the
//!   backend fills during row fetch.
//! - [`StreamedColumn`]: wide, unsized or untrusted columns fetched in chunks
//!   after each row fetch.
//!
//! [`planner`] maps backend metadata to a plan and decode type.

mod bound;
pub mod planner;
mod streamed;

pub use bound::BoundColumn;
pub use planner::{describe_column, plan_column, PlanOptions, RawColumn};
pub use streamed::StreamedColumn;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::protocol::backend::Backend;
use crate::protocol::decode::TimezoneContext;
use crate::protocol::types::{DecodeType, Value};

/// Retrieval strategy chosen for one column.
#[derive(Debug)]
pub enum ColumnPlan {
    Bound(BoundColumn),
    Streamed(StreamedColumn),
}

impl ColumnPlan {
    pub fn decode_type(&self) -> DecodeType {
        match self {
            ColumnPlan::Bound(col) => col.decode_type(),
            ColumnPlan::Streamed(col) => col.decode_type(),
        }
    }

    /// True for the bound strategy, whether or not registration succeeded.
    pub fn is_bound_plan(&self) -> bool {
        matches!(self, ColumnPlan::Bound(_))
    }

    /// True when the backend fills this column during row fetch.
    pub fn is_bound(&self) -> bool {
        match self {
            ColumnPlan::Bound(col) => col.is_bound(),
            ColumnPlan::Streamed(_) => false,
        }
    }

    /// Decode the value of `column` for the current row.
    pub fn current_value<B: Backend>(
        &mut self,
        backend: &mut B,
        column: usize,
        tz: &TimezoneContext,
        cancel: &CancelToken,
    ) -> Result<Value> {
        match self {
            ColumnPlan::Bound(col) => col.current_value(backend, column, tz),
            ColumnPlan::Streamed(col) => col.current_value(backend, column, tz, cancel),
        }
    }
}
