//! HTTP middleware.

mod trace;

pub use trace::{current_trace_id, Trace};
