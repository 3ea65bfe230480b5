//! Process-wide logging setup shared by the binaries.

pub mod tracing;

pub use crate::tracing::{env_filter, DEFAULT_DIRECTIVE};

/// Install the JSON subscriber. Later calls are no-ops.
pub fn init() {
    tracing::init();
}
