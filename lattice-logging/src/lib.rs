// Copyright (c) 2021 MASSA LABS <info@massa.net>

//! Structured trace events: `lattice_trace!("ledger.genesis", {"hash": ...})`
//! emits `lattice_trace:<event>:<json>` at trace level.

pub use serde_json;
pub use tracing;

#[macro_export]
macro_rules! lattice_trace {
    ($evt:expr, $params:tt) => {
        $crate::tracing::trace!(
            "lattice_trace:{}:{}",
            $evt,
            $crate::serde_json::json!($params)
        );
    };
}
