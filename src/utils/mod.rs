//! Utility modules

pub mod cancel;

pub use cancel::{abort_failure, abortable};
