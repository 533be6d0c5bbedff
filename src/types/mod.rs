//! Core data types shared by the streaming, error and model layers.

mod events;
mod finish_reason;
mod flavor;
mod request;
mod usage;

pub use events::*;
pub use finish_reason::*;
pub use flavor::*;
pub use request::*;
pub use usage::*;
