//! Tracing setup. Filters are reloadable at runtime; see `main.rs`.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
