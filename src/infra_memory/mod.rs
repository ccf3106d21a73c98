//! In-process backends for development and tests. They hold state in memory
//! and lose it on restart.

mod revocation_store_memory;
mod user_directory_memory;

pub use revocation_store_memory::*;
pub use user_directory_memory::*;
