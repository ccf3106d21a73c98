mod liveness;

pub use liveness::*;

// store

mod revocation_store;

pub use revocation_store::*;

// directory

mod user_directory;

pub use user_directory::*;
