//! Settings are read from a TOML file (see `settings/dev.toml`) and overlaid
//! with `WARDEN__SECTION__KEY` environment variables.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
