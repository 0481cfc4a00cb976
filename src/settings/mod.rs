//! Settings are read from `settings/dev.toml` (debug) or `settings/release.toml`
//! unless `--settings` points elsewhere. See `bin/store_demo.rs`.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
