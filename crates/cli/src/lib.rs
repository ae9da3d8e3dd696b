//! rtrack command line
//!
//! Subcommands over the research tracker service. Each command resolves the
//! caller's session from `--user` or `RTRACK_USER` and reports failures as
//! terminal notices.

pub mod commands;
pub mod context;
pub mod report;
pub mod util;

pub use context::AppContext;
