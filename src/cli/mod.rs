//! CLI command handlers for emoji-canon.
//!
//! Each subcommand is a clap `Args` struct with an `execute` method taking
//! the global `--config` path.

pub mod aliases;
pub mod build;
pub mod common;
pub mod coverage;
pub mod decode;
pub mod doctor;
pub mod process;
pub mod sync;
pub mod tonable;

// Re-export types used by main.rs and tests
pub use aliases::AliasesArgs;
pub use build::BuildArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use coverage::CoverageArgs;
pub use decode::DecodeArgs;
pub use doctor::DoctorArgs;
pub use process::ProcessArgs;
pub use sync::SyncArgs;
pub use tonable::TonableArgs;
