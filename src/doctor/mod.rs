//! Dependency checking and environment validation.
//!
//! This module checks that the external rasterizer programs and the lookup
//! tables a build relies on are in place.

pub mod checker;
pub mod formatter;

pub use checker::{DependencyChecker, DependencyStatus, ToolStatus};
pub use formatter::{DoctorFormatter, OutputFormat, Platform};
