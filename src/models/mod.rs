//! Data models shared across the pipeline.
//!
//! Canonical names are plain `String`s; the typed pieces are the tone level
//! and the asset address derived from a (name, tone) pair.

pub mod asset;
pub mod tone;

pub use asset::Asset;
pub use tone::ToneLevel;
