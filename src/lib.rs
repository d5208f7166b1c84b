//! emoji-canon library
//!
//! Builds a canonical emoji image library from several vendor sets. Vendor
//! file names and metadata are normalized to one canonical name per emoji,
//! toned variants are stored beside their base image, aliases are expanded
//! and every set is completed from the Unicode reference set.

// Module declarations
pub mod acquire;
pub mod cli;
pub mod codepoints;
pub mod config;
pub mod constants;
pub mod doctor;
pub mod grapheme;
pub mod library;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod raster;
pub mod resolver;
pub mod tables;
pub mod workers;
