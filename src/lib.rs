//! flacseek - FLAC stream inspection and seeking
//!
//! This library crate exposes the CLI's configuration and report types for
//! integration testing.

pub mod config;
pub mod report;
