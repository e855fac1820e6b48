//! Dataset processors library
//!
//! This library provides the processors and their shared plumbing. It is
//! used by the CLI binary and by the integration tests.

pub mod audio;
pub mod config;
pub mod isoviz;
pub mod pipeline;
pub mod platform;
pub mod presets;
