//! Host platform plumbing shared by all processors
//!
//! Structure:
//! - `context/`: `ProcessorContext` trait (status, progress, log, interruption)
//! - `catalogue.rs`: processor metadata and parent dataset descriptions
//! - `operator_properties.rs`: option registry with defaults from operator.json
//! - `properties.rs`: user-supplied parameter values
//! - `palettes.rs`: palette registry from palettes.json
//! - `result.rs`: result files and run outcomes
//! - `error.rs`: error types

pub mod catalogue;
pub mod context;
pub mod error;
pub mod logger;
pub mod operator_properties;
pub mod palettes;
pub mod properties;
pub mod result;

// Re-exports for convenience
pub use catalogue::{DatasetInfo, ProcessorInfo, ProcessorKind, CATALOGUE};
pub use context::{LocalContext, ProcessorContext};
pub use error::{ProcessorError, Result};
pub use logger::DatasetLogger;
pub use operator_properties::{registry, OperatorPropertyReader};
pub use palettes::PALETTE_REGISTRY;
pub use properties::ParameterSet;
pub use result::{write_result, ProcessorOutcome};
