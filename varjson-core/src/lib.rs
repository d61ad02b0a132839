//! # Annotated variant -> nested JSON record
//!
//! This crate turns variants that have already been run through a consequence
//! annotation engine into one consolidated, deeply nested record per variant,
//! ready for line-oriented JSON output. It provides:
//!
//! - consequence fragment reshaping (coordinate ranges, SIFT/PolyPhen strings, domains)
//! - most severe consequence selection against a rank table
//! - merging of per-population allele frequencies from co-located known variants
//! - recursive numberify of numeric-looking strings
//!
//! The annotation engine, the severity ranking and the frequency data are inputs;
//! nothing here does I/O while a record is being assembled.

pub mod assembler;
pub mod config;
pub mod consequence;
pub mod consts;
pub mod errors;
pub mod frequency;
pub mod models;
pub mod naming;
pub mod numberify;
pub mod severity;

pub use assembler::RecordAssembler;
pub use config::{AssemblerConfig, FrequencyFlags};
pub use errors::{Result, VarJsonError};
pub use frequency::{FrequencySource, PopulationFrequencies};
pub use models::{AnnotatedVariant, ColocatedVariant, ConsequenceFragment, FeatureType, VariantRecord};
pub use naming::NamingPolicy;
pub use severity::SeverityRanks;
