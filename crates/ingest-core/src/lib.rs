//! Record ingest pipeline.
//!
//! Drives a provider-aware scan over record files, assembles the decoded
//! planes into per-parameter volumes, derives wind products, and stages
//! the result for an output sink:
//!
//! ```text
//! file -> RecordScanner -> Vec<Field> -> VolumeBuilder -> OutputSink
//! ```
//!
//! The wire decoder ([`grib_records::SectionDecoder`]) and the persistence
//! writer ([`OutputSink`]) are both external; this crate owns everything
//! in between.

pub mod adapter;
pub mod builder;
pub mod config;
pub mod derive;
pub mod error;
pub mod output;
pub mod provider;
pub mod scanner;

pub use adapter::{descriptor_from_grid, swap_orientation_ns_to_sn, ParameterNames, ProjectionAdapter};
pub use builder::VolumeBuilder;
pub use config::{
    IngestConfig, OrientationPolicy, OverrideGeometry, RequestedField, UnitConversion,
};
pub use derive::{derive_wind, WindProduct};
pub use error::{IngestError, Result};
pub use output::{GridRemapper, OutputField, OutputSink};
pub use provider::{Provider, ProviderProfile};
pub use scanner::{RecordScanner, ScanOutcome};
