//! GRIB record section model and decoder boundary.
//!
//! This crate defines the decoded representation of one GRIB-style record
//! (indicator, product definition, grid description) together with the
//! [`SectionDecoder`] trait implemented by the wire-level section decoder.
//! The bit-unpacking of individual sections lives behind that trait; the
//! ingest pipeline only sees decoded structs and unpacked value planes.
//!
//! Also provides the parameter naming tables: the standard-range table,
//! sentinel-terminated provider override tables, and the runtime ensemble
//! code map.

pub mod decoder;
pub mod sections;
pub mod tables;

pub use decoder::{DecodeError, SectionDecoder};
pub use sections::{
    DecodedRecord, GridDescription, GridKind, Indicator, ProductDefinition, RECORD_MARKER,
};
pub use tables::{
    is_isobaric, level_description, levels, lookup_override, params, standard_parameter,
    EnsembleMap, ParameterInfo, STANDARD_MAX, TABLE_END,
};
