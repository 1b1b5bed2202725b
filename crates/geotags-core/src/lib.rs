//! Geotag extraction engine: classify raw OSM features against a tag
//! taxonomy and filter out those whose geometry does not match the shape
//! the taxonomy declares for their tag.
//!
//! Pipeline:
//!   taxonomy compilation → per-feature classification →
//!   geometry validation → projection to the output schema.
//!
//! The crate is pure data transformation: acquisition of features (Overpass,
//! geocoding) and serialization to disk live in `tools/extractor`.

pub mod classify;
pub mod error;
pub mod extract;
pub mod feature;
pub mod summary;
pub mod taxonomy;
pub mod validate;

pub use classify::classify;
pub use error::ConfigError;
pub use extract::{extract, Diagnostics, Extraction};
pub use feature::{
    atomic_kind, shape_name, CanonicalTag, ClassifiedFeature, ElementKind, ElementRef,
    OutputFeature, RawFeature, TagSource,
};
pub use summary::{summarize, ExtractionSummary};
pub use taxonomy::{
    CategoryConfig, CompiledTaxonomy, GeometryConstraint, GeometryKind, GeometrySpec, TagGroup,
    TagValueSpec,
};
pub use validate::{accept, Decision, RejectReason};
