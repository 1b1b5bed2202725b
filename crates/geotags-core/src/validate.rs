//! Geometry validation: keep or reject a classified feature by comparing
//! its actual shape against the taxonomy's expectation for its tag.
//!
//! Classification and geometry compatibility are separate gates on purpose:
//! a feature can be correctly classified yet useless for analysis because
//! its survey shape is wrong (a park digitized as a single point). Each
//! rejection reason is reported distinctly.

use crate::feature::{atomic_kind, shape_name, ClassifiedFeature};
use crate::taxonomy::{CompiledTaxonomy, GeometryConstraint};

/// Outcome of validating one classified feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Reject(RejectReason),
}

/// Why a feature was excluded. Exclusion is a normal outcome, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Canonical tag is the `unknown` sentinel or not declared in the taxonomy.
    UnrecognizedTag { tag: String },
    /// Tag is known, but the observed shape is outside its allowed set.
    GeometryMismatch { tag: String, shape: &'static str },
}

impl RejectReason {
    /// Diagnostic string as accumulated in the run diagnostics.
    pub fn diagnostic(&self) -> String {
        match self {
            RejectReason::UnrecognizedTag { tag } => tag.clone(),
            RejectReason::GeometryMismatch { tag, shape } => {
                format!("{tag} (geometry: {shape})")
            }
        }
    }
}

/// Decide keep/reject for one classified feature.
pub fn accept(feature: &ClassifiedFeature, taxonomy: &CompiledTaxonomy) -> Decision {
    let tag = match feature.canonical.as_known() {
        Some(tag) => tag,
        None => {
            return Decision::Reject(RejectReason::UnrecognizedTag {
                tag: feature.canonical.to_string(),
            })
        }
    };

    let constraint = match taxonomy.constraint(tag) {
        Some(constraint) => constraint,
        None => {
            return Decision::Reject(RejectReason::UnrecognizedTag {
                tag: tag.to_string(),
            })
        }
    };

    match constraint {
        GeometryConstraint::Any => Decision::Keep,
        _ if constraint.allows(atomic_kind(&feature.feature.geometry)) => Decision::Keep,
        _ => Decision::Reject(RejectReason::GeometryMismatch {
            tag: tag.to_string(),
            shape: shape_name(&feature.feature.geometry),
        }),
    }
}
