//! Extraction orchestrator: runs classification then validation over the
//! full feature batch, accumulates rejection diagnostics and projects the
//! survivors down to the output schema.
//!
//! Per-feature work is independent, so with the `threading` feature the
//! decisions are computed in parallel; outcomes are folded in input order
//! afterwards, keeping output and diagnostics identical to the sequential
//! path.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::classify::classify;
use crate::feature::{ClassifiedFeature, OutputFeature, RawFeature, TagSource};
use crate::taxonomy::CompiledTaxonomy;
use crate::validate::{accept, Decision, RejectReason};

// ── Diagnostics ───────────────────────────────────────────────────────────────

/// Deduplicated rejection diagnostics for one run. Ordered sets, so the
/// content is independent of processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Tags seen on features but absent from the taxonomy (plus the
    /// `unknown` sentinel when present).
    pub unrecognized_tags: BTreeSet<String>,
    /// `"{tag} (geometry: {Shape})"` entries for shape mismatches.
    pub geometry_mismatches: BTreeSet<String>,
}

impl Diagnostics {
    fn record(&mut self, reason: &RejectReason) {
        match reason {
            RejectReason::UnrecognizedTag { .. } => {
                self.unrecognized_tags.insert(reason.diagnostic());
            }
            RejectReason::GeometryMismatch { .. } => {
                self.geometry_mismatches.insert(reason.diagnostic());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unrecognized_tags.is_empty() && self.geometry_mismatches.is_empty()
    }
}

/// Result of one extraction run: kept features in input order, plus the
/// diagnostics describing everything that was excluded.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub kept: Vec<OutputFeature>,
    pub diagnostics: Diagnostics,
}

// ── Orchestration ─────────────────────────────────────────────────────────────

enum Outcome {
    Keep(OutputFeature),
    Reject(RejectReason),
}

/// Run the classification → validation → projection pipeline over a batch.
///
/// Deterministic and idempotent: identical inputs give identical kept
/// sequences and diagnostic sets, and re-running on the kept output keeps
/// every feature.
pub fn extract(features: Vec<RawFeature>, taxonomy: &CompiledTaxonomy) -> Extraction {
    let total = features.len();
    let outcomes = decide_all(features, taxonomy);

    let mut kept = Vec::new();
    let mut diagnostics = Diagnostics::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Keep(feature) => kept.push(feature),
            Outcome::Reject(reason) => diagnostics.record(&reason),
        }
    }

    if !diagnostics.unrecognized_tags.is_empty() {
        log::warn!(
            "excluded features with unknown/unconfigured tags: {:?}",
            diagnostics.unrecognized_tags
        );
    }
    if !diagnostics.geometry_mismatches.is_empty() {
        log::info!(
            "excluded features due to geometry mismatch: {:?}",
            diagnostics.geometry_mismatches
        );
    }
    log::info!("kept {} of {total} features", kept.len());

    Extraction { kept, diagnostics }
}

fn decide(feature: RawFeature, taxonomy: &CompiledTaxonomy) -> Outcome {
    let classified = classify(feature, taxonomy);
    match accept(&classified, taxonomy) {
        Decision::Keep => Outcome::Keep(project(classified)),
        Decision::Reject(reason) => Outcome::Reject(reason),
    }
}

#[cfg(not(feature = "threading"))]
fn decide_all(features: Vec<RawFeature>, taxonomy: &CompiledTaxonomy) -> Vec<Outcome> {
    features
        .into_iter()
        .map(|feature| decide(feature, taxonomy))
        .collect()
}

#[cfg(feature = "threading")]
fn decide_all(features: Vec<RawFeature>, taxonomy: &CompiledTaxonomy) -> Vec<Outcome> {
    use rayon::prelude::*;
    features
        .into_par_iter()
        .map(|feature| decide(feature, taxonomy))
        .collect()
}

/// Project a kept feature down to the output schema. `name` stays in the
/// schema as an explicit None when the feature carries no name tag.
fn project(classified: ClassifiedFeature) -> OutputFeature {
    let name = classified.feature.tag("name").map(str::to_owned);
    let ClassifiedFeature { feature, canonical } = classified;
    OutputFeature {
        name,
        osm_tag: canonical.to_string(),
        element: feature.element,
        geometry: feature.geometry,
    }
}
