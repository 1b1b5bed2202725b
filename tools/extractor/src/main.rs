//! Extraction shell: loads a YAML tag taxonomy and a GeoJSON feature
//! collection, runs the classification / geometry-validation pipeline from
//! `geotags-core`, and writes the kept features as GeoJSON plus an optional
//! run manifest with counts and exclusion diagnostics.
//!
//! Feature acquisition (Overpass, geocoding) happens upstream; this tool
//! only consumes what is already on disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue};
use serde::Serialize;

use geotags_core::{
    extract, summarize, CategoryConfig, CompiledTaxonomy, Diagnostics, ElementKind, ElementRef,
    ExtractionSummary, OutputFeature, RawFeature,
};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "extractor",
    about = "Classify OSM features against a tag taxonomy and filter by geometry"
)]
struct Args {
    /// YAML taxonomy configuration (list of category blocks).
    #[arg(short, long)]
    config: PathBuf,

    /// Input GeoJSON FeatureCollection of raw OSM features.
    #[arg(short, long)]
    features: PathBuf,

    /// Output GeoJSON path for the kept features.
    #[arg(short, long, default_value = "data/geotags.geojson")]
    output: PathBuf,

    /// Optional run manifest JSON (counts, distributions, exclusions).
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

// ── Run manifest ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RunManifest {
    input_features: usize,
    kept_features: usize,
    diagnostics: Diagnostics,
    summary: ExtractionSummary,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config_text = fs::read_to_string(&args.config)
        .with_context(|| format!("reading taxonomy config {}", args.config.display()))?;
    let categories: Vec<CategoryConfig> = serde_yaml::from_str(&config_text)
        .with_context(|| format!("parsing taxonomy config {}", args.config.display()))?;
    let taxonomy =
        CompiledTaxonomy::compile(&categories).context("invalid taxonomy configuration")?;
    log::info!(
        "compiled taxonomy: {} query keys, {} tags",
        taxonomy.query_keys().len(),
        taxonomy.tag_count()
    );

    let features = read_features(&args.features)?;
    let input_count = features.len();
    log::info!(
        "loaded {input_count} raw features from {}",
        args.features.display()
    );

    let result = extract(features, &taxonomy);
    let summary = summarize(&result.kept, &taxonomy);
    log_summary(&summary);

    write_features(&args.output, &result.kept)?;
    log::info!(
        "wrote {} features to {}",
        result.kept.len(),
        args.output.display()
    );

    if let Some(path) = &args.manifest {
        let manifest = RunManifest {
            input_features: input_count,
            kept_features: result.kept.len(),
            diagnostics: result.diagnostics,
            summary,
        };
        ensure_parent(path)?;
        fs::write(path, serde_json::to_string_pretty(&manifest)?)
            .with_context(|| format!("writing manifest {}", path.display()))?;
        log::info!("wrote run manifest to {}", path.display());
    }

    Ok(())
}

fn log_summary(summary: &ExtractionSummary) {
    log::info!("successfully extracted {} features", summary.total_features);
    log::info!("features with names: {}", summary.named_features);
    log::info!("geometry types: {:?}", summary.geometry_counts);
    log::info!("OSM tag distribution: {:?}", summary.tag_counts);
}

// ── GeoJSON input ────────────────────────────────────────────────────────────

fn read_features(path: &Path) -> Result<Vec<RawFeature>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading features {}", path.display()))?;
    let geojson: GeoJson = text
        .parse()
        .with_context(|| format!("parsing GeoJSON {}", path.display()))?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => bail!("{} is not a GeoJSON FeatureCollection", path.display()),
    };

    let mut features = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;
    for feature in collection.features {
        match raw_feature(feature) {
            Some(raw) => features.push(raw),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} input features without usable geometry");
    }
    Ok(features)
}

/// Convert one GeoJSON feature into the core model. Returns None when the
/// geometry is absent or not convertible.
///
/// Scalar properties become string tags (JSON nulls are dropped, so a null
/// cell counts as an absent key); `element` and `id` map to the OSM element
/// reference instead of the tag set.
fn raw_feature(feature: geojson::Feature) -> Option<RawFeature> {
    let geometry = feature.geometry?;
    let geometry = geo_types::Geometry::<f64>::try_from(geometry).ok()?;

    let mut tags = HashMap::new();
    let mut kind: Option<ElementKind> = None;
    let mut id: Option<i64> = None;
    if let Some(properties) = feature.properties {
        for (key, value) in properties {
            match key.as_str() {
                "element" => {
                    if let JsonValue::String(s) = &value {
                        kind = s.parse().ok();
                    }
                }
                "id" => id = scalar_i64(&value),
                _ => {
                    if let Some(s) = scalar_string(&value) {
                        tags.insert(key, s);
                    }
                }
            }
        }
    }

    let element = match (kind, id) {
        (Some(kind), Some(id)) => Some(ElementRef { kind, id }),
        _ => None,
    };
    Some(RawFeature {
        tags,
        geometry,
        element,
    })
}

fn scalar_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

// ── GeoJSON output ───────────────────────────────────────────────────────────

fn write_features(path: &Path, kept: &[OutputFeature]) -> Result<()> {
    ensure_parent(path)?;
    let collection = FeatureCollection {
        bbox: None,
        features: kept.iter().map(geojson_feature).collect(),
        foreign_members: None,
    };
    fs::write(path, GeoJson::from(collection).to_string())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Project an output feature into GeoJSON. `name` is always present in the
/// properties, null when the feature had none.
fn geojson_feature(out: &OutputFeature) -> geojson::Feature {
    let mut properties = JsonObject::new();
    properties.insert(
        "name".to_string(),
        match &out.name {
            Some(name) => JsonValue::String(name.clone()),
            None => JsonValue::Null,
        },
    );
    properties.insert(
        "osm_tag".to_string(),
        JsonValue::String(out.osm_tag.clone()),
    );
    if let Some(element) = out.element {
        properties.insert(
            "element".to_string(),
            JsonValue::String(element.kind.to_string()),
        );
        properties.insert("id".to_string(), JsonValue::from(element.id));
    }

    geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&out.geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }
    Ok(())
}
