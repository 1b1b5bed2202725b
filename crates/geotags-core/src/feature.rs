//! Feature model: raw features as delivered by the data source, classified
//! features carrying a canonical tag, and the projected output schema.
//!
//! Raw features are consumed read-only; the engine never mutates geometry or
//! attributes, it only derives and projects.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use geo_types::Geometry;
use serde::{Deserialize, Serialize};

use crate::taxonomy::GeometryKind;

// ── Element identity ──────────────────────────────────────────────────────────

/// OSM element type of the source object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
            ElementKind::Relation => "relation",
        };
        f.write_str(s)
    }
}

impl FromStr for ElementKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(ElementKind::Node),
            "way" => Ok(ElementKind::Way),
            "relation" => Ok(ElementKind::Relation),
            _ => Err(()),
        }
    }
}

/// `(kind, id)` reference back to the source OSM object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: i64,
}

// ── Raw and classified features ───────────────────────────────────────────────

/// Capability query over heterogeneous feature attributes: a feature may
/// carry any subset of tag keys, so callers ask rather than pattern-match.
pub trait TagSource {
    /// Value of attribute `key`, if the feature carries it.
    fn tag(&self, key: &str) -> Option<&str>;

    fn has_tag(&self, key: &str) -> bool {
        self.tag(key).is_some()
    }
}

/// One feature as obtained from the external retrieval collaborator.
#[derive(Debug, Clone)]
pub struct RawFeature {
    pub tags: HashMap<String, String>,
    pub geometry: Geometry<f64>,
    pub element: Option<ElementRef>,
}

impl TagSource for RawFeature {
    fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Canonical tag assigned by the classifier: a real `key=value` string, or
/// the `unknown` sentinel when no query key matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalTag {
    Tag(String),
    Unknown,
}

impl CanonicalTag {
    /// The `key=value` string, or None for the sentinel.
    pub fn as_known(&self) -> Option<&str> {
        match self {
            CanonicalTag::Tag(t) => Some(t),
            CanonicalTag::Unknown => None,
        }
    }
}

impl fmt::Display for CanonicalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalTag::Tag(t) => f.write_str(t),
            CanonicalTag::Unknown => f.write_str("unknown"),
        }
    }
}

/// A raw feature plus its derived canonical tag. Transient: exists only
/// between classification and validation.
#[derive(Debug, Clone)]
pub struct ClassifiedFeature {
    pub feature: RawFeature,
    pub canonical: CanonicalTag,
}

// ── Output schema ─────────────────────────────────────────────────────────────

/// Projection of a kept feature down to the analysis schema.
/// `name` is always present in the schema, null when the feature had none.
#[derive(Debug, Clone)]
pub struct OutputFeature {
    pub name: Option<String>,
    pub osm_tag: String,
    pub element: Option<ElementRef>,
    pub geometry: Geometry<f64>,
}

// ── Shape mapping ─────────────────────────────────────────────────────────────

/// GeoJSON-style shape name, used verbatim in diagnostics.
pub fn shape_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Map a concrete shape to its atomic kind.
///
/// Fixed mapping: Point → point; Polygon, MultiPolygon → area; LineString,
/// MultiLineString → line. Every other shape has no atomic kind and can
/// never satisfy an explicit constraint.
pub fn atomic_kind(geometry: &Geometry<f64>) -> Option<GeometryKind> {
    match geometry {
        Geometry::Point(_) => Some(GeometryKind::Point),
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Some(GeometryKind::Area),
        Geometry::LineString(_) | Geometry::MultiLineString(_) => Some(GeometryKind::Line),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{point, polygon, MultiPoint};

    #[test]
    fn atomic_kind_covers_the_five_source_shapes() {
        let point: Geometry<f64> = point!(x: 2.35, y: 48.85).into();
        let area: Geometry<f64> =
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)].into();

        assert_eq!(atomic_kind(&point), Some(GeometryKind::Point));
        assert_eq!(atomic_kind(&area), Some(GeometryKind::Area));
    }

    #[test]
    fn multipoint_has_no_atomic_kind() {
        let mp: Geometry<f64> =
            MultiPoint::from(vec![point!(x: 0.0, y: 0.0), point!(x: 1.0, y: 1.0)]).into();
        assert_eq!(atomic_kind(&mp), None);
        assert_eq!(shape_name(&mp), "MultiPoint");
    }

    #[test]
    fn unknown_sentinel_displays_as_unknown() {
        assert_eq!(CanonicalTag::Unknown.to_string(), "unknown");
        assert_eq!(
            CanonicalTag::Tag("leisure=park".to_string()).to_string(),
            "leisure=park"
        );
        assert!(CanonicalTag::Unknown.as_known().is_none());
    }

    #[test]
    fn tag_source_distinguishes_absent_from_empty() {
        let mut tags = HashMap::new();
        tags.insert("leisure".to_string(), String::new());
        let f = RawFeature {
            tags,
            geometry: point!(x: 0.0, y: 0.0).into(),
            element: None,
        };
        // Empty string is a present value; only a missing key is absent.
        assert_eq!(f.tag("leisure"), Some(""));
        assert_eq!(f.tag("amenity"), None);
        assert!(f.has_tag("leisure"));
        assert!(!f.has_tag("amenity"));
    }
}
