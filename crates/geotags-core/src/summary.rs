//! Summary statistics over an extraction result: per-tag and per-shape
//! counts plus the category → tag breakdown, for logging and the run
//! manifest.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::feature::{shape_name, OutputFeature};
use crate::taxonomy::CompiledTaxonomy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// One category with the per-tag counts of its kept features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub tags: Vec<TagCount>,
    pub total: usize,
}

/// Distribution statistics for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionSummary {
    pub total_features: usize,
    pub named_features: usize,
    pub tag_counts: BTreeMap<String, usize>,
    pub geometry_counts: BTreeMap<String, usize>,
    pub categories: Vec<CategorySummary>,
}

/// Compute summary statistics for kept features against the taxonomy that
/// produced them. Categories keep their declaration order; tags inside a
/// category likewise.
pub fn summarize(kept: &[OutputFeature], taxonomy: &CompiledTaxonomy) -> ExtractionSummary {
    let mut tag_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut geometry_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut named_features = 0;

    for feature in kept {
        *tag_counts.entry(feature.osm_tag.clone()).or_insert(0) += 1;
        *geometry_counts
            .entry(shape_name(&feature.geometry).to_string())
            .or_insert(0) += 1;
        if feature.name.is_some() {
            named_features += 1;
        }
    }

    let categories = taxonomy
        .categories()
        .iter()
        .map(|category| {
            let tags: Vec<TagCount> = category
                .tags
                .iter()
                .map(|tag| TagCount {
                    tag: tag.clone(),
                    count: tag_counts.get(tag).copied().unwrap_or(0),
                })
                .collect();
            let total = tags.iter().map(|t| t.count).sum();
            CategorySummary {
                name: category.name.clone(),
                tags,
                total,
            }
        })
        .collect();

    ExtractionSummary {
        total_features: kept.len(),
        named_features,
        tag_counts,
        geometry_counts,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::OutputFeature;
    use crate::taxonomy::{CategoryConfig, CompiledTaxonomy, GeometrySpec, TagGroup, TagValueSpec};
    use geo_types::{point, polygon, Geometry};

    fn taxonomy() -> CompiledTaxonomy {
        let config = vec![
            CategoryConfig {
                category: "Green spaces".to_string(),
                tags: vec![TagGroup {
                    key: "leisure".to_string(),
                    specs: vec![
                        TagValueSpec {
                            value: "park".to_string(),
                            geometry: GeometrySpec::Single("area".to_string()),
                        },
                        TagValueSpec {
                            value: "garden".to_string(),
                            geometry: GeometrySpec::Single("area".to_string()),
                        },
                    ],
                }],
            },
            CategoryConfig {
                category: "Transit".to_string(),
                tags: vec![TagGroup {
                    key: "highway".to_string(),
                    specs: vec![TagValueSpec {
                        value: "bus_stop".to_string(),
                        geometry: GeometrySpec::Single("point".to_string()),
                    }],
                }],
            },
        ];
        CompiledTaxonomy::compile(&config).unwrap()
    }

    fn out(name: Option<&str>, tag: &str, geometry: Geometry<f64>) -> OutputFeature {
        OutputFeature {
            name: name.map(str::to_owned),
            osm_tag: tag.to_string(),
            element: None,
            geometry,
        }
    }

    #[test]
    fn counts_group_by_tag_shape_and_category() {
        let area: Geometry<f64> =
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)].into();
        let kept = vec![
            out(Some("Volkspark"), "leisure=park", area.clone()),
            out(None, "leisure=park", area.clone()),
            out(Some("Haltestelle"), "highway=bus_stop", point!(x: 0.0, y: 0.0).into()),
        ];

        let summary = summarize(&kept, &taxonomy());

        assert_eq!(summary.total_features, 3);
        assert_eq!(summary.named_features, 2);
        assert_eq!(summary.tag_counts.get("leisure=park"), Some(&2));
        assert_eq!(summary.geometry_counts.get("Polygon"), Some(&2));
        assert_eq!(summary.geometry_counts.get("Point"), Some(&1));

        assert_eq!(summary.categories.len(), 2);
        let green = &summary.categories[0];
        assert_eq!(green.name, "Green spaces");
        assert_eq!(green.total, 2);
        // Declared but unmatched tags still show up with a zero count.
        assert!(green
            .tags
            .iter()
            .any(|t| t.tag == "leisure=garden" && t.count == 0));
    }

    #[test]
    fn empty_run_summarizes_to_zeroes() {
        let summary = summarize(&[], &taxonomy());
        assert_eq!(summary.total_features, 0);
        assert_eq!(summary.named_features, 0);
        assert!(summary.tag_counts.is_empty());
        assert_eq!(summary.categories[0].total, 0);
    }
}
