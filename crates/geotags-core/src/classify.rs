//! Canonical tag assignment.
//!
//! A feature may carry several query keys at once (`highway=cycleway` plus
//! `amenity=bench`); the taxonomy's declaration order is the disambiguation
//! priority, and the first key present on the feature wins.

use crate::feature::{CanonicalTag, ClassifiedFeature, RawFeature, TagSource};
use crate::taxonomy::CompiledTaxonomy;

/// Assign the single canonical `key=value` tag to a raw feature.
///
/// Scans the taxonomy's query keys in declaration order and stops at the
/// first key the feature carries. No match is not an error: the feature is
/// marked `unknown` and excluded downstream.
pub fn classify(feature: RawFeature, taxonomy: &CompiledTaxonomy) -> ClassifiedFeature {
    let canonical = taxonomy
        .query_keys()
        .iter()
        .find_map(|query| {
            feature
                .tag(&query.key)
                .map(|value| CanonicalTag::Tag(format!("{}={value}", query.key)))
        })
        .unwrap_or(CanonicalTag::Unknown);

    ClassifiedFeature { feature, canonical }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{CategoryConfig, GeometrySpec, TagGroup, TagValueSpec};
    use geo_types::{line_string, point, Geometry};
    use std::collections::HashMap;

    fn taxonomy(keys: &[(&str, &str)]) -> CompiledTaxonomy {
        let config = vec![CategoryConfig {
            category: "Test".to_string(),
            tags: keys
                .iter()
                .map(|(key, value)| TagGroup {
                    key: key.to_string(),
                    specs: vec![TagValueSpec {
                        value: value.to_string(),
                        geometry: GeometrySpec::Single("any".to_string()),
                    }],
                })
                .collect(),
        }];
        CompiledTaxonomy::compile(&config).unwrap()
    }

    fn feature(tags: &[(&str, &str)], geometry: Geometry<f64>) -> RawFeature {
        RawFeature {
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            geometry,
            element: None,
        }
    }

    #[test]
    fn first_declared_key_wins_over_later_keys() {
        let taxonomy = taxonomy(&[("highway", "cycleway"), ("amenity", "bench")]);
        let f = feature(
            &[("amenity", "bench"), ("highway", "cycleway")],
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)].into(),
        );

        let classified = classify(f, &taxonomy);
        assert_eq!(
            classified.canonical,
            CanonicalTag::Tag("highway=cycleway".to_string()),
            "declaration order, not attribute order, decides priority"
        );
    }

    #[test]
    fn feature_without_query_keys_is_unknown() {
        let taxonomy = taxonomy(&[("leisure", "park")]);
        let f = feature(&[("building", "yes")], point!(x: 0.0, y: 0.0).into());

        let classified = classify(f, &taxonomy);
        assert_eq!(classified.canonical, CanonicalTag::Unknown);
    }

    #[test]
    fn value_outside_accepted_set_still_forms_a_tag() {
        // The classifier matches on key presence only; an unconfigured value
        // like leisure=garden is rejected later by the validator.
        let taxonomy = taxonomy(&[("leisure", "park")]);
        let f = feature(&[("leisure", "garden")], point!(x: 0.0, y: 0.0).into());

        let classified = classify(f, &taxonomy);
        assert_eq!(
            classified.canonical,
            CanonicalTag::Tag("leisure=garden".to_string())
        );
    }

    #[test]
    fn classification_is_stable_across_runs() {
        let taxonomy = taxonomy(&[("leisure", "park"), ("landuse", "forest")]);
        let tags: HashMap<String, String> = [
            ("landuse".to_string(), "forest".to_string()),
            ("leisure".to_string(), "park".to_string()),
        ]
        .into();

        for _ in 0..8 {
            let f = RawFeature {
                tags: tags.clone(),
                geometry: point!(x: 0.0, y: 0.0).into(),
                element: None,
            };
            let classified = classify(f, &taxonomy);
            assert_eq!(
                classified.canonical,
                CanonicalTag::Tag("leisure=park".to_string())
            );
        }
    }
}
