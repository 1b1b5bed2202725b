//! Taxonomy configuration and its compiled form.
//!
//! Configuration arrives as a list of category blocks, each mapping tag keys
//! to accepted values with a geometry expectation:
//!
//! ```yaml
//! - category: Green spaces
//!   tags:
//!     leisure:
//!       - { value: park,   geometry: area }
//!       - { value: garden, geometry: [point, area] }
//! - category: Cycling
//!   tags:
//!     highway:
//!       - { value: cycleway, geometry: line }
//! ```
//!
//! Compilation flattens this into (a) a declaration-ordered sequence of query
//! keys with deduplicated values and (b) a `key=value` → constraint lookup.
//! Declaration order is the classifier's priority order, so it is kept as an
//! explicit sequence rather than a map iteration order.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Geometry kinds and constraints ────────────────────────────────────────────

/// Atomic shape family a tag may expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Area,
    Line,
}

impl GeometryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Area => "area",
            GeometryKind::Line => "line",
        }
    }
}

/// Normalized geometry expectation for one `key=value` tag: either the
/// wildcard, or a non-empty set of atomic kinds. The raw string-or-list
/// configuration form never survives past compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryConstraint {
    Any,
    OneOf(Vec<GeometryKind>),
}

impl GeometryConstraint {
    /// Whether a shape of the given atomic kind (None = unrepresentable)
    /// satisfies this constraint.
    pub fn allows(&self, kind: Option<GeometryKind>) -> bool {
        match self {
            GeometryConstraint::Any => true,
            GeometryConstraint::OneOf(kinds) => kind.is_some_and(|k| kinds.contains(&k)),
        }
    }
}

// ── Configuration schema ──────────────────────────────────────────────────────

/// Raw geometry field as written in configuration: a single token or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeometrySpec {
    Single(String),
    Set(Vec<String>),
}

/// One accepted value for a tag key, with its geometry expectation.
#[derive(Debug, Clone, Deserialize)]
pub struct TagValueSpec {
    pub value: String,
    pub geometry: GeometrySpec,
}

/// Value specs for one tag key, in declaration order.
#[derive(Debug, Clone)]
pub struct TagGroup {
    pub key: String,
    pub specs: Vec<TagValueSpec>,
}

/// A human-facing category block. Categories group tags for reporting only;
/// classification works on the flattened key order.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryConfig {
    pub category: String,
    #[serde(deserialize_with = "ordered_tag_map", default)]
    pub tags: Vec<TagGroup>,
}

/// Deserialize a YAML/JSON mapping into a Vec, preserving document order.
/// A plain HashMap would discard the key priority the classifier relies on.
fn ordered_tag_map<'de, D>(deserializer: D) -> Result<Vec<TagGroup>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> serde::de::Visitor<'de> for OrderedVisitor {
        type Value = Vec<TagGroup>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of tag key to a list of value specs")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut groups = Vec::new();
            while let Some((key, specs)) = map.next_entry::<String, Vec<TagValueSpec>>()? {
                groups.push(TagGroup { key, specs });
            }
            Ok(groups)
        }
    }

    deserializer.deserialize_map(OrderedVisitor)
}

// ── Compiled taxonomy ─────────────────────────────────────────────────────────

/// One query key with its accepted values, deduplicated in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryKey {
    pub key: String,
    pub values: Vec<String>,
}

/// Category name with its `key=value` tags, kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTags {
    pub name: String,
    pub tags: Vec<String>,
}

/// Immutable compiled form of the taxonomy. Built once per run, shared by
/// classification, validation and reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTaxonomy {
    query_keys: Vec<QueryKey>,
    geometry_lookup: HashMap<String, GeometryConstraint>,
    categories: Vec<CategoryTags>,
}

impl CompiledTaxonomy {
    /// Flatten category blocks into the compiled taxonomy.
    ///
    /// When two categories declare the same `(key, value)` with different
    /// constraints, the later declaration wins and a warning is logged:
    /// this is almost always a configuration authoring mistake.
    pub fn compile(categories: &[CategoryConfig]) -> Result<Self, ConfigError> {
        let mut query_keys: Vec<QueryKey> = Vec::new();
        let mut geometry_lookup = HashMap::new();
        let mut category_tags = Vec::new();

        for category in categories {
            let mut tags_in_category = Vec::new();

            for group in &category.tags {
                for spec in &group.specs {
                    if spec.value.is_empty() {
                        return Err(ConfigError::EmptyValue {
                            category: category.category.clone(),
                            key: group.key.clone(),
                        });
                    }

                    let tag = format!("{}={}", group.key, spec.value);
                    let constraint = normalize_constraint(&tag, &spec.geometry)?;

                    let idx = match query_keys.iter().position(|q| q.key == group.key) {
                        Some(i) => i,
                        None => {
                            query_keys.push(QueryKey {
                                key: group.key.clone(),
                                values: Vec::new(),
                            });
                            query_keys.len() - 1
                        }
                    };
                    if !query_keys[idx].values.contains(&spec.value) {
                        query_keys[idx].values.push(spec.value.clone());
                    }

                    if let Some(previous) = geometry_lookup.insert(tag.clone(), constraint.clone())
                    {
                        if previous != constraint {
                            log::warn!(
                                "`{tag}`: conflicting geometry constraints \
                                 ({previous:?} replaced by {constraint:?}); last declaration wins"
                            );
                        }
                    }

                    if !tags_in_category.contains(&tag) {
                        tags_in_category.push(tag);
                    }
                }
            }

            category_tags.push(CategoryTags {
                name: category.category.clone(),
                tags: tags_in_category,
            });
        }

        Ok(Self {
            query_keys,
            geometry_lookup,
            categories: category_tags,
        })
    }

    /// Query keys in declaration order — the classifier's priority order.
    pub fn query_keys(&self) -> &[QueryKey] {
        &self.query_keys
    }

    /// Geometry constraint for a `key=value` tag, if the taxonomy declares it.
    pub fn constraint(&self, tag: &str) -> Option<&GeometryConstraint> {
        self.geometry_lookup.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.geometry_lookup.contains_key(tag)
    }

    /// Category → tag list mapping, declaration order, for reporting.
    pub fn categories(&self) -> &[CategoryTags] {
        &self.categories
    }

    /// Total number of distinct `key=value` tags.
    pub fn tag_count(&self) -> usize {
        self.geometry_lookup.len()
    }
}

/// Normalize the raw string-or-list geometry form into a constraint.
fn normalize_constraint(tag: &str, spec: &GeometrySpec) -> Result<GeometryConstraint, ConfigError> {
    match spec {
        GeometrySpec::Single(token) if token == "any" => Ok(GeometryConstraint::Any),
        GeometrySpec::Single(token) => {
            Ok(GeometryConstraint::OneOf(vec![parse_kind(tag, token)?]))
        }
        GeometrySpec::Set(tokens) => {
            if tokens.is_empty() {
                return Err(ConfigError::EmptyGeometrySet {
                    tag: tag.to_string(),
                });
            }
            let mut kinds = Vec::with_capacity(tokens.len());
            for token in tokens {
                if token == "any" {
                    return Err(ConfigError::WildcardInSet {
                        tag: tag.to_string(),
                    });
                }
                let kind = parse_kind(tag, token)?;
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            Ok(GeometryConstraint::OneOf(kinds))
        }
    }
}

fn parse_kind(tag: &str, token: &str) -> Result<GeometryKind, ConfigError> {
    match token {
        "point" => Ok(GeometryKind::Point),
        "area" => Ok(GeometryKind::Area),
        "line" => Ok(GeometryKind::Line),
        _ => Err(ConfigError::UnknownGeometryKind {
            tag: tag.to_string(),
            token: token.to_string(),
        }),
    }
}
