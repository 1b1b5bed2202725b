use thiserror::Error;

/// Taxonomy configuration errors. All are fatal: an extraction run cannot
/// proceed without a valid compiled taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("category `{category}`, key `{key}`: tag value spec has an empty value")]
    EmptyValue { category: String, key: String },

    #[error("`{tag}`: geometry list is empty; declare point/area/line members or the single token `any`")]
    EmptyGeometrySet { tag: String },

    #[error("`{tag}`: unknown geometry kind `{token}` (expected point, area, line or any)")]
    UnknownGeometryKind { tag: String, token: String },

    #[error("`{tag}`: `any` is a wildcard and cannot appear inside a geometry list")]
    WildcardInSet { tag: String },
}
