use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog must be a JSON array of part records")]
    NotAnArray,

    #[error("Invalid integrated GPU pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid alias map: {0}")]
    InvalidAliases(String),

    #[error("Unknown part type: {0}")]
    UnknownPartKind(String),
}
