use buildwise_catalog::CatalogError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OptimizerError>;

#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Budget must be greater than 0 (got {0})")]
    InvalidBudget(f64),

    /// A strategy name outside the configured set. This is a wiring bug, never
    /// a user input problem, so it is not defaulted away.
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Invalid tuning profile: {0}")]
    InvalidProfile(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Strategy task failed: {0}")]
    Join(String),
}
