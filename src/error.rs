use thiserror::Error;

use crate::model::ModelState;

/// Top-level error type for collision models.
#[derive(Debug, Error)]
pub enum CollisionError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Invalid shape parameters, rejected before the model is touched.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("parameter {0} is not finite")]
    NonFinite(&'static str),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Calls made in the wrong phase of the model life cycle.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("shapes can only be added while building, model is {0:?}")]
    NotBuilding(ModelState),

    #[error("model must be built first, model is {0:?}")]
    NotBuilt(ModelState),

    #[error("position was not synchronized since the last build")]
    NotSynced,

    #[error("no contactable is associated with this model")]
    ContactableMissing,
}

/// Invalid family group or mask arguments.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("family {0} is out of range [0, 15]")]
    FamilyOutOfRange(i32),

    #[error("family group {0:#06x} must have exactly one bit set")]
    GroupNotSingleBit(u16),
}

/// Errors raised while reading a convex hull batch file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read hull data: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Errors related to tolerance configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Convenience type alias for results using [`CollisionError`].
pub type Result<T> = std::result::Result<T, CollisionError>;
