//! Errors raised by the filtering core.

use crate::Float;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("unsupported configuration: {0}")]
    Unsupported(String),

    #[error("filter width in {axis} must be positive and finite, got {value}")]
    InvalidWidth { axis: &'static str, value: Float },

    #[error("grid vector {axis} needs at least 2 points to define a spacing, got {len}")]
    DegenerateGrid { axis: &'static str, len: usize },

    #[error("grid vector {axis} is not equidistant (point {index} deviates from spacing {spacing})")]
    NonUniformGrid {
        axis: &'static str,
        index: usize,
        spacing: Float,
    },

    #[error("radial position {0} gives no positive azimuthal arc length")]
    InvalidRadius(Float),

    #[error("shape mismatch for {what}: expected {expected:?}, got {found:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("could not build worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
