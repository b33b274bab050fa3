use thiserror::Error;

/// Errors surfaced by generation. All of them are configuration or input
/// defects; none are transient.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DelveError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("region {width}x{height} has no cells")]
    EmptyRegion { width: u32, height: u32 },

    #[error("duplicate point ({x}, {y})")]
    DuplicatePoint { x: f64, y: f64 },

    #[error("two rooms share the center ({x}, {y})")]
    DuplicateRoomCenter { x: f64, y: f64 },

    #[error("point ({x}, {y}) is not strictly inside the super-triangle")]
    PointOutsideSuperTriangle { x: f64, y: f64 },
}

pub type Result<T> = core::result::Result<T, DelveError>;
