use thiserror::Error;

use crate::models::PhotoId;

/// Failure reported by a [`PhotoSource`](crate::source::PhotoSource).
///
/// The collaborator's error is carried as-is so callers see exactly what the
/// source produced.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Source(#[from] anyhow::Error),
    #[error("photo listing task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("container width must be positive, got {0}")]
    InvalidContainerWidth(f32),
    #[error("photo {id} has invalid geometry {width}x{height}")]
    InvalidGeometry { id: PhotoId, width: u32, height: u32 },
}
