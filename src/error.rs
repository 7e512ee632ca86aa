use thiserror::Error;

/// Failure reported by a feedback backend. The coordinator logs these and
/// carries on; they never reach the tracking loop.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0} backend unavailable")]
    Unavailable(&'static str),
    #[error("{channel} backend failed: {reason}")]
    Failed { channel: &'static str, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown shape '{0}' (expected circle, square or cube3d)")]
pub struct ParseShapeError(pub String);
