//! Pointer path tracking against a fixed catalog of outlines (circle, square,
//! isometric cube) with debounced haptic, audio and accessibility feedback.

pub mod backends;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod feedback;
pub mod geometry;
pub mod session;
pub mod shape;
pub mod tracker;

pub use coordinator::{DispatchOutcome, FeedbackCoordinator};
pub use feedback::{FeedbackCommand, HapticIntensity};
pub use geometry::Point;
pub use session::TracingSession;
pub use shape::{ShapeFrame, ShapeKind};
pub use tracker::{PathTracker, TrackingState};
