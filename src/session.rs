//! One tracing session: a path tracker feeding a feedback coordinator.

use log::{debug, info};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::coordinator::{DispatchOutcome, FeedbackCoordinator};
use crate::feedback::FeedbackCommand;
use crate::geometry::{self, Point};
use crate::shape::{ShapeFrame, ShapeKind};
use crate::tracker::{PathTracker, TrackingState};

/// What happened for a single pointer sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStep {
    pub position: Point,
    pub distance: Option<f64>,
    pub on_path: bool,
    pub at_vertex: bool,
    pub commands: Vec<FeedbackCommand>,
    /// `None` when there was nothing to send.
    #[serde(skip)]
    pub outcome: Option<DispatchOutcome>,
}

impl SessionStep {
    pub fn dispatched(&self) -> bool {
        matches!(self.outcome, Some(DispatchOutcome::Sent(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSummary {
    pub shape: ShapeKind,
    pub samples: usize,
    pub on_path_samples: usize,
    pub path_length: f64,
    pub simplified_points: usize,
}

pub struct TracingSession<C: Clock = SystemClock> {
    tracker: PathTracker,
    feedback: FeedbackCoordinator<C>,
    announce: bool,
    last_on_path: Option<bool>,
    on_path_samples: usize,
    /// Surface the frame was fitted to; `None` for an explicitly placed frame.
    surface: Option<(f64, f64)>,
}

impl<C: Clock> TracingSession<C> {
    pub fn new(shape: ShapeKind, frame: ShapeFrame, mut feedback: FeedbackCoordinator<C>) -> Self {
        let mut tracker = PathTracker::new(shape);
        tracker.set_frame(frame.center, frame.size);
        tracker.setup_shape(shape);
        feedback.prepare_for_tracing();
        info!(
            "session: tracing {shape} at ({:.1}, {:.1}) size {:.1}",
            frame.center.x, frame.center.y, frame.size
        );
        Self {
            tracker,
            feedback,
            announce: false,
            last_on_path: None,
            on_path_samples: 0,
            surface: None,
        }
    }

    /// Starts a session with `shape` fitted to a `width` x `height` surface.
    /// Later shape changes are re-fitted to the same surface.
    pub fn fitted(shape: ShapeKind, width: f64, height: f64, feedback: FeedbackCoordinator<C>) -> Self {
        let mut session = Self::new(shape, ShapeFrame::fit(shape, width, height), feedback);
        session.surface = Some((width, height));
        session
    }

    /// Post spoken status on every on/off-path change.
    pub fn with_announcements(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }

    pub fn set_announcements(&mut self, announce: bool) {
        self.announce = announce;
    }

    pub fn announcements(&self) -> bool {
        self.announce
    }

    pub fn state(&self) -> &TrackingState {
        self.tracker.state()
    }

    pub fn tracker_mut(&mut self) -> &mut PathTracker {
        &mut self.tracker
    }

    pub fn feedback_mut(&mut self) -> &mut FeedbackCoordinator<C> {
        &mut self.feedback
    }

    pub fn handle_move(&mut self, p: Point) -> SessionStep {
        let distance = self.tracker.distance_to_path(p);
        let state = self.tracker.update_position(p);
        let (on_path, at_vertex) = (state.is_on_path, state.is_at_vertex);
        let commands = self.feedback.decide(state);

        if on_path {
            self.on_path_samples += 1;
        }

        // off-path batches are empty; dispatching them would only burn the cooldown
        let outcome = if commands.is_empty() {
            None
        } else {
            Some(self.feedback.dispatch(&commands))
        };

        if self.last_on_path != Some(on_path) {
            if self.announce {
                self.feedback.announce_path_status(on_path, at_vertex);
            }
            self.last_on_path = Some(on_path);
        }

        SessionStep {
            position: p,
            distance,
            on_path,
            at_vertex,
            commands,
            outcome,
        }
    }

    pub fn end_gesture(&mut self) {
        debug!(
            "session: gesture ended after {} samples",
            self.tracker.state().traced_points.len()
        );
    }

    /// Clears the trace and silences any feedback still playing.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.last_on_path = None;
        self.on_path_samples = 0;
        self.feedback.stop_all();
        debug!("session: trace reset");
    }

    pub fn change_shape(&mut self, shape: ShapeKind) {
        self.tracker.setup_shape(shape);
        if let Some((width, height)) = self.surface {
            let frame = ShapeFrame::fit(shape, width, height);
            self.tracker.set_frame(frame.center, frame.size);
        }
        self.last_on_path = None;
        self.on_path_samples = 0;
        info!("session: switched to {shape}");
    }

    /// Re-fits the shape after the tracing surface changed size.
    pub fn resize(&mut self, width: f64, height: f64) {
        let frame = ShapeFrame::fit(self.tracker.shape(), width, height);
        self.tracker.set_frame(frame.center, frame.size);
        self.surface = Some((width, height));
    }

    pub fn summary(&self, simplify_tolerance: f64) -> TraceSummary {
        let points = &self.tracker.state().traced_points;
        TraceSummary {
            shape: self.tracker.shape(),
            samples: points.len(),
            on_path_samples: self.on_path_samples,
            path_length: geometry::path_length(points),
            simplified_points: geometry::simplify_path(points, simplify_tolerance).len(),
        }
    }

    pub fn finish(mut self) -> TrackingState {
        self.feedback.cleanup();
        self.tracker.take_state()
    }
}
