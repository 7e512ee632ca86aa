//! Per-session path tracking: classifies each pointer sample against the
//! active shape outline and accumulates the trace.

use std::fmt;

use log::{debug, warn};
use serde::Serialize;

use crate::geometry::Point;
use crate::shape::{ShapeFrame, ShapeKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackingState {
    pub current_position: Point,
    pub is_on_path: bool,
    pub is_at_vertex: bool, // only ever set together with is_on_path
    /// Reserved for an external progress metric; the tracker never writes it.
    pub completion_percentage: f64,
    pub traced_points: Vec<Point>,
}

pub type Observer = Box<dyn FnMut(&TrackingState)>;

pub struct PathTracker {
    shape: ShapeKind,
    frame: Option<ShapeFrame>,
    state: TrackingState,
    observers: Vec<Observer>,
}

impl fmt::Debug for PathTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathTracker")
            .field("shape", &self.shape)
            .field("frame", &self.frame)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl PathTracker {
    /// A tracker for `shape` with no frame yet. Until [`set_frame`] is called
    /// every sample is recorded but classified off path.
    ///
    /// [`set_frame`]: PathTracker::set_frame
    pub fn new(shape: ShapeKind) -> Self {
        Self {
            shape,
            frame: None,
            state: TrackingState::default(),
            observers: Vec::new(),
        }
    }

    pub fn with_frame(shape: ShapeKind, frame: ShapeFrame) -> Self {
        let mut t = Self::new(shape);
        t.set_frame(frame.center, frame.size);
        t
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub fn frame(&self) -> Option<ShapeFrame> {
        self.frame
    }

    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    /// Records the shape placement. A non-positive size is accepted but makes
    /// the geometry meaningless.
    pub fn set_frame(&mut self, center: Point, size: f64) {
        if size <= 0.0 {
            warn!("tracker: non-positive frame size {size}; distances will be degenerate");
        }
        debug!("tracker: frame center=({}, {}) size={size}", center.x, center.y);
        self.frame = Some(ShapeFrame::new(center, size));
    }

    pub fn setup_shape(&mut self, shape: ShapeKind) {
        self.shape = shape;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.state = TrackingState::default();
    }

    /// Hands the accumulated state to the caller, leaving an empty one behind.
    pub fn take_state(&mut self) -> TrackingState {
        std::mem::take(&mut self.state)
    }

    /// Registers a callback run after every [`update_position`].
    ///
    /// [`update_position`]: PathTracker::update_position
    pub fn subscribe(&mut self, observer: impl FnMut(&TrackingState) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Distance from `p` to the current outline, `None` before a frame is set.
    pub fn distance_to_path(&self, p: Point) -> Option<f64> {
        self.frame.map(|f| f.distance_to_outline(self.shape, p))
    }

    /// Classifies `p` as `(is_on_path, is_at_vertex)` without touching state.
    pub fn classify(&self, p: Point) -> (bool, bool) {
        let Some(frame) = self.frame else {
            return (false, false);
        };
        let on_path = frame.distance_to_outline(self.shape, p) <= self.shape.tolerance();
        let at_vertex = on_path && frame.is_near_vertex(self.shape, p);
        (on_path, at_vertex)
    }

    pub fn update_position(&mut self, p: Point) -> &TrackingState {
        let (on_path, at_vertex) = self.classify(p);

        let s = &mut self.state;
        s.current_position = p;
        s.is_on_path = on_path;
        s.is_at_vertex = at_vertex;
        s.traced_points.push(p);

        for observer in self.observers.iter_mut() {
            observer(&self.state);
        }
        &self.state
    }
}
