//! Touch device discovery and raw-axis mapping (evdev 0.13.2 compatible)

use evdev::{AbsoluteAxisCode, Device, EventType};

use shapetrace::config::{InputRange, Surface};
use shapetrace::geometry::Point;

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
    pub multitouch: bool,
}

/// Absolute-pointer devices under /dev/input: multitouch panels plus
/// single-touch screens and tablets reporting ABS_X/ABS_Y.
pub fn discover_touch_devices() -> Vec<DeviceInfo> {
    let mut out = vec![];
    if let Ok(rd) = std::fs::read_dir("/dev/input") {
        for e in rd.flatten() {
            let p = e.path();
            if !p
                .file_name()
                .and_then(|s| s.to_str())
                .map(|s| s.starts_with("event"))
                .unwrap_or(false)
            {
                continue;
            }
            let Ok(dev) = Device::open(&p) else {
                continue;
            };
            if !dev.supported_events().contains(EventType::ABSOLUTE) {
                continue;
            }
            let Some(axes) = dev.supported_absolute_axes() else {
                continue;
            };
            let multitouch = axes.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
                && axes.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y);
            let single = axes.contains(AbsoluteAxisCode::ABS_X)
                && axes.contains(AbsoluteAxisCode::ABS_Y);
            if multitouch || single {
                out.push(DeviceInfo {
                    path: p.display().to_string(),
                    name: dev.name().unwrap_or("unknown").to_string(),
                    multitouch,
                });
            }
        }
    }
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

/// Maps raw device coordinates onto the tracing surface.
#[derive(Debug, Clone, Copy)]
pub struct AxisMapper {
    range: InputRange,
    width: f64,
    height: f64,
}

impl AxisMapper {
    pub fn new(range: InputRange, surface: &Surface) -> Self {
        Self {
            range,
            width: surface.width,
            height: surface.height,
        }
    }

    pub fn x(&self, raw: i32) -> f64 {
        normalize(raw, self.range.x_min, self.range.x_max) * self.width
    }

    pub fn y(&self, raw: i32) -> f64 {
        normalize(raw, self.range.y_min, self.range.y_max) * self.height
    }
}

/// Position of `raw` within `min..=max` as 0..=1. Works in f64 so full-width
/// i32 ranges cannot overflow; an empty range spans one unit.
fn normalize(raw: i32, min: i32, max: i32) -> f64 {
    let span = (f64::from(max) - f64::from(min)).max(1.0);
    ((f64::from(raw) - f64::from(min)) / span).clamp(0.0, 1.0)
}

/// Latest coordinates of the tracked contact, assembled across events
/// until the next SYN_REPORT.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactState {
    x: Option<f64>,
    y: Option<f64>,
    pub touching: bool,
    dirty: bool,
}

impl ContactState {
    pub fn set_x(&mut self, x: f64) {
        self.x = Some(x);
        self.dirty = true;
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = Some(y);
        self.dirty = true;
    }

    pub fn begin(&mut self) {
        self.touching = true;
    }

    /// Lifts the contact; returns whether a gesture was in progress.
    pub fn end(&mut self) -> bool {
        let was = self.touching;
        self.touching = false;
        self.dirty = false;
        was
    }

    /// Point to report on SYN_REPORT, once both axes are known and moved.
    pub fn take_sample(&mut self) -> Option<Point> {
        if !self.touching || !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(Point::new(self.x?, self.y?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Surface {
        Surface {
            width: 400.0,
            height: 200.0,
        }
    }

    #[test]
    fn maps_and_clamps_raw_axes() {
        let m = AxisMapper::new(InputRange::default(), &surface());
        assert_eq!(m.x(0), 0.0);
        assert_eq!(m.x(2048), 200.0);
        assert_eq!(m.x(9000), 400.0);
        assert_eq!(m.y(-10), 0.0);
        assert_eq!(m.y(1024), 50.0);
    }

    #[test]
    fn degenerate_range_does_not_divide_by_zero() {
        let range = InputRange {
            x_min: 5,
            x_max: 5,
            y_min: 0,
            y_max: 0,
        };
        let m = AxisMapper::new(range, &surface());
        assert!(m.x(6).is_finite());
        assert!(m.y(1).is_finite());
    }

    #[test]
    fn full_width_range_does_not_overflow() {
        let range = InputRange {
            x_min: i32::MIN,
            x_max: i32::MAX,
            y_min: i32::MIN,
            y_max: i32::MAX,
        };
        let m = AxisMapper::new(range, &surface());
        assert!((m.x(0) - 200.0).abs() < 1e-6);
        assert_eq!(m.x(i32::MIN), 0.0);
        assert_eq!(m.x(i32::MAX), 400.0);
        assert_eq!(m.y(i32::MAX), 200.0);
    }

    #[test]
    fn contact_reports_once_per_frame() {
        let mut c = ContactState::default();
        c.set_x(10.0);
        c.set_y(20.0);
        // not touching yet
        assert_eq!(c.take_sample(), None);

        c.begin();
        c.set_x(11.0);
        assert_eq!(c.take_sample(), Some(Point::new(11.0, 20.0)));
        assert_eq!(c.take_sample(), None);

        assert!(c.end());
        assert!(!c.end());
    }
}
