use anyhow::{Context, Result, anyhow};
use directories::UserDirs;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::clock::Clock;
use crate::coordinator::FeedbackCoordinator;
use crate::session::TracingSession;
use crate::shape::{ShapeFrame, ShapeKind};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Meta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    pub shape: ShapeKind,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedbackSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default = "default_tone_ms")]
    pub tone_ms: u64,
    #[serde(default)]
    pub announce: bool,
}

/// Raw axis range reported by the touch device.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct InputRange {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl Default for InputRange {
    fn default() -> Self {
        Self {
            x_min: 0,
            x_max: 4096,
            y_min: 0,
            y_max: 4096,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    pub meta: Meta,
    pub session: SessionSettings,
    pub surface: Surface,
    pub feedback: FeedbackSettings,
    #[serde(default)]
    pub input: InputRange,
}

fn default_true() -> bool {
    true
}

fn default_cooldown_ms() -> u64 {
    100
}

fn default_tone_ms() -> u64 {
    200
}

fn default_profile_text() -> &'static str {
    include_str!("../profiles/default.toml")
}

pub fn config_dir() -> Result<PathBuf> {
    let dirs = UserDirs::new().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(dirs.home_dir().join(".config").join("shapetrace"))
}

pub fn default_profile_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("profile.toml"))
}

impl Profile {
    pub fn bundled() -> Result<Self> {
        Self::parse(default_profile_text()).context("bundled default profile")
    }

    pub fn parse(txt: &str) -> Result<Self> {
        let profile: Profile = toml::from_str(txt)?;
        validate_profile(&profile)?;
        Ok(profile)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path)
            .map_err(|e| anyhow!("failed to read {}: {e}", path.display()))?;
        Self::parse(&txt).map_err(|e| anyhow!("failed to parse {}: {e}", path.display()))
    }

    /// Loads the user profile, writing the bundled default on first use.
    pub fn load_or_install_default() -> Result<(PathBuf, Self)> {
        let path = default_profile_path()?;
        if !path.exists() {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(&path, default_profile_text())?;
            info!("installed default profile at {}", path.display());
        }
        let profile = Self::load(&path)?;
        Ok((path, profile))
    }

    pub fn name(&self) -> &str {
        self.meta.name.as_deref().unwrap_or("unnamed")
    }

    pub fn frame_for(&self, shape: ShapeKind) -> ShapeFrame {
        ShapeFrame::fit(shape, self.surface.width, self.surface.height)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.feedback.cooldown_ms)
    }

    pub fn tone_duration(&self) -> Duration {
        Duration::from_millis(self.feedback.tone_ms)
    }

    /// Pushes the feedback section into a running coordinator.
    pub fn apply_feedback<C: Clock>(&self, coordinator: &mut FeedbackCoordinator<C>) {
        coordinator.set_cooldown(self.cooldown());
        coordinator.set_tone_duration(self.tone_duration());
        coordinator.set_enabled(self.feedback.enabled);
    }

    /// Applies the whole `[feedback]` section, announcements included.
    pub fn apply_to_session<C: Clock>(&self, session: &mut TracingSession<C>) {
        self.apply_feedback(session.feedback_mut());
        session.set_announcements(self.feedback.announce);
    }
}

fn validate_profile(p: &Profile) -> Result<()> {
    let s = &p.surface;
    if !(s.width > 0.0 && s.height > 0.0) {
        return Err(anyhow!("surface width and height must be positive"));
    }
    if p.feedback.tone_ms == 0 {
        return Err(anyhow!("feedback.tone_ms must be a positive duration"));
    }
    let i = &p.input;
    if i.x_max <= i.x_min || i.y_max <= i.y_min {
        return Err(anyhow!("input ranges must satisfy min < max"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::NullBackend;
    use crate::backends::recording::{Call, Recorder};
    use crate::clock::ManualClock;
    use crate::geometry::Point;

    const MINIMAL: &str = r#"
        [meta]
        name = "small"

        [session]
        shape = "cube"

        [surface]
        width = 300.0
        height = 200.0

        [feedback]
    "#;

    #[test]
    fn bundled_profile_parses() {
        let p = Profile::bundled().unwrap();
        assert_eq!(p.name(), "default");
        assert_eq!(p.session.shape, ShapeKind::Circle);
        assert_eq!(p.cooldown(), Duration::from_millis(100));
        assert_eq!(p.tone_duration(), Duration::from_millis(200));
        assert!(p.feedback.announce);
    }

    #[test]
    fn feedback_defaults_fill_in() {
        let p = Profile::parse(MINIMAL).unwrap();
        assert_eq!(p.session.shape, ShapeKind::Cube3D);
        assert!(p.feedback.enabled);
        assert_eq!(p.feedback.cooldown_ms, 100);
        assert!(!p.feedback.announce);
        assert_eq!(p.input.x_max, 4096);
        let frame = p.frame_for(ShapeKind::Cube3D);
        assert!((frame.size - 180.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_values() {
        let zero_surface = MINIMAL.replace("width = 300.0", "width = 0.0");
        assert!(Profile::parse(&zero_surface).is_err());

        let zero_tone = MINIMAL.replace("[feedback]", "[feedback]\ntone_ms = 0");
        assert!(Profile::parse(&zero_tone).is_err());

        let inverted = format!("{MINIMAL}\n[input]\nx_min = 10\nx_max = 5\ny_min = 0\ny_max = 1\n");
        assert!(Profile::parse(&inverted).is_err());

        let bad_shape = MINIMAL.replace("\"cube\"", "\"hexagon\"");
        assert!(Profile::parse(&bad_shape).is_err());
    }

    #[test]
    fn apply_feedback_updates_coordinator() {
        let txt = MINIMAL.replace("[feedback]", "[feedback]\nenabled = false\ncooldown_ms = 40");
        let p = Profile::parse(&txt).unwrap();
        let mut c = FeedbackCoordinator::new(
            ManualClock::new(),
            Box::new(NullBackend),
            Box::new(NullBackend),
            Box::new(NullBackend),
        );
        p.apply_feedback(&mut c);
        assert!(!c.is_enabled());
        assert_eq!(c.cooldown(), Duration::from_millis(40));
    }

    #[test]
    fn reloaded_profile_can_silence_announcements() {
        let rec = Recorder::default();
        let fb = FeedbackCoordinator::new(
            ManualClock::new(),
            Box::new(rec.clone()),
            Box::new(rec.clone()),
            Box::new(rec.clone()),
        );
        let loud = Profile::parse(&MINIMAL.replace("[feedback]", "[feedback]\nannounce = true")).unwrap();
        let mut session = TracingSession::fitted(ShapeKind::Square, 300.0, 200.0, fb);
        loud.apply_to_session(&mut session);
        assert!(session.announcements());

        let quiet = Profile::parse(MINIMAL).unwrap();
        quiet.apply_to_session(&mut session);
        assert!(!session.announcements());

        rec.clear();
        let frame = quiet.frame_for(ShapeKind::Square);
        let right_edge = Point::new(frame.center.x + frame.half_size(), frame.center.y);
        assert!(session.handle_move(right_edge).on_path);
        assert!(!rec.calls().iter().any(|c| matches!(c, Call::Announce(_))));
    }
}
