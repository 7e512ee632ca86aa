//! Debounced fan-out of feedback commands to the haptic, audio and
//! accessibility backends.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::backends::{Announcer, AudioBackend, HapticBackend, LogBackend};
use crate::clock::{Clock, SystemClock};
use crate::feedback::{self, FeedbackCommand};
use crate::tracker::TrackingState;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(100);
pub const DEFAULT_TONE_DURATION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The batch went out; carries the number of commands forwarded.
    Sent(usize),
    Disabled,
    CoolingDown,
}

pub struct FeedbackCoordinator<C: Clock = SystemClock> {
    enabled: bool,
    cooldown: Duration,
    tone_duration: Duration,
    last_dispatch: Option<Instant>,
    clock: C,
    haptic: Box<dyn HapticBackend>,
    audio: Box<dyn AudioBackend>,
    announcer: Box<dyn Announcer>,
}

impl FeedbackCoordinator<SystemClock> {
    /// Coordinator on the wall clock with every channel going to the log.
    pub fn logging() -> Self {
        Self::new(
            SystemClock,
            Box::new(LogBackend),
            Box::new(LogBackend),
            Box::new(LogBackend),
        )
    }
}

impl<C: Clock> FeedbackCoordinator<C> {
    pub fn new(
        clock: C,
        haptic: Box<dyn HapticBackend>,
        audio: Box<dyn AudioBackend>,
        announcer: Box<dyn Announcer>,
    ) -> Self {
        Self {
            enabled: true,
            cooldown: DEFAULT_COOLDOWN,
            tone_duration: DEFAULT_TONE_DURATION,
            last_dispatch: None,
            clock,
            haptic,
            audio,
            announcer,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn set_cooldown(&mut self, cooldown: Duration) {
        self.cooldown = cooldown;
    }

    pub fn set_tone_duration(&mut self, duration: Duration) {
        self.tone_duration = duration;
    }

    pub fn prepare_for_tracing(&mut self) {
        if let Err(e) = self.audio.prepare() {
            warn!("feedback: audio prepare failed: {e}");
        }
        if let Err(e) = self.haptic.prepare() {
            warn!("feedback: haptic prepare failed: {e}");
        }
    }

    pub fn decide(&self, state: &TrackingState) -> Vec<FeedbackCommand> {
        feedback::decide(state)
    }

    /// Forwards `commands` unless feedback is disabled or the previous batch
    /// went out less than one cooldown ago. The whole batch counts as one
    /// dispatch; suppressed batches are dropped.
    pub fn dispatch(&mut self, commands: &[FeedbackCommand]) -> DispatchOutcome {
        let now = self.clock.now();
        if let Some(last) = self.last_dispatch {
            if now.saturating_duration_since(last) < self.cooldown {
                return DispatchOutcome::CoolingDown;
            }
        }
        if !self.enabled {
            return DispatchOutcome::Disabled;
        }

        for cmd in commands {
            let res = match *cmd {
                FeedbackCommand::Haptic { intensity } => self.haptic.emit(intensity),
                FeedbackCommand::Audio { frequency_hz } => {
                    self.audio.play_tone(frequency_hz, self.tone_duration)
                }
                FeedbackCommand::Visual | FeedbackCommand::None => Ok(()),
            };
            if let Err(e) = res {
                warn!("feedback: {e}");
            }
        }

        self.last_dispatch = Some(now);
        DispatchOutcome::Sent(commands.len())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        info!("feedback {}", if enabled { "enabled" } else { "disabled" });
        if !enabled {
            self.stop_all();
        }
    }

    pub fn toggle_enabled(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    pub fn stop_all(&mut self) {
        self.audio.stop_all();
    }

    pub fn cleanup(&mut self) {
        debug!("feedback: cleanup");
        self.stop_all();
        self.audio.release();
    }

    pub fn announce_path_status(&mut self, on_path: bool, at_vertex: bool) {
        let message = match (on_path, at_vertex) {
            (true, true) => "Good! You're at a corner point",
            (true, false) => "Good! You're on the correct path",
            (false, _) => "Move back to the dotted line",
        };
        if let Err(e) = self.announcer.announce(message) {
            warn!("feedback: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::recording::{Call, Recorder};
    use crate::clock::ManualClock;
    use crate::feedback::HapticIntensity;

    fn setup(rec: &Recorder) -> (FeedbackCoordinator<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let c = FeedbackCoordinator::new(
            clock.clone(),
            Box::new(rec.clone()),
            Box::new(rec.clone()),
            Box::new(rec.clone()),
        );
        (c, clock)
    }

    fn on_path(at_vertex: bool) -> TrackingState {
        TrackingState {
            is_on_path: true,
            is_at_vertex: at_vertex,
            ..TrackingState::default()
        }
    }

    #[test]
    fn first_dispatch_forwards_every_channel() {
        let rec = Recorder::default();
        let (mut c, _clock) = setup(&rec);
        let cmds = c.decide(&on_path(true));
        assert_eq!(c.dispatch(&cmds), DispatchOutcome::Sent(3));
        assert_eq!(
            rec.calls(),
            vec![
                Call::Haptic(HapticIntensity::Heavy),
                Call::Tone(800.0, DEFAULT_TONE_DURATION),
            ]
        );
    }

    #[test]
    fn cooldown_applies_per_batch() {
        let rec = Recorder::default();
        let (mut c, clock) = setup(&rec);
        let cmds = c.decide(&on_path(false));

        assert_eq!(c.dispatch(&cmds), DispatchOutcome::Sent(3));
        clock.advance(Duration::from_millis(50));
        assert_eq!(c.dispatch(&cmds), DispatchOutcome::CoolingDown);
        clock.advance(Duration::from_millis(50));
        assert_eq!(c.dispatch(&cmds), DispatchOutcome::Sent(3));
        // two batches of (haptic, tone)
        assert_eq!(rec.calls().len(), 4);
    }

    #[test]
    fn suppressed_batches_do_not_extend_cooldown() {
        let rec = Recorder::default();
        let (mut c, clock) = setup(&rec);
        let cmds = c.decide(&on_path(false));
        c.dispatch(&cmds);
        for _ in 0..4 {
            clock.advance(Duration::from_millis(20));
            assert_eq!(c.dispatch(&cmds), DispatchOutcome::CoolingDown);
        }
        clock.advance(Duration::from_millis(20));
        assert_eq!(c.dispatch(&cmds), DispatchOutcome::Sent(3));
    }

    #[test]
    fn disabled_suppresses_backends_but_decide_still_works() {
        let rec = Recorder::default();
        let (mut c, _clock) = setup(&rec);
        assert!(!c.toggle_enabled());
        assert_eq!(rec.calls(), vec![Call::StopAll]);
        rec.clear();

        let cmds = c.decide(&on_path(false));
        assert_eq!(cmds.len(), 3);
        assert_eq!(c.dispatch(&cmds), DispatchOutcome::Disabled);
        assert!(rec.calls().is_empty());
    }

    #[test]
    fn toggling_twice_restores_state() {
        let rec = Recorder::default();
        let (mut c, _clock) = setup(&rec);
        let before = c.is_enabled();
        c.toggle_enabled();
        c.toggle_enabled();
        assert_eq!(c.is_enabled(), before);
        let cmds = c.decide(&on_path(false));
        assert_eq!(c.dispatch(&cmds), DispatchOutcome::Sent(3));
    }

    #[test]
    fn backend_failure_is_absorbed() {
        let rec = Recorder {
            fail_haptic: true,
            ..Recorder::default()
        };
        let (mut c, _clock) = setup(&rec);
        let cmds = c.decide(&on_path(false));
        assert_eq!(c.dispatch(&cmds), DispatchOutcome::Sent(3));
        // the tone still goes out after the haptic failure
        assert_eq!(rec.calls(), vec![Call::Tone(440.0, DEFAULT_TONE_DURATION)]);
    }

    #[test]
    fn prepare_and_cleanup_reach_backends() {
        let rec = Recorder {
            fail_audio: true,
            ..Recorder::default()
        };
        let (mut c, _clock) = setup(&rec);
        c.prepare_for_tracing();
        c.cleanup();
        assert_eq!(rec.calls(), vec![Call::PrepareHaptic, Call::StopAll, Call::Release]);
    }

    #[test]
    fn configured_cooldown_and_tone_length() {
        let rec = Recorder::default();
        let (mut c, clock) = setup(&rec);
        c.set_cooldown(Duration::from_millis(250));
        c.set_tone_duration(Duration::from_millis(80));
        let cmds = c.decide(&on_path(false));
        c.dispatch(&cmds);
        clock.advance(Duration::from_millis(200));
        assert_eq!(c.dispatch(&cmds), DispatchOutcome::CoolingDown);
        assert!(rec.calls().contains(&Call::Tone(440.0, Duration::from_millis(80))));
    }

    #[test]
    fn announcements_follow_path_status() {
        let rec = Recorder::default();
        let (mut c, _clock) = setup(&rec);
        c.announce_path_status(true, false);
        c.announce_path_status(true, true);
        c.announce_path_status(false, false);
        assert_eq!(
            rec.calls(),
            vec![
                Call::Announce("Good! You're on the correct path".into()),
                Call::Announce("Good! You're at a corner point".into()),
                Call::Announce("Move back to the dotted line".into()),
            ]
        );
    }
}
