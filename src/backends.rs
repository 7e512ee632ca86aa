//! Output ports for feedback, plus the stand-in backends the binary uses.
//!
//! Real vibration motors, tone engines and screen readers live outside this
//! crate; anything implementing these traits can be plugged into the
//! coordinator.

use std::time::Duration;

use log::info;

use crate::error::BackendError;
use crate::feedback::HapticIntensity;

pub trait HapticBackend {
    fn prepare(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
    fn emit(&mut self, intensity: HapticIntensity) -> Result<(), BackendError>;
}

pub trait AudioBackend {
    fn prepare(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
    fn play_tone(&mut self, frequency_hz: f64, duration: Duration) -> Result<(), BackendError>;
    fn stop_all(&mut self) {}
    fn release(&mut self) {}
}

pub trait Announcer {
    fn announce(&mut self, message: &str) -> Result<(), BackendError>;
}

/// Writes every feedback event to the log. Used by the CLI where no real
/// hardware is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogBackend;

impl HapticBackend for LogBackend {
    fn emit(&mut self, intensity: HapticIntensity) -> Result<(), BackendError> {
        info!("haptic: {intensity:?} ({:.1})", intensity.value());
        Ok(())
    }
}

impl AudioBackend for LogBackend {
    fn play_tone(&mut self, frequency_hz: f64, duration: Duration) -> Result<(), BackendError> {
        info!("audio: {frequency_hz:.0} Hz for {} ms", duration.as_millis());
        Ok(())
    }

    fn stop_all(&mut self) {
        info!("audio: stop all");
    }
}

impl Announcer for LogBackend {
    fn announce(&mut self, message: &str) -> Result<(), BackendError> {
        info!("announce: {message}");
        Ok(())
    }
}

/// Swallows everything; for hosts that only want the JSON stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl HapticBackend for NullBackend {
    fn emit(&mut self, _intensity: HapticIntensity) -> Result<(), BackendError> {
        Ok(())
    }
}

impl AudioBackend for NullBackend {
    fn play_tone(&mut self, _frequency_hz: f64, _duration: Duration) -> Result<(), BackendError> {
        Ok(())
    }
}

impl Announcer for NullBackend {
    fn announce(&mut self, _message: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod recording {
    //! Test double that records every backend call in a shared log.

    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::{Announcer, AudioBackend, HapticBackend};
    use crate::error::BackendError;
    use crate::feedback::HapticIntensity;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        PrepareHaptic,
        PrepareAudio,
        Haptic(HapticIntensity),
        Tone(f64, Duration),
        StopAll,
        Release,
        Announce(String),
    }

    #[derive(Debug, Clone, Default)]
    pub struct Recorder {
        pub calls: Rc<RefCell<Vec<Call>>>,
        pub fail_haptic: bool,
        pub fail_audio: bool,
    }

    impl Recorder {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        pub fn clear(&self) {
            self.calls.borrow_mut().clear();
        }

        fn push(&self, c: Call) {
            self.calls.borrow_mut().push(c);
        }
    }

    impl HapticBackend for Recorder {
        fn prepare(&mut self) -> Result<(), BackendError> {
            self.push(Call::PrepareHaptic);
            Ok(())
        }

        fn emit(&mut self, intensity: HapticIntensity) -> Result<(), BackendError> {
            if self.fail_haptic {
                return Err(BackendError::Unavailable("haptic"));
            }
            self.push(Call::Haptic(intensity));
            Ok(())
        }
    }

    impl AudioBackend for Recorder {
        fn prepare(&mut self) -> Result<(), BackendError> {
            if self.fail_audio {
                return Err(BackendError::Failed {
                    channel: "audio",
                    reason: "no output device".into(),
                });
            }
            self.push(Call::PrepareAudio);
            Ok(())
        }

        fn play_tone(&mut self, frequency_hz: f64, duration: Duration) -> Result<(), BackendError> {
            if self.fail_audio {
                return Err(BackendError::Unavailable("audio"));
            }
            self.push(Call::Tone(frequency_hz, duration));
            Ok(())
        }

        fn stop_all(&mut self) {
            self.push(Call::StopAll);
        }

        fn release(&mut self) {
            self.push(Call::Release);
        }
    }

    impl Announcer for Recorder {
        fn announce(&mut self, message: &str) -> Result<(), BackendError> {
            self.push(Call::Announce(message.to_string()));
            Ok(())
        }
    }
}
