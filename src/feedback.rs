//! Feedback commands and the policy mapping tracking state onto them.

use serde::Serialize;

use crate::tracker::TrackingState;

pub const PATH_TONE_HZ: f64 = 440.0;
pub const VERTEX_TONE_HZ: f64 = 800.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticIntensity {
    Light,
    Medium,
    Heavy,
}

impl HapticIntensity {
    /// Motor strength in `0.0..=1.0`.
    pub fn value(self) -> f32 {
        match self {
            HapticIntensity::Light => 0.3,
            HapticIntensity::Medium => 0.7,
            HapticIntensity::Heavy => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "channel", rename_all = "lowercase")]
pub enum FeedbackCommand {
    Haptic { intensity: HapticIntensity },
    Audio { frequency_hz: f64 },
    Visual,
    None,
}

/// Feedback for one tracking sample. Off the path nothing is emitted;
/// vertices get a heavier pulse and a higher tone than plain outline.
pub fn decide(state: &TrackingState) -> Vec<FeedbackCommand> {
    if !state.is_on_path {
        return Vec::new();
    }

    let (intensity, frequency_hz) = if state.is_at_vertex {
        (HapticIntensity::Heavy, VERTEX_TONE_HZ)
    } else {
        (HapticIntensity::Medium, PATH_TONE_HZ)
    };

    vec![
        FeedbackCommand::Haptic { intensity },
        FeedbackCommand::Audio { frequency_hz },
        FeedbackCommand::Visual,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(on_path: bool, at_vertex: bool) -> TrackingState {
        TrackingState {
            is_on_path: on_path,
            is_at_vertex: at_vertex,
            ..TrackingState::default()
        }
    }

    fn haptic(cmds: &[FeedbackCommand]) -> Option<HapticIntensity> {
        cmds.iter().find_map(|c| match c {
            FeedbackCommand::Haptic { intensity } => Some(*intensity),
            _ => None,
        })
    }

    fn tone(cmds: &[FeedbackCommand]) -> Option<f64> {
        cmds.iter().find_map(|c| match c {
            FeedbackCommand::Audio { frequency_hz } => Some(*frequency_hz),
            _ => None,
        })
    }

    #[test]
    fn intensity_scale_is_ordered() {
        assert!(HapticIntensity::Light < HapticIntensity::Medium);
        assert!(HapticIntensity::Medium < HapticIntensity::Heavy);
        assert_eq!(HapticIntensity::Light.value(), 0.3);
        assert_eq!(HapticIntensity::Medium.value(), 0.7);
        assert_eq!(HapticIntensity::Heavy.value(), 1.0);
    }

    #[test]
    fn off_path_is_silent() {
        assert!(decide(&state(false, false)).is_empty());
    }

    #[test]
    fn on_path_emits_all_three_channels() {
        let cmds = decide(&state(true, false));
        assert_eq!(
            cmds,
            vec![
                FeedbackCommand::Haptic { intensity: HapticIntensity::Medium },
                FeedbackCommand::Audio { frequency_hz: 440.0 },
                FeedbackCommand::Visual,
            ]
        );
    }

    #[test]
    fn vertex_feedback_is_stronger() {
        let plain = decide(&state(true, false));
        let vertex = decide(&state(true, true));
        assert_eq!(plain.len(), vertex.len());
        assert!(haptic(&vertex) > haptic(&plain));
        assert!(tone(&vertex) > tone(&plain));
        assert_eq!(tone(&vertex), Some(800.0));
    }

    #[test]
    fn decide_is_repeatable() {
        let s = state(true, true);
        assert_eq!(decide(&s), decide(&s));
    }

    #[test]
    fn commands_serialize_with_channel_tag() {
        let json = serde_json::to_value(FeedbackCommand::Haptic {
            intensity: HapticIntensity::Heavy,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"channel": "haptic", "intensity": "heavy"}));
    }
}
