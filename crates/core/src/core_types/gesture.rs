//! Discrete gesture labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a hand pose at one moment in time
///
/// Labels are mutually exclusive. `Wave` is never produced by the static
/// classifier; it is a temporal upgrade of `Open` applied by the wave
/// detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureLabel {
    /// No hand, or a pose matching no other label
    #[default]
    Idle,
    /// Fingers spread away from the wrist
    Open,
    /// Fingers curled toward the wrist
    Fist,
    /// Thumb tip touching the index fingertip
    Pinch,
    /// Open hand moving left and right
    Wave,
}

impl GestureLabel {
    /// All labels in table order
    pub const ALL: [GestureLabel; 5] = [
        GestureLabel::Idle,
        GestureLabel::Open,
        GestureLabel::Fist,
        GestureLabel::Pinch,
        GestureLabel::Wave,
    ];

    /// Stable position of this label in lookup tables
    pub const fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Open => 1,
            Self::Fist => 2,
            Self::Pinch => 3,
            Self::Wave => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Open => "open",
            Self::Fist => "fist",
            Self::Pinch => "pinch",
            Self::Wave => "wave",
        }
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_table_order() {
        for (i, label) in GestureLabel::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
        }
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(GestureLabel::default(), GestureLabel::Idle);
        assert_eq!(GestureLabel::Wave.to_string(), "wave");
    }
}
