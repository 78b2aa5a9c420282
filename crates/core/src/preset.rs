//! Gesture-to-preset resolution
//!
//! Each gesture maps to a row of a static table. Gestures that force a
//! style (fist, pinch, wave) also override the point size and opacity; open
//! and idle keep the user's style and the performance-mode baseline.

use crate::core_types::{EffectStyle, GestureLabel, PerformanceMode};
use serde::{Deserialize, Serialize};

/// One row of the gesture table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GesturePreset {
    /// Style forced by this gesture; `None` uses the user's selection
    pub forced_style: Option<EffectStyle>,
    pub size: f32,
    pub opacity: f32,
    /// Multiplier applied on top of the user's intensity for force magnitudes
    pub intensity_multiplier: f32,
}

/// Gesture table indexed by [`GestureLabel::index`]
pub const GESTURE_PRESETS: [GesturePreset; 5] = [
    // idle
    GesturePreset {
        forced_style: None,
        size: 0.030,
        opacity: 0.80,
        intensity_multiplier: 0.90,
    },
    // open
    GesturePreset {
        forced_style: None,
        size: 0.032,
        opacity: 0.90,
        intensity_multiplier: 1.00,
    },
    // fist
    GesturePreset {
        forced_style: Some(EffectStyle::Burst),
        size: 0.040,
        opacity: 1.00,
        intensity_multiplier: 1.50,
    },
    // pinch
    GesturePreset {
        forced_style: Some(EffectStyle::Swirl),
        size: 0.028,
        opacity: 0.85,
        intensity_multiplier: 0.85,
    },
    // wave
    GesturePreset {
        forced_style: Some(EffectStyle::Trail),
        size: 0.030,
        opacity: 0.95,
        intensity_multiplier: 1.30,
    },
];

/// Table row for a gesture
pub fn gesture_preset(label: GestureLabel) -> &'static GesturePreset {
    &GESTURE_PRESETS[label.index()]
}

/// Fully resolved visual and force parameters for the current state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPreset {
    pub gesture: GestureLabel,
    pub style: EffectStyle,
    pub size: f32,
    pub opacity: f32,
    pub intensity_multiplier: f32,
}

/// Resolve the preset for a gesture under the current user settings
pub fn resolve(
    label: GestureLabel,
    user_style: EffectStyle,
    mode: PerformanceMode,
) -> ResolvedPreset {
    let row = gesture_preset(label);
    let baseline = mode.baseline_visual();

    match row.forced_style {
        Some(style) => ResolvedPreset {
            gesture: label,
            style,
            size: row.size,
            opacity: row.opacity,
            intensity_multiplier: row.intensity_multiplier,
        },
        None => ResolvedPreset {
            gesture: label,
            style: user_style,
            size: baseline.size,
            opacity: baseline.opacity,
            intensity_multiplier: row.intensity_multiplier,
        },
    }
}
