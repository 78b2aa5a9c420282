//! User-adjustable effect settings
//!
//! These are the knobs exposed to the outer UI: how strong the effect is,
//! what color it is, which force style the user prefers for open and idle
//! hands, and how much work the renderer can afford.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Force style applied to the particle field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectStyle {
    /// Particles stream toward the hand
    Trail,
    /// Particles orbit the hand
    Swirl,
    /// Particles are pushed away from the hand
    Burst,
    /// Trail, swirl and burst together, plus an out-of-plane pulse
    #[default]
    Blended,
}

impl EffectStyle {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trail => "trail",
            Self::Swirl => "swirl",
            Self::Burst => "burst",
            Self::Blended => "blended",
        }
    }
}

impl fmt::Display for EffectStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EffectStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trail" => Ok(Self::Trail),
            "swirl" => Ok(Self::Swirl),
            "burst" => Ok(Self::Burst),
            "blended" | "blend" | "all" => Ok(Self::Blended),
            _ => Err(ConfigError::UnknownEffectStyle(s.to_string())),
        }
    }
}

/// Baseline point size and opacity for a performance mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualBaseline {
    pub size: f32,
    pub opacity: f32,
}

/// Coarse quality/cost tier
///
/// Controls the particle budget at construction and the baseline visual
/// weight of each particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceMode {
    Low,
    #[default]
    Balanced,
    High,
}

impl PerformanceMode {
    /// Particle count at full intensity
    #[must_use]
    pub const fn base_particle_count(&self) -> usize {
        match self {
            Self::Low => 1200,
            Self::Balanced => 3000,
            Self::High => 5000,
        }
    }

    /// Baseline size and opacity before any gesture override
    #[must_use]
    pub const fn baseline_visual(&self) -> VisualBaseline {
        match self {
            Self::Low => VisualBaseline {
                size: 0.024,
                opacity: 0.80,
            },
            Self::Balanced => VisualBaseline {
                size: 0.030,
                opacity: 0.90,
            },
            Self::High => VisualBaseline {
                size: 0.036,
                opacity: 1.00,
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Balanced => "balanced",
            Self::High => "high",
        }
    }
}

impl fmt::Display for PerformanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PerformanceMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "balanced" | "medium" => Ok(Self::Balanced),
            "high" => Ok(Self::High),
            _ => Err(ConfigError::UnknownPerformanceMode(s.to_string())),
        }
    }
}

/// 8-bit RGB color used to tint the particle material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear `[0, 1]` channels for shader uniforms
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::new(0x66, 0xcc, 0xff)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidColor(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Complete set of user-adjustable effect parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParams {
    /// Effect strength in `[0, 1]`
    pub intensity: f32,
    pub color: Rgb,
    /// Preferred style for open and idle hands
    pub effect_style: EffectStyle,
    pub performance_mode: PerformanceMode,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            intensity: 0.7,
            color: Rgb::default(),
            effect_style: EffectStyle::default(),
            performance_mode: PerformanceMode::default(),
        }
    }
}

impl EffectParams {
    /// Check intensity is a finite value in `[0, 1]`
    ///
    /// Runtime updates clamp instead; this is for configuration entry points
    /// that should reject bad input outright.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_intensity(self.intensity).map(|_| ())
    }
}

/// Check an intensity value supplied from outside the engine
pub fn validate_intensity(intensity: f32) -> Result<f32, ConfigError> {
    if intensity.is_finite() && (0.0..=1.0).contains(&intensity) {
        Ok(intensity)
    } else {
        Err(ConfigError::IntensityOutOfRange(intensity))
    }
}

/// Partial update of [`EffectParams`]; `None` fields are left unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParamsUpdate {
    pub intensity: Option<f32>,
    pub color: Option<Rgb>,
    pub effect_style: Option<EffectStyle>,
    pub performance_mode: Option<PerformanceMode>,
}

impl EffectParamsUpdate {
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_effect_style(mut self, style: EffectStyle) -> Self {
        self.effect_style = Some(style);
        self
    }

    pub fn with_performance_mode(mut self, mode: PerformanceMode) -> Self {
        self.performance_mode = Some(mode);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.intensity.is_none()
            && self.color.is_none()
            && self.effect_style.is_none()
            && self.performance_mode.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_particle_counts() {
        assert_eq!(PerformanceMode::Low.base_particle_count(), 1200);
        assert_eq!(PerformanceMode::Balanced.base_particle_count(), 3000);
        assert_eq!(PerformanceMode::High.base_particle_count(), 5000);
    }

    #[test]
    fn test_baseline_visuals() {
        assert_eq!(PerformanceMode::Low.baseline_visual().size, 0.024);
        assert_eq!(PerformanceMode::Low.baseline_visual().opacity, 0.80);
        assert_eq!(PerformanceMode::Balanced.baseline_visual().size, 0.030);
        assert_eq!(PerformanceMode::High.baseline_visual().opacity, 1.00);
    }

    #[test]
    fn test_parse_styles_and_modes() {
        assert_eq!("Swirl".parse::<EffectStyle>(), Ok(EffectStyle::Swirl));
        assert_eq!("all".parse::<EffectStyle>(), Ok(EffectStyle::Blended));
        assert_eq!(
            "sparkle".parse::<EffectStyle>(),
            Err(ConfigError::UnknownEffectStyle("sparkle".to_string()))
        );
        assert_eq!(" high ".parse::<PerformanceMode>(), Ok(PerformanceMode::High));
        assert!("ultra".parse::<PerformanceMode>().is_err());
    }

    #[test]
    fn test_color_round_trip_through_text() {
        let color: Rgb = "#ff6600".parse().unwrap();
        assert_eq!(color, Rgb::new(0xff, 0x66, 0x00));
        assert_eq!(color.to_string(), "#ff6600");
        assert_eq!("00ff00".parse::<Rgb>(), Ok(Rgb::new(0, 255, 0)));
    }

    #[test]
    fn test_invalid_colors() {
        assert!("#ff66".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
        assert!("+f+f+f".parse::<Rgb>().is_err());
        assert!("#ff00ééé".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_validate_intensity() {
        assert_eq!(validate_intensity(0.5), Ok(0.5));
        assert!(validate_intensity(1.5).is_err());
        assert!(validate_intensity(f32::NAN).is_err());
        assert!(EffectParams::default().validate().is_ok());
    }

    #[test]
    fn test_update_builder() {
        let update = EffectParamsUpdate::default()
            .with_intensity(0.2)
            .with_performance_mode(PerformanceMode::Low);
        assert_eq!(update.intensity, Some(0.2));
        assert_eq!(update.performance_mode, Some(PerformanceMode::Low));
        assert!(update.color.is_none());
        assert!(!update.is_empty());
        assert!(EffectParamsUpdate::default().is_empty());
    }

    #[test]
    fn test_unit_channels() {
        let [r, g, b] = Rgb::default().to_unit();
        assert!((r - 0.4).abs() < 1e-6);
        assert!((g - 0.8).abs() < 1e-6);
        assert_eq!(b, 1.0);
        assert_eq!(Rgb::new(0, 0, 0).to_unit(), [0.0, 0.0, 0.0]);
    }
}
