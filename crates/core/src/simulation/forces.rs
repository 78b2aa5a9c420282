//! Per-particle force accumulation
//!
//! # Force Terms
//!
//! All terms are scaled by the frame `dt`, so integration only applies drag
//! and adds the accumulated force to the velocity.
//!
//! 1. **Trail** - attraction toward the target, boosted while waving
//! 2. **Swirl** - tangential orbit plus a weaker inward pull
//! 3. **Wave swirl** - a 0.6x tangential term for non-swirl styles while waving
//! 4. **Burst** - radial push away from the target with out-of-plane jitter
//! 5. **Pulse** - sinusoidal out-of-plane drive for the blended style
//! 6. **Idle jitter** - small isotropic noise while no gesture is held
//!
//! Magnitudes scale with `gesture_scale = multiplier * (0.6 + intensity * 0.7)`.

use crate::core_types::{EffectStyle, GestureLabel, Vec3};
use rand::Rng;

/// Attraction strength for trail
pub const BASE_FORCE: f32 = 2.4;

/// Extra trail attraction while the gesture is a wave
pub const WAVE_TRAIL_BOOST: f32 = 1.4;

/// Tangential strength for swirl
pub const SWIRL_STRENGTH: f32 = 1.8;

/// Inward pull for swirl as a fraction of the tangential strength
pub const SWIRL_INWARD_RATIO: f32 = 0.35;

/// Tangential factor given to non-swirl styles while waving
pub const WAVE_SWIRL_FACTOR: f32 = 0.6;

/// Radial push for burst
pub const BURST_STRENGTH: f32 = 3.0;

/// Out-of-plane jitter amplitude for burst
pub const BURST_JITTER: f32 = 0.8;

/// Out-of-plane pulse amplitude for the blended style
pub const PULSE_STRENGTH: f32 = 0.6;

/// Pulse angular frequency in radians per second
pub const PULSE_FREQUENCY: f32 = 3.0;

/// Pulse phase offset between consecutive particles
pub const PULSE_PHASE_STEP: f32 = 0.05;

/// Isotropic jitter amplitude while idle
pub const IDLE_JITTER: f32 = 0.25;

// Below this distance the particle sits on the target and has no direction
const MIN_DIRECTION_DISTANCE: f32 = 1e-5;

/// Which force terms a style activates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectFlags {
    pub trail: bool,
    pub swirl: bool,
    pub burst: bool,
    pub pulse: bool,
}

impl EffectFlags {
    #[must_use]
    pub const fn for_style(style: EffectStyle) -> Self {
        match style {
            EffectStyle::Trail => Self {
                trail: true,
                swirl: false,
                burst: false,
                pulse: false,
            },
            EffectStyle::Swirl => Self {
                trail: false,
                swirl: true,
                burst: false,
                pulse: false,
            },
            EffectStyle::Burst => Self {
                trail: false,
                swirl: false,
                burst: true,
                pulse: false,
            },
            EffectStyle::Blended => Self {
                trail: true,
                swirl: true,
                burst: true,
                pulse: true,
            },
        }
    }
}

/// Frame-constant inputs shared by every particle
#[derive(Debug, Clone, Copy)]
pub struct ForceField {
    pub flags: EffectFlags,
    pub gesture: GestureLabel,
    pub gesture_scale: f32,
    /// Target in scene space, on the z = 0 plane
    pub target: Vec3,
    /// Total simulation time including this frame
    pub elapsed: f32,
    pub dt: f32,
}

/// Force scale from the gesture multiplier and the user's intensity
#[must_use]
pub fn gesture_scale(intensity_multiplier: f32, intensity: f32) -> f32 {
    intensity_multiplier * (0.6 + intensity * 0.7)
}

impl ForceField {
    /// Accumulated force for the particle at `index` and `position`
    pub fn force_at<R: Rng>(&self, index: usize, position: Vec3, rng: &mut R) -> Vec3 {
        let to_target = self.target - position;
        let distance = to_target.norm();
        let dir = if distance > MIN_DIRECTION_DISTANCE {
            to_target / distance
        } else {
            Vec3::zeros()
        };
        let tangent = Vec3::new(-dir.y, dir.x, 0.0);
        let scale = self.gesture_scale * self.dt;
        let waving = self.gesture == GestureLabel::Wave;

        let mut force = Vec3::zeros();

        if self.flags.trail {
            let boost = if waving { WAVE_TRAIL_BOOST } else { 1.0 };
            force += dir * (BASE_FORCE * boost * scale);
        }

        if self.flags.swirl {
            force += tangent * (SWIRL_STRENGTH * scale);
            force += dir * (SWIRL_STRENGTH * SWIRL_INWARD_RATIO * scale);
        } else if waving {
            force += tangent * (SWIRL_STRENGTH * WAVE_SWIRL_FACTOR * scale);
        }

        if self.flags.burst {
            force -= dir * (BURST_STRENGTH * scale);
            force.z += rng.random_range(-1.0_f32..1.0) * BURST_JITTER * scale;
        }

        if self.flags.pulse {
            let phase = self.elapsed * PULSE_FREQUENCY + index as f32 * PULSE_PHASE_STEP;
            force.z += phase.sin() * PULSE_STRENGTH * self.dt;
        }

        if self.gesture == GestureLabel::Idle {
            force += Vec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            ) * (IDLE_JITTER * self.dt);
        }

        force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn field(style: EffectStyle, gesture: GestureLabel) -> ForceField {
        ForceField {
            flags: EffectFlags::for_style(style),
            gesture,
            gesture_scale: 1.0,
            target: Vec3::zeros(),
            elapsed: 0.0,
            dt: 0.1,
        }
    }

    #[test]
    fn test_blended_enables_everything() {
        let flags = EffectFlags::for_style(EffectStyle::Blended);
        assert!(flags.trail && flags.swirl && flags.burst && flags.pulse);
        assert!(!EffectFlags::for_style(EffectStyle::Trail).swirl);
    }

    #[test]
    fn test_gesture_scale() {
        assert!((gesture_scale(1.0, 0.0) - 0.6).abs() < 1e-6);
        assert!((gesture_scale(1.5, 1.0) - 1.95).abs() < 1e-6);
    }

    #[test]
    fn test_trail_pulls_toward_target() {
        let mut rng = SmallRng::seed_from_u64(1);
        let f = field(EffectStyle::Trail, GestureLabel::Open);
        let force = f.force_at(0, Vec3::new(2.0, 0.0, 0.0), &mut rng);
        assert!(force.x < 0.0);
        assert!(force.y.abs() < 1e-6);
        assert!((force.x + BASE_FORCE * 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_wave_strengthens_trail_and_adds_rotation() {
        let mut rng = SmallRng::seed_from_u64(1);
        let open = field(EffectStyle::Trail, GestureLabel::Open);
        let wave = field(EffectStyle::Trail, GestureLabel::Wave);
        let p = Vec3::new(2.0, 0.0, 0.0);

        let f_open = open.force_at(0, p, &mut rng);
        let f_wave = wave.force_at(0, p, &mut rng);
        assert!(f_wave.x < f_open.x);
        assert!(f_open.y.abs() < 1e-6);
        // dir = -x, tangent = (0, -1)
        assert!((f_wave.y + SWIRL_STRENGTH * WAVE_SWIRL_FACTOR * 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_swirl_is_mostly_tangential() {
        let mut rng = SmallRng::seed_from_u64(1);
        let f = field(EffectStyle::Swirl, GestureLabel::Pinch);
        let force = f.force_at(0, Vec3::new(0.0, 1.0, 0.0), &mut rng);
        // dir = -y, tangent = (1, 0)
        assert!(force.x > 0.0);
        assert!(force.y < 0.0);
        assert!(force.x > force.y.abs());
    }

    #[test]
    fn test_burst_pushes_away() {
        let mut rng = SmallRng::seed_from_u64(1);
        let f = field(EffectStyle::Burst, GestureLabel::Fist);
        let force = f.force_at(0, Vec3::new(1.0, 0.0, 0.0), &mut rng);
        assert!(force.x > 0.0);
        assert!(force.z.abs() <= BURST_JITTER * 0.1);
    }

    #[test]
    fn test_pulse_depends_on_index() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut f = field(EffectStyle::Blended, GestureLabel::Open);
        f.flags = EffectFlags {
            pulse: true,
            ..EffectFlags::default()
        };
        f.elapsed = 1.0;
        let a = f.force_at(0, Vec3::new(1.0, 0.0, 0.0), &mut rng);
        let b = f.force_at(20, Vec3::new(1.0, 0.0, 0.0), &mut rng);
        assert!((a.z - (3.0_f32).sin() * PULSE_STRENGTH * 0.1).abs() < 1e-6);
        assert!((a.z - b.z).abs() > 1e-4);
    }

    #[test]
    fn test_particle_on_target_has_no_direction() {
        let mut rng = SmallRng::seed_from_u64(1);
        let f = field(EffectStyle::Trail, GestureLabel::Open);
        let force = f.force_at(0, Vec3::zeros(), &mut rng);
        assert_eq!(force, Vec3::zeros());
    }
}
