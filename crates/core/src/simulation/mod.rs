//! Fixed-capacity particle simulator steered by gestures
//!
//! `ParticleSimulator` owns the particle arena and the simulation
//! configuration. It is driven through three entry points:
//! - [`ParticleSimulator::set_effect_params`] for user settings
//! - [`ParticleSimulator::set_target`] for the hand position and gesture
//! - [`ParticleSimulator::update`] once per render frame
//!
//! Particles never interact, so each frame is integrated in parallel. Every
//! particle draws from its own RNG stream derived from the simulator seed,
//! the frame number and the particle index, which keeps seeded runs
//! reproducible regardless of thread scheduling.
//!
//! The arena is sized once at construction from the performance mode and
//! intensity. Later changes to either never resize it.

pub mod forces;
pub mod particle;

pub use forces::{gesture_scale, EffectFlags, ForceField};
pub use particle::{arena_size, Particle, BOUNDARY_RADIUS, LIFE_RATE, MAX_LIFE};

use crate::core_types::{
    EffectParams, EffectParamsUpdate, EffectStyle, GestureLabel, Rgb, Vec2, Vec3, VisualBaseline,
};
use crate::preset::{self, ResolvedPreset};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

/// Scene-space width covered by a normalized target x in `[0, 1]`
pub const TARGET_SPAN_X: f32 = 4.0;

/// Scene-space height covered by a normalized target y in `[0, 1]`
pub const TARGET_SPAN_Y: f32 = 3.0;

/// Construction options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorOptions {
    /// Seed for reproducible runs; `None` draws a random seed
    pub seed: Option<u64>,
}

impl SimulatorOptions {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }
}

/// Material parameters for the external renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialState {
    pub color: Rgb,
    pub size: f32,
    pub opacity: f32,
}

/// Current simulation configuration
///
/// Mutated only through [`ParticleSimulator::set_effect_params`] and
/// [`ParticleSimulator::set_target`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub params: EffectParams,
    /// Performance-mode size and opacity before gesture overrides
    pub baseline: VisualBaseline,
    pub gesture: GestureLabel,
    pub preset: ResolvedPreset,
    /// Target in normalized `[0, 1]` frame coordinates
    pub normalized_target: Vec2,
    /// Target in scene coordinates
    pub target: Vec2,
}

impl SimulationConfig {
    /// Force multiplier applied to every term this frame
    pub fn gesture_scale(&self) -> f32 {
        gesture_scale(self.preset.intensity_multiplier, self.params.intensity)
    }

    pub fn style(&self) -> EffectStyle {
        self.preset.style
    }
}

/// Per-frame statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub particle_count: usize,
    pub respawns_last_frame: usize,
    pub frames: u64,
    pub elapsed: f32,
    pub gesture: GestureLabel,
    pub style: EffectStyle,
}

/// Clamp a normalized coordinate into `[0, 1]`, centering NaN
fn clamp_unit(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// Map a normalized `[0, 1]` target to scene coordinates (y up)
pub fn scene_target(x: f32, y: f32) -> Vec2 {
    let (x, y) = (clamp_unit(x), clamp_unit(y));
    Vec2::new((x - 0.5) * TARGET_SPAN_X, (0.5 - y) * TARGET_SPAN_Y)
}

/// Gesture-driven particle simulation
pub struct ParticleSimulator {
    particles: Vec<Particle>,
    /// Flat position buffer mirrored from `particles` after each update
    positions: Vec<[f32; 3]>,
    config: SimulationConfig,
    seed: u64,
    frame: u64,
    elapsed: f32,
    respawns_last_frame: usize,
    disposed: bool,
}

impl ParticleSimulator {
    /// Create a simulator with a random seed
    #[must_use]
    pub fn new(params: EffectParams) -> Self {
        Self::with_options(params, SimulatorOptions::default())
    }

    /// Create a simulator with explicit options
    #[must_use]
    pub fn with_options(params: EffectParams, options: SimulatorOptions) -> Self {
        let mut params = params;
        params.intensity = sanitize_intensity(params.intensity, 0.0);

        let seed = options.seed.unwrap_or_else(rand::random);
        let count = arena_size(params.performance_mode, params.intensity);

        info!(
            "Creating particle simulator: {} particles ({} mode, intensity {:.2}, style {})",
            count, params.performance_mode, params.intensity, params.effect_style
        );

        let mut rng = SmallRng::seed_from_u64(seed);
        let particles: Vec<Particle> = (0..count).map(|_| Particle::scattered(&mut rng)).collect();
        let positions = particles.iter().map(|p| to_array(p.position)).collect();

        let gesture = GestureLabel::Idle;
        let config = SimulationConfig {
            params,
            baseline: params.performance_mode.baseline_visual(),
            gesture,
            preset: preset::resolve(gesture, params.effect_style, params.performance_mode),
            normalized_target: Vec2::new(0.5, 0.5),
            target: Vec2::zeros(),
        };

        Self {
            particles,
            positions,
            config,
            seed,
            frame: 0,
            elapsed: 0.0,
            respawns_last_frame: 0,
            disposed: false,
        }
    }

    /// Apply a partial settings update and re-resolve the preset
    ///
    /// A performance-mode change updates the baseline size and opacity but
    /// keeps the particle count fixed.
    pub fn set_effect_params(&mut self, update: EffectParamsUpdate) {
        let params = &mut self.config.params;

        if let Some(intensity) = update.intensity {
            params.intensity = sanitize_intensity(intensity, params.intensity);
        }
        if let Some(color) = update.color {
            params.color = color;
        }
        if let Some(style) = update.effect_style {
            params.effect_style = style;
        }
        if let Some(mode) = update.performance_mode {
            if mode != params.performance_mode {
                debug!(
                    "Performance mode {} -> {}; keeping {} particles",
                    params.performance_mode,
                    mode,
                    self.particles.len()
                );
            }
            params.performance_mode = mode;
            self.config.baseline = mode.baseline_visual();
        }

        self.resolve_preset();
    }

    /// Store the normalized target and the current gesture
    ///
    /// `None` for the gesture means no hand is held and resolves to `Idle`.
    /// The preset is re-resolved only when the gesture changes.
    pub fn set_target(&mut self, x: f32, y: f32, gesture: Option<GestureLabel>) {
        self.config.normalized_target = Vec2::new(clamp_unit(x), clamp_unit(y));
        self.config.target = scene_target(x, y);

        let gesture = gesture.unwrap_or(GestureLabel::Idle);
        if gesture != self.config.gesture {
            self.config.gesture = gesture;
            self.resolve_preset();
        }
    }

    /// Advance every particle by `dt` seconds
    ///
    /// Zero, negative, and non-finite steps are ignored. Long steps are
    /// integrated as given; callers that want hitch protection cap `dt`.
    pub fn update(&mut self, dt: f32) {
        if self.disposed || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        self.elapsed += dt;
        self.frame += 1;

        let target = self.config.target;
        let field = ForceField {
            flags: EffectFlags::for_style(self.config.preset.style),
            gesture: self.config.gesture,
            gesture_scale: self.config.gesture_scale(),
            target: Vec3::new(target.x, target.y, 0.0),
            elapsed: self.elapsed,
            dt,
        };
        let seed = self.seed;
        let frame = self.frame;

        let respawns: usize = self
            .particles
            .par_iter_mut()
            .zip(self.positions.par_iter_mut())
            .enumerate()
            .map(|(index, (particle, out))| {
                let mut rng = SmallRng::seed_from_u64(particle_stream(seed, frame, index));
                let force = field.force_at(index, particle.position, &mut rng);
                let respawned = particle.integrate(force, dt, target, &mut rng);
                *out = to_array(particle.position);
                usize::from(respawned)
            })
            .sum();

        self.respawns_last_frame = respawns;
        trace!(
            "Frame {}: {} respawns, gesture {}",
            frame,
            respawns,
            self.config.gesture
        );
    }

    /// Release the particle arena and position buffer
    ///
    /// Safe to call repeatedly. Afterwards `update` is a no-op and the
    /// position buffer is empty.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        info!(
            "Disposing particle simulator after {} frames ({} particles)",
            self.frame,
            self.particles.len()
        );
        self.particles = Vec::new();
        self.positions = Vec::new();
        self.disposed = true;
    }

    fn resolve_preset(&mut self) {
        let params = &self.config.params;
        let resolved =
            preset::resolve(self.config.gesture, params.effect_style, params.performance_mode);
        if resolved != self.config.preset {
            debug!(
                "Preset for {}: style {}, size {:.3}, opacity {:.2}, multiplier {:.2}",
                resolved.gesture,
                resolved.style,
                resolved.size,
                resolved.opacity,
                resolved.intensity_multiplier
            );
        }
        self.config.preset = resolved;
    }

    /// Number of live particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particle positions for the renderer, one `[x, y, z]` per particle
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Position buffer as raw bytes for direct GPU upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn material(&self) -> MaterialState {
        MaterialState {
            color: self.config.params.color,
            size: self.config.preset.size,
            opacity: self.config.preset.opacity,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn gesture(&self) -> GestureLabel {
        self.config.gesture
    }

    pub fn preset(&self) -> &ResolvedPreset {
        &self.config.preset
    }

    /// Target in scene coordinates
    pub fn target(&self) -> Vec2 {
        self.config.target
    }

    /// Target in normalized `[0, 1]` frame coordinates
    pub fn normalized_target(&self) -> Vec2 {
        self.config.normalized_target
    }

    /// Simulation time accumulated over all updates (seconds)
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            particle_count: self.particles.len(),
            respawns_last_frame: self.respawns_last_frame,
            frames: self.frame,
            elapsed: self.elapsed,
            gesture: self.config.gesture,
            style: self.config.preset.style,
        }
    }
}

impl Drop for ParticleSimulator {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn to_array(v: Vec3) -> [f32; 3] {
    [v.x, v.y, v.z]
}

/// Clamp a requested intensity into `[0, 1]`, keeping `fallback` for NaN
fn sanitize_intensity(requested: f32, fallback: f32) -> f32 {
    if !requested.is_finite() {
        warn!("Ignoring non-finite intensity {}", requested);
        return fallback;
    }
    let clamped = requested.clamp(0.0, 1.0);
    if clamped != requested {
        warn!("Intensity {} clamped to {}", requested, clamped);
    }
    clamped
}

/// Independent RNG stream for one particle in one frame (`SplitMix64` finalizer)
fn particle_stream(seed: u64, frame: u64, index: usize) -> u64 {
    let mut z = seed
        ^ frame.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (index as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
