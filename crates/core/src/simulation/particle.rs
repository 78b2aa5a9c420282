//! Particle state, arena sizing, and respawn lifecycle
//!
//! Each particle is either integrating normally or being respawned. A
//! respawn teleports it into a small annulus around the current target with
//! zero velocity and zero life, and the particle resumes integrating on the
//! next frame.

use crate::core_types::{PerformanceMode, Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Radius of the initial scatter disk around the origin
pub const SCATTER_RADIUS: f32 = 2.2;

/// Particles farther than this from the origin are respawned
pub const BOUNDARY_RADIUS: f32 = 3.2;

/// Inner radius of the respawn annulus around the target
pub const RESPAWN_INNER_RADIUS: f32 = 0.05;

/// Outer radius of the respawn annulus around the target
pub const RESPAWN_OUTER_RADIUS: f32 = 0.23;

/// Life gained per second of simulation time
pub const LIFE_RATE: f32 = 0.2;

/// Particles whose life exceeds this are respawned
pub const MAX_LIFE: f32 = 1.0;

/// Per-frame velocity damping (not time-scaled)
pub const DRAG: f32 = 0.9;

// Absorbs the f32 representation error of the intensity, which leaves
// products such as 3000 * 0.79 a few 1e-5 short of the integer.
const COUNT_EPSILON: f64 = 1e-4;

/// Number of particles allocated for a mode and intensity
///
/// `floor(base * (0.3 + intensity * 0.7))`, with intensity clamped to
/// `[0, 1]`. Fixed for the lifetime of a simulator.
#[must_use]
pub fn arena_size(mode: PerformanceMode, intensity: f32) -> usize {
    let intensity = if intensity.is_finite() {
        f64::from(intensity.clamp(0.0, 1.0))
    } else {
        0.0
    };
    let base = mode.base_particle_count() as f64;
    (base * (0.3 + intensity * 0.7) + COUNT_EPSILON).floor() as usize
}

/// One simulated particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) life: f32,
}

impl Particle {
    /// Particle at rest at a uniformly random point of the scatter disk
    pub(crate) fn scattered<R: Rng>(rng: &mut R) -> Self {
        let r = SCATTER_RADIUS * rng.random::<f32>().sqrt();
        let angle = rng.random_range(0.0..TAU);
        Self {
            position: Vec3::new(r * angle.cos(), r * angle.sin(), 0.0),
            velocity: Vec3::zeros(),
            life: rng.random_range(0.0..1.0),
        }
    }

    /// Teleport into the annulus around `target` and reset velocity and life
    pub(crate) fn respawn<R: Rng>(&mut self, target: Vec2, rng: &mut R) {
        let r = rng.random_range(RESPAWN_INNER_RADIUS..RESPAWN_OUTER_RADIUS);
        let angle = rng.random_range(0.0..TAU);
        self.position = Vec3::new(target.x + r * angle.cos(), target.y + r * angle.sin(), 0.0);
        self.velocity = Vec3::zeros();
        self.life = 0.0;
    }

    /// Apply one frame of accumulated force
    ///
    /// Returns `true` when the particle was respawned instead of moved.
    pub(crate) fn integrate<R: Rng>(
        &mut self,
        force: Vec3,
        dt: f32,
        target: Vec2,
        rng: &mut R,
    ) -> bool {
        let velocity = self.velocity * DRAG + force;
        let position = self.position + velocity * dt;
        self.life += LIFE_RATE * dt;

        if position.norm() > BOUNDARY_RADIUS || self.life > MAX_LIFE {
            self.respawn(target, rng);
            return true;
        }

        self.velocity = velocity;
        self.position = position;
        false
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn life(&self) -> f32 {
        self.life
    }

    /// Whether the particle has outlived [`MAX_LIFE`]
    pub fn is_expired(&self) -> bool {
        self.life > MAX_LIFE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_arena_sizes() {
        assert_eq!(arena_size(PerformanceMode::Balanced, 0.7), 2370);
        assert_eq!(arena_size(PerformanceMode::Balanced, 1.0), 3000);
        assert_eq!(arena_size(PerformanceMode::Low, 0.0), 360);
        assert_eq!(arena_size(PerformanceMode::High, 0.5), 3250);
        assert_eq!(arena_size(PerformanceMode::High, 4.0), 5000);
        assert_eq!(arena_size(PerformanceMode::High, 0.9), 4650);
    }

    #[test]
    fn test_arena_size_floors_fractional_products() {
        // 1200 * (0.3 + 0.0011898809 * 0.7) = 360.9995
        assert_eq!(arena_size(PerformanceMode::Low, 0.0011898809), 360);
        // 3000 * (0.3 + 0.001 * 0.7) = 902.1
        assert_eq!(arena_size(PerformanceMode::Balanced, 0.001), 902);
    }

    #[test]
    fn test_scatter_stays_in_disk() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1000 {
            let p = Particle::scattered(&mut rng);
            assert!(p.position.norm() <= SCATTER_RADIUS + 1e-5);
            assert!((0.0..1.0).contains(&p.life));
            assert_eq!(p.velocity, Vec3::zeros());
        }
    }

    #[test]
    fn test_respawn_lands_in_annulus() {
        let mut rng = SmallRng::seed_from_u64(11);
        let target = Vec2::new(1.0, -0.5);
        let mut p = Particle::scattered(&mut rng);
        for _ in 0..200 {
            p.velocity = Vec3::new(1.0, 1.0, 1.0);
            p.respawn(target, &mut rng);
            let offset = (p.position.xy() - target).norm();
            assert!(offset >= RESPAWN_INNER_RADIUS - 1e-5);
            assert!(offset <= RESPAWN_OUTER_RADIUS + 1e-5);
            assert_eq!(p.velocity, Vec3::zeros());
            assert_eq!(p.life, 0.0);
        }
    }

    #[test]
    fn test_integrate_applies_drag_then_force() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut p = Particle {
            position: Vec3::zeros(),
            velocity: Vec3::new(1.0, 0.0, 0.0),
            life: 0.0,
        };
        let respawned = p.integrate(Vec3::new(0.0, 0.1, 0.0), 0.5, Vec2::zeros(), &mut rng);
        assert!(!respawned);
        assert!((p.velocity.x - 0.9).abs() < 1e-6);
        assert!((p.velocity.y - 0.1).abs() < 1e-6);
        assert!((p.position.x - 0.45).abs() < 1e-6);
        assert!((p.life - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_bounds_respawns() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut p = Particle {
            position: Vec3::new(3.1, 0.0, 0.0),
            velocity: Vec3::new(10.0, 0.0, 0.0),
            life: 0.3,
        };
        assert!(p.integrate(Vec3::zeros(), 0.1, Vec2::zeros(), &mut rng));
        assert!(p.position.norm() <= RESPAWN_OUTER_RADIUS + 1e-5);
        assert_eq!(p.life, 0.0);
    }

    #[test]
    fn test_expired_life_respawns() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut p = Particle {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            life: 0.999,
        };
        assert!(p.integrate(Vec3::zeros(), 0.1, Vec2::new(0.5, 0.5), &mut rng));
        assert_eq!(p.life, 0.0);
        assert!(!p.is_expired());
    }
}
