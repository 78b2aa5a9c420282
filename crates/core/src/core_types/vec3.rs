//! Vector type aliases for landmark and particle coordinates.

use nalgebra::{Vector2, Vector3};

/// 3D vector type for landmarks, particle positions, and velocities.
///
/// This is a simple alias for `nalgebra::Vector3<f32>`, used throughout
/// the engine for hand landmarks in producer space and particle state in
/// scene space.
pub type Vec3 = Vector3<f32>;

/// 2D vector type for normalized and scene-space target positions.
pub type Vec2 = Vector2<f32>;
