//! Gesture Particles Core Library
//!
//! Classifies a tracked hand into a discrete gesture and uses it to steer a
//! real-time particle force simulation.
//!
//! ## Pipeline
//!
//! Each frame flows through:
//! - **Classifier** - 21 landmarks to idle / open / fist / pinch
//! - **Wave detector** - rolling wrist history upgrades open to wave
//! - **Preset resolver** - gesture and user settings to force style and visuals
//! - **Particle simulator** - fixed arena integrated in parallel, respawned near the hand
//!
//! Pose estimation and rendering stay outside the crate: a [`session::PoseSource`]
//! supplies landmarks and a [`session::FrameSink`] consumes particle positions.

// Core types and utilities
pub mod core_types;
pub mod error;

// Gesture detection
pub mod gesture;
pub mod preset;

// Particle simulation and live sessions
pub mod session;
pub mod simulation;

// Re-export core types
pub use core_types::{
    EffectParams, EffectParamsUpdate, EffectStyle, GestureLabel, HandPose, Landmark,
    PerformanceMode, Rgb, Vec2, Vec3,
};
pub use error::{ConfigError, SessionError};

// Re-export pipeline and simulation types
pub use gesture::{classify, detect_wave, CoordinateSpace, GesturePipeline, GestureReading};
pub use preset::{resolve as resolve_preset, ResolvedPreset};
pub use session::{FrameSink, NullSink, PoseSource, RenderFrame, Session, SessionConfig, SessionReport};
pub use simulation::{ParticleSimulator, SimulationStats, SimulatorOptions};
