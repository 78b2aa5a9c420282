//! Core types shared by the gesture pipeline and the particle simulator

pub mod gesture;
pub mod landmark;
pub mod settings;
pub mod vec3;

pub use gesture::GestureLabel;
pub use landmark::{HandPose, Landmark, FINGERTIPS, LANDMARK_COUNT, PALM_JOINTS};
pub use settings::{
    validate_intensity, EffectParams, EffectParamsUpdate, EffectStyle, PerformanceMode, Rgb,
    VisualBaseline,
};
pub use vec3::{Vec2, Vec3};
