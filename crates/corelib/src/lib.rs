//! Core types: math re-exports, Transform, Camera, and the pool simulation.

pub use glam::{EulerRot, Mat4, Quat, Vec3, vec3};

pub mod ball;
pub mod camera;
pub mod lights;
pub mod scene;
pub mod table;
pub mod transform;

pub use ball::{BALL_RADIUS, Ball};
pub use camera::Camera;
pub use lights::{LightKind, Lights};
pub use scene::Scene;
pub use table::TableBounds;
