//! Static pool table: dimensions and cushion bounds.

use crate::ball::BALL_RADIUS;
use crate::transform::Transform;
use crate::{Vec3, vec3};

/// Half-extents of the playing surface along X and Z.
pub const TABLE_HALF_X: f32 = 0.9;
pub const TABLE_HALF_Z: f32 = 0.45;
/// Half thickness of the table slab.
pub const TABLE_HALF_HEIGHT: f32 = 0.05;

/// Height of a resting ball's centre.
pub const BALL_REST_HEIGHT: f32 = 0.1;

/// Vertical shift that puts the slab's top face under resting balls.
pub const TABLE_Y_OFFSET: f32 = BALL_REST_HEIGHT - TABLE_HALF_HEIGHT - BALL_RADIUS;

/// Placement of the table slab in the scene.
pub fn table_transform() -> Transform {
    Transform::from_translation(vec3(0.0, TABLE_Y_OFFSET, 0.0))
}

/// Axis-aligned cushions around the playing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableBounds {
    pub half_x: f32,
    pub half_z: f32,
}

impl Default for TableBounds {
    fn default() -> Self {
        Self {
            half_x: TABLE_HALF_X,
            half_z: TABLE_HALF_Z,
        }
    }
}

impl TableBounds {
    /// True when a sphere at `position` reaches a cushion. Touching counts.
    pub fn touches(&self, position: Vec3, radius: f32) -> bool {
        position.x.abs() >= self.half_x - radius || position.z.abs() >= self.half_z - radius
    }
}
