//! Pool balls: rolling update and collision checks.

use crate::table::{BALL_REST_HEIGHT, TableBounds};
use crate::transform::Transform;
use crate::{Mat4, Vec3, vec3};

/// Radius shared by every ball.
pub const BALL_RADIUS: f32 = 0.035;
/// Rolling speed in world units per second.
pub const BALL_SPEED: f32 = 0.5;
/// Scale from OBJ model units to world units.
pub const BALL_MODEL_SCALE: f32 = 0.04;
/// Direction a started ball rolls in.
pub const ROLL_DIRECTION: Vec3 = Vec3::X;

pub const BALL_COUNT: usize = 15;

/// Fixed starting layout, one entry per ball (Ball1..Ball15).
pub fn initial_ball_positions() -> [Vec3; BALL_COUNT] {
    let y = BALL_REST_HEIGHT;
    [
        vec3(-0.5, y, 0.2),
        vec3(-0.3, y, 0.3),
        vec3(-0.1, y, -0.2),
        vec3(0.0, y, 0.4),
        vec3(-0.6, y, -0.4),
        vec3(-0.4, y, -0.3),
        vec3(-0.2, y, 0.2),
        vec3(0.3, y, -0.4),
        vec3(0.1, y, 0.1),
        vec3(0.5, y, -0.1),
        vec3(0.2, y, 0.3),
        vec3(0.4, y, -0.2),
        vec3(0.6, y, 0.1),
        vec3(0.7, y, -0.3),
        vec3(0.8, y, 0.4),
    ]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ball {
    pub position: Vec3,
    /// Euler angles in degrees, kept within [0, 360).
    pub orientation_deg: Vec3,
    pub moving: bool,
}

impl Ball {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            orientation_deg: Vec3::ZERO,
            moving: false,
        }
    }

    /// Centre distance within two radii (touching counts).
    pub fn collides_with(&self, other_position: Vec3) -> bool {
        let min_distance = 2.0 * BALL_RADIUS;
        self.position.distance_squared(other_position) <= min_distance * min_distance
    }

    /// Whether a ball at `position` overlaps any of `others` or reaches a cushion.
    pub fn is_colliding(position: Vec3, others: &[Vec3], bounds: &TableBounds) -> bool {
        let probe = Ball::new(position);
        others.iter().any(|&o| probe.collides_with(o)) || bounds.touches(position, BALL_RADIUS)
    }

    /// Advance a moving ball by `dt` seconds.
    ///
    /// The step is tested at the candidate position first; on contact the
    /// ball stops where it is instead of advancing into the obstacle.
    /// `others` holds the centres of every other ball.
    pub fn update(&mut self, dt: f32, others: &[Vec3], bounds: &TableBounds) {
        if !self.moving || dt <= 0.0 {
            return;
        }

        let distance = BALL_SPEED * dt;
        let candidate = self.position + ROLL_DIRECTION * distance;
        if Ball::is_colliding(candidate, others, bounds) {
            self.moving = false;
            return;
        }

        self.position = candidate;
        // Rolling without slipping about the axis perpendicular to +X.
        let spin = -(distance / BALL_RADIUS).to_degrees();
        self.orientation_deg.z = (self.orientation_deg.z + spin).rem_euclid(360.0);
    }

    pub fn transform(&self) -> Transform {
        Transform::from_degrees(
            self.position,
            self.orientation_deg,
            Vec3::splat(BALL_MODEL_SCALE),
        )
    }

    #[inline]
    pub fn model_matrix(&self) -> Mat4 {
        self.transform().matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_balls_collide() {
        let a = Ball::new(vec3(0.0, 0.1, 0.0));
        assert!(a.collides_with(vec3(0.05, 0.1, 0.0)));
        assert!(!a.collides_with(vec3(0.2, 0.1, 0.0)));
    }

    #[test]
    fn touching_is_inclusive() {
        let a = Ball::new(vec3(0.0, 0.1, 0.0));
        assert!(a.collides_with(vec3(2.0 * BALL_RADIUS, 0.1, 0.0)));
        assert!(!a.collides_with(vec3(2.0 * BALL_RADIUS + 1e-4, 0.1, 0.0)));
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let bounds = TableBounds::default();
        for moving in [false, true] {
            let mut ball = Ball::new(vec3(0.0, 0.1, 0.0));
            ball.moving = moving;
            ball.orientation_deg = vec3(0.0, 0.0, 42.0);
            let before = ball;
            // Even when already in contact.
            ball.update(0.0, &[vec3(0.01, 0.1, 0.0)], &bounds);
            assert_eq!(ball, before);
        }
    }

    #[test]
    fn idle_ball_does_not_move() {
        let mut ball = Ball::new(vec3(0.0, 0.1, 0.0));
        let before = ball;
        ball.update(0.5, &[], &TableBounds::default());
        assert_eq!(ball, before);
    }

    #[test]
    fn rolling_advances_and_spins() {
        let mut ball = Ball::new(vec3(0.0, 0.1, 0.0));
        ball.moving = true;
        ball.update(0.01, &[], &TableBounds::default());

        let distance = BALL_SPEED * 0.01;
        assert!((ball.position.x - distance).abs() < 1e-6);
        assert!(ball.moving);
        let expected = (-(distance / BALL_RADIUS).to_degrees()).rem_euclid(360.0);
        assert!((ball.orientation_deg.z - expected).abs() < 1e-3);
        assert!(ball.orientation_deg.z >= 0.0 && ball.orientation_deg.z < 360.0);
    }

    #[test]
    fn stops_before_entering_another_ball() {
        let mut ball = Ball::new(vec3(0.0, 0.1, 0.0));
        ball.moving = true;
        let other = vec3(0.08, 0.1, 0.0);
        // 0.02 step would put the centres 0.06 apart.
        ball.update(0.04, &[other], &TableBounds::default());
        assert!(!ball.moving);
        assert_eq!(ball.position, vec3(0.0, 0.1, 0.0));
        assert_eq!(ball.orientation_deg, Vec3::ZERO);
    }

    #[test]
    fn stops_at_cushion() {
        let mut ball = Ball::new(vec3(0.85, 0.1, 0.0));
        ball.moving = true;
        ball.update(0.1, &[], &TableBounds::default());
        assert!(!ball.moving);
        assert_eq!(ball.position.x, 0.85);
    }

    #[test]
    fn initial_layout_is_clear() {
        let positions = initial_ball_positions();
        let bounds = TableBounds::default();
        for (i, p) in positions.iter().enumerate() {
            let others: Vec<Vec3> = positions
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, o)| *o)
                .collect();
            assert!(!Ball::is_colliding(*p, &others, &bounds), "ball {} starts in contact", i + 1);
        }
    }

    #[test]
    fn model_matrix_places_ball() {
        let ball = Ball::new(vec3(0.2, 0.1, -0.3));
        let origin = ball.model_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - ball.position).length() < 1e-6);
        let surface = ball.model_matrix().transform_point3(Vec3::X);
        assert!(((surface - ball.position).length() - BALL_MODEL_SCALE).abs() < 1e-6);
    }
}
