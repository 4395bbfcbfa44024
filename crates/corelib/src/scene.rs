//! Scene: the balls on the table and the per-frame update system.

use crate::Vec3;
use crate::ball::{Ball, initial_ball_positions};
use crate::table::TableBounds;

/// Index of the ball that space bar sends rolling.
pub const CUE_BALL: usize = 0;

/// All balls plus the cushions they live between.
/// Dense storage; `update` allocates one small scratch buffer per moving ball.
#[derive(Clone, Debug)]
pub struct Scene {
    balls: Vec<Ball>,
    bounds: TableBounds,
    cue: usize,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Standard layout from [`initial_ball_positions`].
    pub fn new() -> Self {
        let balls = initial_ball_positions().into_iter().map(Ball::new).collect();
        Self::with_balls(balls, CUE_BALL)
    }

    pub fn with_balls(balls: Vec<Ball>, cue: usize) -> Self {
        Self {
            balls,
            bounds: TableBounds::default(),
            cue,
        }
    }

    #[inline]
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn cue_ball(&self) -> Option<&Ball> {
        self.balls.get(self.cue)
    }

    /// Put the cue ball in motion. Returns `false` if it was already moving.
    pub fn start_cue_ball(&mut self) -> bool {
        match self.balls.get_mut(self.cue) {
            Some(ball) if !ball.moving => {
                ball.moving = true;
                log::info!("Ball {} starts rolling from {:?}", self.cue + 1, ball.position);
                true
            }
            _ => false,
        }
    }

    pub fn any_moving(&self) -> bool {
        self.balls.iter().any(|b| b.moving)
    }

    /// System: advance every moving ball against all the others.
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for i in 0..self.balls.len() {
            if !self.balls[i].moving {
                continue;
            }
            let others: Vec<Vec3> = self
                .balls
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, b)| b.position)
                .collect();

            let ball = &mut self.balls[i];
            ball.update(dt, &others, &self.bounds);
            if !ball.moving {
                log::info!("Ball {} stopped at {:?}", i + 1, ball.position);
            }
        }
    }
}
