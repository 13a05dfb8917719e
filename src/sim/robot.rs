//! Robot kinematics
//!
//! The robot is either idle or carrying out exactly one [`PendingMove`].
//! Moves are interpolated from the tick they were issued on, so the position
//! after `n` ticks is `start + n * speed` with no accumulated error.
//!
//! Position is never stored directly. It is the pivot (where the robot last
//! turned or was placed) plus `dist` along the current heading.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, CompositeSet, Hit};
use crate::error::MoveError;
use crate::heading_vector;

/// Pose and physical parameters of the robot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotState {
    /// Where the robot last turned (or was placed)
    pub last_turn: Vec2,
    /// Signed distance traveled along `heading` since `last_turn`
    pub dist: f32,
    /// Heading in radians, not normalized
    pub heading: f32,
    /// Linear speed in units per tick
    pub speed: f32,
    /// Half extent of the square bounding box
    pub bbox_radius: f32,
    pub pick_radius: f32,
}

impl RobotState {
    pub fn new(speed: f32, bbox_radius: f32, pick_radius: f32) -> Self {
        Self {
            last_turn: Vec2::ZERO,
            dist: 0.0,
            heading: 0.0,
            speed,
            bbox_radius,
            pick_radius,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.last_turn + self.dist * heading_vector(self.heading)
    }

    pub fn bbox(&self) -> Aabb {
        Aabb::square(self.position(), self.bbox_radius)
    }

    /// Angular speed (radians per tick) at which the outer edge of the robot
    /// sweeps at the same linear speed as a forward move
    pub fn angular_speed(&self) -> f32 {
        self.speed / (PI * self.bbox_radius)
    }
}

/// The motion a pending move is carrying out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Interpolate `dist` from `start` to `target`
    Forward { start: f32, target: f32, speed: f32 },
    /// Interpolate `heading` from `start` to `target`
    Turn {
        start: f32,
        target: f32,
        angular_speed: f32,
    },
}

/// The single in-flight move
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingMove {
    pub motion: Motion,
    /// Robot tick counter when the move was accepted
    pub issued_at: u64,
}

/// Outcome of a finished move, produced exactly once per move
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveResult {
    Forward {
        distance_moved: f32,
        /// The collider that stopped the move early, if any
        collision: Option<Hit>,
    },
    /// Turns cannot fail
    Turn { angle_moved: f32 },
}

impl MoveResult {
    pub fn success(&self) -> bool {
        match self {
            MoveResult::Forward { collision, .. } => collision.is_none(),
            MoveResult::Turn { .. } => true,
        }
    }
}

/// Step `start` toward `target` by `rate * elapsed`, clamping at the target.
/// Returns the new value and whether the target was reached.
fn interpolate(start: f32, target: f32, rate: f32, elapsed: f32) -> (f32, bool) {
    let dir = if target >= start { 1.0 } else { -1.0 };
    let value = start + dir * rate * elapsed;
    let arrived = if dir > 0.0 {
        value >= target
    } else {
        value <= target
    };
    if arrived { (target, true) } else { (value, false) }
}

/// Kinematic state machine: `Idle` when `pending` is `None`, `Moving` otherwise
#[derive(Debug, Clone)]
pub struct Robot {
    state: RobotState,
    pending: Option<PendingMove>,
    ticks: u64,
}

impl Robot {
    pub fn new(state: RobotState) -> Self {
        Self {
            state,
            pending: None,
            ticks: 0,
        }
    }

    pub fn state(&self) -> &RobotState {
        &self.state
    }

    pub fn position(&self) -> Vec2 {
        self.state.position()
    }

    pub fn heading(&self) -> f32 {
        self.state.heading
    }

    pub fn bbox(&self) -> Aabb {
        self.state.bbox()
    }

    pub fn pending(&self) -> Option<&PendingMove> {
        self.pending.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    /// Number of times [`Robot::advance`] has run
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Start moving `distance` units along the current heading (negative backs up)
    pub fn begin_forward(&mut self, distance: f32) -> Result<(), MoveError> {
        if self.pending.is_some() {
            return Err(MoveError::AlreadyMoving);
        }
        self.pending = Some(PendingMove {
            motion: Motion::Forward {
                start: self.state.dist,
                target: self.state.dist + distance,
                speed: self.state.speed,
            },
            issued_at: self.ticks,
        });
        Ok(())
    }

    /// Start rotating by `angle` radians (positive is counter-clockwise).
    ///
    /// The current position becomes the new pivot, so later forward moves are
    /// measured from here along the new heading.
    pub fn begin_turn(&mut self, angle: f32) -> Result<(), MoveError> {
        if self.pending.is_some() {
            return Err(MoveError::AlreadyMoving);
        }
        self.pending = Some(PendingMove {
            motion: Motion::Turn {
                start: self.state.heading,
                target: self.state.heading + angle,
                angular_speed: self.state.angular_speed(),
            },
            issued_at: self.ticks,
        });
        self.state.last_turn = self.state.position();
        self.state.dist = 0.0;
        Ok(())
    }

    /// Advance one tick against `world`. Returns the result when the pending
    /// move finishes or collides on this tick.
    pub fn advance(&mut self, world: &CompositeSet) -> Option<MoveResult> {
        self.ticks += 1;
        let pending = self.pending?;
        let elapsed = (self.ticks - pending.issued_at) as f32;

        match pending.motion {
            Motion::Forward {
                start,
                target,
                speed,
            } => {
                let previous = self.state.dist;
                let (dist, arrived) = interpolate(start, target, speed, elapsed);
                self.state.dist = dist;

                if let Some(hit) = world.test(&self.state.bbox()) {
                    // Back out to the last collision-free tick
                    self.state.dist = previous;
                    self.pending = None;
                    log::debug!(
                        "forward move hit {} after {:.2} units",
                        hit.kind,
                        previous - start
                    );
                    return Some(MoveResult::Forward {
                        distance_moved: previous - start,
                        collision: Some(hit),
                    });
                }

                if arrived {
                    self.pending = None;
                    return Some(MoveResult::Forward {
                        distance_moved: target - start,
                        collision: None,
                    });
                }
                None
            }
            Motion::Turn {
                start,
                target,
                angular_speed,
            } => {
                let (heading, arrived) = interpolate(start, target, angular_speed, elapsed);
                self.state.heading = heading;

                if arrived {
                    self.pending = None;
                    return Some(MoveResult::Turn {
                        angle_moved: target - start,
                    });
                }
                None
            }
        }
    }

    /// Move the pivot to `at` with `dist = 0`, keeping the old pose if the
    /// new one collides with `world`.
    pub fn place(&mut self, at: Vec2, world: &CompositeSet) -> Result<(), Hit> {
        let saved = (self.state.last_turn, self.state.dist);
        self.state.last_turn = at;
        self.state.dist = 0.0;

        if let Some(hit) = world.test(&self.state.bbox()) {
            (self.state.last_turn, self.state.dist) = saved;
            return Err(hit);
        }
        Ok(())
    }

    /// Point the robot along `heading` without animating. Only valid when idle.
    pub fn set_heading(&mut self, heading: f32) -> Result<(), MoveError> {
        if self.pending.is_some() {
            return Err(MoveError::Busy);
        }
        self.state.last_turn = self.state.position();
        self.state.dist = 0.0;
        self.state.heading = heading;
        Ok(())
    }
}
