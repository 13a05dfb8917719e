//! World state
//!
//! A [`Simulation`] owns the robot, the collision set, and the rocks. It is an
//! ordinary value: tests build as many independent worlds as they like.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{Aabb, Collider, ColliderId, CompositeSet, IdSource};
use super::robot::{MoveResult, Robot, RobotState};
use crate::consts::PICK_REACH;
use crate::error::{MoveError, SimError};
use crate::settings::SimConfig;

/// A pickable rock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rock {
    pub collider: ColliderId,
    pub center: Vec2,
    pub radius: f32,
}

impl Rock {
    pub fn aabb(&self) -> Aabb {
        Aabb::square(self.center, self.radius)
    }
}

/// A fixed obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barrier {
    pub collider: ColliderId,
    pub aabb: Aabb,
}

/// Complete simulation state
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    robot: Robot,
    ids: IdSource,
    /// Boundary first, then barriers, then rocks
    collision: CompositeSet,
    rocks: Vec<Rock>,
    barriers: Vec<Barrier>,
    picked: usize,
}

impl Simulation {
    /// Build the field described by `config`, place the robot, and scatter rocks
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let mut sim = Self::empty(config)?;
        let count = sim.config.rock_count;
        sim.scatter_rocks(count)?;
        log::info!(
            "Simulation ready: {}x{} field, {} rocks, {} barriers, seed {}",
            sim.config.field_width,
            sim.config.field_height,
            sim.rocks.len(),
            sim.barriers.len(),
            sim.config.seed
        );
        Ok(sim)
    }

    /// Build the field and place the robot, without scattering rocks
    pub fn empty(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let mut ids = IdSource::new();
        let mut collision = CompositeSet::new(&mut ids);
        collision.insert(Collider::screen(&mut ids, config.field_width, config.field_height));

        let state = RobotState::new(config.robot_speed, config.robot_radius, config.pick_radius);
        let mut sim = Self {
            robot: Robot::new(state),
            ids,
            collision,
            rocks: Vec::new(),
            barriers: Vec::new(),
            picked: 0,
            config,
        };

        for spec in sim.config.barriers.clone() {
            let aabb = Aabb::new(Vec2::new(spec.x, spec.y), spec.width, spec.height);
            let collider = sim.collision.insert(Collider::barrier(&mut sim.ids, aabb));
            sim.barriers.push(Barrier { collider, aabb });
        }

        sim.place(Vec2::new(sim.config.start_x, sim.config.start_y))?;
        sim.robot.set_heading(sim.config.start_heading)?;
        Ok(sim)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn collision(&self) -> &CompositeSet {
        &self.collision
    }

    pub fn rocks(&self) -> &[Rock] {
        &self.rocks
    }

    pub fn barriers(&self) -> &[Barrier] {
        &self.barriers
    }

    /// Rocks removed by [`Simulation::pick`] so far
    pub fn picked(&self) -> usize {
        self.picked
    }

    pub fn ticks(&self) -> u64 {
        self.robot.ticks()
    }

    /// Is `aabb` free of every collider and of the robot?
    fn is_free(&self, aabb: &Aabb) -> bool {
        self.collision.test(aabb).is_none() && !aabb.overlaps(&self.robot.bbox())
    }

    /// Add a rock if the spot is free. Returns `None` when it would overlap something.
    pub fn add_rock(&mut self, center: Vec2, radius: f32) -> Option<ColliderId> {
        let aabb = Aabb::square(center, radius);
        if !self.is_free(&aabb) {
            return None;
        }
        let collider = self.collision.insert(Collider::rock(&mut self.ids, aabb));
        self.rocks.push(Rock {
            collider,
            center,
            radius,
        });
        Some(collider)
    }

    /// Add a barrier if the spot is free. Returns `None` when it would overlap something.
    pub fn add_barrier(&mut self, aabb: Aabb) -> Option<ColliderId> {
        if !self.is_free(&aabb) {
            return None;
        }
        let collider = self.collision.insert(Collider::barrier(&mut self.ids, aabb));
        self.barriers.push(Barrier { collider, aabb });
        Some(collider)
    }

    /// Scatter `count` rocks at seeded random integer positions
    fn scatter_rocks(&mut self, count: usize) -> Result<(), SimError> {
        let mut rng = Pcg32::seed_from_u64(self.config.seed);
        let half_w = (self.config.field_width / 2.0) as i32;
        let half_h = (self.config.field_height / 2.0) as i32;
        let radii = self.config.rock_radii.clone();

        for placed in 0..count {
            let radius = radii[rng.random_range(0..radii.len())];
            let mut attempts = 0;
            loop {
                let center = Vec2::new(
                    rng.random_range(-half_w..=half_w) as f32,
                    rng.random_range(-half_h..=half_h) as f32,
                );
                if self.add_rock(center, radius).is_some() {
                    break;
                }
                attempts += 1;
                if attempts >= self.config.max_placement_attempts {
                    log::warn!("Gave up placing rock {} after {} attempts", placed + 1, attempts);
                    return Err(SimError::RockPlacement {
                        placed,
                        requested: count,
                    });
                }
            }
        }
        Ok(())
    }

    /// Reposition the robot. Fails, leaving the robot where it was, if the new
    /// spot collides or a move is in flight.
    pub fn place(&mut self, at: Vec2) -> Result<(), SimError> {
        if !self.robot.is_idle() {
            return Err(MoveError::Busy.into());
        }
        self.robot.place(at, &self.collision).map_err(|hit| {
            log::warn!("Cannot place robot at ({}, {}): overlaps {}", at.x, at.y, hit.kind);
            SimError::InvalidPlacement {
                x: at.x,
                y: at.y,
                kind: hit.kind,
            }
        })
    }

    pub fn begin_forward(&mut self, distance: f32) -> Result<(), MoveError> {
        self.robot.begin_forward(distance)
    }

    pub fn begin_turn(&mut self, angle: f32) -> Result<(), MoveError> {
        self.robot.begin_turn(angle)
    }

    /// Pick up every rock in reach of the robot. Returns how many were removed.
    pub fn pick(&mut self) -> Result<usize, MoveError> {
        if !self.robot.is_idle() {
            return Err(MoveError::Busy);
        }
        let pos = self.robot.position();
        let pick_radius = self.robot.state().pick_radius;

        let mut removed = 0;
        let collision = &mut self.collision;
        self.rocks.retain(|rock| {
            let reach = pick_radius + rock.radius * PICK_REACH;
            if rock.center.distance(pos) <= reach {
                collision.remove(rock.collider);
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            self.picked += removed;
            log::info!("Picked {} rocks at ({:.1}, {:.1})", removed, pos.x, pos.y);
        }
        Ok(removed)
    }

    /// Advance the robot one tick
    pub fn advance(&mut self) -> Option<MoveResult> {
        self.robot.advance(&self.collision)
    }
}
