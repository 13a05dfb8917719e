//! Rock Rover - a robot on a rocky field, driven by control code on another thread
//!
//! Core modules:
//! - `sim`: Simulation (collision shapes, robot kinematics, world state, tick)
//! - `protocol`: Commands and responses, plus their `(tag, payload)` wire form
//! - `driver`: Bounded command/response channel between the control thread and the simulation
//! - `renderer`: Software frame buffer used for screenshots
//! - `runner`: Fixed-rate simulation loop
//! - `settings`: Data-driven configuration

pub mod driver;
pub mod error;
pub mod protocol;
pub mod renderer;
pub mod runner;
pub mod settings;
pub mod sim;

pub use driver::{ControlHandle, Driver, PendingScreenshot, channel};
pub use error::{ConfigError, DriverError, MoveError, ProtocolError, SimError};
pub use protocol::{Command, Response};
pub use renderer::{FrameBuffer, Screenshot};
pub use settings::SimConfig;
pub use sim::Simulation;

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Target simulation rate
    pub const TICK_HZ: u32 = 60;

    /// Field dimensions, centered on the origin
    pub const FIELD_WIDTH: f32 = 720.0;
    pub const FIELD_HEIGHT: f32 = 720.0;

    /// Robot defaults
    pub const ROBOT_RADIUS: f32 = 12.0;
    pub const ROBOT_SPEED: f32 = 1.0; // units per tick
    pub const PICK_RADIUS: f32 = 12.0;

    /// Rock defaults
    pub const ROCK_COUNT: usize = 24;
    pub const ROCK_RADII: [f32; 3] = [12.0, 18.0, 24.0];
    /// A rock is in reach when its center is within `pick_radius + rock radius * PICK_REACH`
    pub const PICK_REACH: f32 = 1.2;

    /// Depth of the command and response queues
    pub const CHANNEL_CAPACITY: usize = 2;
}

/// Unit vector along `heading` (radians, counter-clockwise from +x)
#[inline]
pub fn heading_vector(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin())
}
