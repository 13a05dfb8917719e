//! Simulation settings
//!
//! Loaded from an optional JSON file; any field left out falls back to the
//! defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// A fixed rectangular obstacle, in field coordinates (origin at the center, y up)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrierSpec {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Everything needed to build a [`crate::sim::Simulation`] and drive it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,
    /// Obstacles, inserted into the collision set in this order
    pub barriers: Vec<BarrierSpec>,

    // === Robot ===
    /// Half extent of the robot's square bounding box
    pub robot_radius: f32,
    /// Units per tick
    pub robot_speed: f32,
    pub pick_radius: f32,
    pub start_x: f32,
    pub start_y: f32,
    /// Radians
    pub start_heading: f32,

    // === Rocks ===
    pub rock_count: usize,
    /// Each rock draws its radius from this list
    pub rock_radii: Vec<f32>,
    /// Seed for rock scattering
    pub seed: u64,
    /// Draws per rock before giving up on finding a free spot
    pub max_placement_attempts: u32,

    // === Driver ===
    /// Bound on both the command and the response queue
    pub channel_capacity: usize,
    pub tick_hz: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            barriers: Vec::new(),

            robot_radius: ROBOT_RADIUS,
            robot_speed: ROBOT_SPEED,
            pick_radius: PICK_RADIUS,
            start_x: 0.0,
            start_y: 0.0,
            start_heading: 0.0,

            rock_count: ROCK_COUNT,
            rock_radii: ROCK_RADII.to_vec(),
            seed: 0x5eed,
            max_placement_attempts: 1_000,

            channel_capacity: CHANNEL_CAPACITY,
            tick_hz: TICK_HZ,
        }
    }
}

impl SimConfig {
    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        }

        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;
        positive("robot_radius", self.robot_radius)?;
        positive("robot_speed", self.robot_speed)?;
        if !(self.pick_radius.is_finite() && self.pick_radius >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pick_radius must not be negative, got {}",
                self.pick_radius
            )));
        }
        if self.rock_count > 0 && self.rock_radii.is_empty() {
            return Err(ConfigError::Invalid(
                "rock_radii must not be empty when rocks are requested".into(),
            ));
        }
        for radius in &self.rock_radii {
            positive("rock radius", *radius)?;
        }
        for barrier in &self.barriers {
            positive("barrier width", barrier.width)?;
            positive("barrier height", barrier.height)?;
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be at least 1".into()));
        }
        if self.tick_hz == 0 {
            return Err(ConfigError::Invalid("tick_hz must be at least 1".into()));
        }
        Ok(())
    }
}
