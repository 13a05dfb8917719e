//! RGB8 frame buffer and screenshots

use super::shapes::{self, Rgb};
use crate::heading_vector;
use crate::sim::Simulation;

pub const GRASS: Rgb = [86, 148, 64];
pub const BARRIER: Rgb = [120, 82, 45];
pub const ROCK: Rgb = [140, 140, 136];
pub const ROBOT: Rgb = [40, 90, 200];
pub const ROBOT_NOSE: Rgb = [240, 240, 240];

/// Canvas the size of the field. Pixels are stored row by row, top row first.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let mut frame = Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 3],
        };
        frame.clear(GRASS);
        frame
    }

    /// A buffer matching the simulation's field size
    pub fn for_simulation(sim: &Simulation) -> Self {
        let config = sim.config();
        Self::new(config.field_width.ceil() as u32, config.field_height.ceil() as u32)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: Rgb) {
        for px in self.data.chunks_exact_mut(3) {
            px.copy_from_slice(&color);
        }
    }

    /// Pixel at column `x`, row `y` (row 0 is the top of the field)
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    pub(crate) fn put(&mut self, x: u32, y: u32, color: Rgb) {
        if x < self.width && y < self.height {
            let i = (y as usize * self.width as usize + x as usize) * 3;
            self.data[i..i + 3].copy_from_slice(&color);
        }
    }

    /// Repaint the whole field
    pub fn draw(&mut self, sim: &Simulation) {
        self.clear(GRASS);

        for barrier in sim.barriers() {
            shapes::fill_rect(self, &barrier.aabb, BARRIER);
        }
        for rock in sim.rocks() {
            shapes::fill_disc(self, rock.center, rock.radius, ROCK);
        }

        let robot = sim.robot();
        shapes::fill_rect(self, &robot.bbox(), ROBOT);
        let radius = robot.state().bbox_radius;
        let nose = robot.position() + heading_vector(robot.heading()) * radius * 0.6;
        shapes::fill_disc(self, nose, (radius * 0.25).max(1.0), ROBOT_NOSE);
    }

    /// Copy the current frame with axis 0 horizontal
    pub fn screenshot(&self) -> Screenshot {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut data = vec![0; w * h * 3];
        for y in 0..h {
            for x in 0..w {
                let src = (y * w + x) * 3;
                let dst = (x * h + y) * 3;
                data[dst..dst + 3].copy_from_slice(&self.data[src..src + 3]);
            }
        }
        Screenshot {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// A captured frame, laid out as a `[width][height][3]` array: the first
/// index is the column, so `data[(x * height + y) * 3 + channel]`. Channels
/// are RGB; any reordering is up to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Screenshot {
    /// Shape as `(axis0, axis1, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width as usize, self.height as usize, 3)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (x as usize * self.height as usize + y as usize) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BarrierSpec, SimConfig};
    use glam::Vec2;

    fn sim() -> Simulation {
        Simulation::empty(SimConfig {
            field_width: 100.0,
            field_height: 80.0,
            rock_count: 0,
            barriers: vec![BarrierSpec {
                x: -40.0,
                y: 30.0,
                width: 10.0,
                height: 10.0,
            }],
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_draw_places_objects() {
        let mut sim = sim();
        sim.add_rock(Vec2::new(30.0, -20.0), 6.0).unwrap();
        let mut frame = FrameBuffer::for_simulation(&sim);
        frame.draw(&sim);

        assert_eq!((frame.width(), frame.height()), (100, 80));
        // Robot body at the field center, just behind the nose
        assert_eq!(frame.pixel(44, 40), Some(ROBOT));
        // Barrier in the top-left (y up in the world, down in pixels)
        assert_eq!(frame.pixel(10, 10), Some(BARRIER));
        // Rock in the bottom-right
        assert_eq!(frame.pixel(80, 60), Some(ROCK));
        // Empty grass
        assert_eq!(frame.pixel(2, 78), Some(GRASS));
        assert_eq!(frame.pixel(100, 0), None);
    }

    #[test]
    fn test_screenshot_is_column_major() {
        let mut frame = FrameBuffer::new(4, 3);
        frame.put(3, 0, ROCK);
        let shot = frame.screenshot();
        assert_eq!(shot.shape(), (4, 3, 3));
        assert_eq!(shot.data.len(), 36);
        assert_eq!(shot.pixel(3, 0), Some(ROCK));
        assert_eq!(&shot.data[(3 * 3) * 3..(3 * 3) * 3 + 3], &ROCK);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(shot.pixel(x, y), frame.pixel(x, y));
            }
        }
    }
}
