//! Rasterization of 2D primitives
//!
//! World coordinates have the origin at the field center with y up; pixel
//! rows grow downward from the top-left corner. A pixel is filled when its
//! center falls inside the shape.

use glam::Vec2;

use super::frame::FrameBuffer;
use crate::sim::Aabb;

pub type Rgb = [u8; 3];

/// World position of the center of pixel (`x`, `y`)
#[inline]
pub fn pixel_center(frame: &FrameBuffer, x: u32, y: u32) -> Vec2 {
    Vec2::new(
        x as f32 + 0.5 - frame.width() as f32 / 2.0,
        frame.height() as f32 / 2.0 - y as f32 - 0.5,
    )
}

/// Pixel ranges (columns, rows) covering a world-space box, clipped to the frame
fn pixel_span(frame: &FrameBuffer, aabb: &Aabb) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
    let w = frame.width() as f32;
    let h = frame.height() as f32;
    let x0 = (aabb.left() + w / 2.0).floor().max(0.0) as u32;
    let x1 = (aabb.right() + w / 2.0).ceil().clamp(0.0, w) as u32;
    let y0 = (h / 2.0 - aabb.top()).floor().max(0.0) as u32;
    let y1 = (h / 2.0 - aabb.bottom()).ceil().clamp(0.0, h) as u32;
    (x0..x1, y0..y1)
}

pub fn fill_rect(frame: &mut FrameBuffer, aabb: &Aabb, color: Rgb) {
    let (xs, ys) = pixel_span(frame, aabb);
    for y in ys {
        for x in xs.clone() {
            let p = pixel_center(frame, x, y);
            if p.x >= aabb.left() && p.x <= aabb.right() && p.y >= aabb.bottom() && p.y <= aabb.top() {
                frame.put(x, y, color);
            }
        }
    }
}

pub fn fill_disc(frame: &mut FrameBuffer, center: Vec2, radius: f32, color: Rgb) {
    let (xs, ys) = pixel_span(frame, &Aabb::square(center, radius));
    let r2 = radius * radius;
    for y in ys {
        for x in xs.clone() {
            if pixel_center(frame, x, y).distance_squared(center) <= r2 {
                frame.put(x, y, color);
            }
        }
    }
}
