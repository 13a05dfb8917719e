//! Fixed-rate simulation loop
//!
//! Draws the frame, updates the driver once, then sleeps for whatever is
//! left of the tick. A tick that overruns its budget is not made up for:
//! the loop just starts the next one immediately.

use std::thread;
use std::time::{Duration, Instant};

use crate::driver::Driver;
use crate::renderer::FrameBuffer;
use crate::sim::Simulation;

/// Totals for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    /// Ticks that took longer than the tick budget
    pub overruns: u64,
}

/// Tick `sim` at `tick_hz` until `stop` returns true (checked before every tick)
pub fn run(
    sim: &mut Simulation,
    driver: &mut Driver,
    frame: &mut FrameBuffer,
    tick_hz: u32,
    mut stop: impl FnMut(&Simulation) -> bool,
) -> RunStats {
    let budget = Duration::from_secs_f64(1.0 / f64::from(tick_hz.max(1)));
    let mut stats = RunStats::default();

    while !stop(sim) {
        let started = Instant::now();

        frame.draw(sim);
        driver.update(sim, frame);
        stats.ticks += 1;

        let elapsed = started.elapsed();
        if let Some(remaining) = budget.checked_sub(elapsed) {
            thread::sleep(remaining);
        } else {
            stats.overruns += 1;
            log::debug!("tick {} overran budget: {:?}", sim.ticks(), elapsed);
        }
    }

    log::info!(
        "Run finished after {} ticks ({} overruns)",
        stats.ticks,
        stats.overruns
    );
    stats
}
