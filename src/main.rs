//! Rock Rover entry point
//!
//! Runs the simulation on the main thread and a scripted control routine on
//! a second thread. Pass a JSON settings file as the only argument to
//! override the defaults.

use std::path::Path;
use std::thread;

use anyhow::{Context, Result};
use serde_json::{Value, json};

use rock_rover::{Command, ControlHandle, FrameBuffer, SimConfig, Simulation, channel, runner};

/// Wire-form commands for the demo routine: sweep a square, picking at each corner
fn demo_route() -> Vec<(&'static str, Value)> {
    let quarter = std::f32::consts::FRAC_PI_2;
    let mut route = Vec::new();
    for _ in 0..4 {
        route.push(("fwd", json!({ "dist": 120.0 })));
        route.push(("pick", json!({})));
        route.push(("turn", json!({ "angle": quarter })));
    }
    route
}

fn drive(control: ControlHandle) -> Result<()> {
    for (tag, payload) in demo_route() {
        let command = Command::from_wire(tag, &payload)?;
        let response = control.call(command)?;
        let (tag, payload) = response.to_wire();
        log::info!("{} -> {}", tag, payload);
    }

    let shot = control.request_screenshot()?;
    log::info!("Screenshot captured: {:?}", shot.shape());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Rock Rover starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(Path::new(&path))?,
        None => SimConfig::default(),
    };
    let tick_hz = config.tick_hz;
    let (control, mut driver) = channel(config.channel_capacity);

    let mut sim = Simulation::new(config).context("failed to build the field")?;
    let mut frame = FrameBuffer::for_simulation(&sim);

    let controller = thread::Builder::new()
        .name("rock-rover-control".into())
        .spawn(move || drive(control))
        .context("failed to spawn control thread")?;

    runner::run(&mut sim, &mut driver, &mut frame, tick_hz, |_| {
        controller.is_finished()
    });

    match controller.join() {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("control thread panicked"),
    }

    log::info!(
        "Done after {} ticks: {} rocks picked, {} left",
        sim.ticks(),
        sim.picked(),
        sim.rocks().len()
    );
    Ok(())
}
