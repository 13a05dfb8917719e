//! Fixed timestep simulation tick
//!
//! One call consumes at most one command, advances the robot once, and
//! returns every response produced on this tick (at most two: an immediate
//! reply to the command and the result of a move that just finished).

use super::state::Simulation;
use crate::protocol::{Command, PickReply, Response};

/// Advance the simulation by one tick
pub fn tick(sim: &mut Simulation, command: Option<Command>) -> Vec<Response> {
    let mut responses = Vec::with_capacity(2);

    if let Some(command) = command {
        log::debug!("tick {}: {:?}", sim.ticks(), command);
        let outcome = match command {
            Command::Forward { dist } => sim.begin_forward(dist).map(|_| None),
            Command::Turn { angle } => sim.begin_turn(angle).map(|_| None),
            Command::Pick => sim
                .pick()
                .map(|n| Some(Response::Pick(PickReply { n }))),
        };
        match outcome {
            Ok(Some(immediate)) => responses.push(immediate),
            Ok(None) => {}
            Err(err) => responses.push(Response::rejected(&command, err)),
        }
    }

    if let Some(result) = sim.advance() {
        responses.push(Response::from(result));
    }

    responses
}
