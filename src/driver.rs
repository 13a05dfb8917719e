//! Command channel between a control thread and the simulation thread
//!
//! [`channel`] returns two halves:
//! - [`ControlHandle`] lives on the control thread. It sends commands,
//!   reads responses, and requests screenshots.
//! - [`Driver`] lives on the simulation thread and is updated once per tick.
//!
//! Both queues are bounded. A control thread that runs ahead blocks in
//! [`ControlHandle::send_command`] until the simulation catches up. The
//! simulation side never blocks: replies that do not fit in the response
//! queue wait in a local outbox, and no new command is taken until the
//! outbox has drained.
//!
//! Screenshots use a one-shot rendezvous: each request carries its own
//! single-slot reply channel, and only one request may be outstanding.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};

use crate::error::DriverError;
use crate::protocol::{Command, Response};
use crate::renderer::{FrameBuffer, Screenshot};
use crate::sim::{Simulation, tick};

type ScreenshotReply = SyncSender<Screenshot>;

/// Create a connected control/driver pair with queues of `capacity` (at least 1)
pub fn channel(capacity: usize) -> (ControlHandle, Driver) {
    let capacity = capacity.max(1);
    let (command_tx, command_rx) = mpsc::sync_channel(capacity);
    let (response_tx, response_rx) = mpsc::sync_channel(capacity);
    let (screenshot_tx, screenshot_rx) = mpsc::sync_channel(1);
    let screenshot_pending = Arc::new(AtomicBool::new(false));

    let control = ControlHandle {
        commands: command_tx,
        responses: response_rx,
        screenshots: screenshot_tx,
        screenshot_pending,
    };
    let driver = Driver {
        commands: command_rx,
        responses: response_tx,
        screenshots: screenshot_rx,
        outbox: VecDeque::with_capacity(2),
        control_gone: false,
    };
    (control, driver)
}

/// Control-thread half of the channel
#[derive(Debug)]
pub struct ControlHandle {
    commands: SyncSender<Command>,
    responses: Receiver<Response>,
    screenshots: SyncSender<ScreenshotReply>,
    screenshot_pending: Arc<AtomicBool>,
}

impl ControlHandle {
    /// Queue a command, blocking while the command queue is full
    pub fn send_command(&self, command: Command) -> Result<(), DriverError> {
        self.commands
            .send(command)
            .map_err(|_| DriverError::Disconnected)
    }

    /// Next response. With `wait` this blocks until one arrives (no timeout);
    /// without it, `Ok(None)` means nothing is ready yet.
    pub fn get_response(&self, wait: bool) -> Result<Option<Response>, DriverError> {
        if wait {
            return self
                .responses
                .recv()
                .map(Some)
                .map_err(|_| DriverError::Disconnected);
        }
        match self.responses.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(DriverError::Disconnected),
        }
    }

    /// Send a command and wait for its response
    pub fn call(&self, command: Command) -> Result<Response, DriverError> {
        self.send_command(command)?;
        self.get_response(true)?.ok_or(DriverError::Disconnected)
    }

    /// Ask the simulation thread for the next frame. Fails if a previous
    /// request is still outstanding.
    pub fn begin_screenshot(&self) -> Result<PendingScreenshot, DriverError> {
        if self
            .screenshot_pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DriverError::ScreenshotInFlight);
        }

        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        let pending = PendingScreenshot {
            reply: reply_rx,
            in_flight: Arc::clone(&self.screenshot_pending),
        };
        // On failure `pending` is dropped, which clears the flag again.
        // A full slot means an abandoned request has not been drained yet.
        match self.screenshots.try_send(reply_tx) {
            Ok(()) => Ok(pending),
            Err(TrySendError::Full(_)) => Err(DriverError::ScreenshotInFlight),
            Err(TrySendError::Disconnected(_)) => Err(DriverError::Disconnected),
        }
    }

    /// Request a screenshot and block until the simulation thread delivers it
    pub fn request_screenshot(&self) -> Result<Screenshot, DriverError> {
        self.begin_screenshot()?.wait()
    }
}

/// An outstanding screenshot request. Dropping it cancels interest in the
/// result and allows a new request.
#[derive(Debug)]
pub struct PendingScreenshot {
    reply: Receiver<Screenshot>,
    in_flight: Arc<AtomicBool>,
}

impl PendingScreenshot {
    /// Block until the frame is captured
    pub fn wait(self) -> Result<Screenshot, DriverError> {
        self.reply.recv().map_err(|_| DriverError::Disconnected)
    }

    /// The frame, if it has been captured already
    pub fn try_take(&self) -> Result<Option<Screenshot>, DriverError> {
        match self.reply.try_recv() {
            Ok(shot) => Ok(Some(shot)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(DriverError::Disconnected),
        }
    }
}

impl Drop for PendingScreenshot {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Simulation-thread half of the channel
#[derive(Debug)]
pub struct Driver {
    commands: Receiver<Command>,
    responses: SyncSender<Response>,
    screenshots: Receiver<ScreenshotReply>,
    /// Replies waiting for room in the response queue
    outbox: VecDeque<Response>,
    control_gone: bool,
}

impl Driver {
    /// Run one simulation tick: take at most one command, advance the
    /// simulation, publish replies, and serve a pending screenshot from `frame`.
    pub fn update(&mut self, sim: &mut Simulation, frame: &FrameBuffer) {
        self.flush();

        let command = if self.outbox.is_empty() {
            self.next_command()
        } else {
            None
        };

        self.outbox.extend(tick(sim, command));
        self.flush();

        match self.screenshots.try_recv() {
            Ok(reply) => {
                // A dropped PendingScreenshot just means nobody is waiting
                if reply.try_send(frame.screenshot()).is_ok() {
                    log::debug!("Screenshot delivered at tick {}", sim.ticks());
                }
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
        }
    }

    /// Replies produced but not yet accepted by the response queue
    pub fn backlog(&self) -> usize {
        self.outbox.len()
    }

    /// Has the control half been dropped?
    pub fn is_disconnected(&self) -> bool {
        self.control_gone
    }

    fn next_command(&mut self) -> Option<Command> {
        match self.commands.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.mark_disconnected();
                None
            }
        }
    }

    fn flush(&mut self) {
        while let Some(response) = self.outbox.pop_front() {
            match self.responses.try_send(response) {
                Ok(()) => {}
                Err(TrySendError::Full(response)) => {
                    self.outbox.push_front(response);
                    break;
                }
                Err(TrySendError::Disconnected(_)) => {
                    self.mark_disconnected();
                    self.outbox.clear();
                    break;
                }
            }
        }
    }

    fn mark_disconnected(&mut self) {
        if !self.control_gone {
            log::warn!("Control thread disconnected; running without commands");
            self.control_gone = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ErrorTag, ForwardReply, PickReply};
    use crate::settings::SimConfig;

    fn setup() -> (ControlHandle, Driver, Simulation, FrameBuffer) {
        let sim = Simulation::empty(SimConfig {
            rock_count: 0,
            field_width: 64.0,
            field_height: 48.0,
            ..Default::default()
        })
        .unwrap();
        let frame = FrameBuffer::for_simulation(&sim);
        let (control, driver) = channel(2);
        (control, driver, sim, frame)
    }

    #[test]
    fn test_get_response_without_wait_is_nonblocking() {
        let (control, _driver, _sim, _frame) = setup();
        assert_eq!(control.get_response(false), Ok(None));
    }

    #[test]
    fn test_one_command_per_tick() {
        let (control, mut driver, mut sim, frame) = setup();
        control.send_command(Command::Pick).unwrap();
        control.send_command(Command::Pick).unwrap();

        driver.update(&mut sim, &frame);
        assert_eq!(
            control.get_response(false),
            Ok(Some(Response::Pick(PickReply { n: 0 })))
        );
        assert_eq!(control.get_response(false), Ok(None));

        driver.update(&mut sim, &frame);
        assert!(control.get_response(false).unwrap().is_some());
    }

    #[test]
    fn test_second_move_rejected_immediately() {
        let (control, mut driver, mut sim, frame) = setup();
        control.send_command(Command::Forward { dist: 5.0 }).unwrap();
        driver.update(&mut sim, &frame);
        control.send_command(Command::Forward { dist: 5.0 }).unwrap();
        driver.update(&mut sim, &frame);

        let rejected = control.get_response(false).unwrap().unwrap();
        assert_eq!(
            rejected,
            Response::Forward(ForwardReply {
                s: false,
                d: 0.0,
                e: Some(ErrorTag::AlreadyMoving),
                c: None
            })
        );

        for _ in 0..3 {
            driver.update(&mut sim, &frame);
        }
        let done = control.get_response(false).unwrap().unwrap();
        assert!(done.success());
        assert_eq!(sim.robot().state().dist, 5.0);
    }

    #[test]
    fn test_full_response_queue_holds_commands_back() {
        let (control, mut driver, mut sim, frame) = setup();
        // Nobody reads responses: two fill the queue, the third waits in the outbox
        for _ in 0..2 {
            control.send_command(Command::Pick).unwrap();
            driver.update(&mut sim, &frame);
        }
        control.send_command(Command::Pick).unwrap();
        driver.update(&mut sim, &frame);
        assert_eq!(driver.backlog(), 1);

        // With a backlog, queued commands stay queued
        control.send_command(Command::Pick).unwrap();
        control.send_command(Command::Pick).unwrap();
        driver.update(&mut sim, &frame);
        assert_eq!(driver.backlog(), 1);

        // Draining one response lets the backlog move and one command through
        control.get_response(false).unwrap().unwrap();
        driver.update(&mut sim, &frame);
        assert_eq!(driver.backlog(), 1);
    }

    #[test]
    fn test_screenshot_rendezvous() {
        let (control, mut driver, mut sim, mut frame) = setup();
        let pending = control.begin_screenshot().unwrap();
        assert_eq!(
            control.begin_screenshot().unwrap_err(),
            DriverError::ScreenshotInFlight
        );
        assert_eq!(pending.try_take(), Ok(None));

        frame.draw(&sim);
        driver.update(&mut sim, &frame);
        let shot = pending.wait().unwrap();
        assert_eq!(shot.shape(), (64, 48, 3));
        assert_eq!(shot, frame.screenshot());

        // Collected, so a new request is allowed
        drop(control.begin_screenshot().unwrap());
        // The abandoned request occupies the slot until the next tick
        assert_eq!(
            control.begin_screenshot().unwrap_err(),
            DriverError::ScreenshotInFlight
        );
        driver.update(&mut sim, &frame);
        assert!(control.begin_screenshot().is_ok());
    }

    #[test]
    fn test_dropped_driver_disconnects_control() {
        let (control, driver, _sim, _frame) = setup();
        drop(driver);
        assert_eq!(
            control.send_command(Command::Pick),
            Err(DriverError::Disconnected)
        );
        assert_eq!(control.get_response(true), Err(DriverError::Disconnected));
        assert_eq!(
            control.request_screenshot().unwrap_err(),
            DriverError::Disconnected
        );
    }

    #[test]
    fn test_dropped_control_keeps_simulation_running() {
        let (control, mut driver, mut sim, frame) = setup();
        control.send_command(Command::Forward { dist: 3.0 }).unwrap();
        drop(control);
        for _ in 0..5 {
            driver.update(&mut sim, &frame);
        }
        assert!(driver.is_disconnected());
        assert_eq!(sim.robot().state().dist, 3.0);
    }
}
