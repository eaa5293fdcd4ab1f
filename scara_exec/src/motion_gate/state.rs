//! Implementations for the MotionGate state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace, warn};
use std::time::Duration;
use tokio::{
    sync::mpsc,
    time::{self, Instant},
};

// Internal
use super::{Actuator, MotionGateError, Params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Waits for an actuator to arrive at commanded positions, one at a time.
#[derive(Debug, Default)]
pub struct MotionGate {
    params: Params,

    state: GateState,
}

/// A single motion command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionCmd {
    /// Units: position units
    pub target: f64,

    /// Units: position units/s^2
    pub acceleration: f64,

    /// Units: position units/s
    pub velocity_limit: f64,
}

/// Information about a completed motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    /// The target actually commanded, after any extension of short moves.
    pub target: f64,

    /// The position reported when arrival was detected.
    pub position: f64,

    /// Time from commanding the target to arrival.
    pub elapsed: Duration,
}

/// Detaches the actuator's listener when dropped.
struct ListenerGuard<'a, A: Actuator> {
    actuator: &'a mut A,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// State of the gate's most recent command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No command has been issued yet.
    Idle,

    /// A command is in flight, or the wait for it was cancelled.
    Waiting,

    Resolved,

    TimedOut,

    /// The listener was removed by someone else while waiting.
    Detached,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionGate {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            state: GateState::Idle,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Command the actuator to a new target and wait until it arrives.
    ///
    /// Targets closer to the current position than the arrival tolerance are
    /// extended to exactly the tolerance, so that the actuator always moves
    /// and reports its position. A timed out command is not retried.
    pub async fn await_arrival<A: Actuator>(
        &mut self,
        actuator: &mut A,
        cmd: MotionCmd,
    ) -> Result<Arrival, MotionGateError> {
        self.state = GateState::Waiting;

        actuator.set_acceleration(cmd.acceleration);
        actuator.set_velocity_limit(cmd.velocity_limit);

        let current = actuator.position();
        let target = self.extend_short_move(current, cmd.target);

        // Install the listener before commanding the target so no update is
        // missed
        let (tx, mut rx) = mpsc::unbounded_channel();
        actuator.set_position_listener(Some(Box::new(move |pos| {
            // The receiver is gone once the gate has settled
            let _ = tx.send(pos);
        })));
        let guard = ListenerGuard { actuator };

        guard.actuator.set_target_position(target);

        debug!(
            "Moving from {:.3} to {:.3} (requested {:.3})",
            current, target, cmd.target
        );

        let start = Instant::now();
        let window = time::sleep(Duration::from_millis(self.params.window_ms));
        tokio::pin!(window);

        let result = loop {
            tokio::select! {
                update = rx.recv() => match update {
                    Some(position) if self.is_arrived(position, target) => {
                        break Ok(Arrival {
                            target,
                            position,
                            elapsed: start.elapsed(),
                        });
                    }
                    Some(position) => trace!("Position {:.3}, target {:.3}", position, target),
                    None => break Err(MotionGateError::ListenerClosed { target }),
                },
                _ = &mut window => {
                    break Err(MotionGateError::TimedOut {
                        target,
                        window_ms: self.params.window_ms,
                    });
                }
            }
        };

        drop(guard);

        self.state = match result {
            Ok(arrival) => {
                debug!("Arrived at {:.3} after {:?}", arrival.position, arrival.elapsed);
                GateState::Resolved
            }
            Err(MotionGateError::TimedOut { .. }) => {
                warn!("Timed out moving to {:.3}", target);
                GateState::TimedOut
            }
            Err(MotionGateError::ListenerClosed { .. }) => {
                warn!("Listener detached while moving to {:.3}", target);
                GateState::Detached
            }
        };

        result
    }

    fn extend_short_move(&self, current: f64, target: f64) -> f64 {
        let tol = self.params.arrival_tolerance;

        if (target - current).abs() < tol {
            let extended = if target > current {
                current + tol
            } else {
                current - tol
            };
            trace!("Short move to {:.3} extended to {:.3}", target, extended);
            extended
        } else {
            target
        }
    }

    fn is_arrived(&self, position: f64, target: f64) -> bool {
        (position - target).abs() < self.params.arrival_tolerance
    }
}

impl Default for GateState {
    fn default() -> Self {
        GateState::Idle
    }
}

impl<'a, A: Actuator> Drop for ListenerGuard<'a, A> {
    fn drop(&mut self) {
        self.actuator.set_position_listener(None);
    }
}
