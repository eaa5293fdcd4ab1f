//! # Simulated stepper
//!
//! A single axis actuator moved by a background tokio task at a fixed tick.
//! Each tick the velocity ramps toward the velocity limit at the commanded
//! acceleration, and back down again so as to stop on the target. Whenever a
//! tick changes the position the listener, if any, is notified.
//!
//! The listener is called without the motor locked, so it may use any handle
//! to the same stepper, including replacing or clearing itself.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Deserialize;
use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};
use tokio::{task::JoinHandle, time};

// Internal
use crate::motion_gate::{Actuator, PositionListener};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulated stepper.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Params {
    /// Units: milliseconds
    pub tick_period_ms: u64,

    /// Units: position units
    #[serde(default)]
    pub initial_position: f64,
}

/// Handle to a simulated stepper. Clones share the same motor.
#[derive(Clone)]
pub struct SimStepper {
    inner: Arc<Mutex<Motor>>,
}

struct Motor {
    position: f64,
    velocity: f64,
    target: f64,
    acceleration: f64,
    velocity_limit: f64,
    listener: Option<PositionListener>,

    /// Incremented each time the listener is set or cleared.
    listener_generation: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimStepper {
    /// Create a new stepper at rest. It does not move until [`SimStepper::spawn`]
    /// starts its tick task.
    pub fn new(params: &Params) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Motor {
                position: params.initial_position,
                velocity: 0.0,
                target: params.initial_position,
                acceleration: 0.0,
                velocity_limit: 0.0,
                listener: None,
                listener_generation: 0,
            })),
        }
    }

    /// Start the task which moves the motor, ticking every `tick_period_ms`.
    ///
    /// The task ends once every handle to the stepper has been dropped.
    pub fn spawn(&self, params: &Params) -> JoinHandle<()> {
        let motor: Weak<Mutex<Motor>> = Arc::downgrade(&self.inner);
        let period = Duration::from_millis(params.tick_period_ms.max(1));

        tokio::spawn(async move {
            let mut interval = time::interval(period);
            let dt = period.as_secs_f64();

            loop {
                interval.tick().await;

                let strong = match motor.upgrade() {
                    Some(m) => m,
                    None => break,
                };

                let (position, generation, listener) = {
                    let mut motor = lock(&strong);
                    if !motor.step(dt) {
                        continue;
                    }
                    (motor.position, motor.listener_generation, motor.listener.take())
                };

                if let Some(mut listener) = listener {
                    listener(position);

                    // Put it back unless it was replaced or cleared during the call
                    let mut motor = lock(&strong);
                    if motor.listener_generation == generation {
                        motor.listener = Some(listener);
                    }
                }
            }

            trace!("Stepper tick task stopped");
        })
    }

    /// Current velocity.
    pub fn velocity(&self) -> f64 {
        lock(&self.inner).velocity
    }

    /// Currently commanded target.
    pub fn target(&self) -> f64 {
        lock(&self.inner).target
    }
}

impl Actuator for SimStepper {
    fn set_acceleration(&mut self, acceleration: f64) {
        lock(&self.inner).acceleration = acceleration.abs();
    }

    fn set_velocity_limit(&mut self, velocity_limit: f64) {
        lock(&self.inner).velocity_limit = velocity_limit.abs();
    }

    fn set_target_position(&mut self, target: f64) {
        lock(&self.inner).target = target;
    }

    fn position(&self) -> f64 {
        lock(&self.inner).position
    }

    fn set_position_listener(&mut self, listener: Option<PositionListener>) {
        let mut motor = lock(&self.inner);
        motor.listener = listener;
        motor.listener_generation = motor.listener_generation.wrapping_add(1);
    }
}

impl Motor {
    /// Advance the motor by `dt` seconds, returning whether it moved.
    fn step(&mut self, dt: f64) -> bool {
        let to_go = self.target - self.position;

        if to_go == 0.0 && self.velocity == 0.0 {
            return false;
        }

        // Fastest speed from which the motor can still stop on the target
        let stopping_speed = (2.0 * self.acceleration * to_go.abs()).sqrt();
        let desired = to_go.signum() * self.velocity_limit.min(stopping_speed);

        let max_dv = self.acceleration * dt;
        self.velocity += (desired - self.velocity).max(-max_dv).min(max_dv);

        let prev = self.position;
        self.position += self.velocity * dt;

        // Stop on the target rather than passing it
        if (self.target - prev) * (self.target - self.position) <= 0.0 {
            self.position = self.target;
            self.velocity = 0.0;
        }

        trace!("Stepper at {:.3}, velocity {:.3}", self.position, self.velocity);

        self.position != prev
    }
}

/// Lock the motor, recovering it if another holder panicked.
fn lock(motor: &Mutex<Motor>) -> MutexGuard<'_, Motor> {
    motor.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
