//! Simulated stepper executable.
//!
//! Moves the simulated stepper through the list of targets in
//! `stepper.toml`, waiting for each move to complete through the motion gate
//! before starting the next. Timed out moves are logged and skipped.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use serde::Deserialize;

// Internal
use scara_lib::{
    motion_gate::{self, Actuator, MotionCmd, MotionGate, MotionGateError},
    stepper_sim::{self, SimStepper},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the stepper executable.
#[derive(Debug, Deserialize)]
struct Params {
    stepper: stepper_sim::Params,

    #[serde(default)]
    gate: motion_gate::Params,

    /// Units: position units/s^2
    acceleration: f64,

    /// Units: position units/s
    velocity_limit: f64,

    /// Targets visited in order.
    targets: Vec<f64>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("stepper_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("SCARA Simulated Stepper Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: Params =
        util::params::load("stepper.toml").wrap_err("Could not load stepper params")?;

    info!(
        "Exec parameters loaded, {} targets, window {} ms",
        params.targets.len(),
        params.gate.window_ms
    );

    // ---- INITIALISE STEPPER ----

    let mut stepper = SimStepper::new(&params.stepper);
    let ticker = stepper.spawn(&params.stepper);

    let mut gate = MotionGate::new(params.gate);

    // ---- MAIN LOOP ----

    let mut num_timed_out = 0;

    for &target in &params.targets {
        let cmd = MotionCmd {
            target,
            acceleration: params.acceleration,
            velocity_limit: params.velocity_limit,
        };

        match gate.await_arrival(&mut stepper, cmd).await {
            Ok(arrival) => info!(
                "Arrived at {:.3} (target {:.3}) in {:.3} s",
                arrival.position,
                arrival.target,
                arrival.elapsed.as_secs_f64()
            ),
            Err(e @ MotionGateError::TimedOut { .. }) => {
                warn!("{}, now at {:.3}", e, stepper.position());
                num_timed_out += 1;
            }
            Err(e) => return Err(e).wrap_err("Motion gate failed"),
        }
    }

    ticker.abort();

    info!(
        "Visited {} targets, {} timed out",
        params.targets.len(),
        num_timed_out
    );
    info!("End of execution");

    Ok(())
}
