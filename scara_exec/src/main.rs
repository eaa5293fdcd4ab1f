//! Main SCARA arm animation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and modules
//!     - For each requested repeat:
//!         - Animate either the configured shape or a chain of random lines
//!         - Write the animation as a GIF into the session directory
//!         - Archive the joint angles of each frame
//!         - Write a JSON report of the run
//!
//! # Usage
//!
//!     scara_exec [--repeat N] shape
//!     scara_exec [--repeat N] random --lines N

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info};
use std::{fs::File, io::BufWriter};
use structopt::StructOpt;

// Internal
use scara_lib::{
    anim_ctrl::{self, AnimCtrl, AnimReport, CanvasRenderer, GifSink},
    arm_ctrl::ArmCtrl,
    Point2D,
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Animate a SCARA arm drawing with a pen.
#[derive(Debug, StructOpt)]
#[structopt(name = "scara_exec")]
struct Opts {
    /// Number of separate animations to produce.
    #[structopt(short, long, default_value = "1")]
    repeat: usize,

    /// Don't archive the joint angles of each frame.
    #[structopt(long)]
    no_archive: bool,

    #[structopt(subcommand)]
    mode: Mode,
}

#[derive(Debug, StructOpt)]
enum Mode {
    /// Trace the shape given in the animation parameters.
    Shape,

    /// Draw a continuous chain of random lines, some of them with the pen up.
    Random {
        /// Number of lines in the chain.
        #[structopt(short, long, default_value = "10")]
        lines: usize,
    },
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("scara_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("SCARA Arm Animation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut arm_ctrl = ArmCtrl::default();
    arm_ctrl
        .init("arm_ctrl.toml", &session)
        .wrap_err("Failed to initialise ArmCtrl")?;
    info!("ArmCtrl init complete");

    let anim_params: anim_ctrl::Params =
        util::params::load("anim_ctrl.toml").wrap_err("Could not load AnimCtrl params")?;

    let shape: Vec<Point2D> = anim_params
        .shape
        .iter()
        .map(|p| Point2D::new(p[0], p[1]))
        .collect();
    let shape_closed = anim_params.shape_closed;

    let mut anim_ctrl =
        AnimCtrl::new(anim_params, arm_ctrl).wrap_err("Failed to initialise AnimCtrl")?;
    info!("AnimCtrl init complete");

    info!("Module initialisation complete\n");

    if let Mode::Shape = opts.mode {
        if shape.len() < 2 {
            return Err(eyre!(
                "Expected at least 2 shape vertices in anim_ctrl.toml, found {}",
                shape.len()
            ));
        }
    }

    // ---- MAIN LOOP ----

    for i in 0..opts.repeat {
        let name = match opts.mode {
            Mode::Shape => format!("shape_{:03}", i),
            Mode::Random { .. } => format!("random_{:03}", i),
        };

        info!("Animating {}", name);

        if !opts.no_archive {
            anim_ctrl
                .enable_archive(&session, format!("anim_ctrl/{}.csv", name))
                .wrap_err("Failed to create the frame archive")?;
        }

        let mut renderer = CanvasRenderer::new(anim_ctrl.params().canvas.clone());
        let mut sink = GifSink::create(
            session.output_path(format!("{}.gif", name)),
            anim_ctrl.params().frame_delay_ms,
        )
        .wrap_err("Failed to create the GIF")?;

        let report = match opts.mode {
            Mode::Shape => anim_ctrl.animate_path(&shape, shape_closed, &mut renderer, &mut sink),
            Mode::Random { lines } => anim_ctrl.animate_random(lines, &mut renderer, &mut sink),
        }
        .wrap_err_with(|| format!("Failed to animate {}", name))?;

        write_report(&session, &name, &report)?;
    }

    info!("End of execution");

    Ok(())
}

/// Write the report of one animation as JSON into the session directory.
fn write_report(session: &Session, name: &str, report: &AnimReport) -> Result<(), Report> {
    let path = session.output_path(format!("{}.json", name));

    let file = File::create(&path).wrap_err_with(|| format!("Failed to create {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .wrap_err("Failed to serialise the report")?;

    info!(
        "{}: {} frames, {} waypoints skipped, {} trace segments",
        name, report.frames, report.waypoints_skipped, report.segments_traced
    );

    Ok(())
}
