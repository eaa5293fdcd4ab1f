//! Implementations for the AnimCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use serde::Serialize;
use std::path::Path;

// Internal
use super::{AnimCtrlError, FrameSink, Params, Renderer, TraceSegment};
use crate::{
    arm_ctrl::{ArmCtrl, InputData, ELBOW, SHOULDER},
    traj_ctrl::{interpolate, PenScheduler, PenState},
    Point2D,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Animation control module state.
///
/// Owns everything that persists across the waypoints of one run: the trace
/// drawn so far, the last hand position and the pen scheduler. All of it is
/// reset at the start of each run.
pub struct AnimCtrl {
    params: Params,

    arm: ArmCtrl,

    pen: PenScheduler,

    sampler_rng: Box<dyn RngCore>,

    trace: Vec<TraceSegment>,

    last_position: Option<Point2D>,

    report: AnimReport,

    arch_frames: Option<Archiver>,

    last_record: Option<FrameRecord>,
}

/// Summary of one animation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnimReport {
    /// Number of frames pushed to the sink.
    pub frames: usize,

    /// Number of waypoints the arm could not reach.
    pub waypoints_skipped: usize,

    /// Number of segments in the final trace.
    pub segments_traced: usize,

    /// Number of lines (path segments) traversed with the pen down.
    pub lines_drawn: usize,

    /// Number of lines traversed with the pen up.
    pub lines_skipped: usize,

    /// Every line traversed, in order.
    pub lines: Vec<LineRecord>,
}

/// One line of a path and whether it was traced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineRecord {
    pub start: Point2D,
    pub end: Point2D,
    pub pen: PenState,
}

/// Archived record of one rendered frame.
#[derive(Debug, Clone, Copy, Serialize)]
struct FrameRecord {
    frame: usize,
    target_x: f64,
    target_y: f64,
    theta1_deg: f64,
    theta2_deg: f64,
    hand_x: f64,
    hand_y: f64,
    shoulder_limited: bool,
    elbow_limited: bool,
    pen: PenState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AnimCtrl {
    /// Create a new animation controller for the given arm.
    ///
    /// If the parameters contain a seed both the pen decisions and the random
    /// targets are reproducible. Fails if the parameters are invalid, see
    /// [`Params::validate`].
    pub fn new(params: Params, arm: ArmCtrl) -> Result<Self, AnimCtrlError> {
        params.validate()?;

        let pen = PenScheduler::new(params.draw_probability, params.seed);

        // The sampler gets its own stream so that changing the draw
        // probability doesn't move the sampled targets
        let sampler_rng: Box<dyn RngCore> = match params.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s.wrapping_add(1))),
            None => Box::new(rand::thread_rng()),
        };

        Ok(Self {
            params,
            arm,
            pen,
            sampler_rng,
            trace: Vec::new(),
            last_position: None,
            report: AnimReport::default(),
            arch_frames: None,
            last_record: None,
        })
    }

    /// Archive every rendered frame to the given CSV file in the session's
    /// archive directory.
    pub fn enable_archive<P: AsRef<Path>>(
        &mut self,
        session: &Session,
        path: P,
    ) -> Result<(), ArchiveError> {
        self.arch_frames = Some(Archiver::from_path(session, path)?);
        Ok(())
    }

    /// Get the parameters of the controller.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The trace drawn so far in the current run.
    pub fn trace(&self) -> &[TraceSegment] {
        &self.trace
    }

    /// Animate an explicit path with the pen down throughout.
    ///
    /// Each pair of consecutive points is one line. If `closed` an extra line
    /// joins the last point back to the first. The sink is finished once the
    /// path is complete.
    pub fn animate_path<R, S>(
        &mut self,
        points: &[Point2D],
        closed: bool,
        renderer: &mut R,
        sink: &mut S,
    ) -> Result<AnimReport, AnimCtrlError>
    where
        R: Renderer,
        S: FrameSink,
    {
        self.reset();

        if points.len() < 2 {
            warn!("Path has {} points, nothing to animate", points.len());
        }

        let closing = match (closed && points.len() > 2, points.first(), points.last()) {
            (true, Some(&first), Some(&last)) => Some((last, first)),
            _ => None,
        };

        let lines = points
            .windows(2)
            .map(|w| (w[0], w[1]))
            .chain(closing.into_iter());

        for (start, end) in lines {
            self.animate_line(start, end, PenState::Down, renderer, sink)?;
        }

        self.finish_run(sink)
    }

    /// Animate a continuous chain of `num_lines` random lines.
    ///
    /// The end of each line is the start of the next. Every endpoint is
    /// reachable by the arm, but the waypoints in between may not be. The pen
    /// scheduler decides which lines are traced.
    pub fn animate_random<R, S>(
        &mut self,
        num_lines: usize,
        renderer: &mut R,
        sink: &mut S,
    ) -> Result<AnimReport, AnimCtrlError>
    where
        R: Renderer,
        S: FrameSink,
    {
        self.reset();

        let mut start = self.sample_reachable()?;

        for _ in 0..num_lines {
            let end = self.sample_reachable()?;
            let pen = self.pen.next_segment();

            self.animate_line(start, end, pen, renderer, sink)?;

            start = end;
        }

        self.finish_run(sink)
    }

    /// Sample a random target from the sample region which the arm can reach.
    pub fn sample_reachable(&mut self) -> Result<Point2D, AnimCtrlError> {
        let region = self.params.sample_region;

        for attempt in 0..self.params.max_sample_attempts {
            let radius = self
                .sampler_rng
                .gen_range(region.min_radius..=region.max_radius);
            let angle = self
                .sampler_rng
                .gen_range(region.min_angle_deg..=region.max_angle_deg)
                .to_radians();

            let point = Point2D::new(radius * angle.cos(), radius * angle.sin());

            if self.arm.is_reachable(&point) {
                trace!("Sampled ({:.2}, {:.2}) after {} attempts", point.x, point.y, attempt + 1);
                return Ok(point);
            }
        }

        warn!(
            "No reachable target found in {} samples",
            self.params.max_sample_attempts
        );

        Err(AnimCtrlError::NoReachableSample {
            attempts: self.params.max_sample_attempts,
        })
    }

    fn reset(&mut self) {
        self.trace.clear();
        self.last_position = None;
        self.report = AnimReport::default();
        self.pen.reset();
    }

    /// Move along one line, rendering a frame at each reachable waypoint.
    fn animate_line<R, S>(
        &mut self,
        start: Point2D,
        end: Point2D,
        pen: PenState,
        renderer: &mut R,
        sink: &mut S,
    ) -> Result<(), AnimCtrlError>
    where
        R: Renderer,
        S: FrameSink,
    {
        debug!(
            "Line ({:.2}, {:.2}) -> ({:.2}, {:.2}), pen {:?}",
            start.x, start.y, end.x, end.y, pen
        );

        for target in interpolate(start, end, self.params.steps_per_segment) {
            self.visit_waypoint(target, pen, renderer, sink)?;
        }

        match pen {
            PenState::Down => self.report.lines_drawn += 1,
            PenState::Up => self.report.lines_skipped += 1,
        }
        self.report.lines.push(LineRecord { start, end, pen });

        Ok(())
    }

    fn visit_waypoint<R, S>(
        &mut self,
        target: Point2D,
        pen: PenState,
        renderer: &mut R,
        sink: &mut S,
    ) -> Result<(), AnimCtrlError>
    where
        R: Renderer,
        S: FrameSink,
    {
        let (angles, arm_report) = match self.arm.proc(&InputData { target }) {
            Ok(output) => output,
            Err(e) => {
                trace!("Skipping waypoint: {}", e);
                self.report.waypoints_skipped += 1;
                return Ok(());
            }
        };

        let pose = self.arm.pose(&angles);

        if let (PenState::Down, Some(last)) = (pen, self.last_position) {
            // Repeated positions (shared line endpoints) add nothing
            if last != pose.hand {
                self.trace.push(TraceSegment {
                    start: last,
                    end: pose.hand,
                });
            }
        }
        self.last_position = Some(pose.hand);

        renderer.draw(&pose, &self.trace);
        sink.push_frame(renderer.canvas())?;

        self.last_record = Some(FrameRecord {
            frame: self.report.frames,
            target_x: target.x,
            target_y: target.y,
            theta1_deg: angles.theta1_deg,
            theta2_deg: angles.theta2_deg,
            hand_x: pose.hand.x,
            hand_y: pose.hand.y,
            shoulder_limited: arm_report.abs_pos_limited[SHOULDER],
            elbow_limited: arm_report.abs_pos_limited[ELBOW],
            pen,
        });
        self.write()?;

        self.report.frames += 1;

        Ok(())
    }

    fn finish_run<S: FrameSink>(&mut self, sink: &mut S) -> Result<AnimReport, AnimCtrlError> {
        sink.finish()?;

        self.report.segments_traced = self.trace.len();

        info!(
            "Animation complete: {} frames, {} waypoints skipped, {} lines drawn, {} lines skipped",
            self.report.frames,
            self.report.waypoints_skipped,
            self.report.lines_drawn,
            self.report.lines_skipped
        );

        Ok(self.report.clone())
    }
}

impl Archived for AnimCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        match (self.arch_frames.as_mut(), self.last_record.as_ref()) {
            (Some(archiver), Some(record)) => archiver.serialise(record),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        anim_ctrl::{params::test_params, CanvasRenderer, InMemorySink},
        arm_ctrl::ArmPose,
        arm_ctrl::Params as ArmParams,
    };
    use image::RgbaImage;

    /// Renderer which only records what it was asked to draw.
    #[derive(Default)]
    struct RecordingRenderer {
        hands: Vec<Point2D>,
        trace_lens: Vec<usize>,
        canvas: RgbaImage,
    }

    impl Renderer for RecordingRenderer {
        fn draw(&mut self, pose: &ArmPose, trace: &[TraceSegment]) {
            self.hands.push(pose.hand);
            self.trace_lens.push(trace.len());
        }

        fn canvas(&self) -> &RgbaImage {
            &self.canvas
        }
    }

    fn square() -> Vec<Point2D> {
        vec![
            Point2D::new(250.0, -100.0),
            Point2D::new(350.0, -100.0),
            Point2D::new(350.0, 100.0),
            Point2D::new(250.0, 100.0),
        ]
    }

    #[test]
    fn test_closed_square() {
        for &steps in &[1usize, 5, 20] {
            let mut ctrl = AnimCtrl::new(test_params::params(steps), ArmCtrl::default()).unwrap();
            let mut renderer = RecordingRenderer::default();
            let mut sink = InMemorySink::default();

            let report = ctrl
                .animate_path(&square(), true, &mut renderer, &mut sink)
                .unwrap();

            assert_eq!(report.frames, 4 * (steps + 1));
            assert_eq!(sink.frames.len(), report.frames);
            assert!(sink.finished);
            assert_eq!(report.waypoints_skipped, 0);
            assert_eq!(report.lines_drawn, 4);
            assert_eq!(report.segments_traced, 4 * steps);
            assert_eq!(ctrl.trace().len(), 4 * steps);

            // The path ends where it started
            let last = *renderer.hands.last().unwrap();
            assert!((last - square()[0]).norm() < 1e-6);

            // The trace only ever grows
            assert!(renderer.trace_lens.windows(2).all(|w| w[1] >= w[0]));
        }
    }

    #[test]
    fn test_configured_shape_reachable() {
        let params: Params = util::params::load_from_path(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../params/anim_ctrl.toml"
        ))
        .unwrap();
        let shape: Vec<Point2D> = params
            .shape
            .iter()
            .map(|p| Point2D::new(p[0], p[1]))
            .collect();
        let steps = params.steps_per_segment;

        let mut ctrl = AnimCtrl::new(params, ArmCtrl::default()).unwrap();
        let report = ctrl
            .animate_path(
                &shape,
                true,
                &mut RecordingRenderer::default(),
                &mut InMemorySink::default(),
            )
            .unwrap();

        assert_eq!(report.waypoints_skipped, 0);
        assert_eq!(report.frames, shape.len() * (steps + 1));
    }

    #[test]
    fn test_open_path_skips_unreachable() {
        let mut ctrl = AnimCtrl::new(test_params::params(20), ArmCtrl::default()).unwrap();
        let mut renderer = RecordingRenderer::default();
        let mut sink = InMemorySink::default();

        // Passes through the base and behind the shoulder, where the joint
        // limits stop the arm following
        let report = ctrl
            .animate_path(
                &[Point2D::new(300.0, 0.0), Point2D::new(-300.0, 0.0)],
                false,
                &mut renderer,
                &mut sink,
            )
            .unwrap();

        assert_eq!(report.frames, 7);
        assert_eq!(report.waypoints_skipped, 14);
        assert_eq!(report.frames + report.waypoints_skipped, 21);
        assert_eq!(report.segments_traced, 6);
        assert_eq!(sink.frames.len(), 7);

        // The hand stops at the last reachable waypoint
        let last = *renderer.hands.last().unwrap();
        assert!((last - Point2D::new(120.0, 0.0)).norm() < 10.0);
    }

    #[test]
    fn test_short_paths() {
        let mut ctrl = AnimCtrl::new(test_params::params(4), ArmCtrl::default()).unwrap();
        let mut renderer = RecordingRenderer::default();

        let mut sink = InMemorySink::default();
        let report = ctrl
            .animate_path(&[Point2D::new(300.0, 0.0)], true, &mut renderer, &mut sink)
            .unwrap();
        assert_eq!(report.frames, 0);
        assert!(sink.finished);

        // Closing a two point path would only retrace its one line
        let mut sink = InMemorySink::default();
        let report = ctrl
            .animate_path(
                &[Point2D::new(300.0, 0.0), Point2D::new(300.0, 50.0)],
                true,
                &mut renderer,
                &mut sink,
            )
            .unwrap();
        assert_eq!(report.frames, 5);
        assert_eq!(report.lines.len(), 1);
    }

    #[test]
    fn test_random_lines() {
        let steps = 8;
        let num_lines = 50;
        let mut ctrl = AnimCtrl::new(test_params::params(steps), ArmCtrl::default()).unwrap();
        let mut renderer = RecordingRenderer::default();
        let mut sink = InMemorySink::default();

        let report = ctrl
            .animate_random(num_lines, &mut renderer, &mut sink)
            .unwrap();

        assert_eq!(report.lines.len(), num_lines);
        assert_eq!(report.lines_drawn + report.lines_skipped, num_lines);
        assert_eq!(
            report.frames + report.waypoints_skipped,
            num_lines * (steps + 1)
        );
        assert_eq!(sink.frames.len(), report.frames);

        // Continuous, every endpoint reachable, never two skips in a row
        let arm = ArmCtrl::default();
        for pair in report.lines.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(!(pair[0].pen == PenState::Up && pair[1].pen == PenState::Up));
        }
        for line in &report.lines {
            assert!(arm.is_reachable(&line.start));
            assert!(arm.is_reachable(&line.end));
        }
    }

    #[test]
    fn test_random_pen_up_leaves_no_trace() {
        let mut params = test_params::params(4);
        params.draw_probability = 0.0;

        // A single line is always skipped
        let mut ctrl = AnimCtrl::new(params.clone(), ArmCtrl::default()).unwrap();
        let mut renderer = RecordingRenderer::default();
        let report = ctrl
            .animate_random(1, &mut renderer, &mut InMemorySink::default())
            .unwrap();
        assert_eq!(report.lines_skipped, 1);
        assert_eq!(report.segments_traced, 0);
        assert!(renderer.trace_lens.iter().all(|&l| l == 0));

        // Longer chains alternate skipped and drawn
        let mut ctrl = AnimCtrl::new(params, ArmCtrl::default()).unwrap();
        let report = ctrl
            .animate_random(
                4,
                &mut RecordingRenderer::default(),
                &mut InMemorySink::default(),
            )
            .unwrap();
        let pens: Vec<PenState> = report.lines.iter().map(|l| l.pen).collect();
        assert_eq!(
            pens,
            vec![PenState::Up, PenState::Down, PenState::Up, PenState::Down]
        );
    }

    #[test]
    fn test_random_seeded_reproducible() {
        let run = || {
            let mut ctrl = AnimCtrl::new(test_params::params(3), ArmCtrl::default()).unwrap();
            ctrl.animate_random(
                10,
                &mut RecordingRenderer::default(),
                &mut InMemorySink::default(),
            )
            .unwrap()
            .lines
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_no_reachable_sample() {
        let mut params = test_params::params(3);
        params.sample_region.min_radius = 500.0;
        params.sample_region.max_radius = 600.0;
        params.max_sample_attempts = 50;
        let mut ctrl = AnimCtrl::new(params, ArmCtrl::default()).unwrap();

        let res = ctrl.animate_random(
            3,
            &mut RecordingRenderer::default(),
            &mut InMemorySink::default(),
        );
        assert!(matches!(
            res,
            Err(AnimCtrlError::NoReachableSample { attempts: 50 })
        ));
    }

    #[test]
    fn test_render_and_archive() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session {
            session_root: dir.path().to_path_buf(),
            arch_root: dir.path().join("arch"),
            log_file_path: dir.path().join("test.log"),
        };

        let params = test_params::params(2);
        let mut renderer = CanvasRenderer::new(params.canvas.clone());
        let mut ctrl = AnimCtrl::new(params, ArmCtrl::new(ArmParams::default())).unwrap();
        ctrl.enable_archive(&session, "anim_ctrl/frames.csv").unwrap();

        let mut sink = InMemorySink::default();
        let report = ctrl
            .animate_path(&square(), true, &mut renderer, &mut sink)
            .unwrap();

        assert_eq!(sink.frames.len(), 12);
        assert!(sink.frames.iter().all(|f| f.dimensions() == (64, 64)));

        let csv = std::fs::read_to_string(dir.path().join("arch/anim_ctrl/frames.csv")).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "frame,target_x,target_y,theta1_deg,theta2_deg,hand_x,hand_y,shoulder_limited,elbow_limited,pen"
        );
        assert_eq!(lines.count(), report.frames);
    }

    #[test]
    fn test_invalid_sample_region() {
        let mut params = test_params::params(3);
        params.sample_region.min_radius = 390.0;
        params.sample_region.max_radius = 150.0;

        assert!(matches!(
            AnimCtrl::new(params, ArmCtrl::default()),
            Err(AnimCtrlError::InvalidSampleRegion(_))
        ));
    }

    #[test]
    fn test_archive_limited_joints() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session {
            session_root: dir.path().to_path_buf(),
            arch_root: dir.path().join("arch"),
            log_file_path: dir.path().join("test.log"),
        };

        // (300, 0) needs the elbow at its limit, (330, 100) doesn't
        let arm = ArmCtrl::new(ArmParams {
            max_abs_pos_deg: [90.0, 80.0],
            min_abs_pos_deg: [-90.0, -80.0],
            ..ArmParams::default()
        });
        let mut ctrl = AnimCtrl::new(test_params::params(1), arm).unwrap();
        ctrl.enable_archive(&session, "limited.csv").unwrap();

        let report = ctrl
            .animate_path(
                &[Point2D::new(300.0, 0.0), Point2D::new(330.0, 100.0)],
                false,
                &mut RecordingRenderer::default(),
                &mut InMemorySink::default(),
            )
            .unwrap();
        assert_eq!(report.frames, 2);

        let csv = std::fs::read_to_string(dir.path().join("arch/limited.csv")).unwrap();
        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ends_with(",false,true,Down"), "{}", rows[0]);
        assert!(rows[1].ends_with(",false,false,Down"), "{}", rows[1]);
    }
}
