//! # Renderer
//!
//! Draws the arm and its trace onto a raster canvas.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::{Rgba, RgbaImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut},
    point::Point,
};

use super::{CanvasParams, TraceSegment};
use crate::{arm_ctrl::ArmPose, Point2D};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something which can draw an arm pose and the trace left so far.
pub trait Renderer {
    /// Redraw the whole scene: the cumulative trace, then the arm on top.
    fn draw(&mut self, pose: &ArmPose, trace: &[TraceSegment]);

    /// The raster produced by the last call to `draw`.
    fn canvas(&self) -> &RgbaImage;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// [`Renderer`] drawing thick lines and discs into an RGBA image.
pub struct CanvasRenderer {
    params: CanvasParams,
    canvas: RgbaImage,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CanvasRenderer {
    pub fn new(params: CanvasParams) -> Self {
        let canvas = RgbaImage::from_pixel(
            params.width,
            params.height,
            Rgba(params.background_colour),
        );

        Self { params, canvas }
    }

    /// Convert a point in the arm frame into canvas pixel coordinates.
    pub fn to_canvas(&self, point: &Point2D) -> (f64, f64) {
        (
            self.params.shoulder_px[0] + point.x,
            self.params.shoulder_px[1] - point.y,
        )
    }

    fn clear(&mut self) {
        let background = Rgba(self.params.background_colour);
        for pixel in self.canvas.pixels_mut() {
            *pixel = background;
        }
    }

    /// Draw a line of the given width with round ends.
    ///
    /// Lines narrower than two pixels are drawn as a single segment. Wider
    /// ones are filled as a quadrilateral around the segment, capped with a
    /// disc at each end.
    fn draw_line(&mut self, start: &Point2D, end: &Point2D, width: f64, colour: Rgba<u8>) {
        let (x0, y0) = self.to_canvas(start);
        let (x1, y1) = self.to_canvas(end);

        draw_line_segment_mut(
            &mut self.canvas,
            (x0 as f32, y0 as f32),
            (x1 as f32, y1 as f32),
            colour,
        );

        let half_width = width / 2.0;
        if half_width.is_nan() || half_width < 1.0 {
            return;
        }

        let cap_radius = half_width.round() as i32;
        draw_filled_circle_mut(&mut self.canvas, pixel(x0, y0), cap_radius, colour);
        draw_filled_circle_mut(&mut self.canvas, pixel(x1, y1), cap_radius, colour);

        let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        if length < 1.0 {
            return;
        }

        // Offset from the centre line to each side
        let nx = -(y1 - y0) / length * half_width;
        let ny = (x1 - x0) / length * half_width;

        let corners = [
            point(x0 + nx, y0 + ny),
            point(x1 + nx, y1 + ny),
            point(x1 - nx, y1 - ny),
            point(x0 - nx, y0 - ny),
        ];

        // The polygon must not be closed explicitly
        if corners[0] != corners[3] {
            draw_polygon_mut(&mut self.canvas, &corners, colour);
        }
    }

    fn draw_disc(&mut self, centre: &Point2D, radius: f64, colour: Rgba<u8>) {
        let (cx, cy) = self.to_canvas(centre);
        draw_filled_circle_mut(&mut self.canvas, pixel(cx, cy), radius.round() as i32, colour);
    }
}

impl Renderer for CanvasRenderer {
    fn draw(&mut self, pose: &ArmPose, trace: &[TraceSegment]) {
        self.clear();

        let trace_colour = Rgba(self.params.trace_colour);
        let trace_width = self.params.trace_width;
        for seg in trace {
            self.draw_line(&seg.start, &seg.end, trace_width, trace_colour);
        }

        let link_colour = Rgba(self.params.link_colour);
        let link_width = self.params.link_width;
        self.draw_line(&pose.shoulder, &pose.elbow, link_width, link_colour);
        self.draw_line(&pose.elbow, &pose.hand, link_width, link_colour);

        let joint_colour = Rgba(self.params.joint_colour);
        let joint_radius = self.params.joint_radius;
        for joint in &[pose.shoulder, pose.elbow, pose.hand] {
            self.draw_disc(joint, joint_radius, joint_colour);
        }
    }

    fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Nearest pixel to a canvas position.
fn pixel(x: f64, y: f64) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn point(x: f64, y: f64) -> Point<i32> {
    let (x, y) = pixel(x, y);
    Point::new(x, y)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::anim_ctrl::params::test_params;

    #[test]
    fn test_to_canvas() {
        let renderer = CanvasRenderer::new(test_params::params(1).canvas);

        assert_eq!(renderer.to_canvas(&Point2D::zeros()), (8.0, 32.0));
        // +y in the arm frame is up the canvas
        assert_eq!(renderer.to_canvas(&Point2D::new(10.0, 20.0)), (18.0, 12.0));
    }

    #[test]
    fn test_draw() {
        let params = test_params::params(1).canvas;
        let mut renderer = CanvasRenderer::new(params.clone());

        // Arm straight along +x, mostly off the right of the canvas
        let pose = ArmPose {
            shoulder: Point2D::zeros(),
            elbow: Point2D::new(30.0, 0.0),
            hand: Point2D::new(60.0, 0.0),
        };
        let trace = vec![TraceSegment {
            start: Point2D::new(0.0, 20.0),
            end: Point2D::new(40.0, 20.0),
        }];
        renderer.draw(&pose, &trace);

        let canvas = renderer.canvas();
        assert_eq!(canvas.dimensions(), (64, 64));
        assert_eq!(*canvas.get_pixel(20, 32), Rgba(params.link_colour));
        assert_eq!(*canvas.get_pixel(8, 32), Rgba(params.joint_colour));
        assert_eq!(*canvas.get_pixel(28, 12), Rgba(params.trace_colour));
        assert_eq!(*canvas.get_pixel(20, 50), Rgba(params.background_colour));

        // Links are three pixels wide
        assert_eq!(*canvas.get_pixel(20, 31), Rgba(params.link_colour));
        assert_eq!(*canvas.get_pixel(20, 33), Rgba(params.link_colour));
        assert_eq!(*canvas.get_pixel(20, 36), Rgba(params.background_colour));

        // Redrawing without the trace clears it
        renderer.draw(&pose, &[]);
        assert_eq!(
            *renderer.canvas().get_pixel(28, 12),
            Rgba(params.background_colour)
        );
    }

    #[test]
    fn test_thick_diagonal_line() {
        let mut params = test_params::params(1).canvas;
        params.trace_width = 6.0;
        let mut renderer = CanvasRenderer::new(params.clone());

        // Arm hanging straight down, clear of the trace
        let pose = ArmPose {
            shoulder: Point2D::zeros(),
            elbow: Point2D::new(0.0, -20.0),
            hand: Point2D::new(0.0, -25.0),
        };

        // Canvas (18, 7) to (48, 37)
        let trace = vec![TraceSegment {
            start: Point2D::new(10.0, 25.0),
            end: Point2D::new(40.0, -5.0),
        }];
        renderer.draw(&pose, &trace);

        let canvas = renderer.canvas();
        let trace_colour = Rgba(params.trace_colour);
        let background = Rgba(params.background_colour);

        // On the centre line and either side of it
        assert_eq!(*canvas.get_pixel(33, 22), trace_colour);
        assert_eq!(*canvas.get_pixel(35, 21), trace_colour);
        assert_eq!(*canvas.get_pixel(31, 23), trace_colour);

        // Past the end of the segment, inside the round cap
        assert_eq!(*canvas.get_pixel(48, 39), trace_colour);

        assert_eq!(*canvas.get_pixel(38, 18), background);
        assert_eq!(*canvas.get_pixel(28, 26), background);
    }
}
