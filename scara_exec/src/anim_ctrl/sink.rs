//! # Frame sinks
//!
//! Consumers of rendered frames, in generation order.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, Frame, RgbaImage,
};
use log::debug;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Sink contract for consuming rendered frames.
///
/// Frames are pushed in strictly increasing generation order and appended to
/// the output, never replaced.
pub trait FrameSink {
    /// Append one frame.
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<(), EncodeError>;

    /// Called once after the last frame is pushed.
    fn finish(&mut self) -> Result<(), EncodeError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Animated GIF output, looping forever.
pub struct GifSink<W: Write> {
    encoder: Option<GifEncoder<W>>,
    delay: Delay,
    num_frames: usize,
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    /// Frames in generation order.
    pub frames: Vec<RgbaImage>,

    /// Whether `finish` has been called.
    pub finished: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Could not create the output file: {0}")]
    Io(std::io::Error),

    #[error("Could not encode the frame: {0}")]
    Image(image::ImageError),

    #[error("Frame pushed after the sink was finished")]
    Finished,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GifSink<BufWriter<File>> {
    /// Create a GIF file at the given path.
    pub fn create<P: AsRef<Path>>(path: P, frame_delay_ms: u32) -> Result<Self, EncodeError> {
        let file = File::create(path.as_ref()).map_err(EncodeError::Io)?;

        debug!("Writing GIF to {:?}", path.as_ref());

        Self::new(BufWriter::new(file), frame_delay_ms)
    }
}

impl<W: Write> GifSink<W> {
    /// Create a GIF sink writing into the given writer.
    pub fn new(writer: W, frame_delay_ms: u32) -> Result<Self, EncodeError> {
        let mut encoder = GifEncoder::new(writer);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(EncodeError::Image)?;

        Ok(Self {
            encoder: Some(encoder),
            delay: Delay::from_numer_denom_ms(frame_delay_ms, 1),
            num_frames: 0,
        })
    }

    /// Number of frames written so far.
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }
}

impl<W: Write> FrameSink for GifSink<W> {
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<(), EncodeError> {
        let encoder = self.encoder.as_mut().ok_or(EncodeError::Finished)?;

        encoder
            .encode_frame(Frame::from_parts(frame.clone(), 0, 0, self.delay))
            .map_err(EncodeError::Image)?;
        self.num_frames += 1;

        Ok(())
    }

    fn finish(&mut self) -> Result<(), EncodeError> {
        // Dropping the encoder writes the GIF trailer
        if self.encoder.take().is_some() {
            debug!("GIF finished with {} frames", self.num_frames);
        }

        Ok(())
    }
}

impl FrameSink for InMemorySink {
    fn push_frame(&mut self, frame: &RgbaImage) -> Result<(), EncodeError> {
        if self.finished {
            return Err(EncodeError::Finished);
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EncodeError> {
        self.finished = true;
        Ok(())
    }
}
