//! # Pen scheduler
//!
//! Decides per segment whether the pen is down (the segment is traced) or up
//! (the arm only moves). Segments are skipped at random, but a skipped segment
//! is always followed by a drawn one.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{trace, warn};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use serde::Serialize;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default probability that a segment which may be skipped is drawn.
pub const DEFAULT_DRAW_PROBABILITY: f64 = 0.25;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// State of the pen while traversing a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PenState {
    /// The segment is traced.
    Down,

    /// The segment is transited without tracing.
    Up,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Stochastic pen up/down policy with a one segment memory.
pub struct PenScheduler {
    draw_probability: f64,
    last_skipped: bool,
    rng: Box<dyn RngCore>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PenScheduler {
    /// Create a new scheduler.
    ///
    /// If `seed` is given the sequence of decisions is reproducible, otherwise
    /// the thread RNG is used. `draw_probability` is limited to `[0, 1]`, a
    /// non-finite probability is replaced by [`DEFAULT_DRAW_PROBABILITY`].
    pub fn new(draw_probability: f64, seed: Option<u64>) -> Self {
        let rng: Box<dyn RngCore> = match seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::thread_rng()),
        };

        Self::with_rng(draw_probability, rng)
    }

    /// Create a new scheduler drawing from the given random source.
    pub fn with_rng(draw_probability: f64, rng: Box<dyn RngCore>) -> Self {
        let draw_probability = if draw_probability.is_finite() {
            clamp(&draw_probability, &0.0, &1.0).0
        } else {
            warn!(
                "Draw probability {} is not finite, using {}",
                draw_probability, DEFAULT_DRAW_PROBABILITY
            );
            DEFAULT_DRAW_PROBABILITY
        };

        Self {
            draw_probability,
            last_skipped: false,
            rng,
        }
    }

    /// Decide the pen state for the next segment.
    pub fn next_segment(&mut self) -> PenState {
        let state = if self.last_skipped {
            PenState::Down
        } else if self.rng.gen_bool(self.draw_probability) {
            PenState::Down
        } else {
            PenState::Up
        };

        self.last_skipped = state == PenState::Up;

        trace!("Pen {:?} for next segment", state);

        state
    }

    /// Forget the previous segment, as at the start of a new animation.
    pub fn reset(&mut self) {
        self.last_skipped = false;
    }
}

impl Default for PenScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DRAW_PROBABILITY, None)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_never_skips_twice() {
        let mut sched = PenScheduler::new(DEFAULT_DRAW_PROBABILITY, Some(7));

        let mut last = PenState::Down;
        let mut num_up = 0;
        for _ in 0..10_000 {
            let state = sched.next_segment();
            assert!(!(last == PenState::Up && state == PenState::Up));
            if state == PenState::Up {
                num_up += 1;
            }
            last = state;
        }

        // With p(draw) = 0.25 and forced draws after a skip, the long run
        // fraction of skipped segments is 0.75 / 1.75 ~= 0.43
        assert!(num_up > 3_800 && num_up < 4_800, "num_up = {}", num_up);
    }

    #[test]
    fn test_probability_extremes() {
        // Never drawn unless forced: alternates skip and draw
        let mut sched = PenScheduler::new(0.0, Some(1));
        let states: Vec<PenState> = (0..6).map(|_| sched.next_segment()).collect();
        assert_eq!(
            states,
            vec![
                PenState::Up,
                PenState::Down,
                PenState::Up,
                PenState::Down,
                PenState::Up,
                PenState::Down
            ]
        );

        // Always drawn
        let mut sched = PenScheduler::new(1.0, Some(1));
        assert!((0..100).all(|_| sched.next_segment() == PenState::Down));

        // Out of range probabilities are limited rather than panicking
        let mut sched = PenScheduler::new(3.0, Some(1));
        assert_eq!(sched.next_segment(), PenState::Down);
    }

    #[test]
    fn test_non_finite_probability() {
        for &p in &[f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut sched = PenScheduler::new(p, Some(5));
            let mut reference = PenScheduler::new(DEFAULT_DRAW_PROBABILITY, Some(5));

            for _ in 0..100 {
                assert_eq!(sched.next_segment(), reference.next_segment());
            }
        }
    }

    #[test]
    fn test_seeded_reproducible() {
        let mut a = PenScheduler::new(0.5, Some(42));
        let mut b = PenScheduler::new(0.5, Some(42));

        for _ in 0..100 {
            assert_eq!(a.next_segment(), b.next_segment());
        }
    }

    #[test]
    fn test_reset() {
        let mut sched = PenScheduler::new(0.0, Some(1));
        assert_eq!(sched.next_segment(), PenState::Up);
        sched.reset();
        assert_eq!(sched.next_segment(), PenState::Up);
    }
}
