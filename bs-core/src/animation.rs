//! Animations: one Burning Ship frame per step of a sinusoidal offset schedule.

use std::f64::consts::PI;

use rayon::prelude::*;

use crate::{
    burning_ship, Complex, Error, FrameSequence, IterationParams, Offset, PixelBuffer, Viewport,
};

/// Sinusoidal schedule for the constant term.
///
/// Over `n` frames, frame `i` uses
/// `A * cos(phase + 2 pi i k / n) + B * sin(2 pi i l / n) i`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnimationSchedule {
    /// (A, B): amplitude of the real and imaginary parts.
    pub amplitude: (f64, f64),
    pub phase: f64,
    /// (k, l): how many full cycles the real and imaginary parts make over the animation.
    pub frequency: (i64, i64),
}

impl Default for AnimationSchedule {
    fn default() -> Self {
        AnimationSchedule {
            amplitude: (1.0, 1.0),
            phase: 0.0,
            frequency: (1, 1),
        }
    }
}

impl AnimationSchedule {
    pub fn validate(&self) -> Result<(), Error> {
        let (a, b) = self.amplitude;
        if !(a.is_finite() && b.is_finite() && self.phase.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "animation schedule must be finite: {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Offset of frame `index` out of `frames`.
    ///
    /// `frames` must be non-zero.
    pub fn offset(&self, index: usize, frames: usize) -> Complex<f64> {
        let (a, b) = self.amplitude;
        let (k, l) = self.frequency;
        let turn = 2.0 * PI * index as f64 / frames as f64;
        Complex::new(
            a * (self.phase + turn * k as f64).cos(),
            b * (turn * l as f64).sin(),
        )
    }
}

/// Render `frames` frames of the schedule over the same viewport.
///
/// Zero frames yields an empty sequence. Frames are evaluated in parallel and returned in index
/// order; each frame depends only on its index.
pub fn build_animation(
    frames: usize,
    viewport: &Viewport,
    schedule: &AnimationSchedule,
    iteration: &IterationParams,
) -> Result<FrameSequence, Error> {
    build_animation_format(
        burning_ship::DEFAULT_FORMAT,
        frames,
        viewport,
        schedule,
        iteration,
    )
}

/// Like [build_animation], iterating in the named numeric format.
pub fn build_animation_format(
    format: &str,
    frames: usize,
    viewport: &Viewport,
    schedule: &AnimationSchedule,
    iteration: &IterationParams,
) -> Result<FrameSequence, Error> {
    // Reject bad parameters before spending time on any frame.
    viewport.validate()?;
    iteration.validate()?;
    schedule.validate()?;
    if !burning_ship::formats().any(|f| f == format) {
        return Err(Error::InvalidArgument(format!(
            "unknown numeric format {}",
            format
        )));
    }

    let span = tracing::info_span!("animation", frames, format);
    let _guard = span.enter();

    let rendered = (0..frames)
        .into_par_iter()
        .map(|i| {
            let offset = Offset::Fixed(schedule.offset(i, frames));
            burning_ship::evaluate_format(format, viewport, &offset, iteration)
        })
        .collect::<Result<Vec<PixelBuffer>, Error>>()?;
    tracing::debug!(frames = rendered.len(), "animation-computed");

    Ok(rendered.into())
}
