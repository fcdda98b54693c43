//! Library code for the Burning Ship renderer.
//!
//! The core computes escape-time images of the Burning Ship fractal as 8-bit grayscale buffers,
//! and sequences of such buffers whose constant term follows a sinusoidal schedule.

use std::ops::Range;

pub use num::Complex;

pub mod animation;
pub mod burning_ship;
pub mod image;
mod buffer;
mod number;

pub use buffer::{FrameSequence, PixelBuffer};
pub use number::ShipNumber;

/// A pair of integer (width, height) dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    /// Number of pixels covered, if it fits in a usize.
    pub fn pixels(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }
}

/// A rectangle of the complex plane, mapped onto a pixel grid.
///
/// Pixel (0, 0) lands on `(x.start, y.start)`; pixel `(height-1, width-1)` lands on
/// `(x.end, y.end)`. Both ends are inclusive.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    pub size: Size,
    pub x: Range<f64>,
    pub y: Range<f64>,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            size: Size {
                width: 50,
                height: 50,
            },
            x: -2.0..1.0,
            y: -1.5..1.5,
        }
    }
}

impl Viewport {
    /// Checks that the grid can be mapped onto the plane.
    pub fn validate(&self) -> Result<(), Error> {
        let Size { width, height } = self.size;
        if width < 2 || height < 2 {
            return Err(Error::InvalidArgument(format!(
                "viewport must be at least 2x2 pixels, got {}x{}",
                width, height
            )));
        }
        if self.size.pixels().is_none() {
            return Err(Error::InvalidArgument(format!(
                "viewport of {}x{} pixels is too large",
                width, height
            )));
        }
        for (axis, r) in [("x", &self.x), ("y", &self.y)] {
            if !r.start.is_finite() || !r.end.is_finite() {
                return Err(Error::InvalidArgument(format!(
                    "{} bounds must be finite: {:?}",
                    axis, r
                )));
            }
            if r.end <= r.start {
                return Err(Error::InvalidArgument(format!(
                    "{} bounds are empty or reversed: {:?}",
                    axis, r
                )));
            }
            if !(r.end - r.start).is_finite() {
                return Err(Error::InvalidArgument(format!(
                    "{} span overflows: {:?}",
                    axis, r
                )));
            }
        }
        Ok(())
    }

    /// Distance in the plane between adjacent pixels, as (dx, dy).
    ///
    /// Only meaningful for a viewport that passes [Viewport::validate]; a grid narrower than
    /// two pixels gives a non-finite step.
    pub fn step(&self) -> (f64, f64) {
        let dx = (self.x.end - self.x.start) / self.size.width.saturating_sub(1) as f64;
        let dy = (self.y.end - self.y.start) / self.size.height.saturating_sub(1) as f64;
        (dx, dy)
    }

    /// The plane coordinate of the pixel at (row, col).
    pub fn point(&self, row: usize, col: usize) -> Complex<f64> {
        let (dx, dy) = self.step();
        Complex::new(self.x.start + col as f64 * dx, self.y.start + row as f64 * dy)
    }
}

/// Escape parameters shared by every pixel of an evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IterationParams {
    /// Iteration stops once |z|^2 exceeds this squared.
    pub escape_radius: f64,
    pub max_iters: usize,
}

impl Default for IterationParams {
    fn default() -> Self {
        IterationParams {
            escape_radius: 2.0,
            max_iters: 100,
        }
    }
}

impl IterationParams {
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_iters == 0 {
            return Err(Error::InvalidArgument(
                "max_iters must be positive".to_owned(),
            ));
        }
        if !self.escape_radius.is_finite() || self.escape_radius <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "escape radius must be positive and finite, got {}",
                self.escape_radius
            )));
        }
        Ok(())
    }
}

/// The constant term added at every step of the map.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum Offset {
    /// Each pixel adds its own coordinate: the conventional Burning Ship.
    #[default]
    Pixel,
    /// Every pixel adds the same constant, deforming the fractal.
    Fixed(Complex<f64>),
}

impl Offset {
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            Offset::Pixel => Ok(()),
            Offset::Fixed(c) if c.re.is_finite() && c.im.is_finite() => Ok(()),
            Offset::Fixed(c) => Err(Error::InvalidArgument(format!(
                "offset must be finite, got {}",
                c
            ))),
        }
    }
}

/// A single render job: what to draw, where, and in which numeric format.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
    pub viewport: Viewport,
    /// Name of the numeric format, one of [burning_ship::formats].
    pub numeric: String,
    pub fractal: FractalParams,
}

impl Default for RenderRequest {
    fn default() -> Self {
        RenderRequest {
            viewport: Viewport::default(),
            numeric: burning_ship::DEFAULT_FORMAT.to_owned(),
            fractal: FractalParams::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FractalParams {
    /// One frame.
    BurningShip {
        offset: Offset,
        iteration: IterationParams,
    },
    /// `frames` frames following `schedule`.
    Animation {
        frames: usize,
        schedule: animation::AnimationSchedule,
        iteration: IterationParams,
    },
}

impl Default for FractalParams {
    fn default() -> Self {
        FractalParams::BurningShip {
            offset: Offset::Pixel,
            iteration: IterationParams::default(),
        }
    }
}

/// Errors that can occur during evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    InvalidArgument(String),
    Internal(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
