//! Implementation of the Burning Ship fractal,
//! parameterized on a numeric type.

use rayon::prelude::*;

use crate::{Complex, Error, IterationParams, Offset, PixelBuffer, ShipNumber, Viewport};

/// Function pointer for evaluating a frame in one numeric format.
type EvalFn = fn(&Viewport, &Offset, &IterationParams) -> Result<PixelBuffer, Error>;

const FUNCTIONS: &[(&str, EvalFn)] = &[
    ("f64", evaluate_numeric::<f64>),
    ("f32", evaluate_numeric::<f32>),
];

/// The format used when none is requested.
pub const DEFAULT_FORMAT: &str = "f64";

/// List the numeric formats that are valid for rendering.
pub fn formats() -> impl Iterator<Item = &'static str> {
    FUNCTIONS.iter().map(|(name, _)| *name)
}

/// Outcome of iterating a single point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escape {
    /// Steps taken before |z| exceeded the escape radius, or `max_iters` if it never did.
    pub count: usize,
    /// |z|^2 of the final iterate.
    pub magnitude_squared: f64,
}

/// Evaluate the fractal over the viewport in f64.
pub fn evaluate(
    viewport: &Viewport,
    offset: &Offset,
    iteration: &IterationParams,
) -> Result<PixelBuffer, Error> {
    evaluate_format(DEFAULT_FORMAT, viewport, offset, iteration)
}

/// Evaluate the fractal over the viewport, iterating in the named numeric format.
pub fn evaluate_format(
    format: &str,
    viewport: &Viewport,
    offset: &Offset,
    iteration: &IterationParams,
) -> Result<PixelBuffer, Error> {
    // Linear scan, we don't have that many options:
    for (candidate, computer) in FUNCTIONS.iter() {
        if *candidate == format {
            return computer(viewport, offset, iteration);
        }
    }

    Err(Error::InvalidArgument(format!(
        "unknown numeric format {}",
        format
    )))
}

fn evaluate_numeric<N: ShipNumber>(
    viewport: &Viewport,
    offset: &Offset,
    iteration: &IterationParams,
) -> Result<PixelBuffer, Error> {
    viewport.validate()?;
    offset.validate()?;
    iteration.validate()?;

    let span = tracing::debug_span!(
        "evaluate",
        width = viewport.size.width,
        height = viewport.size.height,
        max_iters = iteration.max_iters
    );
    let _guard = span.enter();

    let convert = |v: f64| N::from_coordinate(v).map_err(Error::InvalidArgument);
    // Create the X and Y coordinates up-front:
    let xs = (0..viewport.size.width)
        .map(|col| convert(viewport.point(0, col).re))
        .collect::<Result<Vec<N>, Error>>()?;
    let ys = (0..viewport.size.height)
        .map(|row| convert(viewport.point(row, 0).im))
        .collect::<Result<Vec<N>, Error>>()?;
    let fixed = match offset {
        Offset::Pixel => None,
        Offset::Fixed(c) => Some(Complex::new(convert(c.re)?, convert(c.im)?)),
    };
    // A threshold beyond the format's range saturates: nothing finite escapes it.
    let radius_squared = N::from_coordinate(iteration.escape_radius * iteration.escape_radius)
        .unwrap_or_else(|_| N::infinity());
    let max_iters = iteration.max_iters;

    let mut output = vec![0u8; xs.len() * ys.len()];
    output
        .par_chunks_mut(xs.len())
        .zip(ys.par_iter())
        .for_each(|(row_out, y)| {
            xs.iter().zip(row_out).for_each(|(x, out)| {
                let point = Complex::new(*x, *y);
                let constant = fixed.unwrap_or(point);
                let escaped = escape(point, constant, radius_squared, max_iters);
                *out = brightness(smooth(&escaped), max_iters);
            })
        });
    tracing::debug!("burning-ship-computed");

    PixelBuffer::new(viewport.size, output)
}

/// Iterate the Burning Ship map from `start`, adding `constant` at every step.
///
/// The check happens before each step, so a point already outside the radius escapes with
/// count 0.
#[inline]
pub fn escape<N: ShipNumber>(
    start: Complex<N>,
    constant: Complex<N>,
    radius_squared: N,
    max_iters: usize,
) -> Escape {
    let two = N::one() + N::one();
    let mut z = start;
    let mut count = 0;
    while count < max_iters {
        if z.norm_sqr() > radius_squared {
            break;
        }
        // Fold into the first quadrant, then square:
        // (|a| + |b|i)^2 = (a^2 - b^2) + 2|a||b|i
        let (a, b) = (z.re.abs(), z.im.abs());
        z = Complex::new(a * a - b * b + constant.re, two * a * b + constant.im);
        count += 1;
    }
    Escape {
        count,
        magnitude_squared: z.norm_sqr().widen(),
    }
}

/// Continuous escape value: the count, renormalized by how far past the radius the iterate got.
///
/// The correction `1 - log2(ln |z|)` only applies when |z| > 1; below that `ln ln |z|` is
/// undefined. An overflowed iterate gives a non-finite correction, and falls back to the count.
pub fn smooth(escape: &Escape) -> f64 {
    let count = escape.count as f64;
    if escape.magnitude_squared > 1.0 {
        let correction = 1.0 - escape.magnitude_squared.sqrt().ln().ln() / 2f64.ln();
        if correction.is_finite() {
            return count + correction;
        }
    }
    count
}

/// Map a smoothed escape value to a gray level; points that never escape are white.
pub fn brightness(smooth: f64, max_iters: usize) -> u8 {
    let stability = (smooth / max_iters as f64).clamp(0.0, 1.0);
    // Truncates toward zero.
    (stability * 255.0) as u8
}
