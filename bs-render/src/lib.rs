//! Render server for the Burning Ship renderer.
//!
//! Every pixel, and every frame of an animation, can be computed independently.
//! To support this parallelism, we provide the render server, which renders in its own thread-pool.
//!
//! Rendering occurs in these steps:
//! -   Requests are queued to a dispatch thread, which spawns each one onto the pool in order.
//! -   Within the pool, an animation is split into frames, and each frame into rows.
//!     Rows are a compromise between "render at each pixel" and "parallelize";
//!     each row writes to its own slice of the output, with relatively high locality.

use std::{future::Future, sync::mpsc::Receiver};

use bs_core::{animation, burning_ship, FractalParams, FrameSequence, PixelBuffer, RenderRequest};
mod completion;

pub use bs_core::Error;

/// Output of a render.
#[derive(Clone, Debug, PartialEq)]
pub enum Rendered {
    Frame(PixelBuffer),
    Animation(FrameSequence),
}

pub type Completion = Result<Rendered, Error>;

pub struct RenderServer {
    queue: std::sync::mpsc::Sender<ImageRequest>,
    threads: usize,
}

struct ImageRequest {
    request: RenderRequest,
    result: completion::Completer<Completion>,
}

/// Handle to an in-flight render.
///
/// Resolves to the render result, either by blocking on [Handle::wait] or by awaiting it.
pub struct Handle {
    pending: completion::Pending<Completion>,
}

impl Handle {
    /// Block until the render completes.
    pub fn wait(self) -> Completion {
        self.pending
            .wait()
            .unwrap_or_else(|e| Err(Error::Internal(e.to_string())))
    }
}

impl Future for Handle {
    type Output = Completion;

    fn poll(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        std::pin::Pin::new(&mut self.pending)
            .poll(cx)
            .map(|res| res.unwrap_or_else(|e| Err(Error::Internal(e.to_string()))))
    }
}

impl RenderServer {
    pub fn new() -> Result<Self, Error> {
        Self::with_threads(rayon::current_num_threads())
    }

    pub fn with_threads(threads: usize) -> Result<Self, Error> {
        if threads < 1 {
            return Err(Error::InvalidArgument(
                "must provide >=1 thread".to_string(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("bs-render-{}", i))
            .build()
            .map_err(|v| Error::Internal(format!("error creating thread pool: {}", v)))?;

        let (queue, recv) = std::sync::mpsc::channel();
        // The dispatch thread is free-running. It shuts down when the input queue closes.
        std::thread::spawn(move || dispatch(pool, recv));

        Ok(RenderServer { queue, threads })
    }

    /// Number of threads in the render pool.
    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn render(&self, request: RenderRequest) -> Handle {
        let (result, pending) = completion::slot();
        let req = ImageRequest { request, result };
        if let Err(std::sync::mpsc::SendError(req)) = self.queue.send(req) {
            req.result.complete(Err(Error::Internal(
                "rendering server has terminated".to_string(),
            )));
        }
        Handle { pending }
    }
}

fn dispatch(pool: rayon::ThreadPool, receiver: Receiver<ImageRequest>) {
    let span = tracing::info_span!("dispatch thread");
    let _guard = span.enter();

    for req in receiver.iter() {
        // spawn_fifo so that renders complete in ~the same order as requested.
        pool.spawn_fifo(|| render(req));
    }
    tracing::debug!("render queue closed");
}

fn render(req: ImageRequest) {
    let ImageRequest { request, result } = req;
    let res = render_request(&request);
    if let Err(err) = &res {
        tracing::error!("render error: for parameters {:?}: {}", &request, err);
    }
    result.complete(res);
}

fn render_request(request: &RenderRequest) -> Completion {
    let RenderRequest {
        viewport,
        numeric,
        fractal,
    } = request;
    match fractal {
        FractalParams::BurningShip { offset, iteration } => {
            tracing::info!("starting burning ship with format {}", numeric);
            let span = tracing::info_span!("render-burning-ship");
            let _guard = span.enter();
            let frame = burning_ship::evaluate_format(numeric, viewport, offset, iteration)?;
            tracing::debug!("burning-ship-rendered");
            Ok(Rendered::Frame(frame))
        }
        FractalParams::Animation {
            frames,
            schedule,
            iteration,
        } => {
            tracing::info!("starting {} frame animation with format {}", frames, numeric);
            let span = tracing::info_span!("render-animation");
            let _guard = span.enter();
            let sequence =
                animation::build_animation_format(numeric, *frames, viewport, schedule, iteration)?;
            tracing::debug!("animation-rendered");
            Ok(Rendered::Animation(sequence))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bs_core::{
        animation::AnimationSchedule, Complex, IterationParams, Offset, Size, Viewport,
    };

    fn viewport() -> Viewport {
        Viewport {
            size: Size {
                width: 32,
                height: 24,
            },
            ..Viewport::default()
        }
    }

    fn iteration() -> IterationParams {
        IterationParams {
            escape_radius: 2.0,
            max_iters: 48,
        }
    }

    fn frame_request(offset: Offset) -> RenderRequest {
        RenderRequest {
            viewport: viewport(),
            fractal: FractalParams::BurningShip {
                offset,
                iteration: iteration(),
            },
            ..RenderRequest::default()
        }
    }

    #[test]
    fn rejects_zero_threads() {
        assert!(matches!(
            RenderServer::with_threads(0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn renders_frame_like_core() {
        let server = RenderServer::with_threads(2).unwrap();
        assert_eq!(server.threads(), 2);
        let rendered = server.render(frame_request(Offset::Pixel)).wait().unwrap();
        let expected = burning_ship::evaluate(&viewport(), &Offset::Pixel, &iteration()).unwrap();
        assert_eq!(rendered, Rendered::Frame(expected));
    }

    #[test]
    fn renders_animation() {
        let server = RenderServer::with_threads(3).unwrap();
        let schedule = AnimationSchedule::default();
        let request = RenderRequest {
            viewport: viewport(),
            fractal: FractalParams::Animation {
                frames: 4,
                schedule,
                iteration: iteration(),
            },
            ..RenderRequest::default()
        };
        let Rendered::Animation(seq) = server.render(request).wait().unwrap() else {
            panic!("expected an animation");
        };
        assert_eq!(seq.len(), 4);
        let expected =
            animation::build_animation(4, &viewport(), &schedule, &iteration()).unwrap();
        assert_eq!(seq, expected);
    }

    #[test]
    fn same_result_for_any_pool_size() {
        let request = frame_request(Offset::Fixed(Complex::new(-0.5, 0.25)));
        let one = RenderServer::with_threads(1)
            .unwrap()
            .render(request.clone())
            .wait()
            .unwrap();
        let many = RenderServer::with_threads(4)
            .unwrap()
            .render(request)
            .wait()
            .unwrap();
        assert_eq!(one, many);
    }

    #[test]
    fn reports_invalid_requests() {
        let server = RenderServer::with_threads(1).unwrap();
        let mut request = frame_request(Offset::Pixel);
        request.numeric = "I11F5".to_owned();
        assert!(matches!(
            server.render(request).wait(),
            Err(Error::InvalidArgument(_))
        ));

        let mut request = frame_request(Offset::Pixel);
        request.viewport.size.width = 1;
        assert!(matches!(
            server.render(request).wait(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn many_requests_in_flight() {
        let server = RenderServer::with_threads(2).unwrap();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let c = Complex::new(-0.1 * i as f64, 0.05 * i as f64);
                (c, server.render(frame_request(Offset::Fixed(c))))
            })
            .collect();
        for (c, handle) in handles {
            let expected =
                burning_ship::evaluate(&viewport(), &Offset::Fixed(c), &iteration()).unwrap();
            assert_eq!(handle.wait().unwrap(), Rendered::Frame(expected));
        }
    }

    #[tokio::test]
    async fn awaits_render() {
        let server = RenderServer::with_threads(2).unwrap();
        let rendered = server.render(frame_request(Offset::Pixel)).await.unwrap();
        let Rendered::Frame(frame) = rendered else {
            panic!("expected a frame");
        };
        assert_eq!(frame.size(), viewport().size);
    }
}
