use crate::{Error, FrameSequence, PixelBuffer};

/// Hands rendered buffers to a host as in-memory images.
#[derive(Default)]
pub struct Renderer {}

impl Renderer {
    /// Convert a frame into a grayscale image of the same size.
    ///
    /// Each byte of the buffer becomes one luma pixel; nothing is rescaled.
    pub fn render(&self, frame: PixelBuffer) -> Result<image::GrayImage, Error> {
        let (width, height) = (frame.width(), frame.height());
        let (w, h) = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "frame of {} * {} does not fit an image",
                    width, height
                )))
            }
        };
        let data = frame.into_vec();
        let len = data.len();
        image::GrayImage::from_raw(w, h, data).ok_or_else(|| {
            Error::Internal(format!(
                "error: data size != width * height: {} != {} * {}",
                len, width, height
            ))
        })
    }

    /// Convert every frame of an animation, keeping their order.
    pub fn render_all(&self, frames: FrameSequence) -> Result<Vec<image::GrayImage>, Error> {
        frames.into_iter().map(|f| self.render(f)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Size;

    #[test]
    fn keeps_layout() {
        let size = Size {
            width: 3,
            height: 2,
        };
        let frame = PixelBuffer::new(size, vec![0, 50, 100, 150, 200, 255]).unwrap();
        let img = Renderer::default().render(frame).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 0).0, [100]);
        assert_eq!(img.get_pixel(0, 1).0, [150]);
    }

    #[test]
    fn renders_each_frame() {
        let size = Size {
            width: 2,
            height: 2,
        };
        let frames: FrameSequence = vec![
            PixelBuffer::new(size, vec![1; 4]).unwrap(),
            PixelBuffer::new(size, vec![9; 4]).unwrap(),
        ]
        .into();
        let images = Renderer::default().render_all(frames).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].get_pixel(1, 1).0, [9]);
    }
}
