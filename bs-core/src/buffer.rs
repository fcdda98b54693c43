//! Owned output buffers.

use std::ops::Index;

use crate::Size;

/// Row-major 8-bit brightness values, one per pixel.
///
/// Row `i` occupies `[i * width, i * width + width)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    size: Size,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps `data`, which must be `size.width * size.height` bytes long.
    pub fn new(size: Size, data: Vec<u8>) -> Result<Self, crate::Error> {
        if Some(data.len()) != size.pixels() {
            return Err(crate::Error::Internal(format!(
                "data size != width * height: {} != {} * {}",
                data.len(),
                size.width,
                size.height
            )));
        }
        Ok(PixelBuffer { size, data })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> usize {
        self.size.width
    }

    pub fn height(&self) -> usize {
        self.size.height
    }

    pub fn row(&self, row: usize) -> Option<&[u8]> {
        self.data.chunks_exact(self.size.width).nth(row)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if col >= self.size.width {
            return None;
        }
        self.data.get(row * self.size.width + col).copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

/// An ordered sequence of frames; frame `i` is always at index `i`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<PixelBuffer>,
}

impl FrameSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PixelBuffer> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PixelBuffer> {
        self.frames.iter()
    }
}

impl From<Vec<PixelBuffer>> for FrameSequence {
    fn from(frames: Vec<PixelBuffer>) -> Self {
        FrameSequence { frames }
    }
}

impl Index<usize> for FrameSequence {
    type Output = PixelBuffer;

    fn index(&self, index: usize) -> &PixelBuffer {
        &self.frames[index]
    }
}

impl IntoIterator for FrameSequence {
    type Item = PixelBuffer;
    type IntoIter = std::vec::IntoIter<PixelBuffer>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a PixelBuffer;
    type IntoIter = std::slice::Iter<'a, PixelBuffer>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
