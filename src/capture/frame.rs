//! Decoded frame delivered by a live camera stream.

/// Bytes per pixel of a decoded RGB8 frame.
pub const RGB_CHANNELS: usize = 3;

/// A single decoded frame from a live stream.
///
/// Pixels are tightly packed RGB8 rows. Width and height are the
/// stream's native decoded dimensions, which are only known once the
/// stream has delivered its first frame.
#[derive(Clone)]
pub struct Frame {
    /// Packed RGB8 pixel data.
    pixels: Vec<u8>,
    /// Frame width in pixels.
    width: u32,
    /// Frame height in pixels.
    height: u32,
    /// Monotonic sequence number within the stream.
    sequence: u64,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            sequence,
        }
    }

    /// Returns a reference to the packed RGB8 pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// True when the frame has non-zero dimensions and the pixel buffer
    /// matches them exactly.
    pub fn is_valid(&self) -> bool {
        self.pixel_count() > 0 && self.pixels.len() == self.pixel_count() * RGB_CHANNELS
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let pixels = vec![0u8; 640 * 480 * RGB_CHANNELS];
        let frame = Frame::new(pixels, 640, 480, 1);

        assert_eq!(frame.dimensions(), (640, 480));
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_invalid_size() {
        let frame = Frame::new(vec![0u8; 100], 640, 480, 1);
        assert!(!frame.is_valid());
    }

    #[test]
    fn test_zero_sized_frame_is_invalid() {
        let frame = Frame::new(Vec::new(), 0, 0, 1);
        assert!(!frame.is_valid());
    }
}
