//! Raw RGB pixel grids as received from a content source.
//!
//! A frame is a row-major grid of RGB triples with no header. This crate owns
//! the buffer type and a handful of test patterns; it knows nothing about the
//! network or the LED wiring.

pub mod pattern;

/// Bytes per pixel in the ingest format (R, G, B).
pub const BYTES_PER_PIXEL: usize = 3;

/// Width and height of a pixel grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    /// Grid used by the reference installation: 32 columns of 57 pixels.
    ///
    /// Only 30 columns are physically wired; the remaining two pad the grid to
    /// a round number for the content source.
    pub const REFERENCE: GridSize = GridSize {
        width: 32,
        height: 57,
    };

    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of pixels in the grid.
    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Size in bytes of a full frame.
    pub const fn byte_len(&self) -> usize {
        self.pixel_count() * BYTES_PER_PIXEL
    }
}

/// Fixed-size, row-major RGB frame buffer.
///
/// The buffer is always allocated at full grid size. Writes that cover only
/// part of it leave the rest untouched, so reads stay in bounds no matter how
/// much data the last datagram carried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFrame {
    size: GridSize,
    bytes: Vec<u8>,
}

impl RawFrame {
    /// Allocates an all-black frame.
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            bytes: vec![0; size.byte_len()],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn width(&self) -> usize {
        self.size.width
    }

    pub fn height(&self) -> usize {
        self.size.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Copies `payload` over the start of the buffer, discarding any excess.
    ///
    /// Returns the number of bytes copied. Bytes past that point keep whatever
    /// the previous frame left there.
    pub fn overwrite(&mut self, payload: &[u8]) -> usize {
        let copied = payload.len().min(self.bytes.len());
        self.bytes[..copied].copy_from_slice(&payload[..copied]);
        copied
    }

    /// Returns the RGB bytes at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the grid.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> &[u8] {
        assert!(
            x < self.size.width && y < self.size.height,
            "pixel ({x}, {y}) outside {}x{} grid",
            self.size.width,
            self.size.height
        );
        let offset = self.offset(x, y);
        &self.bytes[offset..offset + BYTES_PER_PIXEL]
    }

    /// Returns the pixel at column `x`, row `y`, or `None` outside the grid.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let offset = self.offset(x, y);
        let mut rgb = [0u8; 3];
        rgb.copy_from_slice(&self.bytes[offset..offset + BYTES_PER_PIXEL]);
        Some(rgb)
    }

    /// Sets one pixel. Returns `false` when the coordinate lies outside the grid.
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) -> bool {
        if x >= self.size.width || y >= self.size.height {
            return false;
        }
        let offset = self.offset(x, y);
        self.bytes[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgb);
        true
    }

    /// Paints every pixel with `rgb`.
    pub fn fill(&mut self, rgb: [u8; 3]) {
        for px in self.bytes.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgb);
        }
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (x + y * self.size.width) * BYTES_PER_PIXEL
    }
}
