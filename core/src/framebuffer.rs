use alloc::{boxed::Box, vec, vec::Vec};

use embedded_graphics::{
    Pixel,
    pixelcolor::BinaryColor,
    prelude::{DrawTarget, OriginDimensions, Size},
};

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
/// Rows covered by one page byte.
pub const PAGE_HEIGHT: usize = 8;
pub const PAGES: usize = HEIGHT / PAGE_HEIGHT;
pub const BUFFER_SIZE: usize = PAGES * WIDTH;
pub const PIXEL_COUNT: usize = WIDTH * HEIGHT;

/// Location of a pixel inside a packed frame.
///
/// The display controller stores 8 vertically stacked pixels per byte. Pages
/// run top to bottom, columns left to right inside a page, and bit 0 is the
/// topmost row of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitPosition {
    pub byte_index: usize,
    pub bit: u8,
}

/// Maps a `(row, column)` coordinate to its byte and bit in a packed frame.
///
/// Callers must keep `row < HEIGHT` and `column < WIDTH`.
pub const fn bit_position(row: usize, column: usize) -> BitPosition {
    let page = row / PAGE_HEIGHT;
    BitPosition {
        byte_index: page * WIDTH + column,
        bit: (row % PAGE_HEIGHT) as u8,
    }
}

/// One frame in the display's page-major layout.
#[derive(Clone, PartialEq, Eq)]
pub struct PackedFrame {
    data: Box<[u8; BUFFER_SIZE]>,
}

impl Default for PackedFrame {
    fn default() -> Self {
        Self {
            data: Box::new([0u8; BUFFER_SIZE]),
        }
    }
}

impl core::fmt::Debug for PackedFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PackedFrame")
            .field("set_bits", &self.count_set())
            .finish()
    }
}

impl PackedFrame {
    pub fn from_bytes(bytes: &[u8; BUFFER_SIZE]) -> Self {
        Self {
            data: Box::new(*bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.data
    }

    pub fn get(&self, row: usize, column: usize) -> bool {
        let pos = bit_position(row, column);
        (self.data[pos.byte_index] >> pos.bit) & 1 == 1
    }

    pub fn set(&mut self, row: usize, column: usize, on: bool) {
        let pos = bit_position(row, column);
        if on {
            self.data[pos.byte_index] |= 1 << pos.bit;
        } else {
            self.data[pos.byte_index] &= !(1 << pos.bit);
        }
    }

    pub fn clear(&mut self, on: bool) {
        self.data.fill(if on { 0xFF } else { 0x00 });
    }

    /// Number of lit pixels.
    pub fn count_set(&self) -> u32 {
        self.data.iter().map(|b| b.count_ones()).sum()
    }
}

impl From<[u8; BUFFER_SIZE]> for PackedFrame {
    fn from(bytes: [u8; BUFFER_SIZE]) -> Self {
        Self {
            data: Box::new(bytes),
        }
    }
}

impl AsRef<[u8]> for PackedFrame {
    fn as_ref(&self) -> &[u8] {
        &self.data[..]
    }
}

impl OriginDimensions for PackedFrame {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for PackedFrame {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if coord.x < 0 || coord.y < 0 {
                continue;
            }
            let (x, y) = (coord.x as usize, coord.y as usize);
            if x < WIDTH && y < HEIGHT {
                self.set(y, x, color.is_on());
            }
        }
        Ok(())
    }
}

/// Row-major grid of 8-bit intensities.
///
/// Dimensions are not checked on construction so that the packer can report
/// a mismatch instead of the frame source panicking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterFrame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl RasterFrame {
    /// Creates a raster from row-major pixels. Returns `None` when the pixel
    /// count does not match `width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        if width.checked_mul(height) != Some(pixels.len()) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// A display-sized raster filled with `value`.
    pub fn filled(value: u8) -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            pixels: vec![value; PIXEL_COUNT],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn get(&self, row: usize, column: usize) -> u8 {
        self.pixels[row * self.width + column]
    }

    pub fn set(&mut self, row: usize, column: usize, value: u8) {
        self.pixels[row * self.width + column] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::{
        Drawable,
        prelude::{Point, Primitive},
        primitives::{PrimitiveStyle, Rectangle},
    };

    #[test]
    fn test_geometry() {
        assert_eq!(PAGES, 8);
        assert_eq!(BUFFER_SIZE, 1024);
        assert_eq!(PIXEL_COUNT, 8 * BUFFER_SIZE);
    }

    #[test]
    fn test_bit_position_corners() {
        assert_eq!(bit_position(0, 0), BitPosition { byte_index: 0, bit: 0 });
        assert_eq!(bit_position(7, 0), BitPosition { byte_index: 0, bit: 7 });
        assert_eq!(bit_position(8, 0), BitPosition { byte_index: 128, bit: 0 });
        assert_eq!(bit_position(0, 127), BitPosition { byte_index: 127, bit: 0 });
        assert_eq!(
            bit_position(63, 127),
            BitPosition { byte_index: 1023, bit: 7 }
        );
    }

    #[test]
    fn test_set_and_clear_pixel() {
        let mut frame = PackedFrame::default();
        frame.set(10, 3, true);
        assert!(frame.get(10, 3));
        assert_eq!(frame.as_bytes()[3 + 128], 0b0000_0100);
        frame.set(10, 3, false);
        assert_eq!(frame.count_set(), 0);
    }

    #[test]
    fn test_draw_rectangle() {
        let mut frame = PackedFrame::default();
        Rectangle::new(Point::new(0, 0), Size::new(WIDTH as u32, 8))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut frame)
            .unwrap();
        // The whole top page is lit, nothing else.
        assert!(frame.as_bytes()[..WIDTH].iter().all(|&b| b == 0xFF));
        assert!(frame.as_bytes()[WIDTH..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_draw_ignores_out_of_bounds() {
        let mut frame = PackedFrame::default();
        Rectangle::new(Point::new(-4, 60), Size::new(8, 8))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut frame)
            .unwrap();
        assert_eq!(frame.count_set(), 4 * 4);
    }

    #[test]
    fn test_raster_shape_checked() {
        assert!(RasterFrame::new(4, 4, vec![0; 15]).is_none());
        let raster = RasterFrame::new(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(raster.get(1, 0), 3);
    }

    #[test]
    fn test_raster_huge_dimensions_rejected() {
        assert!(RasterFrame::new(usize::MAX, 2, vec![0; 4]).is_none());
        assert!(RasterFrame::new(2, usize::MAX, Vec::new()).is_none());
    }
}
