//! Conversion between rasters and the display's packed page layout.
//!
//! Packing thresholds each pixel (`intensity > threshold` is lit, optionally
//! inverted) and stores it at [`bit_position`]. Unpacking reverses only the
//! bit layout; the result is a 0/1 raster.

use crate::{
    config::CodecConfig,
    error::PackError,
    framebuffer::{BUFFER_SIZE, HEIGHT, PackedFrame, RasterFrame, WIDTH, bit_position},
};

type Result<T> = core::result::Result<T, PackError>;

fn check_shape(frame: &RasterFrame) -> Result<()> {
    if frame.width() != WIDTH || frame.height() != HEIGHT {
        return Err(PackError::ShapeMismatch {
            width: frame.width(),
            height: frame.height(),
        });
    }
    Ok(())
}

fn pack_with(frame: &RasterFrame, lit: impl Fn(u8) -> bool) -> Result<PackedFrame> {
    check_shape(frame)?;
    let mut bytes = [0u8; BUFFER_SIZE];
    for row in 0..HEIGHT {
        for column in 0..WIDTH {
            if lit(frame.get(row, column)) {
                let pos = bit_position(row, column);
                bytes[pos.byte_index] |= 1 << pos.bit;
            }
        }
    }
    Ok(PackedFrame::from(bytes))
}

#[inline]
fn is_lit(value: u8, config: &CodecConfig) -> bool {
    (value > config.threshold) != config.invert
}

/// Thresholds and packs a 128x64 grayscale raster.
pub fn pack(frame: &RasterFrame, config: &CodecConfig) -> Result<PackedFrame> {
    pack_with(frame, |value| is_lit(value, config))
}

/// Packs a raster that is already binary. Any non-zero pixel is lit.
pub fn pack_bits(frame: &RasterFrame) -> Result<PackedFrame> {
    pack_with(frame, |value| value != 0)
}

/// Expands a packed frame into a 0/1 raster.
pub fn unpack(packed: &PackedFrame) -> RasterFrame {
    let mut raster = RasterFrame::filled(0);
    for row in 0..HEIGHT {
        for column in 0..WIDTH {
            raster.set(row, column, packed.get(row, column) as u8);
        }
    }
    raster
}

/// The 0/1 raster `pack` would encode for `frame`.
pub fn threshold(frame: &RasterFrame, config: &CodecConfig) -> Result<RasterFrame> {
    check_shape(frame)?;
    let mut binary = frame.clone();
    for value in binary.pixels_mut() {
        *value = is_lit(*value, config) as u8;
    }
    Ok(binary)
}

/// Checks that `packed` decodes to the thresholded `frame`.
pub fn verify(frame: &RasterFrame, packed: &PackedFrame, config: &CodecConfig) -> Result<bool> {
    Ok(threshold(frame, config)? == unpack(packed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::PIXEL_COUNT;
    use alloc::{vec, vec::Vec};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    fn random_binary(rng: &mut Pcg64, density: f64) -> RasterFrame {
        let pixels: Vec<u8> = (0..PIXEL_COUNT)
            .map(|_| rng.random_bool(density) as u8)
            .collect();
        RasterFrame::new(WIDTH, HEIGHT, pixels).unwrap()
    }

    #[test]
    fn test_roundtrip_random_binary() {
        let mut rng = Pcg64::seed_from_u64(0x5eed);
        for i in 0..256 {
            let density = (i % 11) as f64 / 10.0;
            let raster = random_binary(&mut rng, density);
            let packed = pack_bits(&raster).unwrap();
            assert_eq!(unpack(&packed), raster, "frame {} differs", i);
        }
    }

    #[test]
    fn test_single_pixel_every_position() {
        for row in 0..HEIGHT {
            for column in 0..WIDTH {
                let mut raster = RasterFrame::filled(0);
                raster.set(row, column, 1);
                let packed = pack_bits(&raster).unwrap();
                let expected_index = column + WIDTH * (row / 8);
                for (index, &byte) in packed.as_bytes().iter().enumerate() {
                    if index == expected_index {
                        assert_eq!(byte, 1 << (row % 8), "row {} column {}", row, column);
                    } else {
                        assert_eq!(byte, 0, "row {} column {} leaked into {}", row, column, index);
                    }
                }
            }
        }
    }

    #[test]
    fn test_vertical_bar_fills_page_bytes() {
        let mut raster = RasterFrame::filled(0);
        for row in 0..8 {
            raster.set(row, 5, 255);
        }
        let packed = pack(&raster, &CodecConfig::default()).unwrap();
        assert_eq!(packed.as_bytes()[5], 0xFF);
        assert_eq!(packed.count_set(), 8);
    }

    #[test]
    fn test_threshold_is_strict() {
        let config = CodecConfig::default().with_threshold(100);
        let mut raster = RasterFrame::filled(100);
        raster.set(0, 0, 101);
        let packed = pack(&raster, &config).unwrap();
        assert_eq!(packed.count_set(), 1);
        assert!(packed.get(0, 0));
    }

    #[test]
    fn test_invert() {
        let config = CodecConfig::default().with_invert(true);
        let packed = pack(&RasterFrame::filled(0), &config).unwrap();
        assert!(packed.as_bytes().iter().all(|&b| b == 0xFF));
        let packed = pack(&RasterFrame::filled(255), &config).unwrap();
        assert_eq!(packed.count_set(), 0);
    }

    #[test]
    fn test_shape_mismatch() {
        let raster = RasterFrame::new(64, 128, vec![0; PIXEL_COUNT]).unwrap();
        assert_eq!(
            pack(&raster, &CodecConfig::default()),
            Err(PackError::ShapeMismatch {
                width: 64,
                height: 128
            })
        );
        assert!(pack_bits(&raster).is_err());
    }

    #[test]
    fn test_verify_grayscale() {
        let mut rng = Pcg64::seed_from_u64(42);
        let config = CodecConfig::default();
        let pixels: Vec<u8> = (0..PIXEL_COUNT).map(|_| rng.random()).collect();
        let raster = RasterFrame::new(WIDTH, HEIGHT, pixels).unwrap();
        let packed = pack(&raster, &config).unwrap();
        assert!(verify(&raster, &packed, &config).unwrap());

        let mut tampered = packed.clone();
        tampered.set(63, 127, !packed.get(63, 127));
        assert!(!verify(&raster, &tampered, &config).unwrap());
        assert_eq!(packed.as_bytes().len(), BUFFER_SIZE);
    }
}
