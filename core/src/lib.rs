/*!
Packed-frame media container for a 128x64 monochrome display with PCM audio.

Frames are stored in the display controller's page layout (8 vertical pixels
per byte) so the player can copy them straight to the panel. The container is
a 20-byte header, the packed frames, then interleaved PCM.

## Usage
```
# use pagevid_core::{config::{AudioFormat, CodecConfig}, container, packer, validate};
# use pagevid_core::framebuffer::RasterFrame;
# fn main() -> Result<(), Box<dyn std::error::Error>> {
let config = CodecConfig::default();
let frame = packer::pack(&RasterFrame::filled(200), &config)?;
let file = container::assemble(&[frame], &[0u8; 4], AudioFormat::default())?;
let parsed = container::parse(file.as_bytes())?;
let report = validate::validate_container(&parsed, &config);
assert!(report.is_valid());
# Ok(())
# }
```
*/

#![no_std]

pub mod config;
pub mod container;
pub mod error;
pub mod framebuffer;
pub mod inspect;
pub mod io;
pub mod packer;
pub mod validate;

extern crate alloc;
