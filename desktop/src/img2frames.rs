use std::path::{Path, PathBuf};

use argh::FromArgs;
use image::{DynamicImage, imageops::FilterType};
use log::{error, info, warn};
use pagevid_core::{
    config::CodecConfig,
    framebuffer::{HEIGHT, PackedFrame, RasterFrame, WIDTH},
    io::write_video_file,
    packer,
};
use rayon::prelude::*;

use crate::std_fs::{Mode, StdFile};

mod std_fs;

/// Frames checked against their source after packing.
const VERIFY_FRAMES: usize = 5;

#[derive(FromArgs)]
/// Convert extracted video frames into the packed video file
struct Args {
    /// directory of frame images, played in file name order
    #[argh(option, short = 'i')]
    input_dir: String,

    /// output video file path
    #[argh(option, short = 'o')]
    output_path: String,

    /// pixels brighter than this are lit
    #[argh(option, short = 't', default = "128")]
    threshold: u8,

    /// swap lit and dark pixels
    #[argh(switch)]
    invert: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let config = CodecConfig::default()
        .with_threshold(args.threshold)
        .with_invert(args.invert);

    let paths = match list_frames(Path::new(&args.input_dir)) {
        Ok(paths) => paths,
        Err(e) => {
            error!("Failed to list {}: {}", args.input_dir, e);
            std::process::exit(1);
        }
    };
    if paths.is_empty() {
        error!("No frame images found in {}", args.input_dir);
        std::process::exit(1);
    }
    info!("Packing {} frames", paths.len());

    let rasters: Result<Vec<RasterFrame>, String> = paths
        .par_iter()
        .map(|path| load_raster(path))
        .collect();
    let rasters = match rasters {
        Ok(rasters) => rasters,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let frames: Result<Vec<PackedFrame>, _> = rasters
        .par_iter()
        .map(|raster| packer::pack(raster, &config))
        .collect();
    let frames = match frames {
        Ok(frames) => frames,
        Err(e) => {
            error!("Failed to pack frame: {}", e);
            std::process::exit(1);
        }
    };

    let verified = rasters
        .iter()
        .zip(&frames)
        .take(VERIFY_FRAMES)
        .filter(|(raster, frame)| packer::verify(raster, frame, &config).unwrap_or(false))
        .count();
    let expected = VERIFY_FRAMES.min(frames.len());
    if verified == expected {
        info!("Verified {}/{} frames", verified, expected);
    } else {
        warn!("Only {}/{} frames passed layout verification", verified, expected);
    }

    let mut out = match StdFile::open(&args.output_path, Mode::Write) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to create {}: {}", args.output_path, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = write_video_file(&mut out, &frames) {
        error!("Failed to write {}: {}", args.output_path, e);
        std::process::exit(1);
    }
    info!(
        "Wrote {} frames ({} bytes) to {}",
        frames.len(),
        4 + frames.len() * pagevid_core::framebuffer::BUFFER_SIZE,
        args.output_path
    );
}

fn list_frames(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let extensions = ["png", "jpg", "jpeg", "bmp", "webp"];
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn load_raster(path: &Path) -> Result<RasterFrame, String> {
    let image = image::open(path).map_err(|e| format!("Failed to open {:?}: {}", path, e))?;
    Ok(to_raster(image))
}

fn to_raster(image: DynamicImage) -> RasterFrame {
    let image = if image.width() as usize != WIDTH || image.height() as usize != HEIGHT {
        image.resize_exact(WIDTH as u32, HEIGHT as u32, FilterType::Triangle)
    } else {
        image
    };
    let luma = image.into_luma8();
    let (width, height) = (luma.width() as usize, luma.height() as usize);
    RasterFrame::new(width, height, luma.into_raw()).expect("Luma buffer is width * height")
}
