use argh::FromArgs;
use log::{error, info};
use pagevid_core::container;

use crate::minifb_display::MinifbDisplay;
use crate::std_fs::read_all;

mod minifb_display;
mod std_fs;

#[derive(FromArgs)]
/// Play the video section of a container on a simulated panel
struct Args {
    /// container file
    #[argh(positional)]
    path: String,

    /// playback rate
    #[argh(option, default = "30")]
    fps: u32,

    /// start again after the last frame
    #[argh(switch, short = 'l')]
    looping: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    let raw = read_all(&args.path).unwrap_or_else(|e| {
        error!("Failed to read {}: {}", args.path, e);
        std::process::exit(1);
    });
    let container = container::parse(&raw).unwrap_or_else(|e| {
        error!("Failed to parse {}: {}", args.path, e);
        std::process::exit(1);
    });

    let frame_count = container.frame_count() as usize;
    if frame_count == 0 {
        error!("{} has no frames", args.path);
        std::process::exit(1);
    }
    info!(
        "Playing {} frames at {} FPS (space: pause, left/right: step, s: scale)",
        frame_count, args.fps
    );

    let mut display = MinifbDisplay::new(args.fps.max(1));
    let mut index: usize = 0;
    let mut paused = false;
    let mut shown = None;

    while display.is_open() {
        display.update();
        let keys = display.keys();
        if keys.pause {
            paused = !paused;
            info!("{} at frame {}", if paused { "Paused" } else { "Resumed" }, index);
        }
        if keys.previous {
            index = index.checked_sub(1).unwrap_or(frame_count - 1);
        }
        if keys.next {
            index = (index + 1) % frame_count;
        }

        if shown != Some(index) {
            if let Some(frame) = container.frame(index) {
                display.show(&frame);
            }
            shown = Some(index);
        } else {
            display.refresh();
        }

        if !paused {
            if index + 1 < frame_count {
                index += 1;
            } else if args.looping {
                index = 0;
            }
        }
    }
}
