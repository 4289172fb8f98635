use log::info;
use pagevid_core::framebuffer::{BUFFER_SIZE, HEIGHT, PackedFrame, WIDTH, bit_position};

const DISPLAY_BUFFER_SIZE: usize = WIDTH * HEIGHT;

const LIT: u32 = 0xFFFFFFFF;
const DARK: u32 = 0xFF000000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Keys {
    pub pause: bool,
    pub previous: bool,
    pub next: bool,
}

/// A simulated 128x64 panel that takes frames in page layout.
pub struct MinifbDisplay {
    // Last page buffer sent to the panel
    shown: Box<[u8; BUFFER_SIZE]>,
    display_buffer: Box<[u32; DISPLAY_BUFFER_SIZE]>,
    window: minifb::Window,
    scale: minifb::Scale,
    fps: usize,
    keys: Keys,
}

impl MinifbDisplay {
    pub fn new(fps: u32) -> Self {
        let scale = minifb::Scale::X4;
        let fps = fps as usize;
        let mut ret = Self {
            shown: Box::new([0; BUFFER_SIZE]),
            display_buffer: Box::new([DARK; DISPLAY_BUFFER_SIZE]),
            window: Self::create_window(scale, fps),
            scale,
            fps,
            keys: Keys::default(),
        };
        ret.update_display();
        ret
    }

    fn create_window(scale: minifb::Scale, fps: usize) -> minifb::Window {
        let options = minifb::WindowOptions {
            borderless: false,
            title: true,
            resize: true,
            scale,
            ..minifb::WindowOptions::default()
        };
        let mut window = minifb::Window::new("pagevid preview", WIDTH, HEIGHT, options)
            .unwrap_or_else(|e| {
                panic!("Unable to open window: {}", e);
            });
        window.set_target_fps(fps);
        window
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(minifb::Key::Escape)
    }

    fn update_display(&mut self) {
        if let Err(e) = self
            .window
            .update_with_buffer(&*self.display_buffer, WIDTH, HEIGHT)
        {
            log::error!("Failed to present frame: {}", e);
        }
    }

    pub fn update(&mut self) {
        let pressed = |key| self.window.is_key_pressed(key, minifb::KeyRepeat::No);
        self.keys = Keys {
            pause: pressed(minifb::Key::Space),
            previous: pressed(minifb::Key::Left),
            next: pressed(minifb::Key::Right),
        };
        if pressed(minifb::Key::S) {
            info!("Toggling scale");
            self.scale = match self.scale {
                minifb::Scale::X1 => minifb::Scale::X2,
                minifb::Scale::X2 => minifb::Scale::X4,
                minifb::Scale::X4 => minifb::Scale::X8,
                _ => minifb::Scale::X1,
            };
            self.window = Self::create_window(self.scale, self.fps);
            self.update_display();
        }
    }

    pub fn keys(&self) -> Keys {
        self.keys
    }

    /// Blits only the pixels that changed since the last frame.
    pub fn show(&mut self, frame: &PackedFrame) {
        let next = frame.as_bytes();
        for row in 0..HEIGHT {
            for column in 0..WIDTH {
                let pos = bit_position(row, column);
                let mask = 1 << pos.bit;
                if (next[pos.byte_index] ^ self.shown[pos.byte_index]) & mask == 0 {
                    continue;
                }
                let on = next[pos.byte_index] & mask != 0;
                self.display_buffer[row * WIDTH + column] = if on { LIT } else { DARK };
            }
        }
        self.shown.copy_from_slice(next);
        self.update_display();
    }

    /// Presents the current buffer without changing it.
    pub fn refresh(&mut self) {
        self.update_display();
    }
}
