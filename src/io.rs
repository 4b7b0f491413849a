// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)
#![allow(missing_docs)]
//! Windowed frontend for the interpreter, built on [minifb]

use crate::{error::Result, screen, CPU};
use minifb::*;
use std::{
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(Clone, Debug)]
pub struct UIBuilder {
    pub width: usize,
    pub height: usize,
    pub name: Option<&'static str>,
    pub rom: Option<PathBuf>,
    pub window_options: WindowOptions,
}

impl UIBuilder {
    pub fn new(width: usize, height: usize, rom: impl AsRef<Path>) -> Self {
        UIBuilder {
            width,
            height,
            rom: Some(rom.as_ref().to_owned()),
            ..Default::default()
        }
    }
    pub fn build(&self) -> Result<UI> {
        let ui = UI {
            window: Window::new(
                self.name.unwrap_or_default(),
                self.width,
                self.height,
                self.window_options,
            )?,
            keyboard: Default::default(),
            fb: Default::default(),
            rom: self.rom.to_owned().unwrap_or_default(),
            time: Instant::now(),
        };
        Ok(ui)
    }
}

impl Default for UIBuilder {
    fn default() -> Self {
        UIBuilder {
            width: screen::WIDTH,
            height: screen::HEIGHT,
            name: Some("chip8vm"),
            rom: None,
            window_options: WindowOptions {
                title: true,
                resize: false,
                scale: Scale::X16,
                scale_mode: ScaleMode::AspectRatioStretch,
                none: true,
                ..Default::default()
            },
        }
    }
}

/// Colors for lit and unlit pixels, as `0x00RRGGBB`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameBufferFormat {
    pub fg: u32,
    pub bg: u32,
}

impl Default for FrameBufferFormat {
    fn default() -> Self {
        FrameBufferFormat {
            fg: 0x0011a434,
            bg: 0x001E2431,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameBuffer {
    buffer: Vec<u32>,
    width: usize,
    height: usize,
    format: FrameBufferFormat,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            buffer: vec![0x00be4d; width * height],
            width,
            height,
            format: Default::default(),
        }
    }
    /// Converts the screen's pixels into colors
    pub fn paint(&mut self, screen: &crate::Screen) {
        for (color, &pixel) in self.buffer.iter_mut().zip(screen.as_slice()) {
            *color = if pixel != 0 {
                self.format.fg
            } else {
                self.format.bg
            }
        }
    }
    pub fn render(&mut self, window: &mut Window, screen: &crate::Screen) -> Result<()> {
        self.paint(screen);
        window.update_with_buffer(&self.buffer, self.width, self.height)?;
        Ok(())
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(screen::WIDTH, screen::HEIGHT)
    }
}

#[derive(Debug)]
pub struct UI {
    window: Window,
    keyboard: Vec<Key>,
    fb: FrameBuffer,
    rom: PathBuf,
    time: Instant,
}

impl UI {
    /// Redraws the window. Returns false once the window has been closed.
    pub fn frame(&mut self, cpu: &mut CPU) -> Result<bool> {
        if cpu.flags.pause {
            self.window.set_title("chip8vm ⏸")
        } else if cpu.sound() > 0 {
            self.window.set_title("chip8vm ♪")
        } else {
            self.window.set_title(&format!(
                "chip8vm  ▶ {:02.02}",
                (1.0 / self.time.elapsed().as_secs_f64())
            ));
        }
        if !self.window.is_open() {
            return Ok(false);
        }
        self.time = Instant::now();
        if cpu.take_redraw() {
            self.fb.render(&mut self.window, cpu.screen())?;
        } else {
            // keep the event loop pumping
            self.window.update();
        }
        Ok(true)
    }

    /// Feeds key presses and releases into the CPU, and handles the debug keybinds.
    /// Returns false if the user asked to quit.
    pub fn keys(&mut self, cpu: &mut CPU) -> Result<bool> {
        let held = self.window.get_keys();
        for &key in self.keyboard.iter().filter(|key| !held.contains(key)) {
            if let Some(key) = identify_key(key) {
                cpu.release(key)?;
            }
        }
        for &key in held.iter().filter(|key| !self.keyboard.contains(key)) {
            use Key::*;
            match key {
                F1 | Comma => cpu.dump(),
                F2 | Period => print!("{}", cpu.screen()),
                F4 | Slash => eprintln!("Debug {}.", {
                    cpu.flags.debug();
                    if cpu.flags.debug {
                        "enabled"
                    } else {
                        "disabled"
                    }
                }),
                F5 | Backslash => eprintln!("{}.", {
                    cpu.flags.pause();
                    if cpu.flags.pause {
                        "Paused"
                    } else {
                        "Unpaused"
                    }
                }),
                F6 | Enter => {
                    eprintln!("Step");
                    cpu.singlestep()?;
                }
                F9 | Delete => {
                    eprintln!("Reset at {:03x}", cpu.pc());
                    reload(cpu, &self.rom)?;
                }
                Escape => return Ok(false),
                key => {
                    if let Some(key) = identify_key(key) {
                        cpu.press(key)?;
                    }
                }
            }
        }
        self.keyboard = held;
        Ok(true)
    }
}

/// Resets the CPU, and loads a fresh copy of the program from `rom`
pub fn reload(cpu: &mut CPU, rom: &Path) -> Result<()> {
    cpu.load_program(rom)?;
    Ok(())
}

/// Maps the left side of a QWERTY keyboard onto the Chip-8 keypad
/// ```text
/// 1 2 3 4      1 2 3 C
/// Q W E R  ->  4 5 6 D
/// A S D F      7 8 9 E
/// Z X C V      A 0 B F
/// ```
pub fn identify_key(key: Key) -> Option<usize> {
    match key {
        Key::Key1 => Some(0x1),
        Key::Key2 => Some(0x2),
        Key::Key3 => Some(0x3),
        Key::Key4 => Some(0xc),
        Key::Q => Some(0x4),
        Key::W => Some(0x5),
        Key::E => Some(0x6),
        Key::R => Some(0xD),
        Key::A => Some(0x7),
        Key::S => Some(0x8),
        Key::D => Some(0x9),
        Key::F => Some(0xE),
        Key::Z => Some(0xA),
        Key::X => Some(0x0),
        Key::C => Some(0xB),
        Key::V => Some(0xF),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypad_is_complete() {
        let keys = [
            Key::Key1, Key::Key2, Key::Key3, Key::Key4,
            Key::Q, Key::W, Key::E, Key::R,
            Key::A, Key::S, Key::D, Key::F,
            Key::Z, Key::X, Key::C, Key::V,
        ];
        let mut seen = [false; 16];
        for key in keys {
            seen[identify_key(key).unwrap()] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(None, identify_key(Key::Space));
    }

    #[test]
    fn reload_keeps_program() {
        let rom = std::env::temp_dir().join(format!("chip8vm-reload-{}.ch8", std::process::id()));
        std::fs::write(&rom, [0x60, 0x42, 0x12, 0x02]).unwrap();
        let mut cpu = CPU::default();
        cpu.load_program(&rom).unwrap();
        cpu.multistep(4).unwrap();
        cpu.press(0x3).unwrap();

        reload(&mut cpu, &rom).unwrap();
        std::fs::remove_file(&rom).ok();

        assert_eq!(0x200, cpu.pc());
        assert_eq!(0, cpu.v()[0]);
        assert_eq!(&[false; 16], cpu.keys());
        // the program is still there, and still runs
        cpu.multistep(2).unwrap();
        assert_eq!(0x42, cpu.v()[0]);
        assert_eq!(0x202, cpu.pc());
        assert_eq!(0, cpu.unrecognized());
    }

    #[test]
    fn paint() {
        let mut screen = crate::Screen::default();
        screen.draw_sprite(0, 0, &[0x80], false);
        let mut fb = FrameBuffer::default();
        fb.paint(&screen);
        assert_eq!(fb.format.fg, fb.buffer[0]);
        assert!(fb.buffer[1..].iter().all(|&c| c == fb.format.bg));
    }
}
