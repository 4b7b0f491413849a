// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Stores and displays the Chip-8's screen memory

use std::fmt::{Display, Formatter, Result};

/// Width of the screen, in pixels
pub const WIDTH: usize = 64;
/// Height of the screen, in pixels
pub const HEIGHT: usize = 32;

/// A 64x32 monochrome framebuffer, one byte (0 or 1) per pixel, row-major
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    pixels: [u8; WIDTH * HEIGHT],
}

impl Screen {
    /// Constructs a new, blank screen
    pub fn new() -> Self {
        Screen {
            pixels: [0; WIDTH * HEIGHT],
        }
    }

    /// Turns every pixel off
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Gets the pixel at (x, y), or None if it's off the screen
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let screen = Screen::default();
    /// assert_eq!(Some(0), screen.pixel(63, 31));
    /// assert_eq!(None, screen.pixel(64, 0));
    /// ```
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x < WIDTH && y < HEIGHT {
            Some(self.pixels[x + y * WIDTH])
        } else {
            None
        }
    }

    /// Gets the framebuffer as a slice, indexed by `x + y * 64`
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    /// XORs an 8-pixel-wide sprite onto the screen with its top-left corner at (x, y).
    ///
    /// `x` and `y` are taken modulo the screen size. Rows and columns that run off
    /// the edge are wrapped around when `wrap` is set, and clipped otherwise.
    ///
    /// Returns true if any pixel was turned off (a collision).
    /// # Examples
    /// ```rust
    /// # use chip8vm::*;
    /// let mut screen = Screen::default();
    /// assert!(!screen.draw_sprite(0, 0, &[0xff], false));
    /// assert_eq!(8, screen.as_slice().iter().filter(|&&p| p == 1).count());
    /// assert!(screen.draw_sprite(0, 0, &[0xff], false));
    /// assert!(screen.as_slice().iter().all(|&p| p == 0));
    /// ```
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8], wrap: bool) -> bool {
        let (x, y) = (x % WIDTH, y % HEIGHT);
        let mut collision = false;
        for (line, &row) in sprite.iter().enumerate() {
            let py = y + line;
            if py >= HEIGHT && !wrap {
                break;
            }
            for bit in 0..8 {
                if row & (0x80 >> bit) == 0 {
                    continue;
                }
                let px = x + bit;
                if px >= WIDTH && !wrap {
                    break;
                }
                let pixel = &mut self.pixels[px % WIDTH + (py % HEIGHT) * WIDTH];
                collision |= *pixel == 1;
                *pixel ^= 1;
            }
        }
        collision
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Screen {
    /// Renders the screen as text, two pixel rows per line of half-blocks
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for rows in self.pixels.chunks(WIDTH * 2) {
            let (top, bottom) = rows.split_at(WIDTH);
            for (&t, &b) in top.iter().zip(bottom) {
                write!(
                    f,
                    "{}",
                    match (t, b) {
                        (0, 0) => ' ',
                        (_, 0) => '▀',
                        (0, _) => '▄',
                        _ => '█',
                    }
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(screen: &Screen) -> usize {
        screen.as_slice().iter().filter(|&&p| p == 1).count()
    }

    #[test]
    fn clips_at_right_edge() {
        let mut screen = Screen::new();
        screen.draw_sprite(60, 0, &[0xff], false);
        assert_eq!(4, lit(&screen));
        assert_eq!(Some(1), screen.pixel(63, 0));
        assert_eq!(Some(0), screen.pixel(0, 0));
    }

    #[test]
    fn clips_at_bottom_edge() {
        let mut screen = Screen::new();
        screen.draw_sprite(0, 30, &[0x80; 4], false);
        assert_eq!(2, lit(&screen));
        assert_eq!(Some(0), screen.pixel(0, 0));
    }

    #[test]
    fn wraps_when_asked() {
        let mut screen = Screen::new();
        screen.draw_sprite(60, 30, &[0xff; 4], true);
        assert_eq!(32, lit(&screen));
        assert_eq!(Some(1), screen.pixel(0, 0));
        assert_eq!(Some(1), screen.pixel(3, 1));
        assert_eq!(Some(0), screen.pixel(4, 0));
    }

    #[test]
    fn origin_wraps() {
        let mut screen = Screen::new();
        screen.draw_sprite(64 + 2, 32 + 1, &[0x80], false);
        assert_eq!(Some(1), screen.pixel(2, 1));
    }

    #[test]
    fn collision_on_partial_overlap() {
        let mut screen = Screen::new();
        assert!(!screen.draw_sprite(0, 0, &[0xf0], false));
        assert!(screen.draw_sprite(0, 0, &[0x18], false));
        assert_eq!(Some(0), screen.pixel(3, 0));
        assert_eq!(Some(1), screen.pixel(4, 0));
    }

    #[test]
    fn display() {
        let mut screen = Screen::new();
        screen.draw_sprite(0, 0, &[0x80, 0x80, 0x00, 0x80], false);
        let text = screen.to_string();
        assert_eq!(16, text.lines().count());
        assert!(text.starts_with('█'));
        assert!(text.lines().nth(1).unwrap().starts_with('▄'));
    }
}
