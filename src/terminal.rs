use std::io::Write;

use anyhow::Result;
use crossterm::terminal;

use crate::renderer::Renderer;

const HALF_BLOCK: &str = "\u{2580}";

/// Terminal size in columns and rows.
pub fn terminal_size() -> (u32, u32) {
    match terminal::size() {
        Ok((cols, rows)) => (cols as u32, rows as u32),
        Err(_) => (80, 24), // fallback
    }
}

/// Pixel resolution that fills `cols x rows` cells, two pixel rows per cell.
pub fn pixel_size(cols: u32, rows: u32) -> (u32, u32) {
    (cols.max(1), rows.max(1).saturating_mul(2))
}

/// Writes the colour buffer as upper-half blocks: the foreground paints the
/// upper pixel, the background the lower one.
pub fn present<W: Write>(out: &mut W, renderer: &Renderer) -> Result<()> {
    let pixels = renderer.pixels();
    let width = renderer.width as usize;
    let height = renderer.height as usize;

    write!(out, "\x1b[?2026h")?; // Begin synchronized update

    let mut prev: Option<([u8; 3], [u8; 3])> = None;

    for y in (0..height).step_by(2) {
        for x in 0..width {
            let upper = pixels[y * width + x];
            let lower = if y + 1 < height {
                pixels[(y + 1) * width + x]
            } else {
                [0, 0, 0]
            };

            if prev != Some((upper, lower)) {
                write!(out, "\x1b[38;2;{};{};{}m", upper[0], upper[1], upper[2])?;
                write!(out, "\x1b[48;2;{};{};{}m", lower[0], lower[1], lower[2])?;
                prev = Some((upper, lower));
            }

            write!(out, "{}", HALF_BLOCK)?;
        }
        write!(out, "\x1b[0m\r\n")?;
        prev = None;
    }

    write!(out, "\x1b[?2026l")?; // End synchronized update

    out.flush()?;
    Ok(())
}
