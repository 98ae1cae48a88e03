//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! The first frame (and any frame after a resize or [`TerminalRenderer::invalidate`]) is a
//! full redraw; every other frame only emits runs of cells that changed.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{Cell, CellStyle, FrameBuffer, Rgb};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(64 * 1024),
        }
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.flush_buf()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw.
    ///
    /// Useful on terminal resize events.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw a framebuffer, swapping it into internal state.
    ///
    /// Callers should keep one `FrameBuffer` and pass it in every frame.
    /// The renderer will diff against the previous frame and then swap buffers
    /// so the caller can reuse the old one without cloning.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.buf.clear();
        let mut prev = match self.last.take() {
            Some(prev) if prev.width() == fb.width() && prev.height() == fb.height() => {
                encode_diff_into(&prev, fb, &mut self.buf)?;
                prev
            }
            stale => {
                encode_full_into(fb, &mut self.buf)?;
                let mut prev = stale.unwrap_or_else(|| FrameBuffer::new(0, 0));
                prev.resize(fb.width(), fb.height());
                prev
            }
        };
        self.flush_buf()?;

        // Swap current into prev so next frame can diff without cloning.
        std::mem::swap(&mut prev, fb);
        self.last = Some(prev);
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Encode a full-frame redraw into `out`.
///
/// This builds a sequence of crossterm commands without writing to stdout.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;

    let mut pen = Pen::default();
    for (y, row) in rows(fb).enumerate() {
        if y > 0 {
            out.queue(Print("\r\n"))?;
        }
        for cell in row {
            pen.put(out, *cell)?;
        }
    }
    pen.finish(out)
}

/// Encode only the runs of cells that differ between `prev` and `next`.
///
/// Falls back to a full redraw when the sizes differ.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    if prev.width() != next.width() || prev.height() != next.height() {
        return encode_full_into(next, out);
    }

    let mut pen = Pen::default();
    for (y, (old, new)) in rows(prev).zip(rows(next)).enumerate() {
        for (start, end) in changed_runs(old, new) {
            out.queue(cursor::MoveTo(start as u16, y as u16))?;
            for cell in &new[start..end] {
                pen.put(out, *cell)?;
            }
        }
    }
    pen.finish(out)
}

fn rows(fb: &FrameBuffer) -> std::slice::Chunks<'_, Cell> {
    // `chunks(0)` panics; an empty buffer has no rows anyway.
    fb.cells().chunks(fb.width().max(1) as usize)
}

/// Half-open column ranges `[start, end)` where two equally long rows differ.
fn changed_runs<'a>(old: &'a [Cell], new: &'a [Cell]) -> impl Iterator<Item = (usize, usize)> + 'a {
    let mut x = 0;
    std::iter::from_fn(move || {
        let start = x + old[x..].iter().zip(&new[x..]).position(|(a, b)| a != b)?;
        let len = old[start..]
            .iter()
            .zip(&new[start..])
            .take_while(|(a, b)| a != b)
            .count();
        x = start + len;
        Some((start, x))
    })
}

/// Tracks the terminal's SGR state so unchanged attributes are not re-sent.
#[derive(Default)]
struct Pen {
    current: Option<CellStyle>,
}

impl Pen {
    fn put(&mut self, out: &mut Vec<u8>, cell: Cell) -> Result<()> {
        let style = cell.style;
        match self.current {
            Some(cur) if cur == style => {}
            Some(cur) if cur.bold == style.bold && cur.dim == style.dim => {
                if cur.fg != style.fg {
                    out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
                }
                if cur.bg != style.bg {
                    out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
                }
            }
            _ => {
                // SGR reset clears colors too, so it goes first.
                out.queue(SetAttribute(Attribute::Reset))?;
                if style.bold {
                    out.queue(SetAttribute(Attribute::Bold))?;
                }
                if style.dim {
                    out.queue(SetAttribute(Attribute::Dim))?;
                }
                out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
                out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
            }
        }
        self.current = Some(style);
        out.queue(Print(cell.ch))?;
        Ok(())
    }

    fn finish(self, out: &mut Vec<u8>) -> Result<()> {
        if self.current.is_some() {
            out.queue(ResetColor)?;
            out.queue(SetAttribute(Attribute::Reset))?;
        }
        Ok(())
    }
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}
