//! Terminal setup, teardown and diffed drawing.

mod buffer;

pub use buffer::{Buffer, Style, text_width};

use std::io::{self, Stdout, Write};
use std::panic;

use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Attribute, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::debug;

/// Owns the terminal while the UI runs. Restores it on drop and on panic.
pub struct TerminalGuard {
    stdout: Stdout,
    /// What the terminal currently shows.
    previous: Buffer,
}

impl TerminalGuard {
    pub fn new() -> io::Result<Self> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            original_hook(panic_info);
        }));

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let (width, height) = terminal::size()?;
        debug!("terminal ready ({width}x{height})");
        Ok(Self {
            stdout,
            previous: Buffer::new(width, height),
        })
    }

    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Write the cells of `frame` that changed since the last draw.
    ///
    /// A frame of a different size than the last one repaints everything.
    pub fn draw(&mut self, frame: &Buffer) -> io::Result<()> {
        if frame.width() != self.previous.width() || frame.height() != self.previous.height() {
            queue!(self.stdout, terminal::Clear(terminal::ClearType::All))?;
            self.previous = Buffer::new(frame.width(), frame.height());
        }

        let mut cursor_at: Option<(u16, u16)> = None;
        let mut last_style: Option<Style> = None;

        for (x, y, cell) in frame.diff(&self.previous) {
            if cell.wide_continuation {
                continue;
            }
            if cursor_at != Some((x, y)) {
                queue!(self.stdout, cursor::MoveTo(x, y))?;
            }
            if last_style != Some(cell.style) {
                apply_style(&mut self.stdout, cell.style)?;
                last_style = Some(cell.style);
            }
            write!(self.stdout, "{}", cell.ch)?;
            let advance = unicode_width::UnicodeWidthChar::width(cell.ch).unwrap_or(1).max(1);
            cursor_at = Some((x.saturating_add(advance as u16), y));
        }

        queue!(self.stdout, SetAttribute(Attribute::Reset))?;
        self.stdout.flush()?;
        self.previous = frame.clone();
        Ok(())
    }
}

fn apply_style(out: &mut impl Write, style: Style) -> io::Result<()> {
    queue!(
        out,
        SetAttribute(Attribute::Reset),
        SetForegroundColor(style.fg),
        SetBackgroundColor(style.bg)
    )?;
    if style.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        queue!(out, SetAttribute(Attribute::Dim))?;
    }
    if style.reverse {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    }
    Ok(())
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        cursor::Show
    )?;
    Ok(())
}
