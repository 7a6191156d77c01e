//! Cell grid the screen is painted into before it is flushed.

use crossterm::style::Color;
use unicode_width::UnicodeWidthChar;

/// Visual attributes of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub dim: bool,
    pub reverse: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fg: Color::Reset,
            bg: Color::Reset,
            bold: false,
            dim: false,
            reverse: false,
        }
    }
}

impl Style {
    pub fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
    /// Right half of a double-width character; never written itself.
    pub wide_continuation: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
            wide_continuation: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Blank a rectangle and paint it with `style`.
    pub fn fill(&mut self, x: u16, y: u16, width: u16, height: u16, style: Style) {
        for row in y..y.saturating_add(height) {
            for col in x..x.saturating_add(width) {
                if let Some(i) = self.index(col, row) {
                    self.cells[i] = Cell {
                        ch: ' ',
                        style,
                        wide_continuation: false,
                    };
                }
            }
        }
    }

    /// Write `text` at `(x, y)`, clipped to `max_width` columns and to the
    /// buffer edge. Returns the number of columns written.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style, max_width: u16) -> u16 {
        let limit = max_width.min(self.width.saturating_sub(x));
        let mut used: u16 = 0;

        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            if used + width > limit {
                break;
            }
            if let Some(i) = self.index(x + used, y) {
                self.cells[i] = Cell {
                    ch,
                    style,
                    wide_continuation: false,
                };
            }
            if width == 2
                && let Some(i) = self.index(x + used + 1, y)
            {
                self.cells[i] = Cell {
                    ch: ' ',
                    style,
                    wide_continuation: true,
                };
            }
            used += width;
        }
        used
    }

    /// Text of one row, continuation cells skipped. Mostly for tests.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .filter(|cell| !cell.wide_continuation)
            .map(|cell| cell.ch)
            .collect()
    }

    /// Cells that differ from `previous`, row-major.
    pub fn diff<'a>(&'a self, previous: &'a Buffer) -> impl Iterator<Item = (u16, u16, &'a Cell)> {
        let width = usize::from(self.width.max(1));
        self.cells
            .iter()
            .zip(previous.cells.iter())
            .enumerate()
            .filter(|(_, (now, before))| now != before)
            .map(move |(i, (cell, _))| ((i % width) as u16, (i / width) as u16, cell))
    }
}

/// Display width of `text` in columns.
pub fn text_width(text: &str) -> u16 {
    unicode_width::UnicodeWidthStr::width(text).min(usize::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_str_clips() {
        let mut buffer = Buffer::new(10, 2);
        let written = buffer.put_str(6, 0, "Present", Style::default(), 20);
        assert_eq!(written, 4);
        assert_eq!(buffer.row_text(0), "      Pres");

        let written = buffer.put_str(0, 1, "Absent", Style::default(), 3);
        assert_eq!(written, 3);
        assert_eq!(buffer.row_text(1).trim_end(), "Abs");
    }

    #[test]
    fn test_wide_char_marks_continuation() {
        let mut buffer = Buffer::new(6, 1);
        buffer.put_str(0, 0, "日x", Style::default(), 6);
        assert!(buffer.get(1, 0).unwrap().wide_continuation);
        assert_eq!(buffer.get(2, 0).unwrap().ch, 'x');
        assert_eq!(buffer.row_text(0).trim_end(), "日x");
    }

    #[test]
    fn test_diff_reports_changed_cells() {
        let previous = Buffer::new(4, 2);
        let mut current = Buffer::new(4, 2);
        current.put_str(1, 1, "ok", Style::default(), 4);

        let changed: Vec<_> = current.diff(&previous).map(|(x, y, c)| (x, y, c.ch)).collect();
        assert_eq!(changed, vec![(1, 1, 'o'), (2, 1, 'k')]);
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut buffer = Buffer::new(3, 1);
        assert_eq!(buffer.put_str(5, 5, "x", Style::default(), 1), 0);
        buffer.fill(2, 0, 10, 10, Style::default().reverse());
        assert!(buffer.get(2, 0).unwrap().style.reverse);
        assert!(buffer.get(3, 0).is_none());
    }

    #[test]
    fn test_fill_blanks_text() {
        let mut buffer = Buffer::new(4, 1);
        buffer.put_str(0, 0, "abcd", Style::default(), 4);
        buffer.fill(1, 0, 2, 1, Style::default().bold());

        assert_eq!(buffer.row_text(0), "a  d");
        assert!(buffer.get(1, 0).unwrap().style.bold);
        assert!(!buffer.get(3, 0).unwrap().style.bold);
    }
}
