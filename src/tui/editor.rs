//! Multi-line source buffer with a char-indexed cursor.

use unicode_width::UnicodeWidthStr;

use crate::utils::unicode::char_to_byte_index;

#[derive(Debug, Clone)]
pub struct Editor {
    lines: Vec<String>,
    row: usize,
    /// Cursor column in characters.
    col: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }
}

impl Editor {
    pub fn with_text(text: &str) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        let row = lines.len() - 1;
        let col = lines[row].chars().count();
        Self { lines, row, col }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    /// Terminal column of the cursor within its line.
    pub fn cursor_display_col(&self) -> usize {
        let line = &self.lines[self.row];
        line[..char_to_byte_index(line, self.col)].width()
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.newline();
            return;
        }
        let line = &mut self.lines[self.row];
        let at = char_to_byte_index(line, self.col);
        line.insert(at, c);
        self.col += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.replace("\r\n", "\n").replace('\r', "\n").chars() {
            self.insert_char(c);
        }
    }

    pub fn newline(&mut self) {
        let line = &mut self.lines[self.row];
        let at = char_to_byte_index(line, self.col);
        let rest = line.split_off(at);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let at = char_to_byte_index(line, self.col - 1);
            line.remove(at);
            self.col -= 1;
        } else if self.row > 0 {
            let current = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&current);
        }
    }

    pub fn delete(&mut self) {
        if self.col < self.line_len(self.row) {
            let line = &mut self.lines[self.row];
            let at = char_to_byte_index(line, self.col);
            line.remove(at);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = self.line_len(self.row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_newlines() {
        let mut ed = Editor::default();
        ed.insert_str("x = 1\nprint(x)");
        assert_eq!(ed.text(), "x = 1\nprint(x)");
        assert_eq!(ed.cursor(), (1, 8));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut ed = Editor::with_text("ab\ncd");
        ed.move_home();
        ed.backspace();
        assert_eq!(ed.text(), "abcd");
        assert_eq!(ed.cursor(), (0, 2));
    }

    #[test]
    fn delete_at_end_pulls_next_line() {
        let mut ed = Editor::with_text("ab\ncd");
        ed.move_up();
        ed.move_end();
        ed.delete();
        assert_eq!(ed.text(), "abcd");
    }

    #[test]
    fn multibyte_cursor() {
        let mut ed = Editor::with_text("π = 3");
        ed.move_home();
        ed.move_right();
        ed.insert_char('2');
        assert_eq!(ed.text(), "π2 = 3");
        assert_eq!(ed.cursor_display_col(), 2);
        ed.backspace();
        ed.backspace();
        assert_eq!(ed.text(), " = 3");
    }

    #[test]
    fn vertical_moves_clamp_column() {
        let mut ed = Editor::with_text("long line\nab");
        ed.move_up();
        ed.move_end();
        ed.move_down();
        assert_eq!(ed.cursor(), (1, 2));
    }

    #[test]
    fn pasted_crlf_is_normalized() {
        let mut ed = Editor::default();
        ed.insert_str("a\r\nb");
        assert_eq!(ed.lines(), &["a".to_string(), "b".to_string()]);
    }
}
