use ropey::Rope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Raw text of the config file being edited, with a (line, column) cursor.
///
/// Columns count chars, not display cells. The buffer never looks at the
/// parsed hosts; what is in here is exactly what gets written on save.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
    cursor_line: usize,
    cursor_col: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_content(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
            cursor_line: 0,
            cursor_col: 0,
        }
    }

    pub fn set_content(&mut self, content: &str) {
        self.rope = Rope::from_str(content);
        self.cursor_line = 0;
        self.cursor_col = 0;
    }

    pub fn content(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Text of `line` without its line break.
    pub fn line(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let slice = self.rope.line(line);
        Some(slice.slice(..self.line_len(line)).to_string())
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_line, self.cursor_col)
    }

    pub fn set_cursor(&mut self, line: usize, col: usize) {
        self.cursor_line = line.min(self.rope.len_lines().saturating_sub(1));
        self.cursor_col = col.min(self.line_len(self.cursor_line));
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.cursor_char_idx();
        self.rope.insert_char(idx, c);
        if c == '\n' {
            self.cursor_line += 1;
            self.cursor_col = 0;
        } else {
            self.cursor_col += 1;
        }
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn delete_backward(&mut self) {
        if self.cursor_col > 0 {
            let idx = self.cursor_char_idx();
            self.rope.remove(idx - 1..idx);
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            let prev = self.cursor_line - 1;
            let prev_len = self.line_len(prev);
            let end = self.rope.line_to_char(self.cursor_line);
            let start = end - self.break_len(prev);
            self.rope.remove(start..end);
            self.cursor_line = prev;
            self.cursor_col = prev_len;
        }
    }

    pub fn delete_forward(&mut self) {
        let idx = self.cursor_char_idx();
        if self.cursor_col < self.line_len(self.cursor_line) {
            self.rope.remove(idx..idx + 1);
        } else if self.cursor_line + 1 < self.rope.len_lines() {
            let end = self.rope.line_to_char(self.cursor_line + 1);
            self.rope.remove(idx..end);
        }
    }

    /// Add an empty line at the end of the buffer and put the cursor on it.
    pub fn append_newline(&mut self) {
        self.rope.insert_char(self.rope.len_chars(), '\n');
        self.cursor_line = self.rope.len_lines() - 1;
        self.cursor_col = 0;
    }

    /// Remove the cursor line. A buffer with a single line is cleared.
    pub fn delete_line(&mut self) {
        let lines = self.rope.len_lines();
        if lines <= 1 {
            self.rope = Rope::new();
            self.cursor_line = 0;
            self.cursor_col = 0;
            return;
        }

        let start = self.rope.line_to_char(self.cursor_line);
        if self.cursor_line + 1 < lines {
            let end = self.rope.line_to_char(self.cursor_line + 1);
            self.rope.remove(start..end);
        } else {
            // Last line: take the preceding line break with it.
            let prev = self.cursor_line - 1;
            let start = start - self.break_len(prev);
            self.rope.remove(start..self.rope.len_chars());
            self.cursor_line = prev;
        }
        self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_line));
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                if self.cursor_col > 0 {
                    self.cursor_col -= 1;
                } else if self.cursor_line > 0 {
                    self.cursor_line -= 1;
                    self.cursor_col = self.line_len(self.cursor_line);
                }
            }
            Direction::Right => {
                if self.cursor_col < self.line_len(self.cursor_line) {
                    self.cursor_col += 1;
                } else if self.cursor_line + 1 < self.rope.len_lines() {
                    self.cursor_line += 1;
                    self.cursor_col = 0;
                }
            }
            Direction::Up => {
                if self.cursor_line > 0 {
                    self.cursor_line -= 1;
                    self.clamp_cursor_col();
                }
            }
            Direction::Down => {
                if self.cursor_line + 1 < self.rope.len_lines() {
                    self.cursor_line += 1;
                    self.clamp_cursor_col();
                }
            }
        }
    }

    fn cursor_char_idx(&self) -> usize {
        self.rope.line_to_char(self.cursor_line) + self.cursor_col
    }

    fn clamp_cursor_col(&mut self) {
        self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_line));
    }

    /// Length of `line` in chars, excluding the line break.
    fn line_len(&self, line: usize) -> usize {
        self.rope.line(line).len_chars() - self.break_len(line)
    }

    fn break_len(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len == 0 || slice.char(len - 1) != '\n' {
            return 0;
        }
        if len >= 2 && slice.char(len - 2) == '\r' {
            2
        } else {
            1
        }
    }
}
