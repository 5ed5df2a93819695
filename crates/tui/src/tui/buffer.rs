/// Single-line editable text with a byte-offset cursor kept on char boundaries.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.text.drain(idx..self.cursor);
            self.cursor = idx;
        }
    }

    pub fn delete_char(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            let end = self.cursor + ch.len_utf8();
            self.text.drain(self.cursor..end);
        }
    }

    pub fn move_left(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> TextBuffer {
        let mut buffer = TextBuffer::new();
        text.chars().for_each(|ch| buffer.insert_char(ch));
        buffer
    }

    #[test]
    fn typing_advances_cursor() {
        let buffer = typed("hello");

        assert_eq!(buffer.as_str(), "hello");
        assert_eq!(buffer.cursor_column(), 5);
    }

    #[test]
    fn edits_respect_multibyte_characters() {
        let mut buffer = typed("café");
        buffer.move_left();
        buffer.insert_char('x');
        assert_eq!(buffer.as_str(), "cafxé");

        buffer.move_end();
        buffer.backspace();
        buffer.move_home();
        buffer.delete_char();
        assert_eq!(buffer.as_str(), "afx");
        assert_eq!(buffer.cursor_column(), 0);
    }

    #[test]
    fn control_characters_are_ignored() {
        let mut buffer = TextBuffer::new();
        buffer.insert_char('\n');
        buffer.insert_char('\t');
        assert!(buffer.is_blank());
    }
}
