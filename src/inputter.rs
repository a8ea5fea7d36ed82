use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Single line editor behind the search box. The cursor counts characters,
/// not bytes.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    cursor_pos: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputResult {
    pub input: String,
    pub cursor_pos: usize,
    pub finished: bool,
    pub canceled: bool,
    /// The text differs from before the key was applied.
    pub changed: bool,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        let snapshot = self.current_input.clone();
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.finished = true,
            (KeyCode::Esc, _) => self.escape(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.cursor_pos = self.cursor_pos.saturating_sub(1),
            (KeyCode::Right, _) => self.cursor_pos = (self.cursor_pos + 1).min(self.char_count()),
            (KeyCode::Home, _) => self.cursor_pos = 0,
            (KeyCode::End, _) => self.cursor_pos = self.char_count(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.current_input.clear();
                self.cursor_pos = 0;
            }
            (KeyCode::Char(chr), m) if !m.contains(KeyModifiers::CONTROL) => self.insert(chr),
            _ => {}
        }
        let changed = snapshot != self.current_input;
        trace!("Input {:?} -> {:?}", key.code, self.current_input);
        InputResult {
            changed,
            ..self.get()
        }
    }

    /// Starts a new edit on top of `s`, cursor at the end.
    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.cursor_pos = self.char_count();
        self.finished = false;
        self.canceled = false;
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            input: self.current_input.clone(),
            cursor_pos: self.cursor_pos,
            finished: self.finished,
            canceled: self.canceled,
            changed: false,
        }
    }

    fn escape(&mut self) {
        self.current_input.clear();
        self.cursor_pos = 0;
        self.canceled = true;
        self.finished = true;
    }

    fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let at = self.byte_pos(self.cursor_pos);
            self.current_input.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.cursor_pos < self.char_count() {
            let at = self.byte_pos(self.cursor_pos);
            self.current_input.remove(at);
        }
    }

    fn insert(&mut self, chr: char) {
        let at = self.byte_pos(self.cursor_pos);
        self.current_input.insert(at, chr);
        self.cursor_pos += 1;
    }

    fn char_count(&self) -> usize {
        self.current_input.chars().count()
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.current_input
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut Inputter, s: &str) -> InputResult {
        let mut last = input.get();
        for c in s.chars() {
            last = input.read(key(KeyCode::Char(c)));
        }
        last
    }

    #[test]
    fn typing_reports_changes() {
        let mut input = Inputter::default();
        let res = type_str(&mut input, "amaz");
        assert_eq!(res.input, "amaz");
        assert!(res.changed);
        assert_eq!(res.cursor_pos, 4);

        let res = input.read(key(KeyCode::Left));
        assert!(!res.changed);
        assert_eq!(res.cursor_pos, 3);
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut input = Inputter::default();
        type_str(&mut input, "abc");
        input.read(key(KeyCode::Left));
        let res = input.read(key(KeyCode::Backspace));
        assert_eq!(res.input, "ac");
        assert_eq!(res.cursor_pos, 1);
        let res = input.read(key(KeyCode::Delete));
        assert_eq!(res.input, "a");
    }

    #[test]
    fn handles_multibyte_chars() {
        let mut input = Inputter::default();
        type_str(&mut input, "größe");
        input.read(key(KeyCode::Home));
        input.read(key(KeyCode::Right));
        input.read(key(KeyCode::Right));
        let res = input.read(key(KeyCode::Delete));
        assert_eq!(res.input, "grße");
        let res = input.read(key(KeyCode::End));
        assert_eq!(res.cursor_pos, 4);
    }

    #[test]
    fn enter_finishes_and_escape_cancels() {
        let mut input = Inputter::default();
        input.set("league");
        let res = input.read(key(KeyCode::Enter));
        assert!(res.finished);
        assert!(!res.canceled);
        assert_eq!(res.input, "league");

        input.set("league");
        let res = input.read(key(KeyCode::Esc));
        assert!(res.finished && res.canceled);
        assert!(res.changed);
        assert_eq!(res.input, "");
    }
}
