use std::time::Duration;
use tracing::trace;

use crate::domain::{DashConfig, DashError, Message};
use crate::model::Model;
use crate::model::views::SortField;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &DashConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, DashError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    if model.raw_keyevents() {
                        Some(Message::RawKey(key))
                    } else {
                        self.handle_key(key)
                    }
                }
                Event::Resize(width, height) => {
                    Some(Message::Resize(width as usize, height as usize))
                }
                _ => None,
            });
        }
        Ok(None)
    }

    pub fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('?'), _) | (KeyCode::F(1), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            (KeyCode::Enter, _) => Some(Message::Enter),
            (KeyCode::Tab, _) => Some(Message::NextTab),
            (KeyCode::BackTab, _) => Some(Message::PrevTab),
            (KeyCode::Char('/'), _) => Some(Message::Search),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => Some(Message::PrevPage),
            (KeyCode::Right, _) | (KeyCode::Char('l'), _) => Some(Message::NextPage),
            (KeyCode::Home, _) | (KeyCode::Char('g'), _) => Some(Message::FirstPage),
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => Some(Message::LastPage),
            (KeyCode::Char('1'), _) => Some(Message::SortBy(SortField::Title)),
            (KeyCode::Char('2'), _) => Some(Message::SortBy(SortField::Keyword)),
            (KeyCode::Char('3'), _) => Some(Message::SortBy(SortField::WordCount)),
            (KeyCode::Char('4'), _) => Some(Message::SortBy(SortField::CreatedLabel)),
            (KeyCode::Char(' '), _) => Some(Message::ToggleSelect),
            (KeyCode::Char('a'), _) => Some(Message::ToggleSelectAll),
            (KeyCode::Char('c'), _) => Some(Message::ClearSelection),
            (KeyCode::Char('v'), _) => Some(Message::ViewArticle),
            (KeyCode::Char('m'), _) => Some(Message::ActionMenu),
            (KeyCode::Char('b'), _) => Some(Message::ToggleSidebar),
            (KeyCode::Char('o'), _) => Some(Message::ToggleMobileMenu),
            (KeyCode::Char('t'), _) => Some(Message::ToggleTheme),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
