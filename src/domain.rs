use std::fmt;
use std::io::Error;
use std::time::Duration;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

/// Crate wide error type. Only start-up (argument handling, data loading and
/// terminal io) can fail, the dashboard itself has no error paths.
#[derive(Debug)]
pub enum DashError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    InvalidRecord(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl fmt::Display for DashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashError::IoError(e) => write!(f, "io error: {e}"),
            DashError::PolarsError(e) => write!(f, "could not read data: {e}"),
            DashError::LoadingFailed(reason) => write!(f, "loading failed: {reason}"),
            DashError::InvalidRecord(reason) => write!(f, "invalid article record: {reason}"),
            DashError::FileNotFound => write!(f, "file not found"),
            DashError::PermissionDenied => write!(f, "permission denied"),
            DashError::UnknownFileType => {
                write!(f, "unknown file type (expected csv, parquet or arrow)")
            }
        }
    }
}

impl std::error::Error for DashError {}

impl From<Error> for DashError {
    fn from(err: Error) -> Self {
        DashError::IoError(err)
    }
}

impl From<PolarsError> for DashError {
    fn from(err: PolarsError) -> Self {
        DashError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
pub struct DashConfig {
    /// Milliseconds the event loop waits for a terminal event before ticking.
    pub event_poll_time: u64,
    pub page_size: usize,
    /// Delay before a freshly mounted table leaves its loading state.
    pub loading_delay: Duration,
    /// Terminals narrower than this are treated like a mobile viewport.
    pub mobile_width: usize,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            page_size: 10,
            loading_delay: Duration::from_millis(1000),
            mobile_width: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Quit,
    Tick,
    Resize(usize, usize),
    Help,
    Enter,
    Exit,
    NextTab,
    PrevTab,
    SortBy(crate::model::views::SortField),
    MoveUp,
    MoveDown,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    ToggleSelect,
    ToggleSelectAll,
    ClearSelection,
    ViewArticle,
    ActionMenu,
    Search,
    ToggleSidebar,
    ToggleMobileMenu,
    ToggleTheme,
    RawKey(KeyEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

pub const HELP_TEXT: &str = "artdash - articles dashboard

Tabs & search
  <Tab>/<Shift-Tab>   next / previous article tab
  /                   search titles & keywords (Enter keep, Esc clear)

Table
  <Up>/<Down> k/j     move row cursor
  <Left>/<Right> h/l  previous / next page
  <Home>/<End> g/G    first / last page
  1 2 3 4             sort by title / keyword / words / created
  <Space>             select row
  a                   select / deselect all rows on page
  c                   clear selection
  v                   view article
  <Enter> m           row actions (publish, schedule, edit, delete)

Layout
  b                   collapse / expand sidebar
  o                   open / close sidebar on narrow terminals
  t                   toggle light / dark theme
  ?                   this help
  <Esc>               close popup
  q                   quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_setters_chain() {
        let cfg = DashConfig::default()
            .page_size(25)
            .loading_delay(Duration::ZERO);
        assert_eq!(cfg.page_size, 25);
        assert_eq!(cfg.loading_delay, Duration::ZERO);
        assert_eq!(cfg.event_poll_time, 100);
    }

    #[test]
    fn io_errors_convert() {
        let err: DashError = Error::other("boom").into();
        assert!(matches!(err, DashError::IoError(_)));
        assert_eq!(err.to_string(), "io error: boom");
    }
}
