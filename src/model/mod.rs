pub mod loading;
pub mod views;

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::articles::{ArticleRecord, ArticleStatus};
use crate::domain::{DashConfig, HELP_TEXT, InputMode, Message, Theme};
use crate::inputter::{InputResult, Inputter};
use views::{FilterCriteria, SidebarView, SortField, TableSnapshot, TableView};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    INPUT,
    ACTIONMENU,
    POPUP,
}

/// Row level actions. The dashboard only forwards them to an [`ActionHook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    View,
    PublishNow,
    Schedule,
    Edit,
    Delete,
}

impl RowAction {
    /// Entries of the per-row action menu. `View` has its own key.
    pub const MENU: [RowAction; 4] = [
        RowAction::PublishNow,
        RowAction::Schedule,
        RowAction::Edit,
        RowAction::Delete,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RowAction::View => "View",
            RowAction::PublishNow => "Publish Now",
            RowAction::Schedule => "Schedule",
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
        }
    }
}

/// Receives row actions. Returns the message shown in the status line.
pub trait ActionHook {
    fn on_action(&mut self, action: RowAction, article: &ArticleRecord) -> String;
}

/// Default hook, records the action and nothing else.
#[derive(Debug, Default)]
pub struct LoggingActionHook;

impl ActionHook for LoggingActionHook {
    fn on_action(&mut self, action: RowAction, article: &ArticleRecord) -> String {
        info!("Action {:?} requested for article {}", action, article.id);
        format!("{}: \"{}\" (not wired up)", action.label(), article.title)
    }
}

struct ArticlesTab {
    category: ArticleStatus,
    table: TableView,
    cursor: usize,
}

impl ArticlesTab {
    fn clamp_cursor(&mut self) {
        let nrows = self.table.page_rows().len();
        self.cursor = std::cmp::min(self.cursor, nrows.saturating_sub(1));
    }

    fn cursor_record(&self) -> Option<&ArticleRecord> {
        self.table.page_rows().get(self.cursor).copied()
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
}

pub struct TabHeader {
    pub title: &'static str,
    pub count: usize,
}

/// Everything the UI draws in one frame.
pub struct UIData<'a> {
    pub tabs: Vec<TabHeader>,
    pub active_tab: usize,
    pub table: TableSnapshot<'a>,
    pub cursor_row: usize,
    pub search: InputResult,
    pub search_active: bool,
    pub sidebar: &'a SidebarView,
    pub sidebar_visible: bool,
    pub theme: Theme,
    pub popup_message: Option<&'static str>,
    pub action_menu: Option<usize>,
    pub status_message: &'a str,
    pub last_status_message_update: Instant,
    pub layout: UILayout,
}

pub struct Model {
    config: DashConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    tabs: Vec<ArticlesTab>,
    active_tab: usize,
    search_text: String,
    input: Inputter,
    input_mode: Option<InputMode>,
    last_input: InputResult,
    sidebar: SidebarView,
    theme: Theme,
    action_menu_idx: usize,
    action_hook: Box<dyn ActionHook>,
    uilayout: UILayout,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(
        config: &DashConfig,
        articles: Vec<ArticleRecord>,
        ui_width: usize,
        ui_height: usize,
    ) -> Self {
        Self::init_at(config, articles, ui_width, ui_height, Instant::now())
    }

    /// Like [`Model::init`], with the loading timers started at `now`.
    pub fn init_at(
        config: &DashConfig,
        articles: Vec<ArticleRecord>,
        ui_width: usize,
        ui_height: usize,
        now: Instant,
    ) -> Self {
        let articles = Arc::new(articles);
        let tabs = ArticleStatus::ALL
            .into_iter()
            .map(|category| ArticlesTab {
                category,
                table: TableView::new(
                    category.as_str(),
                    Arc::clone(&articles),
                    FilterCriteria::new(category, ""),
                    config.page_size,
                    config.loading_delay,
                    now,
                ),
                cursor: 0,
            })
            .collect();
        info!("Dashboard started with {} articles", articles.len());

        Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            tabs,
            active_tab: 0,
            search_text: String::new(),
            input: Inputter::default(),
            input_mode: None,
            last_input: InputResult::default(),
            sidebar: SidebarView::default(),
            theme: Theme::default(),
            action_menu_idx: 0,
            action_hook: Box::new(LoggingActionHook),
            uilayout: UILayout {
                width: ui_width,
                height: ui_height,
            },
            status_message: "Loading articles ...".to_string(),
            last_status_message_update: now,
        }
    }

    pub fn with_action_hook(mut self, hook: Box<dyn ActionHook>) -> Self {
        self.action_hook = hook;
        self
    }

    pub fn raw_keyevents(&self) -> bool {
        self.input_mode.is_some()
    }

    pub fn active_category(&self) -> ArticleStatus {
        self.tabs[self.active_tab].category
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn active_table(&self) -> &TableView {
        &self.tabs[self.active_tab].table
    }

    pub fn table(&self, category: ArticleStatus) -> &TableView {
        let tab = self
            .tabs
            .iter()
            .find(|t| t.category == category)
            .unwrap_or(&self.tabs[0]);
        &tab.table
    }

    pub fn cursor(&self) -> usize {
        self.tabs[self.active_tab].cursor
    }

    pub fn sidebar(&self) -> &SidebarView {
        &self.sidebar
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Replaces the article collection of every tab.
    pub fn set_articles(&mut self, articles: Vec<ArticleRecord>) {
        let articles = Arc::new(articles);
        for tab in self.tabs.iter_mut() {
            tab.table.set_records(Arc::clone(&articles));
            tab.cursor = 0;
        }
        info!("Article collection replaced, {} articles", articles.len());
    }

    pub fn quit(&mut self) {
        for tab in self.tabs.iter_mut() {
            tab.table.cancel_loading();
        }
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        trace!("Status: {}", self.status_message);
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout { width, height };
    }

    pub fn update(&mut self, message: Message) {
        self.update_at(message, Instant::now());
    }

    pub fn update_at(&mut self, message: Message, now: Instant) {
        match message {
            Message::Tick => return self.tick(now),
            Message::Resize(width, height) => return self.ui_resize(width, height),
            Message::Quit if self.modus != Modus::INPUT => return self.quit(),
            _ => {}
        }

        match self.modus {
            Modus::TABLE => match message {
                Message::Help => self.show_help(),
                Message::Exit => self.sidebar.close_mobile(),
                Message::NextTab => self.switch_tab(1),
                Message::PrevTab => self.switch_tab(self.tabs.len() - 1),
                Message::Search => self.enter_input_mode(InputMode::Search),
                Message::ToggleSidebar => self.sidebar.toggle_collapsed(),
                Message::ToggleMobileMenu => self.sidebar.toggle_mobile_open(),
                Message::ToggleTheme => self.theme = self.theme.toggled(),
                msg => self.update_table(msg),
            },
            Modus::ACTIONMENU => match message {
                Message::MoveUp => {
                    self.action_menu_idx = self.action_menu_idx.saturating_sub(1);
                }
                Message::MoveDown => {
                    self.action_menu_idx =
                        std::cmp::min(self.action_menu_idx + 1, RowAction::MENU.len() - 1);
                }
                Message::Enter => {
                    self.modus = Modus::TABLE;
                    self.fire_action(RowAction::MENU[self.action_menu_idx]);
                }
                Message::Exit | Message::ActionMenu => self.exit(),
                _ => (),
            },
            Modus::POPUP => match message {
                Message::Exit | Message::Enter | Message::Help => self.exit(),
                _ => (),
            },
            Modus::INPUT => {
                if let Message::RawKey(key) = message {
                    self.raw_input(key)
                }
            }
        }
    }

    // Table interaction, ignored while the active table is still loading.
    fn update_table(&mut self, message: Message) {
        let tab = &mut self.tabs[self.active_tab];
        if !tab.table.is_ready() {
            trace!("Ignoring {:?}, table {} is loading", message, tab.category.as_str());
            return;
        }
        match message {
            Message::MoveUp => tab.cursor = tab.cursor.saturating_sub(1),
            Message::MoveDown => {
                tab.cursor += 1;
                tab.clamp_cursor();
            }
            Message::NextPage => Self::change_page(tab, TableView::next_page),
            Message::PrevPage => Self::change_page(tab, TableView::previous_page),
            Message::FirstPage => Self::change_page(tab, TableView::first_page),
            Message::LastPage => Self::change_page(tab, TableView::last_page),
            Message::SortBy(field) => self.sort_by(field),
            Message::ToggleSelect => {
                if let Some(id) = tab.cursor_record().map(|r| r.id.clone()) {
                    tab.table.toggle_select_one(&id);
                }
            }
            Message::ToggleSelectAll => tab.table.toggle_select_all(),
            Message::ClearSelection => tab.table.clear_selection(),
            Message::ViewArticle => self.fire_action(RowAction::View),
            Message::Enter | Message::ActionMenu => self.open_action_menu(),
            _ => (),
        }
    }

    fn change_page(tab: &mut ArticlesTab, step: fn(&mut TableView)) {
        let before = tab.table.current_page();
        step(&mut tab.table);
        if before != tab.table.current_page() {
            tab.cursor = 0;
        }
    }

    fn sort_by(&mut self, field: SortField) {
        let tab = &mut self.tabs[self.active_tab];
        tab.table.set_sort_field(field);
        tab.clamp_cursor();
        let spec = tab.table.sort_spec();
        debug!("Table {} sorted by {:?}", tab.category.as_str(), spec);
        self.set_status_message(format!(
            "Sorted by {} ({:?})",
            field.header(),
            spec.direction
        ));
    }

    fn tick(&mut self, now: Instant) {
        let mut became_ready = false;
        for tab in self.tabs.iter_mut() {
            if tab.table.tick(now) {
                became_ready = true;
            }
        }
        if became_ready && self.tabs.iter().all(|t| t.table.is_ready()) {
            let total: usize = self.tabs.iter().map(|t| t.table.filtered_count()).sum();
            self.set_status_message(format!("Loaded {total} articles"));
        }
    }

    fn switch_tab(&mut self, step: usize) {
        self.active_tab = (self.active_tab + step) % self.tabs.len();
        let tab = &mut self.tabs[self.active_tab];
        tab.table.first_page();
        tab.cursor = 0;
        debug!("Switched to tab {}", tab.category.as_str());
    }

    fn open_action_menu(&mut self) {
        if self.tabs[self.active_tab].cursor_record().is_none() {
            return;
        }
        self.previous_modus = self.modus;
        self.modus = Modus::ACTIONMENU;
        self.action_menu_idx = 0;
    }

    fn fire_action(&mut self, action: RowAction) {
        let tab = &self.tabs[self.active_tab];
        if let Some(article) = tab.cursor_record() {
            let message = self.action_hook.on_action(action, article);
            self.set_status_message(message);
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::TABLE => {}
            Modus::ACTIONMENU | Modus::POPUP | Modus::INPUT => {
                trace!("Close {:?} ...", self.modus);
                let closed = self.modus;
                self.modus = self.previous_modus;
                self.previous_modus = closed;
            }
        }
    }

    // -------------------- Search input ---------------------- //

    fn enter_input_mode(&mut self, mode: InputMode) {
        trace!("Entering input mode {:?} ...", mode);
        self.previous_modus = self.modus;
        self.modus = Modus::INPUT;
        self.input_mode = Some(mode);
        self.input.set(&self.search_text);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.changed {
            let text = self.last_input.input.clone();
            self.apply_search(&text);
        }
        if self.last_input.finished {
            self.input_mode = None;
            self.exit();
            if self.last_input.canceled {
                self.set_status_message("Search cleared");
            }
        }
    }

    fn apply_search(&mut self, text: &str) {
        self.search_text = text.to_string();
        for tab in self.tabs.iter_mut() {
            tab.table.set_search_text(text);
            tab.cursor = 0;
        }
        let matches = self.tabs[self.active_tab].table.filtered_count();
        debug!("Search {:?} matches {} articles in active tab", text, matches);
    }

    // -------------------- UI data ---------------------- //

    pub fn get_uidata(&self) -> UIData<'_> {
        let tab = &self.tabs[self.active_tab];
        UIData {
            tabs: self
                .tabs
                .iter()
                .map(|t| TabHeader {
                    title: t.category.tab_title(),
                    count: t.table.filtered_count(),
                })
                .collect(),
            active_tab: self.active_tab,
            table: tab.table.snapshot(),
            cursor_row: tab.cursor,
            search: if self.input_mode.is_some() {
                self.last_input.clone()
            } else {
                InputResult {
                    input: self.search_text.clone(),
                    cursor_pos: self.search_text.chars().count(),
                    ..InputResult::default()
                }
            },
            search_active: self.input_mode.is_some(),
            sidebar: &self.sidebar,
            sidebar_visible: self
                .sidebar
                .is_visible(self.uilayout.width, self.config.mobile_width),
            theme: self.theme,
            popup_message: (self.modus == Modus::POPUP).then_some(HELP_TEXT),
            action_menu: (self.modus == Modus::ACTIONMENU).then_some(self.action_menu_idx),
            status_message: &self.status_message,
            last_status_message_update: self.last_status_message_update,
            layout: self.uilayout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::articles::builtin_articles;
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn key(code: KeyCode) -> Message {
        Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn many_articles(n: usize) -> Vec<ArticleRecord> {
        (1..=n)
            .map(|i| {
                ArticleRecord::new(
                    &i.to_string(),
                    &format!("Article {i}"),
                    &format!("keyword {i} [10]"),
                    i as u32,
                    "---",
                    if i % 2 == 0 {
                        ArticleStatus::Generated
                    } else {
                        ArticleStatus::Published
                    },
                )
            })
            .collect()
    }

    fn ready_model(articles: Vec<ArticleRecord>) -> Model {
        let t0 = Instant::now();
        let mut model = Model::init_at(&DashConfig::default(), articles, 120, 40, t0);
        model.update_at(Message::Tick, t0 + Duration::from_secs(2));
        model
    }

    fn search(model: &mut Model, text: &str) {
        model.update(Message::Search);
        for c in text.chars() {
            model.update(key(KeyCode::Char(c)));
        }
        model.update(key(KeyCode::Enter));
    }

    #[test]
    fn starts_loading_and_ignores_table_input() {
        let t0 = Instant::now();
        let mut model = Model::init_at(&DashConfig::default(), many_articles(40), 120, 40, t0);
        assert!(!model.active_table().is_ready());
        model.update_at(Message::NextPage, t0);
        model.update_at(Message::SortBy(SortField::Title), t0);
        assert_eq!(model.active_table().current_page(), 1);
        assert_eq!(model.active_table().sort_spec(), views::SortSpec::default());

        model.update_at(Message::Tick, t0 + Duration::from_millis(999));
        assert!(!model.active_table().is_ready());
        model.update_at(Message::Tick, t0 + Duration::from_millis(1000));
        assert!(model.active_table().is_ready());
        assert_eq!(model.status_message(), "Loaded 40 articles");

        model.update_at(Message::NextPage, t0 + Duration::from_millis(1001));
        assert_eq!(model.active_table().current_page(), 2);
    }

    #[test]
    fn tabs_filter_by_category() {
        let model = ready_model(builtin_articles());
        assert_eq!(model.active_category(), ArticleStatus::Generated);
        assert_eq!(model.table(ArticleStatus::Generated).filtered_count(), 6);
        assert_eq!(model.table(ArticleStatus::Published).filtered_count(), 1);
        let data = model.get_uidata();
        let counts: Vec<usize> = data.tabs.iter().map(|t| t.count).collect();
        assert_eq!(counts, vec![6, 1, 1, 1]);
    }

    #[test]
    fn search_is_shared_and_resets_pages() {
        let mut model = ready_model(many_articles(60));
        model.update(Message::NextPage);
        model.update(Message::NextTab);
        model.update(Message::NextPage);
        assert_eq!(model.active_table().current_page(), 2);

        search(&mut model, "article 1");
        assert_eq!(model.search_text(), "article 1");
        assert!(!model.raw_keyevents());
        assert_eq!(model.table(ArticleStatus::Generated).current_page(), 1);
        assert_eq!(model.table(ArticleStatus::Published).current_page(), 1);

        // Switching tabs keeps the search text
        model.update(Message::PrevTab);
        assert_eq!(model.active_category(), ArticleStatus::Generated);
        assert_eq!(model.search_text(), "article 1");
        assert_eq!(
            model.active_table().criteria().search_text,
            "article 1".to_string()
        );
    }

    #[test]
    fn search_escape_clears_filter() {
        let mut model = ready_model(builtin_articles());
        search(&mut model, "league");
        assert_eq!(model.active_table().filtered_count(), 3);

        model.update(Message::Search);
        model.update(key(KeyCode::Esc));
        assert_eq!(model.search_text(), "");
        assert_eq!(model.active_table().filtered_count(), 6);
        assert_eq!(model.status_message(), "Search cleared");
    }

    #[test]
    fn quit_key_is_text_while_searching() {
        let mut model = ready_model(builtin_articles());
        model.update(Message::Search);
        model.update(Message::Quit);
        assert_eq!(model.status, Status::READY);
        model.update(key(KeyCode::Enter));
        model.update(Message::Quit);
        assert_eq!(model.status, Status::QUITTING);
    }

    #[test]
    fn tab_state_is_independent() {
        let mut model = ready_model(many_articles(60));
        model.update(Message::SortBy(SortField::WordCount));
        model.update(Message::ToggleSelectAll);
        assert_eq!(model.active_table().selected_count(), 10);

        model.update(Message::NextTab);
        assert_eq!(model.active_table().selected_count(), 0);
        assert_eq!(model.active_table().sort_spec(), views::SortSpec::default());

        model.update(Message::PrevTab);
        assert_eq!(model.active_table().selected_count(), 10);
        assert_eq!(model.active_table().sort_spec().field, SortField::WordCount);
    }

    #[test]
    fn switching_tab_resets_page_of_activated_tab() {
        let mut model = ready_model(many_articles(60));
        model.update(Message::LastPage);
        assert_eq!(model.active_table().current_page(), 3);
        model.update(Message::NextTab);
        model.update(Message::PrevTab);
        assert_eq!(model.active_table().current_page(), 1);
    }

    #[test]
    fn cursor_selects_rows() {
        let mut model = ready_model(many_articles(60));
        model.update(Message::SortBy(SortField::WordCount));
        model.update(Message::MoveDown);
        model.update(Message::MoveDown);
        model.update(Message::ToggleSelect);
        assert_eq!(model.active_table().selection(), vec!["6"]);

        for _ in 0..20 {
            model.update(Message::MoveDown);
        }
        assert_eq!(model.cursor(), 9);
        model.update(Message::NextPage);
        assert_eq!(model.cursor(), 0);
        model.update(Message::ClearSelection);
        assert_eq!(model.active_table().selected_count(), 0);
    }

    struct Recorder(Rc<RefCell<Vec<(RowAction, String)>>>);

    impl ActionHook for Recorder {
        fn on_action(&mut self, action: RowAction, article: &ArticleRecord) -> String {
            self.0.borrow_mut().push((action, article.id.clone()));
            "recorded".to_string()
        }
    }

    #[test]
    fn actions_reach_the_hook() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut model =
            ready_model(builtin_articles()).with_action_hook(Box::new(Recorder(calls.clone())));
        model.update(Message::SortBy(SortField::WordCount));

        model.update(Message::ViewArticle);
        model.update(Message::ActionMenu);
        assert_eq!(model.get_uidata().action_menu, Some(0));
        model.update(Message::MoveDown);
        model.update(Message::MoveDown);
        model.update(Message::Enter);
        assert_eq!(model.get_uidata().action_menu, None);

        // Smallest generated article is id 5 with 1793 words
        assert_eq!(
            *calls.borrow(),
            vec![
                (RowAction::View, "5".to_string()),
                (RowAction::Edit, "5".to_string())
            ]
        );
        assert_eq!(model.status_message(), "recorded");
        // Records are not touched
        assert_eq!(model.active_table().filtered_count(), 6);
    }

    #[test]
    fn action_menu_needs_a_row() {
        let mut model = ready_model(builtin_articles());
        search(&mut model, "nothing matches this");
        model.update(Message::ActionMenu);
        assert_eq!(model.get_uidata().action_menu, None);
        let data = model.get_uidata();
        assert_eq!(data.table.total_pages, 1);
        assert!(data.table.rows.is_empty());
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = ready_model(builtin_articles());
        model.update(Message::Help);
        assert!(model.get_uidata().popup_message.is_some());
        model.update(Message::NextPage);
        model.update(Message::Exit);
        assert!(model.get_uidata().popup_message.is_none());
    }

    #[test]
    fn sidebar_and_theme_toggles() {
        let mut model = ready_model(builtin_articles());
        model.update(Message::ToggleSidebar);
        assert!(model.sidebar().is_collapsed());
        model.update(Message::Resize(60, 30));
        assert!(!model.get_uidata().sidebar_visible);
        model.update(Message::ToggleMobileMenu);
        assert!(model.get_uidata().sidebar_visible);
        model.update(Message::Exit);
        assert!(!model.get_uidata().sidebar_visible);
        model.update(Message::ToggleTheme);
        assert_eq!(model.theme(), Theme::Dark);
    }

    #[test]
    fn replacing_articles_prunes_selection() {
        let mut model = ready_model(many_articles(60));
        model.update(Message::ToggleSelectAll);
        model.update(Message::LastPage);
        model.set_articles(many_articles(4));
        assert_eq!(model.active_table().current_page(), 1);
        // Only ids 2 and 4 are generated and still present
        assert!(model.active_table().selection().iter().all(|id| ["2", "4"].contains(id)));
    }

    #[test]
    fn quit_cancels_pending_loading() {
        let t0 = Instant::now();
        let mut model = Model::init_at(&DashConfig::default(), builtin_articles(), 120, 40, t0);
        model.update_at(Message::Quit, t0);
        assert_eq!(model.status, Status::QUITTING);
        model.update_at(Message::Tick, t0 + Duration::from_secs(5));
        assert!(!model.active_table().is_ready());
    }
}
