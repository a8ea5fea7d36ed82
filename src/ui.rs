use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Tabs,
        Wrap,
    },
};

use crate::domain::Theme;
use crate::model::views::{NavEntry, SortDirection, SortField, TableSnapshot};
use crate::model::{Model, RowAction, UIData};
use crate::model::views::sidebar::{BRAND, SITE};

pub const HEADER_HEIGHT: u16 = 1;
pub const TABS_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 1;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const SEARCH_WIDTH: u16 = 36;
pub const SKELETON_ROWS: usize = 5;
const STATUS_FADE: Duration = Duration::from_secs(5);

struct Palette {
    fg: Color,
    bg: Color,
    muted: Color,
    primary: Color,
    primary_fg: Color,
    highlight: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                fg: Color::Black,
                bg: Color::White,
                muted: Color::DarkGray,
                primary: Color::Blue,
                primary_fg: Color::White,
                highlight: Color::Rgb(219, 234, 254),
            },
            Theme::Dark => Palette {
                fg: Color::Gray,
                bg: Color::Black,
                muted: Color::DarkGray,
                primary: Color::LightBlue,
                primary_fg: Color::Black,
                highlight: Color::Rgb(30, 41, 59),
            },
        }
    }

    fn base(&self) -> Style {
        Style::new().fg(self.fg).bg(self.bg)
    }
}

#[derive(Debug, Default)]
pub struct TableUI {
    table_state: TableState,
    menu_state: ListState,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let data = model.get_uidata();
        let palette = Palette::for_theme(data.theme);
        let area = frame.area();
        frame.render_widget(Block::new().style(palette.base()), area);

        let main = if data.sidebar_visible {
            let [side, main] =
                Layout::horizontal([Constraint::Length(data.sidebar.width()), Constraint::Min(0)])
                    .areas(area);
            draw_sidebar(&data, &palette, frame, side);
            main
        } else {
            area
        };

        let [header, tabs, table, footer, status] = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(TABS_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(main);

        frame.render_widget(
            Paragraph::new(Line::from(" Articles".bold().fg(palette.primary))),
            header,
        );
        draw_tabs(&data, &palette, frame, tabs);
        self.draw_table(&data, &palette, frame, table);
        draw_footer(&data.table, &palette, frame, footer);
        draw_status(&data, &palette, frame, status);

        if let Some(idx) = data.action_menu {
            self.draw_action_menu(idx, &palette, frame, table);
        }
        if let Some(message) = data.popup_message {
            draw_popup(message, &palette, frame, area);
        }
    }

    fn draw_table(&mut self, data: &UIData, palette: &Palette, frame: &mut Frame, area: Rect) {
        let widths = [
            Constraint::Length(3),
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Length(7),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(3),
        ];
        let block = Block::bordered().border_style(Style::new().fg(palette.muted));
        let snapshot = &data.table;

        if !snapshot.ready {
            let skeleton = |w: usize| Cell::from("░".repeat(w)).fg(palette.muted);
            let header = Row::new([1, 12, 16, 5, 10, 4, 1].map(skeleton));
            let rows = (0..SKELETON_ROWS).map(|_| Row::new([1, 24, 18, 5, 10, 4, 1].map(skeleton)));
            frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
            return;
        }

        let checkbox = |checked: bool| if checked { "[x]" } else { "[ ]" };
        let header = Row::new(
            std::iter::once(Cell::from(checkbox(snapshot.all_on_page_selected)))
                .chain(SortField::ALL.iter().map(|&field| {
                    Cell::from(format!("{}{}", field.header(), sort_indicator(snapshot, field)))
                }))
                .chain([Cell::from("Action"), Cell::from("")]),
        )
        .style(Style::new().add_modifier(Modifier::BOLD));

        let rows = snapshot.rows.iter().map(|article| {
            let selected = snapshot.selected.contains(&article.id.as_str());
            Row::new([
                Cell::from(checkbox(selected)),
                Cell::from(article.title.as_str()).add_modifier(Modifier::BOLD),
                Cell::from(article.keyword.as_str()),
                Cell::from(article.word_count.to_string()),
                Cell::from(article.created_label.as_str()),
                Cell::from("View").fg(palette.primary),
                Cell::from("⋯"),
            ])
        });

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::new().bg(palette.highlight));

        if snapshot.rows.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(data.cursor_row));
        }
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_action_menu(&mut self, idx: usize, palette: &Palette, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = RowAction::MENU
            .iter()
            .map(|action| ListItem::new(action.label()))
            .collect();
        let popup = centered(area, 20, RowAction::MENU.len() as u16 + 2);
        let list = List::new(items)
            .block(Block::bordered().title(" Publish "))
            .style(palette.base())
            .highlight_style(Style::new().fg(palette.primary_fg).bg(palette.primary));
        self.menu_state.select(Some(idx));
        frame.render_widget(Clear, popup);
        frame.render_stateful_widget(list, popup, &mut self.menu_state);
    }
}

fn sort_indicator(snapshot: &TableSnapshot, field: SortField) -> &'static str {
    if snapshot.sort.field != field {
        return "";
    }
    match snapshot.sort.direction {
        SortDirection::Ascending => " ▲",
        SortDirection::Descending => " ▼",
    }
}

fn draw_sidebar(data: &UIData, palette: &Palette, frame: &mut Frame, area: Rect) {
    let collapsed = data.sidebar.is_collapsed();
    let mut lines = Vec::new();
    if collapsed {
        lines.push(Line::from("»").fg(palette.muted));
    } else {
        lines.push(Line::from(vec![
            Span::from(BRAND).bold().fg(palette.primary),
            Span::from("  «").fg(palette.muted),
        ]));
        lines.push(Line::from(format!("● {SITE} ▾")).fg(palette.muted));
    }
    lines.push(Line::default());

    for entry in data.sidebar.entries() {
        match entry {
            NavEntry::Separator => lines.push(Line::from("─".repeat(area.width as usize))),
            NavEntry::Item(item) => {
                let text = if collapsed {
                    item.icon.to_string()
                } else {
                    format!("{} {}", item.icon, item.label)
                };
                let style = if item.is_active {
                    Style::new().fg(palette.primary).bg(palette.highlight).bold()
                } else {
                    Style::new().fg(palette.fg)
                };
                lines.push(Line::styled(text, style));
            }
        }
    }

    let theme = match data.theme {
        Theme::Light => "☀",
        Theme::Dark => "☾",
    };
    let [nav, footer] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(2)]).areas(area);
    let block = Block::bordered().border_style(Style::new().fg(palette.muted));
    frame.render_widget(Paragraph::new(lines).block(block), nav);
    let label = if collapsed {
        theme.to_string()
    } else {
        format!("{theme} theme <t>")
    };
    frame.render_widget(Paragraph::new(label).fg(palette.muted), footer);
}

fn draw_tabs(data: &UIData, palette: &Palette, frame: &mut Frame, area: Rect) {
    let search_width = std::cmp::min(SEARCH_WIDTH, area.width / 2);
    let [tabs_area, search_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(search_width)]).areas(area);

    let titles: Vec<Line> = data
        .tabs
        .iter()
        .map(|t| Line::from(format!(" {} ({}) ", t.title, t.count)))
        .collect();
    let tabs = Tabs::new(titles)
        .select(data.active_tab)
        .style(Style::new().fg(palette.muted))
        .highlight_style(Style::new().fg(palette.primary_fg).bg(palette.primary))
        .divider(" ")
        .block(Block::new().title_bottom(Line::from(" <Tab> switch ").fg(palette.muted)));
    frame.render_widget(tabs, tabs_area);

    let placeholder = data.search.input.is_empty() && !data.search_active;
    let text = if placeholder {
        Line::from("Search for Title & Keywords...").fg(palette.muted)
    } else {
        Line::from(data.search.input.as_str())
    };
    let border = if data.search_active { palette.primary } else { palette.muted };
    let search = Paragraph::new(text).block(
        Block::bordered()
            .title(" / ")
            .border_style(Style::new().fg(border)),
    );
    frame.render_widget(search, search_area);

    if data.search_active {
        let max_x = search_area.x + search_area.width.saturating_sub(2);
        let x = std::cmp::min(search_area.x + 1 + data.search.cursor_pos as u16, max_x);
        frame.set_cursor_position((x, search_area.y + 1));
    }
}

fn draw_footer(table: &TableSnapshot, palette: &Palette, frame: &mut Frame, area: Rect) {
    let [summary, pager] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(30)]).areas(area);
    let selected = if table.selected.is_empty() {
        String::new()
    } else {
        format!(" | {} selected", table.selected.len())
    };
    frame.render_widget(
        Paragraph::new(format!(
            " Total {} Article Titles | Show {} entries per page{}",
            table.filtered_count, table.page_size, selected
        ))
        .fg(palette.muted),
        summary,
    );

    let enabled = |on: bool| {
        if on {
            Style::new().fg(palette.fg)
        } else {
            Style::new().fg(palette.muted).add_modifier(Modifier::DIM)
        }
    };
    let line = Line::from(vec![
        Span::styled("◀ Previous ", enabled(table.current_page > 1)),
        Span::from(format!(" {} / {} ", table.current_page, table.total_pages)).bold(),
        Span::styled(" Next ▶", enabled(table.current_page < table.total_pages)),
    ]);
    frame.render_widget(Paragraph::new(line).right_aligned(), pager);
}

fn draw_status(data: &UIData, palette: &Palette, frame: &mut Frame, area: Rect) {
    let style = if data.last_status_message_update.elapsed() > STATUS_FADE {
        Style::new().fg(palette.muted).add_modifier(Modifier::DIM)
    } else {
        Style::new().fg(palette.fg)
    };
    let line = Line::from(vec![
        Span::styled(format!(" {}", data.status_message), style),
        Span::from("   ? help  q quit").fg(palette.muted),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_popup(message: &str, palette: &Palette, frame: &mut Frame, area: Rect) {
    let height = message.lines().count() as u16 + 2;
    let width = message.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
    let popup = centered(area, width, height);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(message)
            .style(palette.base())
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(" Help ").title_bottom(" <Esc> close ")),
        popup,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = std::cmp::min(width, area.width);
    let height = std::cmp::min(height, area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::articles::builtin_articles;
    use crate::domain::{DashConfig, Message};
    use ratatui::{Terminal, backend::TestBackend};

    fn render(model: &Model, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut ui = TableUI::new();
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn make_model(delay: Duration) -> Model {
        let cfg = DashConfig::default().loading_delay(delay);
        let mut model = Model::init(&cfg, builtin_articles(), 160, 40);
        model.update(Message::Tick);
        model
    }

    #[test]
    fn renders_loading_skeleton() {
        let model = make_model(Duration::from_secs(60));
        let screen = render(&model, 160, 40);
        assert!(screen.contains("░░░░"));
        assert!(!screen.contains("Article Title"));
    }

    #[test]
    fn renders_table_and_footer() {
        let model = make_model(Duration::ZERO);
        let screen = render(&model, 160, 40);
        assert!(screen.contains("Article Title"));
        assert!(screen.contains("Created On ▼"));
        assert!(screen.contains("Total 6 Article Titles"));
        assert!(screen.contains("1 / 1"));
        assert!(screen.contains("abun"));
    }

    #[test]
    fn narrow_terminal_hides_sidebar() {
        let mut model = make_model(Duration::ZERO);
        model.update(Message::Resize(70, 30));
        let screen = render(&model, 70, 30);
        assert!(!screen.contains("Keyword Projects"));
    }

    #[test]
    fn centered_fits_area() {
        let area = Rect::new(0, 0, 10, 5);
        let popup = centered(area, 20, 20);
        assert_eq!(popup, area);
    }
}
