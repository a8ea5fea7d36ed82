use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub icon: &'static str,
    pub label: &'static str,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEntry {
    Item(NavItem),
    Separator,
}

const fn item(icon: &'static str, label: &'static str) -> NavEntry {
    NavEntry::Item(NavItem {
        icon,
        label,
        is_active: false,
    })
}

static NAVIGATION: [NavEntry; 22] = [
    NavEntry::Item(NavItem {
        icon: "▤",
        label: "Articles",
        is_active: true,
    }),
    item("✎", "Create Article"),
    item("⚙", "Generated Articles"),
    item("▤", "Keyword Projects"),
    item("⚙", "AI Keyword to Article"),
    item("▤", "Steal Competitor Keyword"),
    item("▤", "Import Keyword from GSC"),
    item("▤", "Manual Keyword to Article"),
    item("▤", "Bulk Keyword to Article"),
    item("▤", "Longtail Keyword to Article"),
    item("▤", "Article Settings"),
    NavEntry::Separator,
    item("◧", "Auto Blog"),
    item("⛓", "Internal Links"),
    item("⛓", "Free Backlinks"),
    item("▥", "Integrations"),
    item("▭", "Subscription"),
    item("⇪", "Affiliate Program"),
    item("?", "Help Center"),
    item("♪", "Updates"),
    item("✉", "Live Chat Support"),
    item("☺", "Profile"),
];

pub const BRAND: &str = "abun";
pub const SITE: &str = "amazon.com";

/// Navigation chrome. The links are inert, only the two flags change.
#[derive(Debug, Default)]
pub struct SidebarView {
    collapsed: bool,
    mobile_open: bool,
}

impl SidebarView {
    pub fn entries(&self) -> &'static [NavEntry] {
        &NAVIGATION
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn is_mobile_open(&self) -> bool {
        self.mobile_open
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
        trace!("Sidebar collapsed: {}", self.collapsed);
    }

    pub fn toggle_mobile_open(&mut self) {
        self.mobile_open = !self.mobile_open;
        trace!("Sidebar mobile open: {}", self.mobile_open);
    }

    pub fn close_mobile(&mut self) {
        self.mobile_open = false;
    }

    /// On narrow terminals the sidebar only shows while opened explicitly.
    pub fn is_visible(&self, terminal_width: usize, mobile_width: usize) -> bool {
        terminal_width >= mobile_width || self.mobile_open
    }

    /// Columns the sidebar occupies, borders included.
    pub fn width(&self) -> u16 {
        if self.collapsed { 5 } else { 32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_articles_is_active() {
        let sidebar = SidebarView::default();
        let active: Vec<_> = sidebar
            .entries()
            .iter()
            .filter_map(|e| match e {
                NavEntry::Item(item) if item.is_active => Some(item.label),
                _ => None,
            })
            .collect();
        assert_eq!(active, vec!["Articles"]);
        let items = sidebar
            .entries()
            .iter()
            .filter(|e| matches!(e, NavEntry::Item(_)))
            .count();
        assert_eq!(items, 21);
    }

    #[test]
    fn narrow_terminal_hides_until_opened() {
        let mut sidebar = SidebarView::default();
        assert!(sidebar.is_visible(120, 80));
        assert!(!sidebar.is_visible(60, 80));
        sidebar.toggle_mobile_open();
        assert!(sidebar.is_visible(60, 80));
        sidebar.close_mobile();
        assert!(!sidebar.is_mobile_open());
    }

    #[test]
    fn collapsing_shrinks_width() {
        let mut sidebar = SidebarView::default();
        let wide = sidebar.width();
        sidebar.toggle_collapsed();
        assert!(sidebar.is_collapsed());
        assert!(sidebar.width() < wide);
    }
}
