pub mod sidebar;
pub mod table_view;

pub use sidebar::{NavEntry, NavItem, SidebarView};
pub use table_view::{
    FilterCriteria, SortDirection, SortField, SortSpec, TableSnapshot, TableView,
};
