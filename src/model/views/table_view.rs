use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::articles::{ArticleRecord, ArticleStatus};
use crate::model::loading::LoadingTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Title,
    Keyword,
    WordCount,
    CreatedLabel,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::Title,
        SortField::Keyword,
        SortField::WordCount,
        SortField::CreatedLabel,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            SortField::Title => "Article Title",
            SortField::Keyword => "Keyword [Traffic]",
            SortField::WordCount => "Words",
            SortField::CreatedLabel => "Created On",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec {
            field: SortField::CreatedLabel,
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub category: ArticleStatus,
    pub search_text: String,
}

impl FilterCriteria {
    pub fn new(category: ArticleStatus, search_text: impl Into<String>) -> Self {
        Self {
            category,
            search_text: search_text.into(),
        }
    }

    pub fn matches(&self, record: &ArticleRecord) -> bool {
        if record.status != self.category {
            return false;
        }
        if self.search_text.is_empty() {
            return true;
        }
        let needle = self.search_text.to_lowercase();
        record.title.to_lowercase().contains(&needle)
            || record.keyword.to_lowercase().contains(&needle)
    }
}

/// Ordering for display strings: case folded first, raw text breaks ties so
/// the order stays total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

fn compare_by(field: SortField, a: &ArticleRecord, b: &ArticleRecord) -> Ordering {
    match field {
        SortField::Title => locale_cmp(&a.title, &b.title),
        SortField::Keyword => locale_cmp(&a.keyword, &b.keyword),
        SortField::WordCount => a.word_count.cmp(&b.word_count),
        SortField::CreatedLabel => locale_cmp(&a.created_label, &b.created_label),
    }
}

/// Indices of the records matching `criteria`, in collection order.
pub fn filter_rows(records: &[ArticleRecord], criteria: &FilterCriteria) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(idx, _)| idx)
        .collect()
}

/// Stable sort of row indices. Descending reverses the comparator, so equal
/// keys keep their filtered order in both directions.
pub fn sort_rows(records: &[ArticleRecord], rows: &mut [usize], spec: SortSpec) {
    rows.sort_by(|&a, &b| {
        let ord = compare_by(spec.field, &records[a], &records[b]);
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Number of pages for `nrows`, never less than one.
pub fn total_pages(nrows: usize, page_size: usize) -> usize {
    nrows.div_ceil(page_size.max(1)).max(1)
}

/// The slice of `rows` shown on the 1-based `page`. Out of range pages yield
/// an empty slice.
pub fn page_slice(rows: &[usize], page: usize, page_size: usize) -> &[usize] {
    let begin = page.saturating_sub(1).saturating_mul(page_size);
    let end = std::cmp::min(begin.saturating_add(page_size), rows.len());
    if begin >= end { &[] } else { &rows[begin..end] }
}

/// Everything a host needs to draw one table.
#[derive(Debug)]
pub struct TableSnapshot<'a> {
    pub rows: Vec<&'a ArticleRecord>,
    pub sort: SortSpec,
    pub selected: Vec<&'a str>,
    pub current_page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub page_size: usize,
    pub all_on_page_selected: bool,
    pub ready: bool,
}

/// Filter, sort, page and selection state of one articles table.
///
/// `rows` is derived state: the filtered and sorted record indices. It is
/// rebuilt from `records`, `criteria` and `sort` after every change, so the
/// visible page only depends on those inputs and the current page.
#[derive(Debug)]
pub struct TableView {
    name: String,
    records: Arc<Vec<ArticleRecord>>,
    criteria: FilterCriteria,
    sort: SortSpec,
    page_size: usize,
    current_page: usize,
    selected: HashSet<String>,
    rows: Vec<usize>,
    loading: LoadingTimer,
    ready: bool,
}

impl TableView {
    pub fn new(
        name: impl Into<String>,
        records: Arc<Vec<ArticleRecord>>,
        criteria: FilterCriteria,
        page_size: usize,
        loading_delay: Duration,
        now: Instant,
    ) -> Self {
        let mut table = TableView {
            name: name.into(),
            records,
            criteria,
            sort: SortSpec::default(),
            page_size: page_size.max(1),
            current_page: 1,
            selected: HashSet::new(),
            rows: Vec::new(),
            loading: LoadingTimer::start(loading_delay, now),
            ready: false,
        };
        table.rebuild_rows();
        table
    }

    /// A table that skips the loading phase.
    #[cfg(test)]
    pub fn ready(
        name: impl Into<String>,
        records: Arc<Vec<ArticleRecord>>,
        criteria: FilterCriteria,
        page_size: usize,
    ) -> Self {
        let now = Instant::now();
        let mut table = Self::new(name, records, criteria, page_size, Duration::ZERO, now);
        table.tick(now);
        table
    }

    fn rebuild_rows(&mut self) {
        let mut rows = filter_rows(&self.records, &self.criteria);
        sort_rows(&self.records, &mut rows, self.sort);
        self.rows = rows;
        trace!(
            "Table {}: {} of {} records match, sort {:?}",
            self.name,
            self.rows.len(),
            self.records.len(),
            self.sort
        );
    }

    // Drops selected ids that left the filtered collection.
    fn prune_selection(&mut self) {
        if self.selected.is_empty() {
            return;
        }
        let visible: HashSet<&str> = self
            .rows
            .iter()
            .map(|&idx| self.records[idx].id.as_str())
            .collect();
        let before = self.selected.len();
        self.selected.retain(|id| visible.contains(id.as_str()));
        if self.selected.len() != before {
            debug!(
                "Table {}: dropped {} selections outside the filter",
                self.name,
                before - self.selected.len()
            );
        }
    }

    // -------------------- Loading ---------------------- //

    /// Resolves the loading phase once its delay has passed. Returns `true`
    /// on the tick that made the table ready.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.loading.poll(now) {
            self.ready = true;
            debug!("Table {} is ready", self.name);
            return true;
        }
        false
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn cancel_loading(&mut self) {
        self.loading.cancel();
    }

    // -------------------- Inputs ---------------------- //

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if criteria == self.criteria {
            return;
        }
        self.criteria = criteria;
        self.current_page = 1;
        self.rebuild_rows();
        self.prune_selection();
    }

    pub fn set_search_text(&mut self, search_text: &str) {
        let criteria = FilterCriteria::new(self.criteria.category, search_text);
        self.set_criteria(criteria);
    }

    pub fn set_records(&mut self, records: Arc<Vec<ArticleRecord>>) {
        self.records = records;
        self.current_page = 1;
        self.rebuild_rows();
        self.prune_selection();
    }

    // -------------------- Sorting ---------------------- //

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    /// Same field flips the direction, a new field starts ascending.
    pub fn set_sort_field(&mut self, field: SortField) {
        self.sort = if self.sort.field == field {
            SortSpec {
                field,
                direction: self.sort.direction.flipped(),
            }
        } else {
            SortSpec {
                field,
                direction: SortDirection::Ascending,
            }
        };
        self.rebuild_rows();
    }

    // -------------------- Pagination ---------------------- //

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.rows.len(), self.page_size)
    }

    pub fn filtered_count(&self) -> usize {
        self.rows.len()
    }

    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.set_page(1);
    }

    pub fn last_page(&mut self) {
        self.set_page(self.total_pages());
    }

    fn page_indices(&self) -> &[usize] {
        page_slice(&self.rows, self.current_page, self.page_size)
    }

    pub fn page_rows(&self) -> Vec<&ArticleRecord> {
        self.page_indices()
            .iter()
            .map(|&idx| &self.records[idx])
            .collect()
    }

    /// All filtered and sorted records, ignoring pagination.
    pub fn sorted_rows(&self) -> Vec<&ArticleRecord> {
        self.rows.iter().map(|&idx| &self.records[idx]).collect()
    }

    // -------------------- Selection ---------------------- //

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected ids in table order.
    pub fn selection(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|&idx| self.records[idx].id.as_str())
            .filter(|id| self.selected.contains(*id))
            .collect()
    }

    /// Header checkbox state: the page has rows and all of them are selected.
    pub fn all_on_page_selected(&self) -> bool {
        let page = self.page_indices();
        !page.is_empty()
            && page
                .iter()
                .all(|&idx| self.selected.contains(&self.records[idx].id))
    }

    pub fn toggle_select_one(&mut self, id: &str) {
        if self.selected.remove(id) {
            return;
        }
        if self.rows.iter().any(|&idx| self.records[idx].id == id) {
            self.selected.insert(id.to_string());
        } else {
            trace!("Ignoring selection of {id}, it is not part of table {}", self.name);
        }
    }

    /// Selects every row on the current page, or deselects them when all of
    /// them already are. Other pages keep their selection.
    pub fn toggle_select_all(&mut self) {
        let page_ids: Vec<String> = self
            .page_indices()
            .iter()
            .map(|&idx| self.records[idx].id.clone())
            .collect();
        if self.all_on_page_selected() {
            for id in page_ids.iter() {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(page_ids);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn snapshot(&self) -> TableSnapshot<'_> {
        TableSnapshot {
            rows: self.page_rows(),
            sort: self.sort,
            selected: self.selection(),
            current_page: self.current_page,
            total_pages: self.total_pages(),
            filtered_count: self.filtered_count(),
            page_size: self.page_size,
            all_on_page_selected: self.all_on_page_selected(),
            ready: self.ready,
        }
    }
}
