use polars::prelude::*;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::domain::DashError;

/// Publication state of an article. Doubles as the tab category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleStatus {
    Generated,
    Published,
    Scheduled,
    Archived,
}

impl ArticleStatus {
    pub const ALL: [ArticleStatus; 4] = [
        ArticleStatus::Generated,
        ArticleStatus::Published,
        ArticleStatus::Scheduled,
        ArticleStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Generated => "generated",
            ArticleStatus::Published => "published",
            ArticleStatus::Scheduled => "scheduled",
            ArticleStatus::Archived => "archived",
        }
    }

    pub fn tab_title(&self) -> &'static str {
        match self {
            ArticleStatus::Generated => "Generated Articles",
            ArticleStatus::Published => "Published Articles",
            ArticleStatus::Scheduled => "Scheduled Articles",
            ArticleStatus::Archived => "Archived Articles",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        ArticleStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub id: String,
    pub title: String,
    /// Keyword with its traffic annotation, e.g. `backlinks [8100]`.
    pub keyword: String,
    pub word_count: u32,
    /// Display only. Relative phrases and placeholders like `---` are mixed.
    pub created_label: String,
    pub status: ArticleStatus,
}

impl ArticleRecord {
    pub fn new(
        id: &str,
        title: &str,
        keyword: &str,
        word_count: u32,
        created_label: &str,
        status: ArticleStatus,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            keyword: keyword.to_string(),
            word_count,
            created_label: created_label.to_string(),
            status,
        }
    }
}

/// The articles shipped with the dashboard when no data file is given.
pub fn builtin_articles() -> Vec<ArticleRecord> {
    use ArticleStatus::*;
    vec![
        ArticleRecord::new(
            "1",
            "How to Improve Your Skills in League of Legends",
            "league of legends [2240000]",
            4575,
            "20 hours ago",
            Generated,
        ),
        ArticleRecord::new(
            "2",
            "How to Master Last Hitting in League of Legends",
            "league of legends [2240000]",
            3480,
            "21 hours ago",
            Generated,
        ),
        ArticleRecord::new(
            "3",
            "7 Tips for Better Teamplay in League of Legends",
            "league of legends [2240000]",
            2676,
            "a day ago",
            Generated,
        ),
        ArticleRecord::new(
            "4",
            "Top Virtual Executive Assistant Services (2024)",
            "virtual executive assistant [2900]",
            2408,
            "1 Oct, 24",
            Generated,
        ),
        ArticleRecord::new(
            "5",
            "Unlimited Graphics Design Solutions",
            "unlimited graphic design services [390]",
            1793,
            "---",
            Generated,
        ),
        ArticleRecord::new(
            "6",
            "Top Amazon Payment Methods for Quick Access to Funds",
            "amazon payment methods [3600]",
            2647,
            "---",
            Published,
        ),
        ArticleRecord::new(
            "7",
            "Backlinks 101: What are backlinks and why they're important [Free template]",
            "backlinks [8100]",
            2261,
            "---",
            Scheduled,
        ),
        ArticleRecord::new(
            "8",
            "7 Leading AI SEO Tools in 2024 [Ranked & Compared]",
            "ai seo software [880]",
            1543,
            "---",
            Archived,
        ),
        ArticleRecord::new(
            "9",
            "Unlimited Graphic Design Services You Can Rely On",
            "unlimited graphic design services [390]",
            1974,
            "---",
            Generated,
        ),
    ]
}

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

const COLUMNS: [&str; 6] = ["id", "title", "keyword", "words", "created", "status"];

/// Load the article table from a csv, parquet or arrow file.
///
/// The file needs the columns `id, title, keyword, words, created, status`.
/// Additional columns are ignored.
#[instrument]
pub fn load_articles(path: PathBuf) -> Result<Vec<ArticleRecord>, DashError> {
    let file_type = check_file(&path)?;
    let frame = match file_type {
        FileType::CSV => load_csv(&path)?,
        FileType::PARQUET => load_parquet(&path)?,
        FileType::ARROW => load_arrow(&path)?,
    };

    let start_time = Instant::now();
    let df = frame.select(COLUMNS.map(col)).collect()?;

    // Each column is converted in its own thread.
    let columns: Result<Vec<Vec<String>>, PolarsError> = COLUMNS
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect();
    let columns = columns?;
    debug!("Converted {} columns in {}ms", columns.len(), start_time.elapsed().as_millis());

    let records = build_records(&columns)?;
    info!("Loaded {} articles from {:?}", records.len(), path);
    Ok(records)
}

fn build_records(columns: &[Vec<String>]) -> Result<Vec<ArticleRecord>, DashError> {
    let nrows = columns.first().map(|c| c.len()).unwrap_or(0);
    let mut seen = HashSet::with_capacity(nrows);
    let mut records = Vec::with_capacity(nrows);

    for row in 0..nrows {
        let id = columns[0][row].trim().to_string();
        if id.is_empty() {
            return Err(DashError::InvalidRecord(format!("row {}: empty id", row + 1)));
        }
        if !seen.insert(id.clone()) {
            return Err(DashError::InvalidRecord(format!("row {}: duplicate id {id}", row + 1)));
        }
        let word_count = columns[3][row].trim().parse::<u32>().map_err(|_| {
            DashError::InvalidRecord(format!(
                "row {}: words must be a non negative integer, got {:?}",
                row + 1,
                columns[3][row]
            ))
        })?;
        let status = ArticleStatus::parse(&columns[5][row]).ok_or_else(|| {
            DashError::InvalidRecord(format!(
                "row {}: unknown status {:?}",
                row + 1,
                columns[5][row]
            ))
        })?;
        records.push(ArticleRecord {
            id,
            title: columns[1][row].clone(),
            keyword: columns[2][row].clone(),
            word_count,
            created_label: columns[4][row].clone(),
            status,
        });
    }
    Ok(records)
}

fn load_column(df: &DataFrame, name: &str) -> Result<Vec<String>, PolarsError> {
    let col = df.column(name)?.cast(&DataType::String)?;
    let series = col.str()?;
    Ok(series
        .into_iter()
        .map(|value| value.map(|s| s.replace(['\r', '\n'], " ")).unwrap_or_default())
        .collect())
}

fn check_file(path: &Path) -> Result<FileType, DashError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DashError::FileNotFound,
        ErrorKind::PermissionDenied => DashError::PermissionDenied,
        _ => DashError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(DashError::LoadingFailed("Not a file!".into()));
    }
    detect_file_type(path)
}

fn detect_file_type(path: &Path) -> Result<FileType, DashError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(DashError::UnknownFileType),
    }
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn builtin_ids_are_unique() {
        let articles = builtin_articles();
        let ids: HashSet<_> = articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), articles.len());
        assert_eq!(articles.len(), 9);
    }

    #[test]
    fn status_parse_ignores_case() {
        assert_eq!(ArticleStatus::parse("Published"), Some(ArticleStatus::Published));
        assert_eq!(ArticleStatus::parse(" archived "), Some(ArticleStatus::Archived));
        assert_eq!(ArticleStatus::parse("draft"), None);
    }

    #[test]
    fn loads_csv_fixture() {
        let records = load_articles(fixture("articles.csv")).unwrap();
        assert_eq!(records.len(), 12);
        assert_eq!(records[0].id, "a-1");
        assert_eq!(records[0].word_count, 4575);
        assert_eq!(records[0].status, ArticleStatus::Generated);
        assert_eq!(records[11].status, ArticleStatus::Archived);
        assert_eq!(records[5].created_label, "---");
    }

    #[test]
    fn rejects_unknown_status() {
        let err = load_articles(fixture("articles_bad_status.csv")).unwrap_err();
        assert!(matches!(err, DashError::InvalidRecord(_)), "{err:?}");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_articles(fixture("does_not_exist.csv")).unwrap_err();
        assert!(matches!(err, DashError::FileNotFound));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = detect_file_type(Path::new("articles.xlsx")).unwrap_err();
        assert!(matches!(err, DashError::UnknownFileType));
    }

    #[test]
    fn build_records_rejects_duplicates() {
        let row = |id: &str| {
            vec![
                id.to_string(),
                "t".to_string(),
                "k".to_string(),
                "1".to_string(),
                "---".to_string(),
                "generated".to_string(),
            ]
        };
        // Transpose two rows into columns
        let rows = [row("x"), row("x")];
        let columns: Vec<Vec<String>> = (0..6)
            .map(|c| rows.iter().map(|r| r[c].clone()).collect())
            .collect();
        let err = build_records(&columns).unwrap_err();
        assert!(matches!(err, DashError::InvalidRecord(_)));
    }
}
