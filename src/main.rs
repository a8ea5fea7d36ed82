use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use artdash::articles::{ArticleRecord, builtin_articles, load_articles};
use artdash::controller::Controller;
use artdash::domain::{DashConfig, DashError, Message};
use artdash::model::{Model, Status};
use artdash::ui::TableUI;

/// A tui based articles dashboard.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Article table (csv, parquet or arrow). The built-in articles are used if omitted.
    #[arg(short, long)]
    data: Option<String>,

    /// Rows per table page.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..))]
    page_size: u16,

    /// Milliseconds the tables show their loading placeholder.
    #[arg(long, default_value_t = 1000)]
    loading_delay_ms: u64,

    /// Milliseconds to wait for terminal events per loop iteration.
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Write logs to this file. Nothing is logged without it.
    #[arg(long)]
    log_file: Option<String>,

    #[arg(long, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            error!("artdash failed: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn expand_path(path: &str) -> Result<PathBuf, DashError> {
    let expanded = shellexpand::full(path)
        .map_err(|e| DashError::LoadingFailed(format!("cannot expand {path}: {e}")))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn init_logging(log_file: Option<&str>, level: &str) -> Result<(), DashError> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(expand_path(path)?)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("artdash={level}")));

    // The terminal belongs to the UI, so logs only go to the file.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), DashError> {
    init_logging(args.log_file.as_deref(), &args.log_level)?;
    info!("Starting artdash with {:?}", args);

    let articles = match &args.data {
        Some(path) => load_articles(expand_path(path)?)?,
        None => builtin_articles(),
    };

    let cfg = DashConfig::default()
        .event_poll_time(args.poll_ms)
        .page_size(args.page_size as usize)
        .loading_delay(Duration::from_millis(args.loading_delay_ms));

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &cfg, articles);
    ratatui::restore();
    info!("artdash stopped");
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    cfg: &DashConfig,
    articles: Vec<ArticleRecord>,
) -> Result<(), DashError> {
    let size = terminal.size()?;
    let mut model = Model::init(cfg, articles, size.width as usize, size.height as usize);
    let mut ui = TableUI::new();
    let controller = Controller::new(cfg);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message);
        }
        model.update(Message::Tick);
    }
    Ok(())
}
