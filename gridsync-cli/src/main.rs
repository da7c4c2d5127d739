//! gridsync - fetch pages and row details from a server-side grid endpoint

use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;
use gridsync_lib::csrf::CookieJarToken;
use gridsync_lib::grid::{DrawInfo, GridApi, HeadlessGridFactory, MountPoint, RowIndex};
use gridsync_lib::retry::RetryConfig;
use gridsync_lib::session::{DateRange, UiEvent};
use gridsync_lib::transport::HttpTransport;
use gridsync_lib::{TableConfig, TableController};
use simplelog::{Config, LevelFilter, WriteLogger};
use url::Url;

#[derive(Parser)]
#[command(name = "gridsync")]
#[command(version)]
#[command(about = "Fetch pages and row details from a server-side grid endpoint", long_about = None)]
struct Cli {
    /// Grid endpoint URL
    url: Url,

    /// Mount point id used in log output
    #[arg(long, default_value = "table")]
    mount: String,

    /// Zero-based page to fetch
    #[arg(short, long, default_value_t = 0)]
    page: usize,

    /// Page length (defaults to the endpoint's first length menu entry)
    #[arg(short, long)]
    length: Option<i64>,

    /// Global search term
    #[arg(short, long)]
    search: Option<String>,

    /// Column filter as INDEX=VALUE (repeatable)
    #[arg(short, long = "filter", value_parser = parse_filter)]
    filters: Vec<(usize, String)>,

    /// Lower date bound (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Upper date bound (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Fetch details for the row at this position on the page (repeatable)
    #[arg(short, long = "details")]
    details: Vec<usize>,

    /// Cookie header sent with every request; also read from GRIDSYNC_COOKIE
    #[arg(long, env = "GRIDSYNC_COOKIE")]
    cookie: Option<String>,

    /// Retries for rate-limited, failing or unreachable requests
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Log file
    #[arg(long, default_value = "gridsync.log")]
    log_file: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Upper bound on waiting for composition beyond the settle delay.
const COMPOSE_GRACE: Duration = Duration::from_secs(2);

const COMPOSE_POLL: Duration = Duration::from_millis(10);

/// Header line of a printed page; rows are numbered from one.
fn page_summary(info: &DrawInfo, row_count: usize) -> String {
    let (first, last) = match row_count {
        0 => (0, 0),
        n => (info.start + 1, info.start + n),
    };
    format!(
        "# page {} rows {}-{} of {} (total {})",
        info.page, first, last, info.records_filtered, info.records_total
    )
}

fn parse_filter(s: &str) -> Result<(usize, String), String> {
    let (index, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=VALUE, got '{}'", s))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid column index '{}'", index))?;
    Ok((index, value.to_string()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match File::create(&cli.log_file) {
        Ok(log_file) => {
            let level = cli.log_level.parse().unwrap_or(LevelFilter::Info);
            if let Err(e) = WriteLogger::init(level, Config::default(), log_file) {
                eprintln!("Warning: logger not initialized: {}", e);
            }
        }
        Err(e) => eprintln!("Warning: cannot create {}: {}", cli.log_file, e),
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cookie = cli.cookie.unwrap_or_default();
    let config = TableConfig::default();
    let settle = config.settle_delay;

    let transport = HttpTransport::new()
        .timeout(Duration::from_secs(cli.timeout))
        .retry(RetryConfig::bounded(cli.retries))
        .cookies(cookie.clone());
    let factory = Arc::new(HeadlessGridFactory::new());
    let controller = TableController::builder()
        .shared_grid_factory(factory.clone())
        .csrf(CookieJarToken::new(cookie))
        .transport(transport)
        .config(config)
        .build();

    let mount = MountPoint::new(cli.mount);
    let session = controller
        .initialize_table(mount.clone(), cli.url.as_str(), None, None)
        .await?;
    let grid = factory
        .grid(&mount)
        .ok_or_else(|| format!("no grid constructed on {}", mount))?;

    if let Some(length) = cli.length {
        grid.set_page_length(length);
    }
    if let Some(search) = cli.search {
        grid.set_search(search);
    }
    for (index, value) in &cli.filters {
        grid.set_column_search(*index, value);
    }
    session.set_date_range(DateRange::new(cli.from, cli.to));
    grid.set_page(cli.page);

    let info = grid.draw_now().await?;
    let rows = grid.rows();
    println!("{}", page_summary(&info, rows.len()));
    for row in rows {
        println!("{}", serde_json::to_string(&row)?);
    }
    if let Some(footer) = session.footer() {
        println!("# footer: {}", footer);
    }

    if cli.details.is_empty() {
        return Ok(());
    }

    // Row tools are bound once the grid has settled after its first render.
    let composed = tokio::time::timeout(settle + COMPOSE_GRACE, async {
        while !session.is_composed() {
            tokio::time::sleep(COMPOSE_POLL).await;
        }
    })
    .await;
    if composed.is_err() {
        return Err("table did not finish initializing".into());
    }

    let detail_timeout = Duration::from_secs(cli.timeout);
    for &index in &cli.details {
        let row = RowIndex(index);
        if !session.dispatch(UiEvent::RowToolClick { row }) {
            eprintln!("Warning: no row at position {}", index);
            continue;
        }
        let Some(pane) = grid.child(row) else {
            continue;
        };
        if tokio::time::timeout(detail_timeout, pane.settled()).await.is_err() {
            pane.cancel();
            eprintln!("Warning: details for row {} timed out", index);
            continue;
        }
        println!("# details {}", index);
        println!("{}", pane.html());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(page: usize, start: usize) -> DrawInfo {
        DrawInfo {
            draw: 1,
            page,
            start,
            length: 10,
            records_total: 42,
            records_filtered: 12,
        }
    }

    #[test]
    fn test_page_summary() {
        assert_eq!(
            page_summary(&info(1, 10), 2),
            "# page 1 rows 11-12 of 12 (total 42)"
        );
    }

    #[test]
    fn test_page_summary_empty_page() {
        assert_eq!(
            page_summary(&info(3, 30), 0),
            "# page 3 rows 0-0 of 12 (total 42)"
        );
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("0=acme"), Ok((0, "acme".to_string())));
        assert_eq!(parse_filter(" 2 =a=b"), Ok((2, "a=b".to_string())));
        assert!(parse_filter("name").is_err());
        assert!(parse_filter("x=1").is_err());
    }
}
