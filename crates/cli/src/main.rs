// ABOUTME: CLI for scraping a list of URLs into records with gleaner.
// ABOUTME: Runs the batch sequentially, shows a truncated table or JSON, and saves CSV/summary files on request.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use gleaner::options::{DEFAULT_CONTENT_SELECTOR, DEFAULT_TITLE_SELECTOR};
use gleaner::{
    export_csv, export_summary, load_csv, validate_records, BatchFailure, CancellationToken,
    RunSummary, SampleProfile, ScrapeTarget, ScrapedRecord, Scraper,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Extract title, content, date and images from web pages.
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(about = "Scrape pages into records and save them as CSV", long_about = None)]
struct Args {
    /// URLs to scrape, processed in order.
    #[arg()]
    urls: Vec<String>,

    /// File with one URL per line; blank lines and lines starting with '#' are ignored.
    #[arg(long = "url-file")]
    url_file: Option<PathBuf>,

    /// Comma-separated title selectors, tried in order.
    #[arg(long = "title-selector", default_value = DEFAULT_TITLE_SELECTOR)]
    title_selector: String,

    /// Comma-separated content selectors, tried in order.
    #[arg(long = "content-selector", default_value = DEFAULT_CONTENT_SELECTOR)]
    content_selector: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Pause between URLs in seconds.
    #[arg(long, default_value_t = 1.0)]
    delay: f64,

    /// Retries for timeouts, connection errors, 5xx and 429 responses.
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Override the User-Agent header.
    #[arg(long = "user-agent")]
    user_agent: Option<String>,

    /// HTML file to extract from instead of fetching (requires --url).
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// URL context for --html (used for the host-name title and image links).
    #[arg(long = "url")]
    url: Option<String>,

    /// Reload records from a CSV file written by --csv instead of scraping.
    #[arg(long = "load")]
    load: Option<PathBuf>,

    /// Print records as JSON instead of a table.
    #[arg(long = "json")]
    json_output: bool,

    /// Save records to this CSV file.
    #[arg(long = "csv")]
    csv: Option<PathBuf>,

    /// Save the run summary and sample profile to this CSV file.
    #[arg(long = "summary")]
    summary: Option<PathBuf>,

    /// Check records for missing URL, title or content and print the problems.
    #[arg(long = "validate")]
    validate: bool,
}

/// What a run produced, whichever way the records were obtained.
struct Collected {
    records: Vec<ScrapedRecord>,
    failures: Vec<BatchFailure>,
    summary: RunSummary,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
}

fn read_url_file(path: &PathBuf) -> Result<Vec<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading URL file {:?}", path))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// URLs from the command line then the URL file, without duplicates, first occurrence kept.
fn collect_urls(args: &Args) -> Result<Vec<String>> {
    let mut urls: Vec<String> = Vec::new();
    let from_file = match &args.url_file {
        Some(path) => read_url_file(path)?,
        None => Vec::new(),
    };
    for url in args.urls.iter().cloned().chain(from_file) {
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    Ok(urls)
}

fn build_scraper(args: &Args) -> Result<Scraper> {
    let Ok(delay) = Duration::try_from_secs_f64(args.delay) else {
        bail!("--delay must be a non-negative number of seconds within range");
    };
    let mut builder = Scraper::builder()
        .timeout(Duration::from_secs(args.timeout))
        .delay(delay)
        .max_retries(args.retries);
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua);
    }
    Ok(builder.build())
}

fn print_table(records: &[ScrapedRecord]) {
    for (i, record) in records.iter().enumerate() {
        println!("{}. {}", i + 1, record.url);
        println!("   title:   {}", record.display_title());
        println!("   content: {}", record.display_content());
        if !record.date.is_empty() {
            println!("   date:    {}", record.date);
        }
        println!("   images:  {}", record.images.len());
        println!("   scraped: {}", record.timestamp);
    }
}

async fn collect(args: &Args) -> Result<Collected> {
    if let Some(path) = &args.load {
        let records = load_csv(path)?;
        let summary = RunSummary::from_records(&records, Local::now());
        return Ok(Collected {
            records,
            failures: Vec::new(),
            summary,
        });
    }

    let scraper = build_scraper(args)?;

    if let Some(html_path) = &args.html {
        let Some(url) = args.url.as_deref() else {
            bail!("--url is required when using --html");
        };
        let html = fs::read_to_string(html_path)
            .with_context(|| format!("reading HTML file {:?}", html_path))?;
        let target = ScrapeTarget::new(url, &args.title_selector, &args.content_selector);
        let records = vec![scraper.extract_html(&html, &target)];
        let summary = RunSummary::new(1, 1, Local::now());
        return Ok(Collected {
            records,
            failures: Vec::new(),
            summary,
        });
    }

    let urls = collect_urls(args)?;
    if urls.is_empty() {
        bail!("at least one URL is required, or use --html with --url, or --load");
    }
    let targets: Vec<ScrapeTarget> = urls
        .iter()
        .map(|url| ScrapeTarget::new(url, &args.title_selector, &args.content_selector))
        .collect();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("stop requested; finishing the current URL");
            on_signal.cancel();
        }
    });

    let report = scraper.process_all(&targets, &cancel).await;
    let summary = report.summary();
    Ok(Collected {
        records: report.records,
        failures: report.failures,
        summary,
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let args = Args::parse();

    if args.html.is_some() && !args.urls.is_empty() {
        bail!("cannot use both --html and positional URLs");
    }

    let collected = collect(&args).await?;
    let mut had_error = !collected.failures.is_empty();

    if args.json_output {
        println!("{}", serde_json::to_string_pretty(&collected.records)?);
    } else {
        print_table(&collected.records);
    }

    for failure in &collected.failures {
        eprintln!("failed: {}: {}", failure.url, failure.error);
    }
    eprintln!(
        "done: {} total, {} succeeded, {} failed",
        collected.summary.total, collected.summary.succeeded, collected.summary.failed
    );

    if let Some(path) = &args.csv {
        export_csv(&collected.records, path)?;
    }

    if let Some(path) = &args.summary {
        let profile = SampleProfile::from_records(&collected.records);
        export_summary(&collected.summary, profile.as_ref(), path)?;
    }

    if args.validate {
        let report = validate_records(&collected.records);
        for issue in &report.issues {
            eprintln!("invalid: {}", issue);
        }
        eprintln!(
            "validation: {}/{} rows have a URL, {}",
            report.valid_count,
            report.total_count,
            if report.valid { "ok" } else { "problems found" }
        );
        had_error |= !report.valid;
    }

    Ok(if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
