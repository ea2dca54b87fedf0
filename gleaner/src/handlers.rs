use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;
use gleaner_core::crawl::{CrawlOptions, DepthMode, HostCallback, PageReport, ScrapeController};
use gleaner_core::report::{ReportFormat, ReportSummary, generate_report, save_report};
use gleaner_scanner::fetcher::DEFAULT_TIMEOUT_SECS;
use gleaner_scanner::{Classifier, HttpFetcher, TldRegistry};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

/// Maps `-v` occurrences to a log level. `-q` wins over any `-v`.
pub fn verbosity_level(verbosity: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Installs the stderr log subscriber. Later calls are ignored.
pub fn init_logging(verbosity: u8, quiet: bool) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(verbosity_level(verbosity, quiet))
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    PathBuf::from(expanded.as_ref())
}

pub fn default_dump_dir() -> PathBuf {
    std::env::temp_dir().join("gleaner")
}

pub fn load_registry(tld_file: Option<&Path>) -> Result<TldRegistry> {
    match tld_file {
        Some(path) => TldRegistry::from_file(path)
            .with_context(|| format!("Failed to load TLD list from {}", path.display())),
        None => Ok(TldRegistry::bundled()),
    }
}

/// Everything the scan subcommands share, pulled out of their arguments.
#[derive(Debug)]
pub struct ScanSettings {
    pub options: CrawlOptions,
    pub timeout_secs: u64,
    pub dump_dir: PathBuf,
    pub tld_file: Option<PathBuf>,
    pub cdn_markers: Option<Vec<String>>,
    pub cloud_markers: Option<Vec<String>>,
    pub output: Option<PathBuf>,
    pub format: ReportFormat,
}

impl ScanSettings {
    pub fn from_args(args: &ArgMatches) -> Result<Self> {
        let mut options = CrawlOptions::default();
        if let Some(max_level) = args.get_one::<usize>("max-depth") {
            options.max_level = *max_level;
        }
        if let Some(mode) = args.get_one::<String>("depth-mode") {
            options.depth_mode = DepthMode::from_str(mode)
                .with_context(|| format!("Unknown depth mode: {}", mode))?;
        }
        if let Some(chunk_size) = args.get_one::<usize>("chunk-size") {
            anyhow::ensure!(*chunk_size > 0, "Chunk size must be at least one byte");
            options.chunk_size = *chunk_size;
        }

        let format = match args.get_one::<String>("format") {
            Some(raw) => ReportFormat::from_str(raw)
                .with_context(|| format!("Unknown report format: {}", raw))?,
            None => ReportFormat::Text,
        };

        Ok(Self {
            options,
            timeout_secs: args
                .get_one::<u64>("timeout")
                .copied()
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            dump_dir: args
                .get_one::<String>("dump-dir")
                .map(|raw| expand_path(raw))
                .unwrap_or_else(default_dump_dir),
            tld_file: args.get_one::<String>("tld-file").map(|raw| expand_path(raw)),
            cdn_markers: collect_markers(args, "cdn-marker"),
            cloud_markers: collect_markers(args, "cloud-marker"),
            output: args.get_one::<PathBuf>("output").cloned(),
            format,
        })
    }

    pub fn classifier(&self) -> Classifier {
        let mut classifier = Classifier::new();
        if let Some(ref markers) = self.cdn_markers {
            classifier = classifier.with_cdn_markers(markers.clone());
        }
        if let Some(ref markers) = self.cloud_markers {
            classifier = classifier.with_cloud_markers(markers.clone());
        }
        classifier
    }

    pub fn controller(&self, host_callback: HostCallback) -> Result<ScrapeController<HttpFetcher>> {
        let registry = load_registry(self.tld_file.as_deref())?;
        let fetcher = HttpFetcher::with_timeout(self.timeout_secs)
            .context("Failed to build HTTP client")?
            .with_dump_dir(self.dump_dir.clone());

        Ok(ScrapeController::new(fetcher, Arc::new(registry))
            .with_options(self.options.clone())
            .with_classifier(self.classifier())
            .with_host_callback(host_callback))
    }
}

fn collect_markers(args: &ArgMatches, id: &str) -> Option<Vec<String>> {
    args.get_many::<String>(id)
        .map(|values| values.map(|v| v.to_lowercase()).collect())
}

fn start_spinner(quiet: bool, message: String) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    Ok(spinner)
}

/// Prints each cloud-hosted hostname on stdout without tearing the spinner.
fn stdout_host_callback(spinner: &ProgressBar) -> HostCallback {
    let spinner = spinner.clone();
    Arc::new(move |hostname: &str| spinner.suspend(|| println!("{}", hostname)))
}

pub async fn handle_crawl(args: &ArgMatches, quiet: bool) -> Result<()> {
    let target = args
        .get_one::<String>("TARGET")
        .context("No target supplied")?;
    let settings = ScanSettings::from_args(args)?;

    let spinner = start_spinner(quiet, format!("Scraping {}", target))?;
    let controller = settings.controller(stdout_host_callback(&spinner))?;
    let result = controller.scrape_site(target).await;
    spinner.finish_and_clear();

    let report = result.with_context(|| format!("Scrape of {} failed", target))?;
    finish(&report, &settings, quiet)
}

pub async fn handle_file(args: &ArgMatches, quiet: bool) -> Result<()> {
    let path = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or_default();
    let hostname = args
        .get_one::<String>("hostname")
        .map(String::as_str)
        .unwrap_or_default();
    let settings = ScanSettings::from_args(args)?;

    let spinner = start_spinner(quiet, format!("Scraping {}", path))?;
    let controller = settings.controller(stdout_host_callback(&spinner))?;
    let result = controller.scrape_local_file(hostname, path).await;
    spinner.finish_and_clear();

    let report = result.with_context(|| format!("Scrape of local file '{}' failed", path))?;
    finish(&report, &settings, quiet)
}

pub async fn handle_list(args: &ArgMatches) -> Result<()> {
    let path = args
        .get_one::<String>("PATH")
        .context("No site list supplied")?;
    let registry = load_registry(None)?;
    let controller = ScrapeController::new(
        HttpFetcher::new().context("Failed to build HTTP client")?,
        Arc::new(registry),
    );
    controller
        .scrape_site_list(path)
        .await
        .with_context(|| format!("Scrape of site list {} failed", path))
}

fn finish(report: &PageReport, settings: &ScanSettings, quiet: bool) -> Result<()> {
    if let Some(ref output) = settings.output {
        let content = generate_report(report, settings.format).context("Failed to render report")?;
        save_report(&content, output)
            .with_context(|| format!("Failed to save report to {}", output.display()))?;
        if !quiet {
            eprintln!("{} Report saved to {}", "✓".green().bold(), output.display());
        }
    }

    if !quiet {
        print_summary(report);
    }
    Ok(())
}

fn print_summary(report: &PageReport) {
    let summary = ReportSummary::from_page(report);
    print_divider();
    eprintln!("{} {}", "✓".green().bold(), "Scrape complete".bold());
    eprintln!("  {} pages scraped: {}", "→".blue(), summary.pages_scraped);
    if summary.pages_failed > 0 {
        eprintln!("  {} pages failed:  {}", "✗".red(), summary.pages_failed.to_string().red());
    }
    eprintln!("  {} urls found:    {}", "→".blue(), summary.urls_found);
    eprintln!("  {} ips found:     {}", "→".blue(), summary.ips_found);
    eprintln!(
        "  {} cloud hosts:   {}",
        "→".blue(),
        summary.cloud_hosts.to_string().yellow().bold()
    );
    print_divider();
}

fn print_divider() {
    eprintln!("{}", "═".repeat(60).bright_blue().bold());
}
