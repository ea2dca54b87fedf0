// Report generation from a finished scrape

use crate::crawl::PageReport;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Totals across a page and everything it led to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub pages_scraped: usize,
    pub pages_failed: usize,
    pub urls_found: usize,
    pub ips_found: usize,
    pub cloud_hosts: usize,
    pub deepest_level: usize,
}

impl ReportSummary {
    pub fn from_page(page: &PageReport) -> Self {
        Self {
            pages_scraped: page.page_count(),
            pages_failed: page.failed_count(),
            urls_found: page.total_urls(),
            ips_found: page.total_ips(),
            cloud_hosts: page.cloud_hostnames().len(),
            deepest_level: page.max_depth(),
        }
    }
}

pub fn generate_text_report(page: &PageReport) -> String {
    let summary = ReportSummary::from_page(page);
    let mut report = String::new();

    report.push_str(RULE);
    report.push('\n');
    report.push_str("                           GLEANER SCRAPE REPORT\n");
    report.push_str(RULE);
    report.push_str("\n\n");

    report.push_str(&format!("Target:        {}\n", page.target));
    report.push_str(&format!("Pages scraped: {}\n", summary.pages_scraped));
    if summary.pages_failed > 0 {
        report.push_str(&format!("Pages failed:  {}\n", summary.pages_failed));
    }
    report.push_str(&format!("URLs found:    {}\n", summary.urls_found));
    report.push_str(&format!("IPs found:     {}\n", summary.ips_found));
    report.push_str(&format!("Cloud hosts:   {}\n", summary.cloud_hosts));
    report.push_str(&format!("Deepest level: {}\n\n", summary.deepest_level));

    report.push_str(RULE);
    report.push_str("\nPAGES\n");
    report.push_str(RULE);
    report.push_str("\n\n");
    write_page(&mut report, page);

    let cloud_hosts = page.cloud_hostnames();
    if !cloud_hosts.is_empty() {
        report.push('\n');
        report.push_str(RULE);
        report.push_str("\nCLOUD HOSTED\n");
        report.push_str(RULE);
        report.push_str("\n\n");
        for host in cloud_hosts {
            report.push_str(&format!("  {}\n", host));
        }
    }

    report.push('\n');
    report.push_str(RULE);
    report.push_str("\nGenerated by Gleaner. For authorized reconnaissance only.\n");

    report
}

fn write_page(report: &mut String, page: &PageReport) {
    let indent = "    ".repeat(page.depth);

    match page.error {
        Some(ref error) => {
            report.push_str(&format!("{}✗ {} [depth {}] {}\n", indent, page.target, page.depth, error));
            return;
        }
        None => {
            report.push_str(&format!("{}● {} [depth {}]\n", indent, page.target, page.depth));
        }
    }

    for ip in &page.discovered_ips {
        report.push_str(&format!("{}    ip   {}\n", indent, ip));
    }

    for url in &page.discovered_urls {
        let mut flags = Vec::new();
        if url.follow {
            flags.push("follow");
        }
        if url.cloud_hosted {
            flags.push("cloud");
        }

        if flags.is_empty() {
            report.push_str(&format!("{}    url  {}\n", indent, url.url));
        } else {
            report.push_str(&format!("{}    url  {} ({})\n", indent, url.url, flags.join(", ")));
        }
    }

    for child in &page.children {
        write_page(report, child);
    }
}

pub fn generate_json_report(page: &PageReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Gleaner",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": ReportSummary::from_page(page),
            "cloud_hosts": page.cloud_hostnames(),
            "root": page
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_report(page: &PageReport, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(page)),
        ReportFormat::Json => generate_json_report(page),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
