// Tests for report generation functionality

use gleaner_core::crawl::PageReport;
use gleaner_core::report::{
    ReportFormat, ReportSummary, generate_json_report, generate_report, generate_text_report,
    save_report,
};
use gleaner_scanner::DiscoveredUrl;
use tempfile::TempDir;

fn url(url: &str, hostname: &str, follow: bool, cloud_hosted: bool) -> DiscoveredUrl {
    DiscoveredUrl {
        url: url.to_string(),
        hostname: hostname.to_string(),
        follow,
        cloud_hosted,
    }
}

fn page(target: &str, depth: usize) -> PageReport {
    PageReport {
        target: target.to_string(),
        hostname: target.split('/').next().unwrap_or_default().to_string(),
        depth,
        discovered_ips: Vec::new(),
        discovered_urls: Vec::new(),
        children: Vec::new(),
        error: None,
    }
}

fn sample_report() -> PageReport {
    let mut child = page("cdn.cloudflare.com/lib.js", 1);
    child.discovered_urls.push(url(
        "bucket.s3.amazonaws.com/data.json",
        "bucket.s3.amazonaws.com",
        false,
        true,
    ));

    let mut failed = page("cdn.cloudflare.com/gone.js", 1);
    failed.error = Some("Failed to fetch cdn.cloudflare.com/gone.js: timed out".to_string());

    let mut root = page("example.com", 0);
    root.discovered_ips = vec!["10.0.0.5".to_string(), "10.0.0.6".to_string()];
    root.discovered_urls = vec![
        url("cdn.cloudflare.com/lib.js", "cdn.cloudflare.com", true, false),
        url("cdn.cloudflare.com/gone.js", "cdn.cloudflare.com", true, false),
        url("assets.aws.dev/logo.png", "assets.aws.dev", false, true),
        url("fonts.example.org", "fonts.example.org", false, false),
    ];
    root.children = vec![child, failed];
    root
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str_text() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("txt"), Some(ReportFormat::Text)));
}

#[test]
fn test_report_format_from_str_json() {
    assert!(matches!(ReportFormat::from_str("json"), Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert!(matches!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("Json"), Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("csv").is_none());
    assert!(ReportFormat::from_str("").is_none());
}

// ============================================================================
// Summary Tests
// ============================================================================

#[test]
fn test_summary_counts_whole_tree() {
    let summary = ReportSummary::from_page(&sample_report());

    assert_eq!(summary.pages_scraped, 3);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.urls_found, 5);
    assert_eq!(summary.ips_found, 2);
    assert_eq!(summary.cloud_hosts, 2);
    assert_eq!(summary.deepest_level, 1);
}

#[test]
fn test_summary_single_page() {
    let summary = ReportSummary::from_page(&page("example.com", 0));

    assert_eq!(summary.pages_scraped, 1);
    assert_eq!(summary.pages_failed, 0);
    assert_eq!(summary.urls_found, 0);
    assert_eq!(summary.deepest_level, 0);
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_header_and_summary() {
    let text = generate_text_report(&sample_report());

    assert!(text.contains("GLEANER SCRAPE REPORT"));
    assert!(text.contains("Target:        example.com"));
    assert!(text.contains("Pages scraped: 3"));
    assert!(text.contains("Pages failed:  1"));
    assert!(text.contains("Cloud hosts:   2"));
}

#[test]
fn test_text_report_lists_pages_with_flags() {
    let text = generate_text_report(&sample_report());

    assert!(text.contains("● example.com [depth 0]"));
    assert!(text.contains("    ● cdn.cloudflare.com/lib.js [depth 1]"));
    assert!(text.contains("ip   10.0.0.5"));
    assert!(text.contains("url  cdn.cloudflare.com/lib.js (follow)"));
    assert!(text.contains("url  assets.aws.dev/logo.png (cloud)"));
    assert!(text.contains("url  fonts.example.org\n"));
}

#[test]
fn test_text_report_marks_failed_pages() {
    let text = generate_text_report(&sample_report());
    assert!(text.contains("✗ cdn.cloudflare.com/gone.js [depth 1] Failed to fetch"));
}

#[test]
fn test_text_report_cloud_section() {
    let text = generate_text_report(&sample_report());
    let section = text.split("CLOUD HOSTED").nth(1).unwrap();

    let assets = section.find("assets.aws.dev").unwrap();
    let bucket = section.find("bucket.s3.amazonaws.com").unwrap();
    assert!(assets < bucket);
}

#[test]
fn test_text_report_without_cloud_hosts_has_no_section() {
    let text = generate_text_report(&page("example.com", 0));
    assert!(!text.contains("CLOUD HOSTED"));
    assert!(!text.contains("Pages failed"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&sample_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let report = &value["report"];
    assert_eq!(report["metadata"]["generator"], "Gleaner");
    assert_eq!(report["metadata"]["format"], "json");
    assert!(report["metadata"]["generated_at"].is_string());
    assert_eq!(report["summary"]["pages_scraped"], 3);
    assert_eq!(report["cloud_hosts"][0], "assets.aws.dev");
    assert_eq!(report["root"]["target"], "example.com");
    assert_eq!(report["root"]["discovered_urls"][0]["follow"], true);
    assert_eq!(report["root"]["children"][1]["depth"], 1);
    assert!(report["root"]["children"][1]["error"].is_string());
    assert!(report["root"]["children"][0].get("error").is_none());
}

#[test]
fn test_generate_report_dispatches_on_format() {
    let report = sample_report();

    let text = generate_report(&report, ReportFormat::Text).unwrap();
    assert!(text.contains("GLEANER SCRAPE REPORT"));

    let json = generate_report(&report, ReportFormat::Json).unwrap();
    assert!(json.trim_start().starts_with('{'));
}

// ============================================================================
// Save Tests
// ============================================================================

#[test]
fn test_save_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.txt");

    save_report("hello report", &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello report");
}

#[test]
fn test_save_report_missing_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("report.txt");
    assert!(save_report("x", &path).is_err());
}
