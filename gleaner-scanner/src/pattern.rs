//! Pattern grammar for hosts, URLs and IPv4 addresses in raw page text.
//!
//! Each fragment is a plain regex string so it can be tested on its own;
//! the composed expressions are compiled once on first use.
//!
//! A hostname only counts when it directly follows one of `"`, `'` or `/`,
//! which is how hosts appear in markup and script (`src="cdn.example.com`,
//! `//cdn.example.com`). A URL is a hostname optionally followed by a path
//! that ends in a file extension and an optional query string.

use regex::Regex;
use std::sync::LazyLock;

/// Characters a hostname must directly follow.
pub const MARKER: &str = r#"["'/]"#;

/// Dash-joined alphanumeric labels, each followed by a dot, ending in an
/// alphabetic label (the candidate TLD).
pub const HOSTNAME_BODY: &str = r"([a-zA-Z0-9]+(-[a-zA-Z0-9]+)*\.)+[a-zA-Z]+";

/// Zero or more path segments ending in a lowercase file extension.
pub const PATH_SUFFIX: &str = r"(/[a-zA-Z0-9\-_&=.%?/]*)*\.[a-z]+";

/// Optional query string after the file extension.
pub const QUERY_SUFFIX: &str = r"(\?[a-zA-Z0-9\-_&=.%?]*)?";

/// A single dotted-quad octet, 0 to 255.
pub const IPV4_OCTET: &str = r"(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

/// Trailing `.label` of a hostname, capture group 1 is the label.
pub const TLD_SUFFIX: &str = r"\.([a-zA-Z]+(-[a-zA-Z]+)*)$";

/// Script resource ending: `.js` at the end of the URL or before a query.
pub const SCRIPT_SUFFIX: &str = r"\.js(\?.*)?$";

pub fn hostname_pattern() -> String {
    format!("{MARKER}{HOSTNAME_BODY}")
}

pub fn url_pattern() -> String {
    format!("{}({PATH_SUFFIX}{QUERY_SUFFIX})?", hostname_pattern())
}

pub fn ipv4_pattern() -> String {
    format!(r"{IPV4_OCTET}(\.{IPV4_OCTET}){{3}}")
}

pub static HOSTNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&hostname_pattern()).expect("hardcoded regex pattern is valid"));

pub static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&url_pattern()).expect("hardcoded regex pattern is valid"));

pub static IPV4_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&ipv4_pattern()).expect("hardcoded regex pattern is valid"));

pub static TLD_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TLD_SUFFIX).expect("hardcoded regex pattern is valid"));

pub static SCRIPT_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SCRIPT_SUFFIX).expect("hardcoded regex pattern is valid"));

/// Returns the TLD label of a hostname (without the dot), if it has one.
pub fn tld_of(hostname: &str) -> Option<&str> {
    TLD_SUFFIX_REGEX
        .captures(hostname)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
