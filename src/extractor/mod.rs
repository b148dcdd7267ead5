use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

mod sort;

pub use sort::{order_urls, sort_key};

// Word classes are ASCII-only; a non-ASCII letter ends the extension.
const PUZZLE_PATH_PATTERN: &str = r"/edu\S+\.(?-u:\w)+";

fn puzzle_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PUZZLE_PATH_PATTERN).expect("puzzle path regex compiles"))
}

/// Hostname encoded in a log file name: everything after the first `_`
/// (`access_example.com` -> `example.com`), or the whole name if there is none.
pub fn hostname_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    match file_name.split_once('_') {
        Some((_, host)) => host.to_string(),
        None => file_name.to_string(),
    }
}

/// Every `/edu...` image path in `text`, in the order found, as a full URL.
pub fn extract_urls(text: &str, hostname: &str) -> Vec<String> {
    puzzle_path_re()
        .find_iter(text)
        .map(|m| format!("http://{}{}", hostname, m.as_str()))
        .collect()
}

/// Reads a log file and returns its unique puzzle URLs in display order.
/// Bytes that aren't valid UTF-8 (common in user-agent fields) are replaced,
/// not rejected.
pub fn read_urls(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read(path)
        .with_context(|| format!("Failed to read log file {}", path.display()))?;
    let text = String::from_utf8_lossy(&raw);

    let hostname = hostname_from_path(path);
    log::debug!("Using hostname {:?} for {}", hostname, path.display());

    let urls = extract_urls(&text, &hostname);
    let found = urls.len();
    let ordered = order_urls(urls);

    log::debug!(
        "Found {} puzzle paths, {} unique",
        found,
        ordered.len()
    );

    Ok(ordered)
}
