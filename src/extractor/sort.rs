use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

const PUZZLE_NAME_PATTERN: &str = r"puzzle/(?-u:\w)+-((?-u:\w)+)-((?-u:\w)+)\.(?-u:\w)+";

fn puzzle_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PUZZLE_NAME_PATTERN).expect("puzzle name regex compiles"))
}

/// Ordering key for a puzzle URL: the last dash-separated word of the image
/// name (`puzzle/p-abc-xyz.jpg` -> `xyz`), or the whole URL when the name
/// doesn't have that shape.
pub fn sort_key(url: &str) -> &str {
    puzzle_name_re()
        .captures(url)
        .and_then(|caps| caps.get(2))
        .map_or(url, |m| m.as_str())
}

/// Drops duplicate URLs and sorts the rest ascending by [`sort_key`].
pub fn order_urls<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let unique: BTreeSet<String> = urls.into_iter().collect();
    let mut ordered: Vec<String> = unique.into_iter().collect();
    ordered.sort_by(|a, b| sort_key(a).cmp(sort_key(b)));
    ordered
}
