// src/utils/sanitize.rs

use regex::Regex;
use std::sync::OnceLock;

static NON_PRINTABLE: OnceLock<Regex> = OnceLock::new();

/// Strips characters outside the printable ASCII range (0x20-0x7E) and
/// trims surrounding whitespace.
///
/// Bank files tend to be spreadsheet exports carrying mojibake and other
/// encoding artifacts; those must never reach the user.
pub fn sanitize(text: &str) -> String {
    let re = NON_PRINTABLE
        .get_or_init(|| Regex::new(r"[^\x20-\x7E]").expect("invalid sanitize pattern"));
    re.replace_all(text, "").trim().to_string()
}
