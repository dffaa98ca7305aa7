use crate::config::RuleSet;
use std::borrow::Cow;

/// Removes line comments from `content` using the prefix registered for
/// `extension`. Content for an extension without a prefix comes back
/// untouched.
pub fn strip<'a>(content: &'a str, extension: Option<&str>, rules: &RuleSet) -> Cow<'a, str> {
    match extension.and_then(|ext| rules.comment_prefix(ext)) {
        Some(prefix) => Cow::Owned(strip_line_comments(content, prefix)),
        None => Cow::Borrowed(content),
    }
}

/// Line-based removal with no lexing: a prefix inside a string literal is
/// treated as a comment all the same.
///
/// Lines starting with `prefix` (after leading whitespace) are dropped.
/// Other lines are cut at the first `prefix` and lose trailing whitespace.
/// Every kept line is terminated with `\n`.
pub fn strip_line_comments(content: &str, prefix: &str) -> String {
    let mut cleaned = String::with_capacity(content.len());
    for line in content.lines() {
        if line.trim_start().starts_with(prefix) {
            continue;
        }
        match line.find(prefix) {
            Some(idx) => cleaned.push_str(line[..idx].trim_end()),
            None => cleaned.push_str(line),
        }
        cleaned.push('\n');
    }
    cleaned
}
