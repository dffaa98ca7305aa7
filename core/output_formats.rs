use crate::config::{ConfigOverrides, FILE_PATH_PLACEHOLDER};
use crate::error::{AppError, Result};
use crate::gather::FileRecord;
use once_cell::sync::Lazy;

pub const DEFAULT_DELIMITER: &str = "\n<<<FILENAME:{file_path}>>>\n";

static DEFAULT_RULES_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../data/default_rules.json"));

static DEFAULT_RULES: Lazy<ConfigOverrides> = Lazy::new(|| {
    serde_json::from_str(DEFAULT_RULES_JSON)
        .expect("Failed to parse embedded data/default_rules.json")
});

/// Built-in rules every run starts from before user overrides are layered on.
pub fn get_default_rules() -> &'static ConfigOverrides {
    &DEFAULT_RULES
}

/// The built-in rules as pretty JSON, in the same shape a user config file takes.
pub fn default_config_json() -> Result<String> {
    serde_json::to_string_pretty(get_default_rules()).map_err(AppError::JsonSerialize)
}

pub fn render_delimiter(template: &str, relative_path: &str) -> String {
    template.replace(FILE_PATH_PLACEHOLDER, relative_path)
}

/// Concatenates each record as its rendered delimiter followed by its cleaned
/// content, in record order.
pub fn render_records(records: &[FileRecord], delimiter_template: &str) -> String {
    let capacity = records
        .iter()
        .map(|r| delimiter_template.len() + r.relative_path.len() + r.content.len())
        .sum();
    let mut rendered = String::with_capacity(capacity);
    for record in records {
        rendered.push_str(&render_delimiter(delimiter_template, &record.relative_path));
        rendered.push_str(&record.content);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, content: &str) -> FileRecord {
        FileRecord {
            relative_path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_default_delimiter_form() {
        assert_eq!(
            render_delimiter(DEFAULT_DELIMITER, "src/main.py"),
            "\n<<<FILENAME:src/main.py>>>\n"
        );
    }

    #[test]
    fn test_embedded_defaults_match_builtin_delimiter() {
        let defaults = get_default_rules();
        let delimiter = defaults
            .output_format
            .as_ref()
            .and_then(|f| f.delimiter.as_deref());
        assert_eq!(delimiter, Some(DEFAULT_DELIMITER));
        assert_eq!(
            defaults.comment_patterns.as_ref().and_then(|c| c.get(".py")),
            Some(&"#".to_string())
        );
    }

    #[test]
    fn test_render_records_in_order() {
        let records = vec![record("a.py", "x = 1\n"), record("b.py", "y = 2\n")];
        assert_eq!(
            render_records(&records, "== {file_path} ==\n"),
            "== a.py ==\nx = 1\n== b.py ==\ny = 2\n"
        );
    }

    #[test]
    fn test_render_every_placeholder_occurrence() {
        let records = vec![record("lib.js", "")];
        assert_eq!(
            render_records(&records, "<{file_path}|{file_path}>"),
            "<lib.js|lib.js>"
        );
    }

    #[test]
    fn test_render_no_records_is_empty() {
        assert_eq!(render_records(&[], DEFAULT_DELIMITER), "");
    }

    #[test]
    fn test_default_config_json_parses_back() {
        let json = default_config_json().unwrap();
        let parsed: ConfigOverrides = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, get_default_rules());
    }
}
