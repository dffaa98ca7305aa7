use crate::error::{AppError, Result};
use crate::output_formats::{DEFAULT_DELIMITER, get_default_rules};
use indexmap::IndexMap;
use log;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const DEFAULT_CONFIG_FILENAME: &str = "config.json";
pub const FILE_PATH_PLACEHOLDER: &str = "{file_path}";

/// User-supplied configuration. Every field is optional; anything left out
/// falls back to the built-in rules when merged into a [`RuleSet`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_patterns: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormatConfig>,
    /// Replace the accumulated include/exclude lists instead of appending.
    #[serde(default, skip_serializing_if = "is_false")]
    pub replace_patterns: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputFormatConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("toml") => ConfigFormat::Toml,
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

impl ConfigOverrides {
    pub fn parse(content: &str, format: ConfigFormat) -> std::result::Result<Self, String> {
        match format {
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Yaml => serde_yml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Loads overrides from `config_path`. A missing file is not an error and
    /// yields `None`, so the caller runs on defaults.
    pub fn load_from_path(config_path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!(
                    "Configuration file not found at {}. Using default settings.",
                    config_path.display()
                );
                return Ok(None);
            }
            Err(e) => {
                return Err(AppError::ConfigParse {
                    path: config_path.to_path_buf(),
                    message: format!("could not be read: {}", e),
                });
            }
        };
        log::info!("Loading configuration from: {}", config_path.display());
        let format = ConfigFormat::from_path(config_path);
        Self::parse(&content, format)
            .map(Some)
            .map_err(|message| AppError::ConfigParse {
                path: config_path.to_path_buf(),
                message,
            })
    }
}

/// The immutable rules governing one run: which paths are selected, how
/// comments are stripped per extension, and how each file is delimited.
#[derive(Debug, Clone)]
pub struct RuleSet {
    include_patterns: Vec<Regex>,
    exclude_patterns: Vec<Regex>,
    comment_prefixes: IndexMap<String, String>,
    delimiter: String,
}

#[derive(Debug, Default)]
struct RuleSource {
    include: Vec<String>,
    exclude: Vec<String>,
    comments: IndexMap<String, String>,
    delimiter: Option<String>,
}

impl RuleSource {
    fn apply(&mut self, layer: &ConfigOverrides) -> Result<()> {
        if layer.replace_patterns {
            self.include.clear();
            self.exclude.clear();
        }
        if let Some(include) = &layer.include_patterns {
            self.include.extend(include.iter().cloned());
        }
        if let Some(exclude) = &layer.exclude_patterns {
            self.exclude.extend(exclude.iter().cloned());
        }
        if let Some(comments) = &layer.comment_patterns {
            for (extension, prefix) in comments {
                if prefix.is_empty() {
                    return Err(AppError::Config(format!(
                        "Empty comment prefix for extension '{}'",
                        extension
                    )));
                }
                self.comments
                    .insert(normalize_extension_key(extension)?, prefix.clone());
            }
        }
        if let Some(delimiter) = layer
            .output_format
            .as_ref()
            .and_then(|f| f.delimiter.as_ref())
        {
            if !delimiter.contains(FILE_PATH_PLACEHOLDER) {
                return Err(AppError::Config(format!(
                    "Output delimiter {:?} is missing the {} placeholder",
                    delimiter, FILE_PATH_PLACEHOLDER
                )));
            }
            self.delimiter = Some(delimiter.clone());
        }
        Ok(())
    }
}

/// Lowercases an extension key and gives it a leading dot (`"PY"` → `".py"`).
pub fn normalize_extension_key(extension: &str) -> Result<String> {
    let trimmed = extension.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() {
        return Err(AppError::Config(format!(
            "Invalid comment pattern extension '{}'",
            extension
        )));
    }
    Ok(format!(".{}", bare.to_lowercase()))
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| AppError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

impl RuleSet {
    /// The built-in rules with no user overrides applied.
    pub fn defaults() -> Result<Self> {
        Self::merge(std::iter::empty::<&ConfigOverrides>())
    }

    pub fn from_overrides(overrides: Option<&ConfigOverrides>) -> Result<Self> {
        Self::merge(overrides)
    }

    /// Builds a rule set from the built-in defaults followed by `layers`, in
    /// order. For each layer:
    ///
    /// * include/exclude patterns are appended after everything before them,
    ///   unless the layer sets `replace_patterns`, which discards the
    ///   accumulated lists first;
    /// * comment prefixes override earlier entries per extension;
    /// * a delimiter, if given, replaces the earlier one.
    pub fn merge<'a, I>(layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ConfigOverrides>,
    {
        let mut source = RuleSource::default();
        source.apply(get_default_rules())?;
        for layer in layers {
            source.apply(layer)?;
        }

        Ok(RuleSet {
            include_patterns: compile_patterns(&source.include)?,
            exclude_patterns: compile_patterns(&source.exclude)?,
            comment_prefixes: source.comments,
            delimiter: source
                .delimiter
                .unwrap_or_else(|| DEFAULT_DELIMITER.to_string()),
        })
    }

    pub fn include_patterns(&self) -> &[Regex] {
        &self.include_patterns
    }

    pub fn exclude_patterns(&self) -> &[Regex] {
        &self.exclude_patterns
    }

    pub fn comment_prefixes(&self) -> &IndexMap<String, String> {
        &self.comment_prefixes
    }

    pub fn comment_prefix(&self, extension: &str) -> Option<&str> {
        self.comment_prefixes.get(extension).map(String::as_str)
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// The effective rules in config-file shape, with `replace_patterns` set
    /// so that loading the result reproduces this rule set exactly.
    pub fn to_overrides(&self) -> ConfigOverrides {
        let sources = |patterns: &[Regex]| {
            patterns
                .iter()
                .map(|r| r.as_str().to_string())
                .collect::<Vec<_>>()
        };
        ConfigOverrides {
            include_patterns: Some(sources(&self.include_patterns)),
            exclude_patterns: Some(sources(&self.exclude_patterns)),
            comment_patterns: Some(self.comment_prefixes.clone()),
            output_format: Some(OutputFormatConfig {
                delimiter: Some(self.delimiter.clone()),
            }),
            replace_patterns: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides_json(json: &str) -> ConfigOverrides {
        ConfigOverrides::parse(json, ConfigFormat::Json).unwrap()
    }

    fn pattern_sources(patterns: &[Regex]) -> Vec<&str> {
        patterns.iter().map(Regex::as_str).collect()
    }

    #[test]
    fn test_defaults_carry_builtin_rules() {
        let rules = RuleSet::defaults().unwrap();
        assert!(pattern_sources(rules.include_patterns()).contains(&r"\.py$"));
        assert!(pattern_sources(rules.exclude_patterns()).contains(&"__pycache__"));
        assert_eq!(rules.comment_prefix(".js"), Some("//"));
        assert_eq!(rules.delimiter(), DEFAULT_DELIMITER);
    }

    #[test]
    fn test_user_patterns_are_appended() {
        let user = overrides_json(r#"{"include_patterns": ["\\.rs$"], "exclude_patterns": ["target"]}"#);
        let rules = RuleSet::from_overrides(Some(&user)).unwrap();
        let include = pattern_sources(rules.include_patterns());
        assert_eq!(include.first(), Some(&r"\.py$"));
        assert_eq!(include.last(), Some(&r"\.rs$"));
        assert_eq!(pattern_sources(rules.exclude_patterns()).last(), Some(&"target"));
    }

    #[test]
    fn test_replace_patterns_discards_defaults() {
        let user = overrides_json(
            r#"{"include_patterns": ["\\.rs$"], "replace_patterns": true}"#,
        );
        let rules = RuleSet::from_overrides(Some(&user)).unwrap();
        assert_eq!(pattern_sources(rules.include_patterns()), vec![r"\.rs$"]);
        assert!(rules.exclude_patterns().is_empty());
        // Comment prefixes are still merged per key.
        assert_eq!(rules.comment_prefix(".py"), Some("#"));
    }

    #[test]
    fn test_comment_patterns_override_per_key() {
        let user = overrides_json(r#"{"comment_patterns": {".py": ";;", "RS": "//"}}"#);
        let rules = RuleSet::from_overrides(Some(&user)).unwrap();
        assert_eq!(rules.comment_prefix(".py"), Some(";;"));
        assert_eq!(rules.comment_prefix(".rs"), Some("//"));
        assert_eq!(rules.comment_prefix(".js"), Some("//"));
    }

    #[test]
    fn test_missing_delimiter_falls_back() {
        let user = overrides_json(r#"{"output_format": {}}"#);
        let rules = RuleSet::from_overrides(Some(&user)).unwrap();
        assert_eq!(rules.delimiter(), DEFAULT_DELIMITER);
    }

    #[test]
    fn test_custom_delimiter() {
        let user = overrides_json(r#"{"output_format": {"delimiter": "--- {file_path} ---\n"}}"#);
        let rules = RuleSet::from_overrides(Some(&user)).unwrap();
        assert_eq!(rules.delimiter(), "--- {file_path} ---\n");
    }

    #[test]
    fn test_delimiter_without_placeholder_is_config_error() {
        let user = overrides_json(r#"{"output_format": {"delimiter": "---\n"}}"#);
        let err = RuleSet::from_overrides(Some(&user)).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let user = overrides_json(r#"{"exclude_patterns": ["(unclosed"]}"#);
        let err = RuleSet::from_overrides(Some(&user)).unwrap_err();
        assert!(matches!(err, AppError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_empty_comment_prefix_rejected() {
        let user = overrides_json(r#"{"comment_patterns": {".py": ""}}"#);
        assert!(RuleSet::from_overrides(Some(&user)).unwrap_err().is_config_error());
    }

    #[test]
    fn test_non_mapping_and_unknown_keys_rejected() {
        assert!(ConfigOverrides::parse("[1, 2]", ConfigFormat::Json).is_err());
        assert!(ConfigOverrides::parse(r#"{"bogus": 1}"#, ConfigFormat::Json).is_err());
        assert!(ConfigOverrides::parse(r#"{"include_patterns": "x"}"#, ConfigFormat::Json).is_err());
    }

    #[test]
    fn test_layers_apply_in_order() {
        let first = overrides_json(r##"{"include_patterns": ["a"], "comment_patterns": {".x": "#"}}"##);
        let second = overrides_json(r#"{"include_patterns": ["b"], "comment_patterns": {".x": "--"}}"#);
        let rules = RuleSet::merge([&first, &second]).unwrap();
        let include = pattern_sources(rules.include_patterns());
        assert_eq!(&include[include.len() - 2..], &["a", "b"]);
        assert_eq!(rules.comment_prefix(".x"), Some("--"));
    }

    #[test]
    fn test_to_overrides_reproduces_rule_set() {
        let user = overrides_json(r#"{"include_patterns": ["\\.rs$"], "comment_patterns": {".rs": "//"}}"#);
        let rules = RuleSet::from_overrides(Some(&user)).unwrap();
        let rebuilt = RuleSet::from_overrides(Some(&rules.to_overrides())).unwrap();
        assert_eq!(
            pattern_sources(rebuilt.include_patterns()),
            pattern_sources(rules.include_patterns())
        );
        assert_eq!(
            pattern_sources(rebuilt.exclude_patterns()),
            pattern_sources(rules.exclude_patterns())
        );
        assert_eq!(rebuilt.comment_prefixes(), rules.comment_prefixes());
    }

    #[test]
    fn test_toml_and_yaml_formats() {
        let toml_src = "include_patterns = ['\\.rs$']\n[comment_patterns]\n'.rs' = '//'\n";
        let parsed = ConfigOverrides::parse(toml_src, ConfigFormat::Toml).unwrap();
        assert_eq!(parsed.include_patterns, Some(vec![r"\.rs$".to_string()]));

        let yaml_src = "exclude_patterns:\n  - target\noutput_format:\n  delimiter: \"# {file_path}\\n\"\n";
        let parsed = ConfigOverrides::parse(yaml_src, ConfigFormat::Yaml).unwrap();
        assert_eq!(parsed.exclude_patterns, Some(vec!["target".to_string()]));
        assert_eq!(
            parsed.output_format.and_then(|f| f.delimiter),
            Some("# {file_path}\n".to_string())
        );
    }

    #[test]
    fn test_load_missing_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ConfigOverrides::load_from_path(&dir.path().join("config.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = ConfigOverrides::load_from_path(&path).unwrap_err();
        assert!(matches!(err, AppError::ConfigParse { path: ref p, .. } if *p == path));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("rules.toml");
        fs::write(&toml_path, "exclude_patterns = ['target/']\n").unwrap();
        let loaded = ConfigOverrides::load_from_path(&toml_path).unwrap().unwrap();
        assert_eq!(loaded.exclude_patterns, Some(vec!["target/".to_string()]));

        let yaml_path = dir.path().join("rules.yaml");
        fs::write(&yaml_path, "include_patterns:\n  - \\.go$\n").unwrap();
        let loaded = ConfigOverrides::load_from_path(&yaml_path).unwrap().unwrap();
        assert_eq!(loaded.include_patterns, Some(vec![r"\.go$".to_string()]));
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("config.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("rules.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("rules.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Json);
    }

    #[test]
    fn test_normalize_extension_key() {
        assert_eq!(normalize_extension_key("PY").unwrap(), ".py");
        assert_eq!(normalize_extension_key(".Js").unwrap(), ".js");
        assert!(normalize_extension_key(".").is_err());
    }
}
