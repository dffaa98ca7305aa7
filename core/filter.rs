use crate::config::RuleSet;
use std::path::{Component, Path, PathBuf};

pub const NO_MATCHING_INCLUDE: &str = "no matching include pattern";

/// A path reached during traversal, described relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub absolute_path: PathBuf,
    /// Forward-slash form, relative to the project root.
    pub relative_path: String,
    /// Lowercase, including the leading dot.
    pub extension: Option<String>,
    pub is_dir: bool,
}

impl FileCandidate {
    pub fn new(project_root: &Path, absolute_path: &Path, is_dir: bool) -> Option<Self> {
        let relative = pathdiff::diff_paths(absolute_path, project_root)?;
        Some(Self {
            absolute_path: absolute_path.to_path_buf(),
            relative_path: normalize_relative_path(&relative),
            extension: if is_dir {
                None
            } else {
                extension_of(absolute_path)
            },
            is_dir,
        })
    }
}

pub fn normalize_relative_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub include: bool,
    pub reason: Option<String>,
}

impl Decision {
    fn include(reason: String) -> Self {
        Self {
            include: true,
            reason: Some(reason),
        }
    }

    fn exclude(reason: String) -> Self {
        Self {
            include: false,
            reason: Some(reason),
        }
    }
}

/// Decides whether a candidate is selected.
///
/// Patterns are searched anywhere in the relative path, not anchored. Any
/// exclude match wins over every include pattern. A file matching no include
/// pattern is excluded. Directories only consult the exclude patterns: an
/// excluded directory is pruned, any other directory is descended into.
pub fn decide(candidate: &FileCandidate, rules: &RuleSet) -> Decision {
    let path = candidate.relative_path.as_str();

    if let Some(pattern) = rules.exclude_patterns().iter().find(|p| p.is_match(path)) {
        return Decision::exclude(format!("excluded by pattern '{}'", pattern.as_str()));
    }

    if candidate.is_dir {
        return Decision {
            include: true,
            reason: None,
        };
    }

    match rules.include_patterns().iter().find(|p| p.is_match(path)) {
        Some(pattern) => Decision::include(format!("matched include pattern '{}'", pattern.as_str())),
        None => Decision::exclude(NO_MATCHING_INCLUDE.to_string()),
    }
}
