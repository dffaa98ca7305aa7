use crate::config::RuleSet;
use crate::error::{AppError, Result};
use crate::filter::{self, FileCandidate};
use crate::output_formats::render_records;
use crate::report::{AggregationEvent, ReportSink};
use crate::strip;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One included file, with comments already stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub relative_path: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    pub included: usize,
    /// Files not included, whether filtered out or unreadable.
    pub skipped: usize,
    /// Unreadable or undecodable entries; also counted in `skipped`.
    pub errored: usize,
    pub pruned_dirs: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    pub records: Vec<FileRecord>,
    pub stats: AggregationStats,
    /// Delimiter and content for every record, concatenated in traversal order.
    pub rendered: String,
}

/// Walks a project once and collects the selected, cleaned files.
///
/// `run` consumes the aggregator, so nothing carries over between runs.
pub struct Aggregator<'a, S: ReportSink> {
    rules: &'a RuleSet,
    sink: S,
    skip_paths: Vec<PathBuf>,
    records: Vec<FileRecord>,
    stats: AggregationStats,
}

impl<'a, S: ReportSink> Aggregator<'a, S> {
    pub fn new(rules: &'a RuleSet, sink: S) -> Self {
        Self {
            rules,
            sink,
            skip_paths: Vec::new(),
            records: Vec::new(),
            stats: AggregationStats::default(),
        }
    }

    /// Never aggregate `path`, even if the rules would select it. Used to
    /// keep the output file out of its own input.
    pub fn skip_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip_paths.push(path.into());
        self
    }

    pub fn run(mut self, project_root: &Path) -> Result<AggregationResult> {
        if !project_root.is_dir() {
            return Err(AppError::ProjectRoot(format!(
                "'{}' is not a directory",
                project_root.display()
            )));
        }
        let root = project_root.canonicalize().map_err(|e| {
            AppError::ProjectRoot(format!(
                "Failed to canonicalize project root '{}': {}",
                project_root.display(),
                e
            ))
        })?;

        self.traverse(&root);
        let rendered = render_records(&self.records, self.rules.delimiter());

        Ok(AggregationResult {
            records: self.records,
            stats: self.stats,
            rendered,
        })
    }

    fn traverse(&mut self, root: &Path) {
        let mut walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry_result) = walker.next() {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .and_then(|p| pathdiff::diff_paths(p, root))
                        .map(|p| filter::normalize_relative_path(&p))
                        .unwrap_or_default();
                    self.fail(path, AppError::from(e));
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let file_type = entry.file_type();
            let is_dir = file_type.is_dir();
            let Some(candidate) = FileCandidate::new(root, path, is_dir) else {
                continue;
            };

            if is_dir {
                let decision = filter::decide(&candidate, self.rules);
                if !decision.include {
                    walker.skip_current_dir();
                    self.stats.pruned_dirs += 1;
                    self.sink.record(AggregationEvent::Pruned {
                        path: candidate.relative_path,
                        reason: decision.reason.unwrap_or_default(),
                    });
                }
                continue;
            }

            if file_type.is_symlink() && !path.is_file() {
                self.skip(candidate.relative_path, "symbolic link not followed".to_string());
                continue;
            }

            if self.skip_paths.iter().any(|p| p == path) {
                self.skip(candidate.relative_path, "output file".to_string());
                continue;
            }

            let decision = filter::decide(&candidate, self.rules);
            if !decision.include {
                self.skip(candidate.relative_path, decision.reason.unwrap_or_default());
                continue;
            }

            self.include(candidate);
        }
    }

    fn include(&mut self, candidate: FileCandidate) {
        let content = match read_text(&candidate.absolute_path) {
            Ok(content) => content,
            Err(e) => {
                self.stats.skipped += 1;
                self.fail(candidate.relative_path, e);
                return;
            }
        };
        let cleaned = strip::strip(&content, candidate.extension.as_deref(), self.rules);

        self.stats.included += 1;
        self.sink.record(AggregationEvent::Included {
            path: candidate.relative_path.clone(),
        });
        self.records.push(FileRecord {
            relative_path: candidate.relative_path,
            content: cleaned.into_owned(),
        });
    }

    fn skip(&mut self, path: String, reason: String) {
        self.stats.skipped += 1;
        self.sink.record(AggregationEvent::Skipped { path, reason });
    }

    fn fail(&mut self, path: String, error: AppError) {
        self.stats.errored += 1;
        self.sink.record(AggregationEvent::ReadFailed {
            path,
            error: error.to_string(),
        });
    }
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    String::from_utf8(bytes).map_err(|_| AppError::Decode {
        path: path.to_path_buf(),
    })
}

/// Traverses `project_root` and renders the output stream in memory.
pub fn run<S: ReportSink>(
    project_root: &Path,
    rules: &RuleSet,
    sink: S,
) -> Result<AggregationResult> {
    Aggregator::new(rules, sink).run(project_root)
}

/// Runs the aggregation and writes the rendered stream to `output_path`.
///
/// Nothing is written unless traversal succeeds; the file is written in a
/// single call once all content is in memory.
pub fn aggregate<S: ReportSink>(
    project_root: &Path,
    output_path: &Path,
    rules: &RuleSet,
    mut sink: S,
) -> Result<AggregationResult> {
    let mut aggregator = Aggregator::new(rules, &mut sink);
    if let Some(resolved) = resolve_existing_output(output_path) {
        aggregator = aggregator.skip_path(resolved);
    }
    let result = aggregator.run(project_root)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(output_path, result.rendered.as_bytes()).map_err(|e| AppError::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    sink.record(AggregationEvent::Written {
        path: output_path.display().to_string(),
        bytes: result.rendered.len(),
    });
    Ok(result)
}

/// Canonical form of the output path, if its directory already exists.
fn resolve_existing_output(output_path: &Path) -> Option<PathBuf> {
    let file_name = output_path.file_name()?;
    let parent = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    parent.canonicalize().ok().map(|p| p.join(file_name))
}
