use log;
use serde::Serialize;

/// Something that happened to one path during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AggregationEvent {
    Included { path: String },
    Skipped { path: String, reason: String },
    Pruned { path: String, reason: String },
    ReadFailed { path: String, error: String },
    Written { path: String, bytes: usize },
}

impl AggregationEvent {
    pub fn path(&self) -> &str {
        match self {
            AggregationEvent::Included { path }
            | AggregationEvent::Skipped { path, .. }
            | AggregationEvent::Pruned { path, .. }
            | AggregationEvent::ReadFailed { path, .. }
            | AggregationEvent::Written { path, .. } => path,
        }
    }
}

/// Receives events from the aggregator. The core reports exclusively through
/// this trait and never touches a global logger.
pub trait ReportSink {
    fn record(&mut self, event: AggregationEvent);
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn record(&mut self, event: AggregationEvent) {
        (**self).record(event);
    }
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn record(&mut self, event: AggregationEvent) {
        match event {
            AggregationEvent::Included { path } => log::debug!("Including: {}", path),
            AggregationEvent::Skipped { path, reason } => {
                log::trace!("Skipping {}: {}", path, reason)
            }
            AggregationEvent::Pruned { path, reason } => {
                log::debug!("Pruning directory {}: {}", path, reason)
            }
            AggregationEvent::ReadFailed { path, error } => {
                log::warn!("Error processing file {}: {}", path, error)
            }
            AggregationEvent::Written { path, bytes } => {
                log::info!("Wrote {} bytes to {}", bytes, path)
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn record(&mut self, _event: AggregationEvent) {}
}

/// Keeps every event in memory, in the order recorded.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub events: Vec<AggregationEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn included_paths(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| matches!(e, AggregationEvent::Included { .. }))
            .map(AggregationEvent::path)
            .collect()
    }

    pub fn pruned_paths(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| matches!(e, AggregationEvent::Pruned { .. }))
            .map(AggregationEvent::path)
            .collect()
    }

    pub fn skip_reason(&self, path: &str) -> Option<&str> {
        self.events.iter().find_map(|e| match e {
            AggregationEvent::Skipped { path: p, reason } if p == path => Some(reason.as_str()),
            _ => None,
        })
    }

    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AggregationEvent::ReadFailed { path, error } => {
                    Some((path.as_str(), error.as_str()))
                }
                _ => None,
            })
            .collect()
    }
}

impl ReportSink for MemorySink {
    fn record(&mut self, event: AggregationEvent) {
        self.events.push(event);
    }
}
