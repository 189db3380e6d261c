// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input file watching for `--watch`.
//!
//! The parent directory is watched rather than the file, so editors that save
//! by replacing the file are still picked up. Events for other files in the
//! directory are dropped.

use crate::error::CliError;
use crate::pipeline::{Input, Pipeline};
use notify_debouncer_full::{
    new_debouncer,
    notify::{EventKind, RecommendedWatcher, RecursiveMode},
    DebounceEventResult, Debouncer, RecommendedCache,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

/// Events emitted by the watcher
#[derive(Debug, Clone, PartialEq)]
pub enum FileEvent {
    /// The file was written or replaced
    Changed(PathBuf),
    /// The file was deleted
    Deleted(PathBuf),
    /// The watcher reported an error
    Error(String),
}

/// Configuration for the watcher
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Debounce duration for events
    pub debounce_duration: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_millis(250),
        }
    }
}

/// Debounced watcher for a single file
pub struct FileWatcher {
    /// Kept alive for as long as events are wanted
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
    event_rx: Receiver<FileEvent>,
    path: PathBuf,
}

impl FileWatcher {
    /// Start watching `path`
    pub fn new(path: &Path, config: &WatchConfig) -> Result<Self, CliError> {
        let path = std::path::absolute(path).map_err(|e| CliError::io(path, e))?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| CliError::Usage(format!("cannot watch {path:?}: no parent directory")))?;
        let name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| CliError::Usage(format!("cannot watch {path:?}: not a file")))?;

        let (event_tx, event_rx) = mpsc::channel();
        let mut debouncer = new_debouncer(
            config.debounce_duration,
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    for event in events {
                        let Some(hit) = event
                            .paths
                            .iter()
                            .find(|p| p.file_name() == Some(name.as_os_str()))
                            .cloned()
                        else {
                            continue;
                        };

                        let file_event = match event.kind {
                            EventKind::Create(_) | EventKind::Modify(_) => FileEvent::Changed(hit),
                            EventKind::Remove(_) => FileEvent::Deleted(hit),
                            EventKind::Any | EventKind::Access(_) | EventKind::Other => continue,
                        };
                        let _ = event_tx.send(file_event);
                    }
                }
                Err(errors) => {
                    for error in errors {
                        let _ = event_tx.send(FileEvent::Error(error.to_string()));
                    }
                }
            },
        )?;

        debouncer.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!("Watching {:?} for changes", path);

        Ok(Self {
            _debouncer: debouncer,
            event_rx,
            path,
        })
    }

    /// The watched file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the next event; `None` once the watcher has shut down
    pub fn next_event(&self) -> Option<FileEvent> {
        self.event_rx.recv().ok()
    }

    /// Block until the file changes, coalescing any events already queued
    pub fn wait_for_change(&self) -> Option<FileEvent> {
        let mut last = self.next_event()?;
        while let Ok(event) = self.event_rx.try_recv() {
            last = event;
        }
        Some(last)
    }
}

/// Process the input once, then again after every change until the watcher stops
pub fn run(pipeline: &mut Pipeline, input: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let watcher = FileWatcher::new(input, &WatchConfig::default())?;
    let source = Input::File(watcher.path().to_path_buf());

    rebuild(pipeline, &source, output);
    while let Some(event) = watcher.wait_for_change() {
        match event {
            FileEvent::Changed(path) => {
                tracing::debug!("Input changed: {:?}", path);
                rebuild(pipeline, &source, output);
            }
            FileEvent::Deleted(path) => tracing::warn!("Input deleted: {:?}", path),
            FileEvent::Error(message) => tracing::warn!("Watcher error: {}", message),
        }
    }

    tracing::warn!("File watcher channel disconnected");
    Ok(())
}

fn rebuild(pipeline: &mut Pipeline, source: &Input, output: Option<&Path>) {
    if let Err(e) = pipeline.process(source, output) {
        tracing::error!("Rebuild failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_config_default() {
        let config = WatchConfig::default();
        assert_eq!(config.debounce_duration, Duration::from_millis(250));
    }

    #[test]
    fn test_watcher_resolves_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{}").unwrap();

        let watcher = FileWatcher::new(&path, &WatchConfig::default()).unwrap();
        assert!(watcher.path().is_absolute());
        assert_eq!(watcher.path().file_name(), path.file_name());
    }

    #[test]
    fn test_rebuild_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.json");
        let output = dir.path().join("graph.json");
        std::fs::write(&input, r#"{"a": {"b": 1}}"#).unwrap();

        let mut pipeline = Pipeline::new(&Settings::default(), true, false);
        rebuild(&mut pipeline, &Input::File(input.clone()), Some(&output));
        let first = std::fs::read_to_string(&output).unwrap();
        assert!(first.contains("\"start-a\""));

        // A failing rebuild leaves the previous output in place.
        std::fs::write(&input, "{ broken").unwrap();
        rebuild(&mut pipeline, &Input::File(input), Some(&output));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), first);
    }
}
