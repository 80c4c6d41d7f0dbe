//! Content Processor: read, decode, sanitize and validate discovered files

use crate::config::ProcessorConfig;
use crate::encoding::decode;
use crate::error::IngestError;
use crate::sanitize::{sanitize, truncate_at_line};
use crate::stats::{ProcessingStats, SkipReason, SkippedFile};
use futures::stream::{self, StreamExt};
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use worklog_domain::{Cancellation, Diagnostic, DiscoveredFile, ProcessedContent, ProgressTracker};

/// Turns discovered files into sanitized [`ProcessedContent`]
///
/// Files are read on tokio's blocking pool, at most
/// [`ProcessorConfig::workers`] at a time. Every per-file problem is local:
/// the file is recorded in [`ProcessingStats::skipped`] and the batch goes on.
#[derive(Debug, Clone)]
pub struct ContentProcessor {
    config: Arc<ProcessorConfig>,
}

impl ContentProcessor {
    /// Create a processor; fails when the configuration is invalid
    pub fn new(config: ProcessorConfig) -> Result<Self, IngestError> {
        config.validate().map_err(IngestError::Config)?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process one file synchronously
    pub fn process_file(&self, file: &DiscoveredFile) -> Result<ProcessedContent, SkipReason> {
        read_and_clean(file, &self.config)
    }

    /// Process a batch of files
    ///
    /// Advances `progress` once per finished file. On cancellation no new
    /// files are started and the partial result is returned with
    /// `stats.cancelled` set. Returned content is sorted by date regardless
    /// of completion order.
    pub async fn process(
        &self,
        files: &[DiscoveredFile],
        progress: &ProgressTracker,
        cancel: &Cancellation,
    ) -> (Vec<ProcessedContent>, ProcessingStats) {
        let started = Instant::now();
        let mut stats = ProcessingStats {
            total: files.len(),
            ..Default::default()
        };
        let mut contents = Vec::with_capacity(files.len());

        let mut outcomes = stream::iter(files.iter().cloned())
            .map(|file| {
                let config = Arc::clone(&self.config);
                async move {
                    let path = file.path.clone();
                    let date = file.date;
                    let result = tokio::task::spawn_blocking(move || read_and_clean(&file, &config))
                        .await
                        .unwrap_or_else(|e| Err(SkipReason::Io(format!("worker failed: {}", e))));
                    (path, date, result)
                }
            })
            .buffer_unordered(self.config.workers);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(processed = stats.processed, "Processing cancelled");
                    stats.cancelled = true;
                    break;
                }
                next = outcomes.next() => next,
            };
            let Some((path, date, result)) = next else {
                break;
            };

            match result {
                Ok(content) => {
                    stats.processed += 1;
                    stats.total_bytes += content.size_bytes;
                    stats.total_words += content.word_count;
                    if !content.diagnostics.is_empty() {
                        stats.with_diagnostics += 1;
                    }
                    if content
                        .diagnostics
                        .iter()
                        .any(|d| matches!(d, Diagnostic::Truncated { .. }))
                    {
                        stats.truncated += 1;
                    }
                    debug!(date = %date, words = content.word_count, encoding = %content.encoding, "Processed worklog");
                    contents.push(content);
                    progress.advance();
                }
                Err(reason) => {
                    if reason.is_failure() {
                        warn!(date = %date, path = %path.display(), %reason, "Worklog failed");
                        progress.advance_with_error(format!("{}: {}", date, reason));
                    } else {
                        info!(date = %date, %reason, "Worklog skipped");
                        progress.advance();
                    }
                    stats.skipped.push(SkippedFile { path, date, reason });
                }
            }
        }

        contents.sort_by_key(|c| c.date);
        stats.skipped.sort_by_key(|s| s.date);
        stats.elapsed = started.elapsed();
        info!("{}", stats.summary());
        (contents, stats)
    }
}

fn read_and_clean(file: &DiscoveredFile, config: &ProcessorConfig) -> Result<ProcessedContent, SkipReason> {
    let size = fs::metadata(&file.path)
        .map_err(|e| SkipReason::Io(e.to_string()))?
        .len();
    // Checked before reading so oversized files never enter memory
    if size > config.max_file_bytes {
        return Err(SkipReason::Oversized {
            size,
            limit: config.max_file_bytes,
        });
    }

    let bytes = fs::read(&file.path).map_err(|e| SkipReason::Io(e.to_string()))?;
    let decoded = decode(&bytes, config.min_encoding_confidence, &config.fallback_encodings)
        .map_err(|e| SkipReason::Encoding(e.to_string()))?;
    let mut diagnostics = decoded.diagnostics;

    let cleaned = sanitize(&decoded.text);
    if cleaned.is_empty() {
        return Err(SkipReason::Empty);
    }
    if cleaned.trim_end() != decoded.text.trim_end() {
        diagnostics.push(Diagnostic::Sanitized);
    }

    let (kept, truncated) = truncate_at_line(&cleaned, config.max_content_chars);
    if truncated {
        diagnostics.push(Diagnostic::Truncated {
            original_chars: cleaned.chars().count(),
            kept_chars: kept.chars().count(),
        });
    }
    let text = kept.to_string();

    Ok(ProcessedContent {
        path: file.path.clone(),
        date: file.date,
        word_count: text.split_whitespace().count(),
        line_count: text.lines().count(),
        text,
        encoding: decoded.encoding.to_string(),
        size_bytes: size,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use worklog_domain::{cancellation, NoopObserver, PathResolver, Stage};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn write(resolver: &PathResolver, day: u32, bytes: &[u8]) -> DiscoveredFile {
        let path = resolver.expected_path(d(day));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, bytes).unwrap();
        DiscoveredFile { path, date: d(day) }
    }

    fn tracker() -> ProgressTracker {
        ProgressTracker::new(Arc::new(NoopObserver))
    }

    #[test]
    fn test_process_file_counts() {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path());
        let file = write(&resolver, 1, b"# Monday\n- fixed login bug\n- reviewed PR\n");

        let processor = ContentProcessor::new(ProcessorConfig::default()).unwrap();
        let content = processor.process_file(&file).unwrap();
        assert_eq!(content.line_count, 3);
        assert_eq!(content.word_count, 9);
        assert_eq!(content.encoding, "UTF-8");
        assert!(content.diagnostics.is_empty());
    }

    #[test]
    fn test_sanitized_diagnostic() {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path());
        let file = write(&resolver, 1, b"line one   \r\n\r\n\r\n\r\n\r\nline two");

        let processor = ContentProcessor::new(ProcessorConfig::default()).unwrap();
        let content = processor.process_file(&file).unwrap();
        assert_eq!(content.text, "line one\n\n\nline two\n");
        assert_eq!(content.diagnostics, vec![Diagnostic::Sanitized]);
    }

    #[test]
    fn test_truncation_diagnostic() {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path());
        let file = write(&resolver, 1, b"aaaa\nbbbb\ncccc\n");

        let config = ProcessorConfig {
            max_content_chars: 12,
            ..ProcessorConfig::default()
        };
        let content = ContentProcessor::new(config).unwrap().process_file(&file).unwrap();
        assert_eq!(content.text, "aaaa\nbbbb\n");
        assert_eq!(
            content.diagnostics,
            vec![Diagnostic::Truncated {
                original_chars: 15,
                kept_chars: 10
            }]
        );
    }

    #[test]
    fn test_oversized_not_read() {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path());
        let file = write(&resolver, 1, &[b'x'; 64]);

        let config = ProcessorConfig {
            max_file_bytes: 16,
            ..ProcessorConfig::default()
        };
        let err = ContentProcessor::new(config).unwrap().process_file(&file).unwrap_err();
        assert_eq!(err, SkipReason::Oversized { size: 64, limit: 16 });
    }

    #[tokio::test]
    async fn test_batch_partial_failure_and_ordering() {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path());
        let files = vec![
            write(&resolver, 5, b"friday notes"),
            write(&resolver, 1, b"monday notes"),
            write(&resolver, 2, b"  \n\t\n"),
            write(&resolver, 3, b"bin\x00\x00\x9f"),
            write(&resolver, 4, b"caf\xe9 with Ren\xe9e"),
        ];

        let processor = ContentProcessor::new(ProcessorConfig {
            workers: 2,
            ..ProcessorConfig::default()
        })
        .unwrap();
        let progress = tracker();
        progress.begin_stage(Stage::Processing, files.len());
        let (contents, stats) = processor.process(&files, &progress, &Cancellation::never()).await;

        let dates: Vec<_> = contents.iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![d(1), d(4), d(5)]);
        assert_eq!(contents[1].encoding, "windows-1252");
        assert_eq!(contents[1].text, "café with Renée\n");

        assert_eq!(stats.total, 5);
        assert_eq!(stats.processed, 3);
        assert_eq!(stats.empty(), 1);
        assert_eq!(stats.failed(), 1);
        assert_eq!(stats.skipped[0].date, d(2));
        assert!(!stats.cancelled);

        let snap = progress.snapshot();
        assert_eq!(snap.processed, 5);
        assert_eq!(snap.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_failure() {
        let dir = TempDir::new().unwrap();
        let file = DiscoveredFile {
            path: dir.path().join("gone.txt"),
            date: d(1),
        };
        let processor = ContentProcessor::new(ProcessorConfig::default()).unwrap();
        let (contents, stats) = processor.process(&[file], &tracker(), &Cancellation::never()).await;
        assert!(contents.is_empty());
        assert!(matches!(stats.skipped[0].reason, SkipReason::Io(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let dir = TempDir::new().unwrap();
        let resolver = PathResolver::new(dir.path());
        let files = vec![write(&resolver, 1, b"a"), write(&resolver, 2, b"b")];

        let (handle, signal) = cancellation();
        handle.cancel();
        let processor = ContentProcessor::new(ProcessorConfig::default()).unwrap();
        let (contents, stats) = processor.process(&files, &tracker(), &signal).await;
        assert!(contents.is_empty());
        assert!(stats.cancelled);
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ProcessorConfig {
            workers: 0,
            ..ProcessorConfig::default()
        };
        assert!(matches!(ContentProcessor::new(config), Err(IngestError::Config(_))));
    }
}
