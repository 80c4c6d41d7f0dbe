//! Report Emitter: deterministic file naming and atomic writes

use crate::error::ReportError;
use crate::markdown::render_markdown;
use crate::stats::RunStats;
use chrono::{Local, NaiveDateTime};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use worklog_domain::{DateRange, Granularity, PeriodSummary};

/// Highest `-N` suffix tried before giving up on a name
const MAX_SUFFIX: u32 = 100;

/// Location and size of a written report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportResult {
    /// Final path of the report
    pub path: PathBuf,
    /// Bytes written
    pub size_bytes: u64,
}

/// Base file name (without `-N` suffix or extension) for a report
///
/// ```
/// use chrono::NaiveDate;
/// use worklog_domain::{DateRange, Granularity};
/// use worklog_report::report_stem;
///
/// let range = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
/// ).unwrap();
/// let at = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(9, 30, 5).unwrap();
/// assert_eq!(
///     report_stem(Granularity::Week, &range, at),
///     "worklog_summary_week_2024-01-01_to_2024-01-14_20240115_093005"
/// );
/// ```
pub fn report_stem(granularity: Granularity, range: &DateRange, generated_at: NaiveDateTime) -> String {
    format!(
        "worklog_summary_{}_{}_to_{}_{}",
        granularity.as_str(),
        range.start(),
        range.end(),
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Writes markdown reports into one output directory
#[derive(Debug, Clone)]
pub struct ReportEmitter {
    output_dir: PathBuf,
}

impl ReportEmitter {
    /// Create an emitter writing into `output_dir` (created on first write)
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Target directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render and write a report stamped with the current local time
    pub fn emit(
        &self,
        summaries: &[PeriodSummary],
        range: &DateRange,
        granularity: Granularity,
        stats: &RunStats,
    ) -> Result<ReportResult, ReportError> {
        self.emit_at(summaries, range, granularity, stats, Local::now().naive_local())
    }

    /// Render and write a report stamped with `generated_at`
    ///
    /// The document is written to a temporary file in the output directory
    /// and then linked into place, so readers never see a partial report. An
    /// existing file is never replaced; the name gets a `-2`, `-3`, ...
    /// suffix instead.
    pub fn emit_at(
        &self,
        summaries: &[PeriodSummary],
        range: &DateRange,
        granularity: Granularity,
        stats: &RunStats,
        generated_at: NaiveDateTime,
    ) -> Result<ReportResult, ReportError> {
        let document = render_markdown(summaries, stats, generated_at)?;
        let stem = report_stem(granularity, range, generated_at);

        std::fs::create_dir_all(&self.output_dir).map_err(|source| self.write_error(source))?;

        let mut temp = NamedTempFile::new_in(&self.output_dir).map_err(|source| self.write_error(source))?;
        temp.write_all(document.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|source| ReportError::OutputWrite {
                path: temp.path().to_path_buf(),
                source,
            })?;

        let mut suffix = 1;
        loop {
            let path = self.output_dir.join(file_name(&stem, suffix));
            match temp.persist_noclobber(&path) {
                Ok(_) => {
                    let size_bytes = document.len() as u64;
                    info!(path = %path.display(), size_bytes, "Report written");
                    return Ok(ReportResult { path, size_bytes });
                }
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists && suffix < MAX_SUFFIX => {
                    debug!(path = %path.display(), "Report name taken, trying next suffix");
                    temp = e.file;
                    suffix += 1;
                }
                Err(e) => return Err(ReportError::OutputWrite { path, source: e.error }),
            }
        }
    }

    fn write_error(&self, source: io::Error) -> ReportError {
        ReportError::OutputWrite {
            path: self.output_dir.clone(),
            source,
        }
    }
}

fn file_name(stem: &str, suffix: u32) -> String {
    if suffix <= 1 {
        format!("{}.md", stem)
    } else {
        format!("{}-{}.md", stem, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::NOTES_HEADING;
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        )
        .unwrap()
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn stats() -> RunStats {
        RunStats::new(Uuid::now_v7(), range(), Granularity::Week)
    }

    #[test]
    fn test_writes_report_and_creates_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports/nested");
        let emitter = ReportEmitter::new(&out);

        let result = emitter.emit_at(&[], &range(), Granularity::Week, &stats(), at()).unwrap();

        assert_eq!(
            result.path,
            out.join("worklog_summary_week_2024-01-01_to_2024-01-07_20240108_120000.md")
        );
        let content = std::fs::read_to_string(&result.path).unwrap();
        assert_eq!(content.len() as u64, result.size_bytes);
        assert!(content.contains(NOTES_HEADING));

        // No temporary files left behind
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn test_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let emitter = ReportEmitter::new(dir.path());

        let first = emitter.emit_at(&[], &range(), Granularity::Week, &stats(), at()).unwrap();
        let second = emitter.emit_at(&[], &range(), Granularity::Week, &stats(), at()).unwrap();
        let third = emitter.emit_at(&[], &range(), Granularity::Week, &stats(), at()).unwrap();

        assert_ne!(first.path, second.path);
        assert!(second.path.to_string_lossy().ends_with("_120000-2.md"));
        assert!(third.path.to_string_lossy().ends_with("_120000-3.md"));
        assert!(first.path.exists());
    }

    #[test]
    fn test_path_under_file_is_output_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "file").unwrap();

        let emitter = ReportEmitter::new(blocker.join("reports"));
        let err = emitter.emit_at(&[], &range(), Granularity::Week, &stats(), at()).unwrap_err();
        assert!(matches!(err, ReportError::OutputWrite { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_directory_is_output_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("reports");
        std::fs::create_dir(&out).unwrap();
        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits do not bind root
        let writable = std::fs::write(out.join(".check"), "x").is_ok();
        if !writable {
            let emitter = ReportEmitter::new(&out);
            let err = emitter.emit_at(&[], &range(), Granularity::Week, &stats(), at()).unwrap_err();
            match err {
                ReportError::OutputWrite { path, .. } => assert!(path.starts_with(&out)),
                other => panic!("unexpected error: {other:?}"),
            }
            assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
        }

        std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_file_name_suffix() {
        assert_eq!(file_name("x", 1), "x.md");
        assert_eq!(file_name("x", 2), "x-2.md");
    }
}
