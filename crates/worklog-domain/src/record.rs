//! Records passed between pipeline stages

use crate::entity::Entities;
use crate::period::Period;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A worklog file that exists on disk for a requested date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredFile {
    /// Location on disk
    pub path: PathBuf,
    /// Entry date
    pub date: NaiveDate,
}

/// Non-fatal issue noticed while reading a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Sniffing was inconclusive; decoded with a configured fallback encoding
    EncodingFallback {
        /// Encoding that finally succeeded
        encoding: String,
    },
    /// Sniffing picked an encoding but with low confidence
    LowConfidenceEncoding {
        /// Chosen encoding
        encoding: String,
        /// Plausibility score in `[0, 1]`
        confidence: f32,
    },
    /// A byte-order mark was found and stripped
    ByteOrderMark,
    /// Whitespace or line endings were rewritten
    Sanitized,
    /// Content exceeded the character budget and was cut
    Truncated {
        /// Characters before truncation
        original_chars: usize,
        /// Characters kept
        kept_chars: usize,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::EncodingFallback { encoding } => {
                write!(f, "encoding fallback used ({})", encoding)
            }
            Diagnostic::LowConfidenceEncoding { encoding, confidence } => {
                write!(f, "low-confidence encoding {} ({:.2})", encoding, confidence)
            }
            Diagnostic::ByteOrderMark => write!(f, "byte-order mark removed"),
            Diagnostic::Sanitized => write!(f, "sanitization applied"),
            Diagnostic::Truncated { original_chars, kept_chars } => {
                write!(f, "truncated from {} to {} chars", original_chars, kept_chars)
            }
        }
    }
}

/// Decoded, sanitized text of one worklog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedContent {
    /// Source path
    pub path: PathBuf,
    /// Entry date
    pub date: NaiveDate,
    /// Sanitized text
    pub text: String,
    /// Whitespace-separated word count
    pub word_count: usize,
    /// Line count of the sanitized text
    pub line_count: usize,
    /// Name of the encoding used to decode the file
    pub encoding: String,
    /// Size of the file on disk
    pub size_bytes: u64,
    /// Non-fatal issues
    pub diagnostics: Vec<Diagnostic>,
}

/// Entities extracted from one worklog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Source path
    pub path: PathBuf,
    /// Entry date
    pub date: NaiveDate,
    /// Normalized entity sets
    pub entities: Entities,
    /// Wall time spent, including retries and fallbacks
    pub latency: Duration,
    /// Self-reported model confidence, when provided
    pub confidence: Option<f32>,
    /// Unparsed model output, when retention is enabled
    pub raw_response: Option<String>,
    /// Provider that produced the result
    pub provider: String,
}

/// Where a period's narrative came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrativeSource {
    /// Written by a provider
    Generated {
        /// Provider name
        provider: String,
    },
    /// Built deterministically from the aggregated entities
    Fallback {
        /// Why generation was abandoned
        reason: String,
    },
}

/// Aggregated entities and prose for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Period covered
    pub period: Period,
    /// Union of entities across the period's entries
    pub entities: Entities,
    /// Narrative prose
    pub narrative: String,
    /// Origin of the narrative
    pub narrative_source: NarrativeSource,
    /// Number of entries merged
    pub entry_count: usize,
    /// Dates that contributed entries
    pub entry_dates: Vec<NaiveDate>,
    /// Time spent producing the narrative
    pub generation_time: Duration,
}
