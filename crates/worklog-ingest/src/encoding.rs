//! Encoding detection and decoding
//!
//! Detection order:
//!
//! 1. Byte-order mark (UTF-8, UTF-16LE, UTF-16BE)
//! 2. Strict UTF-8
//! 3. Statistical sniffing over common 8-bit Western encodings: each candidate
//!    decoding is scored by how plausible its non-ASCII characters are as
//!    prose. The best score wins when it reaches the configured confidence.
//! 4. The configured fallback order, first strict decode that yields text wins
//!
//! A decoding that produces NUL characters is treated as failed; such files
//! are binary, not text.

use encoding_rs::{Encoding, ISO_8859_15, UTF_8, WINDOWS_1252};
use worklog_domain::Diagnostic;

/// Encodings scored by the sniffer, in tie-break order
const SNIFF_CANDIDATES: [&Encoding; 2] = [WINDOWS_1252, ISO_8859_15];

/// Non-alphabetic, non-ASCII characters common in prose
const TYPOGRAPHIC: &str = "€£¥°§©®™«»‹›‘’‚“”„–—…•·×÷±µ¶†‡‰";

/// Successfully decoded text
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// Decoded text, BOM removed
    pub text: String,
    /// Name of the encoding that succeeded
    pub encoding: &'static str,
    /// Issues noticed while decoding
    pub diagnostics: Vec<Diagnostic>,
}

/// Every strategy failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    /// Encodings attempted in the fallback phase
    pub tried: Vec<String>,
}

impl std::fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no encoding could decode the file (tried {})", self.tried.join(", "))
    }
}

impl std::error::Error for DecodeFailure {}

/// Decode raw file bytes
///
/// `min_confidence` is the sniffing threshold in `[0, 1]`; `fallbacks` are
/// WHATWG labels tried in order when sniffing is inconclusive. Unknown labels
/// are skipped.
pub fn decode(bytes: &[u8], min_confidence: f32, fallbacks: &[String]) -> Result<Decoded, DecodeFailure> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        if let Some(text) = strict_text(encoding, &bytes[bom_len..]) {
            return Ok(Decoded {
                text,
                encoding: encoding.name(),
                diagnostics: vec![Diagnostic::ByteOrderMark],
            });
        }
    }

    if let Some(text) = strict_text(UTF_8, bytes) {
        return Ok(Decoded {
            text,
            encoding: UTF_8.name(),
            diagnostics: Vec::new(),
        });
    }

    let (best, confidence) = sniff(bytes);
    if let Some(encoding) = best {
        if confidence >= min_confidence {
            if let Some(text) = strict_text(encoding, bytes) {
                return Ok(Decoded {
                    text,
                    encoding: encoding.name(),
                    diagnostics: Vec::new(),
                });
            }
        }
    }

    let mut tried = Vec::with_capacity(fallbacks.len());
    for label in fallbacks {
        let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
            continue;
        };
        tried.push(encoding.name().to_string());
        if let Some(text) = strict_text(encoding, bytes) {
            let mut diagnostics = Vec::with_capacity(2);
            if let Some(guess) = best {
                diagnostics.push(Diagnostic::LowConfidenceEncoding {
                    encoding: guess.name().to_string(),
                    confidence,
                });
            }
            diagnostics.push(Diagnostic::EncodingFallback {
                encoding: encoding.name().to_string(),
            });
            return Ok(Decoded {
                text,
                encoding: encoding.name(),
                diagnostics,
            });
        }
    }

    Err(DecodeFailure { tried })
}

/// Best sniffing candidate and its plausibility score
///
/// Returns `(None, 0.0)` when no candidate decodes to text at all.
pub fn sniff(bytes: &[u8]) -> (Option<&'static Encoding>, f32) {
    let mut best: Option<&'static Encoding> = None;
    let mut best_score = 0.0f32;
    for encoding in SNIFF_CANDIDATES {
        let Some(text) = strict_text(encoding, bytes) else {
            continue;
        };
        let score = plausibility(&text);
        if best.is_none() || score > best_score {
            best = Some(encoding);
            best_score = score;
        }
    }
    (best, best_score)
}

/// Share of non-ASCII characters that look like prose, in `[0, 1]`
///
/// Pure ASCII scores 1.0.
pub fn plausibility(text: &str) -> f32 {
    let mut non_ascii = 0usize;
    let mut plausible = 0usize;
    for c in text.chars().filter(|c| !c.is_ascii()) {
        non_ascii += 1;
        if c.is_alphabetic() || TYPOGRAPHIC.contains(c) || c == '\u{a0}' {
            plausible += 1;
        }
    }
    if non_ascii == 0 {
        1.0
    } else {
        plausible as f32 / non_ascii as f32
    }
}

fn strict_text(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    let text = encoding.decode_without_bom_handling_and_without_replacement(bytes)?;
    if text.contains('\0') {
        return None;
    }
    Some(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallbacks() -> Vec<String> {
        vec!["utf-8".into(), "windows-1252".into(), "iso-8859-15".into()]
    }

    #[test]
    fn test_plain_utf8() {
        let decoded = decode("Met with José about Zürich".as_bytes(), 0.9, &fallbacks()).unwrap();
        assert_eq!(decoded.encoding, "UTF-8");
        assert_eq!(decoded.text, "Met with José about Zürich");
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"standup notes");
        let decoded = decode(&bytes, 0.9, &fallbacks()).unwrap();
        assert_eq!(decoded.text, "standup notes");
        assert_eq!(decoded.diagnostics, vec![Diagnostic::ByteOrderMark]);
    }

    #[test]
    fn test_utf16le_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode(&bytes, 0.9, &fallbacks()).unwrap();
        assert_eq!(decoded.encoding, "UTF-16LE");
        assert_eq!(decoded.text, "hi");
    }

    #[test]
    fn test_sniffs_windows_1252() {
        // "café naïve – done" in windows-1252
        let bytes = b"caf\xe9 na\xefve \x96 done";
        let decoded = decode(bytes, 0.9, &fallbacks()).unwrap();
        assert_eq!(decoded.encoding, "windows-1252");
        assert_eq!(decoded.text, "café naïve – done");
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn test_sniffs_iso_8859_15() {
        // 0xA4 is the euro sign and 0xA6 is S-caron only in ISO-8859-15
        let bytes = b"Paid \xa4 40 for \xa6koda parts";
        let decoded = decode(bytes, 0.9, &fallbacks()).unwrap();
        assert_eq!(decoded.encoding, "ISO-8859-15");
        assert_eq!(decoded.text, "Paid € 40 for Škoda parts");
    }

    #[test]
    fn test_low_confidence_falls_back_in_order() {
        // Unassigned C1 positions decode to control characters in both candidates
        let bytes = b"log \x81\x8d\x8f\x90 end";
        let decoded = decode(bytes, 0.9, &fallbacks()).unwrap();
        assert_eq!(decoded.encoding, "windows-1252");
        assert!(decoded
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::EncodingFallback { encoding } if encoding == "windows-1252")));
        assert!(decoded
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::LowConfidenceEncoding { .. })));
    }

    #[test]
    fn test_binary_content_fails() {
        let bytes = b"abc\x00\x00\x9f\x00";
        let err = decode(bytes, 0.9, &fallbacks()).unwrap_err();
        assert_eq!(err.tried, vec!["UTF-8", "windows-1252", "ISO-8859-15"]);
        assert!(err.to_string().contains("windows-1252"));
    }

    #[test]
    fn test_utf8_only_fallback_fails_on_legacy_bytes() {
        let bytes = b"log \x81\x8d end";
        let err = decode(bytes, 0.9, &["utf-8".to_string()]).unwrap_err();
        assert_eq!(err.tried, vec!["UTF-8"]);
    }

    #[test]
    fn test_plausibility() {
        assert_eq!(plausibility("plain ascii"), 1.0);
        assert_eq!(plausibility("é€"), 1.0);
        assert_eq!(plausibility("¤¦"), 0.0);
        assert_eq!(plausibility("é¤"), 0.5);
    }
}
