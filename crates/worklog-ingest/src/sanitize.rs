//! Structure-preserving text cleanup

/// Maximum consecutive blank lines kept
const MAX_BLANK_RUN: usize = 2;

/// Normalize a decoded worklog
///
/// - `\r\n` and lone `\r` become `\n`
/// - control characters other than tab are removed
/// - trailing whitespace is trimmed from every line
/// - runs of more than two blank lines collapse to exactly two
/// - leading and trailing blank lines are dropped; non-empty output ends in `\n`
///
/// Headings, bullets and indentation are untouched. The function is
/// idempotent.
///
/// # Examples
///
/// ```
/// use worklog_ingest::sanitize;
///
/// assert_eq!(sanitize("# Mon\r\n- item  \r\n\r\n\r\n\r\nend"), "# Mon\n- item\n\n\nend\n");
/// ```
pub fn sanitize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    let mut blank_run = 0usize;
    let mut seen_content = false;

    for raw_line in unified.split('\n') {
        let line: String = raw_line
            .chars()
            .filter(|c| *c == '\t' || !c.is_control())
            .filter(|c| *c != '\u{feff}')
            .collect();
        let line = line.trim_end();

        if line.is_empty() {
            if seen_content {
                blank_run += 1;
            }
            continue;
        }

        if seen_content {
            for _ in 0..blank_run.min(MAX_BLANK_RUN) {
                out.push('\n');
            }
        }
        blank_run = 0;
        seen_content = true;
        out.push_str(line);
        out.push('\n');
    }

    out
}

/// Cut `text` to at most `max_chars` characters, preferring a line boundary
///
/// Returns the (possibly shortened) text and whether anything was removed.
/// When no newline falls inside the budget the cut is made mid-line at a
/// character boundary.
pub fn truncate_at_line(text: &str, max_chars: usize) -> (&str, bool) {
    let Some((byte_limit, _)) = text.char_indices().nth(max_chars) else {
        return (text, false);
    };
    let head = &text[..byte_limit];
    match head.rfind('\n') {
        Some(idx) if idx > 0 => (&text[..=idx], true),
        _ => (head, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endings_normalized() {
        assert_eq!(sanitize("a\r\nb\rc"), "a\nb\nc\n");
    }

    #[test]
    fn test_blank_runs_collapse_to_two() {
        assert_eq!(sanitize("a\n\n\n\n\nb"), "a\n\n\nb\n");
        assert_eq!(sanitize("a\n\nb"), "a\n\nb\n");
        assert_eq!(sanitize("a\n\n\nb"), "a\n\n\nb\n");
    }

    #[test]
    fn test_trailing_whitespace_trimmed_indent_kept() {
        assert_eq!(sanitize("## Tasks   \n  - nested\t \n"), "## Tasks\n  - nested\n");
    }

    #[test]
    fn test_control_characters_removed() {
        assert_eq!(sanitize("ok\u{7}ay\u{0}\tdone"), "okay\tdone\n");
    }

    #[test]
    fn test_whitespace_only_becomes_empty() {
        assert_eq!(sanitize(" \n\t\r\n   "), "");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_leading_and_trailing_blank_lines_dropped() {
        assert_eq!(sanitize("\n\n\nbody\n\n\n"), "body\n");
    }

    #[test]
    fn test_truncate_prefers_line_boundary() {
        let text = "first line\nsecond line\nthird";
        let (cut, truncated) = truncate_at_line(text, 15);
        assert!(truncated);
        assert_eq!(cut, "first line\n");
    }

    #[test]
    fn test_truncate_mid_line_when_no_newline() {
        let (cut, truncated) = truncate_at_line("abcdefgh", 3);
        assert!(truncated);
        assert_eq!(cut, "abc");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let (cut, truncated) = truncate_at_line("ééééé", 2);
        assert!(truncated);
        assert_eq!(cut, "éé");
    }

    #[test]
    fn test_no_truncation_within_budget() {
        assert_eq!(truncate_at_line("short\n", 6), ("short\n", false));
        assert_eq!(truncate_at_line("short\n", 100), ("short\n", false));
    }
}
