//! Classification of free-text signal lines
//!
//! The runner embeds a handful of meaningful plain-text lines inside the
//! structured event stream: the coverage summary, the cache-hit marker, and
//! the compile-failure marker. This classifier is deliberately decoupled
//! from JSON parsing so new patterns can be added without touching the
//! decoder.

/// Outcome of classifying one output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputKind {
    /// A coverage summary line, with the trailing newline stripped.
    Coverage(String),
    /// The package result was served from the test cache.
    Cached,
    /// The package failed to compile.
    BuildFailed,
    /// No recognized signal.
    None,
}

/// Classify one line of runner output.
///
/// The patterns are exact, locale-independent substrings:
/// - `coverage: ... of statements` covers both `-cover` and `-coverpkg`
///   output shapes;
/// - `(cached)` appears in the package summary line on a cache hit;
/// - `[build failed]` terminates the summary line of a package that failed
///   to compile.
pub fn classify_line(line: &str) -> OutputKind {
    let trimmed = line.trim_end_matches('\n');
    if trimmed.starts_with("coverage:") && trimmed.contains("of statements") {
        return OutputKind::Coverage(trimmed.to_string());
    }
    if trimmed.contains("(cached)") {
        return OutputKind::Cached;
    }
    if trimmed.ends_with("[build failed]") {
        return OutputKind::BuildFailed;
    }
    OutputKind::None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_line() {
        assert_eq!(
            classify_line("coverage: 33.1% of statements\n"),
            OutputKind::Coverage("coverage: 33.1% of statements".to_string())
        );
    }

    #[test]
    fn test_coverage_line_coverpkg() {
        assert_eq!(
            classify_line("coverage: 7.5% of statements in ./testing\n"),
            OutputKind::Coverage("coverage: 7.5% of statements in ./testing".to_string())
        );
    }

    #[test]
    fn test_coverage_prefix_required() {
        // A line merely mentioning coverage elsewhere is not a summary.
        assert_eq!(
            classify_line("see coverage: 10% of statements\n"),
            OutputKind::None
        );
    }

    #[test]
    fn test_cached_line() {
        assert_eq!(
            classify_line("ok  \texample.com/pkg\t(cached)\n"),
            OutputKind::Cached
        );
    }

    #[test]
    fn test_build_failed_line() {
        assert_eq!(
            classify_line("FAIL\texample.com/pkg [build failed]\n"),
            OutputKind::BuildFailed
        );
    }

    #[test]
    fn test_plain_output() {
        assert_eq!(classify_line("=== RUN   TestOk\n"), OutputKind::None);
        assert_eq!(classify_line("PASS\n"), OutputKind::None);
        assert_eq!(classify_line(""), OutputKind::None);
    }
}
