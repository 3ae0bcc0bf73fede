//! Test event parsing
//!
//! `go test -json` emits one JSON object per line describing a lifecycle
//! action for a test or a package. This module decodes one such line into a
//! [`TestEvent`], keeping the original bytes around for diagnostics and
//! replay.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Lifecycle action reported by the test runner.
///
/// The wire strings are fixed by the runner; an unrecognized action is a
/// parse failure, never a silent pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// A test has started running.
    Run,
    /// A test has been paused (parallel test scheduling).
    Pause,
    /// A paused test has resumed.
    Cont,
    /// A line of output was produced.
    Output,
    /// Benchmark result line.
    Bench,
    /// Test or package passed.
    Pass,
    /// Test or package failed.
    Fail,
    /// Test or package was skipped.
    Skip,
    /// Output produced while building the package.
    #[serde(rename = "build-output")]
    BuildOutput,
    /// The package failed to build.
    #[serde(rename = "build-fail")]
    BuildFail,
}

impl Action {
    /// Returns true for actions that record a terminal outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::Pass | Action::Fail | Action::Skip)
    }
}

/// One decoded line from the test runner's structured output.
#[derive(Debug, Clone, PartialEq)]
pub struct TestEvent {
    /// When the event was emitted, if the runner reported it.
    pub time: Option<DateTime<Utc>>,
    /// Lifecycle action this event describes.
    pub action: Action,
    /// Import path of the package, empty for some build-level events.
    pub package: String,
    /// Test name; empty means the event is package-level.
    pub test: String,
    /// Elapsed duration, only meaningful on terminal actions.
    pub elapsed: Duration,
    /// Output text, only meaningful on output actions.
    pub output: String,
    raw: Vec<u8>,
}

impl TestEvent {
    /// Returns true if this event refers to an individual test rather than
    /// the package as a whole.
    pub fn is_test_level(&self) -> bool {
        !self.test.is_empty()
    }

    /// The original input line, unmodified.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

/// Wire schema of one `go test -json` line. Optional fields default to their
/// zero values; `Action` is the only required field.
#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "Time")]
    time: Option<DateTime<Utc>>,
    #[serde(rename = "Action")]
    action: Action,
    #[serde(rename = "Package", default)]
    package: String,
    #[serde(rename = "Test", default)]
    test: String,
    #[serde(rename = "Elapsed", default)]
    elapsed: f64,
    #[serde(rename = "Output", default)]
    output: String,
}

/// Parse one line of runner output into a [`TestEvent`].
///
/// The elapsed field arrives as fractional seconds and is converted to a
/// [`Duration`] with sub-millisecond precision; a negative value is clamped
/// to zero and a value too large for a `Duration` is a parse failure like
/// any other malformed line. On failure the offending line is carried on
/// the error for diagnostics.
pub fn parse_event(raw: &[u8]) -> Result<TestEvent> {
    let malformed = || Error::MalformedEvent {
        line: String::from_utf8_lossy(raw).into_owned(),
    };
    let decoded: RawEvent = serde_json::from_slice(raw).map_err(|_| malformed())?;
    let elapsed =
        Duration::try_from_secs_f64(decoded.elapsed.max(0.0)).map_err(|_| malformed())?;

    Ok(TestEvent {
        time: decoded.time,
        action: decoded.action,
        package: decoded.package,
        test: decoded.test,
        elapsed,
        output: decoded.output,
        raw: raw.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_full() {
        let raw = r#"{"Time":"2018-03-22T22:33:35.168308334Z","Action":"output","Package":"example.com/good","Test": "TestOk","Output":"PASS\n"}"#;
        let event = parse_event(raw.as_bytes()).unwrap();

        let expected_time: DateTime<Utc> =
            "2018-03-22T22:33:35.168308334Z".parse().unwrap();
        assert_eq!(event.time, Some(expected_time));
        assert_eq!(event.action, Action::Output);
        assert_eq!(event.package, "example.com/good");
        assert_eq!(event.test, "TestOk");
        assert_eq!(event.output, "PASS\n");
        assert_eq!(event.elapsed, Duration::ZERO);
        assert_eq!(event.raw(), raw.as_bytes());
    }

    #[test]
    fn test_parse_event_missing_optional_fields() {
        let event = parse_event(br#"{"Action":"run"}"#).unwrap();
        assert_eq!(event.action, Action::Run);
        assert!(event.time.is_none());
        assert_eq!(event.package, "");
        assert_eq!(event.test, "");
        assert_eq!(event.output, "");
        assert_eq!(event.elapsed, Duration::ZERO);
        assert!(!event.is_test_level());
    }

    #[test]
    fn test_parse_event_elapsed_subsecond_precision() {
        let event =
            parse_event(br#"{"Action":"pass","Package":"p","Test":"T","Elapsed":0.0125}"#)
                .unwrap();
        assert_eq!(event.elapsed, Duration::from_micros(12500));
        assert!(event.is_test_level());
    }

    #[test]
    fn test_parse_event_hyphenated_actions() {
        let event = parse_event(br#"{"Action":"build-output","Package":"p"}"#).unwrap();
        assert_eq!(event.action, Action::BuildOutput);

        let event = parse_event(br#"{"Action":"build-fail","Package":"p"}"#).unwrap();
        assert_eq!(event.action, Action::BuildFail);
    }

    #[test]
    fn test_parse_event_elapsed_out_of_range() {
        let err =
            parse_event(br#"{"Action":"pass","Package":"p","Elapsed":1e300}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent { .. }));
    }

    #[test]
    fn test_parse_event_negative_elapsed_clamped() {
        let event =
            parse_event(br#"{"Action":"pass","Package":"p","Test":"T","Elapsed":-0.5}"#)
                .unwrap();
        assert_eq!(event.elapsed, Duration::ZERO);
    }

    #[test]
    fn test_parse_event_unknown_action() {
        let err = parse_event(br#"{"Action":"explode","Package":"p"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent { .. }));
    }

    #[test]
    fn test_parse_event_missing_action() {
        let err = parse_event(br#"{"Package":"p"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent { .. }));
    }

    #[test]
    fn test_parse_event_not_json() {
        // `go test -json` interleaves a bare FAIL line on build failures.
        let err = parse_event(b"FAIL\texample.com/broken [build failed]").unwrap_err();
        match err {
            Error::MalformedEvent { line } => {
                assert_eq!(line, "FAIL\texample.com/broken [build failed]");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_action_is_terminal() {
        assert!(Action::Pass.is_terminal());
        assert!(Action::Fail.is_terminal());
        assert!(Action::Skip.is_terminal());
        assert!(!Action::Run.is_terminal());
        assert!(!Action::Output.is_terminal());
        assert!(!Action::Bench.is_terminal());
        assert!(!Action::BuildFail.is_terminal());
    }
}
