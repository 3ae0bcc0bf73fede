//! testjson - incremental aggregation of `go test -json` event streams
//!
//! `go test -json` emits one JSON object per line describing per-test and
//! per-package lifecycle actions (run, output, pass, fail, skip). This crate
//! replays such a stream into an in-memory aggregate model of the whole
//! execution: per-package status, per-test outcomes and timing, captured
//! output text, and derived signals (coverage percentage, build failure,
//! cache-hit detection) embedded in free-text output lines.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`event`]: the [`TestEvent`] record and line parsing
//! - [`classify`]: classification of free-text signal lines
//! - [`execution`]: the [`Execution`], [`Package`], and [`TestCase`] aggregates
//! - [`scanner`]: the scan loop driving a byte stream into an execution
//! - [`error`]: error types and `Result` alias
//!
//! Command-line parsing, process execution, and output rendering are left to
//! consumers: the crate exposes a typed event and a queryable aggregate, and
//! everything downstream only consumes them.
//!
//! # Example
//!
//! ```
//! use testjson::{scan_test_output, ScanConfig};
//!
//! # fn main() -> testjson::Result<()> {
//! let stream: &[u8] = br#"{"Action":"run","Package":"example.com/p","Test":"TestOk"}
//! {"Action":"pass","Package":"example.com/p","Test":"TestOk","Elapsed":0.01}
//! {"Action":"pass","Package":"example.com/p","Elapsed":0.02}
//! "#;
//!
//! let execution = scan_test_output(ScanConfig::new(stream))?;
//! assert_eq!(execution.total(), 1);
//!
//! let pkg = execution.package("example.com/p").unwrap();
//! assert_eq!(pkg.passed().len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod error;
pub mod event;
pub mod execution;
pub mod scanner;

pub use error::{Error, Result};
pub use event::{parse_event, Action, TestEvent};
pub use execution::{Execution, Package, TestCase, PKG_OUTPUT_ID};
pub use scanner::{scan_test_output, EventHandler, ScanConfig};
