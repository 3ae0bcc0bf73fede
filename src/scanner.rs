//! Scan loop driving events into an [`Execution`]
//!
//! The scanner consumes the runner's stdout strictly in order, one line at a
//! time. Every line is parsed, folded into the execution, and then offered
//! to the configured handler, so each mutation happens before the next line
//! is read. Lines that fail to parse are reported and skipped; a handler
//! error or a genuine read error aborts the scan and fires the stop
//! callback exactly once.

use crate::error::{Error, Result};
use crate::event::{parse_event, TestEvent};
use crate::execution::Execution;
use std::io::BufRead;

/// Capability invoked synchronously for every event and every unparsable
/// line. Returning an error from either hook aborts the scan.
pub trait EventHandler {
    /// Called after the event has been folded into the execution.
    fn event(&mut self, event: &TestEvent, execution: &Execution) -> Result<()>;

    /// Called with each input line that failed to parse.
    fn err(&mut self, line: &str) -> Result<()>;
}

/// Handler used when none is configured.
struct NoopHandler;

impl EventHandler for NoopHandler {
    fn event(&mut self, _event: &TestEvent, _execution: &Execution) -> Result<()> {
        Ok(())
    }

    fn err(&mut self, _line: &str) -> Result<()> {
        Ok(())
    }
}

/// Configuration for one scan of runner output.
pub struct ScanConfig<'a, R> {
    /// The runner's standard output stream.
    pub stdout: R,
    /// Handler invoked per event; `None` means events are only aggregated.
    pub handler: Option<&'a mut dyn EventHandler>,
    /// Invoked at most once, on fatal abort only, typically to terminate an
    /// in-flight subprocess. Never invoked on clean completion.
    pub stop: Option<Box<dyn FnOnce() + 'a>>,
}

impl<'a, R: BufRead> ScanConfig<'a, R> {
    /// Minimal configuration: aggregate only, no handler, no stop hook.
    pub fn new(stdout: R) -> Self {
        ScanConfig {
            stdout,
            handler: None,
            stop: None,
        }
    }

    /// Set the per-event handler.
    pub fn with_handler(mut self, handler: &'a mut dyn EventHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Set the stop callback.
    pub fn with_stop(mut self, stop: impl FnOnce() + 'a) -> Self {
        self.stop = Some(Box::new(stop));
        self
    }
}

/// Scan the runner's output stream to completion, returning the aggregated
/// [`Execution`].
///
/// Individual unparsable lines are recorded on the execution, reported via
/// [`EventHandler::err`], and skipped; the stream routinely interleaves
/// non-JSON lines. A handler error or a read error is fatal: the stop
/// callback fires and the error propagates without any further lines being
/// processed.
pub fn scan_test_output<R: BufRead>(config: ScanConfig<'_, R>) -> Result<Execution> {
    let ScanConfig {
        mut stdout,
        handler,
        mut stop,
    } = config;
    let mut noop = NoopHandler;
    let handler: &mut dyn EventHandler = match handler {
        Some(handler) => handler,
        None => &mut noop,
    };

    let mut execution = Execution::new();
    let mut buf = Vec::new();
    loop {
        // Lines are read as raw bytes: build and tool output can carry
        // arbitrary non-UTF-8 data, which must flow through the
        // malformed-line path rather than abort the scan.
        buf.clear();
        match stdout.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                invoke_stop(&mut stop);
                return Err(Error::Io(err));
            }
        }
        let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            continue;
        }

        let event = match parse_event(line) {
            Ok(event) => event,
            Err(Error::MalformedEvent { line }) => {
                execution.add_error(&line);
                if let Err(err) = handler.err(&line) {
                    invoke_stop(&mut stop);
                    return Err(err);
                }
                continue;
            }
            Err(err) => {
                invoke_stop(&mut stop);
                return Err(err);
            }
        };

        execution.add(&event);
        if let Err(err) = handler.event(&event, &execution) {
            invoke_stop(&mut stop);
            return Err(err);
        }
    }

    Ok(execution)
}

fn invoke_stop(stop: &mut Option<Box<dyn FnOnce() + '_>>) {
    if let Some(stop) = stop.take() {
        stop();
    }
}
