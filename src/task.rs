// Background Execution
// Runs blocking RSA operations off the caller's thread

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Result, RsaError};

const WORKER_NAME: &str = "secure-rsa-worker";

/// Result of `run_with_timeout`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T> {
    /// The operation finished, successfully or not
    Finished(Result<T>),
    /// The deadline passed first. The worker is detached and its result dropped.
    TimedOut,
}

fn run_caught<T>(operation: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(operation))
        .unwrap_or_else(|_| Err(RsaError::Internal("worker panicked".to_string())))
}

/// Run `operation` on a named background thread.
///
/// Exactly one of `resolve` or `reject` is called, on the worker thread.
/// A panic inside `operation` is delivered to `reject` as `RsaError::Internal`.
pub fn spawn<T, O, S, F>(operation: O, resolve: S, reject: F) -> io::Result<JoinHandle<()>>
where
    T: Send + 'static,
    O: FnOnce() -> Result<T> + Send + 'static,
    S: FnOnce(T) + Send + 'static,
    F: FnOnce(RsaError) + Send + 'static,
{
    thread::Builder::new()
        .name(WORKER_NAME.to_string())
        .spawn(move || match run_caught(operation) {
            Ok(value) => resolve(value),
            Err(e) => {
                debug!(kind = e.kind(), "background operation failed");
                reject(e)
            }
        })
}

/// Run `operation` on a worker thread and wait at most `timeout` for it.
///
/// Rust threads cannot be killed, so a timed-out worker keeps running until
/// the operation returns on its own.
pub fn run_with_timeout<T, O>(operation: O, timeout: Duration) -> TaskOutcome<T>
where
    T: Send + 'static,
    O: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name(WORKER_NAME.to_string())
        .spawn(move || {
            // Receiver may already be gone after a timeout
            let _ = tx.send(run_caught(operation));
        });
    if let Err(e) = spawned {
        return TaskOutcome::Finished(Err(RsaError::Internal(format!(
            "failed to start worker: {}",
            e
        ))));
    }

    match rx.recv_timeout(timeout) {
        Ok(result) => TaskOutcome::Finished(result),
        Err(RecvTimeoutError::Timeout) => {
            warn!(?timeout, "operation timed out");
            TaskOutcome::TimedOut
        }
        Err(RecvTimeoutError::Disconnected) => TaskOutcome::Finished(Err(RsaError::Internal(
            "worker exited without a result".to_string(),
        ))),
    }
}
