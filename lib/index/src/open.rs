//! Bounded-wait index open.
//!
//! Opening an index can block indefinitely when another process holds its
//! file lock. The open runs on a dedicated thread so the caller can give
//! up after a deadline. An abandoned open leaks its thread (and whatever
//! the open eventually acquires) until the underlying call resolves;
//! there is no way to interrupt it.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use lorahub_core::RepositoryError;
use tracing::warn;

/// Run `open` on its own thread and wait at most `timeout` for it to
/// finish. On deadline, fails fast with [`RepositoryError::Timeout`] and
/// abandons the thread.
pub(crate) fn open_with_timeout<T, F>(
    what: &str,
    timeout: Duration,
    open: F,
) -> Result<T, RepositoryError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, RepositoryError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name(format!("open-{what}"))
        .spawn(move || {
            // The receiver may be gone if the caller timed out; the
            // opened handle is dropped right here in that case.
            let _ = tx.send(open());
        })
        .map_err(|e| RepositoryError::Internal(format!("failed to spawn open thread: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!("opening {what} timed out after {timeout:?}, abandoning");
            Err(RepositoryError::Timeout(format!(
                "opening {what} timed out after {timeout:?}"
            )))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(RepositoryError::Internal(format!(
            "open thread for {what} died"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_result_when_fast_enough() {
        let value =
            open_with_timeout("test", Duration::from_secs(1), || Ok::<_, RepositoryError>(42))
                .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn propagates_open_errors() {
        let err = open_with_timeout("test", Duration::from_secs(1), || {
            Err::<(), _>(RepositoryError::Corruption("bad index".into()))
        })
        .unwrap_err();
        assert_eq!(err.error_code(), "CORRUPTION");
    }

    #[test]
    fn blocked_open_times_out() {
        let err = open_with_timeout("test", Duration::from_millis(20), || {
            thread::sleep(Duration::from_millis(500));
            Ok::<_, RepositoryError>(())
        })
        .unwrap_err();
        assert_eq!(err.error_code(), "TIMEOUT");
    }
}
