use async_trait::async_trait;
use std::error::Error;

/// Asynchronous destination for JSON lines produced by the layout.
///
/// Implementations are responsible for transporting lines to a concrete
/// destination (stdout, a file, a collector). The layer calls `send` from a
/// background task and never awaits it on the application thread.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Send a single formatted line.
    ///
    /// **Parameters**
    /// - `line`: one JSON object, including the trailing line separator
    ///   when the layout appends one.
    ///
    /// **Returns**
    /// - `Ok(())` if the line was accepted.
    /// - `Err(..)` on I/O failure. The layer treats this as transient and
    ///   retries the batch with backoff.
    async fn send(&self, line: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered lines, if the sink implements buffering.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
