use crate::event::{current_thread_name, LogEvent};
use crate::key;
use crate::layout::JsonLayout;
use crate::sink::LogSink;
use chrono::Utc;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that renders events as JSON lines with a
/// [`JsonLayout`] and forwards them to an asynchronous [`LogSink`] via a
/// bounded channel and background task.
///
/// Layout and encoding happen on the emitting thread; sink I/O is fully
/// decoupled from application threads. By default events at `INFO` and
/// above are captured.
pub struct JsonLogLayer {
    layout: Arc<JsonLayout>,
    sender: mpsc::Sender<String>,
    max_level: Level,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Dropped because the channel was full.
    pub dropped_events: Arc<AtomicU64>,
}

impl JsonLogLayer {
    /// Create a new layer and spawn a background task that pulls lines
    /// from a bounded channel and sends them to the provided [`LogSink`].
    ///
    /// Minimal thresholds are enforced for `buffer`, `batch_size` and
    /// `flush_interval` to avoid degenerate configurations. The task ends
    /// once the layer is dropped and the channel is drained.
    pub fn new(
        layout: Arc<JsonLayout>,
        sink: Arc<dyn LogSink>,
        buffer: usize,
        batch_size: usize,
        flush_interval: Duration,
    ) -> (Self, JoinHandle<()>) {
        let buffer = buffer.max(16);
        let batch_size = batch_size.max(1);
        let flush_interval = if flush_interval < Duration::from_millis(10) {
            Duration::from_millis(10)
        } else {
            flush_interval
        };

        let (tx, mut rx) = mpsc::channel::<String>(buffer);

        let total_events = Arc::new(AtomicU64::new(0));
        let enqueued_events = Arc::new(AtomicU64::new(0));
        let dropped_events = Arc::new(AtomicU64::new(0));

        let enqueued_events_bg = Arc::clone(&enqueued_events);

        let handle = tokio::spawn(async move {
            let mut batch = Vec::with_capacity(batch_size);
            let backoff = Duration::from_millis(100);
            let max_backoff = Duration::from_secs(10);

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(line) => {
                            batch.push(line);
                            enqueued_events_bg.fetch_add(1, Ordering::Relaxed);
                            if batch.len() >= batch_size {
                                if let Err(e) = send_batch(&*sink, &mut batch, backoff, max_backoff).await {
                                    eprintln!("error sending log batch: {}", e);
                                }
                            }
                        }
                        None => {
                            if !batch.is_empty() {
                                if let Err(e) = send_batch(&*sink, &mut batch, backoff, max_backoff).await {
                                    eprintln!("error flushing log batch on shutdown: {}", e);
                                }
                            }
                            break;
                        }
                    },
                    _ = sleep(flush_interval) => {
                        if !batch.is_empty() {
                            if let Err(e) = send_batch(&*sink, &mut batch, backoff, max_backoff).await {
                                eprintln!("error flushing log batch: {}", e);
                            }
                        }
                    }
                }
            }
        });

        (Self {
            layout,
            sender: tx,
            max_level: Level::INFO,
            total_events,
            enqueued_events,
            dropped_events,
        }, handle)
    }

    /// Capture events at `level` and above (more severe).
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }
}

/// Hand `batch` to the sink, retrying with backoff until it is accepted.
///
/// Lines the sink already accepted are removed from the batch before a
/// retry, so a partial failure never sends a line twice. When every line
/// was sent and only `flush` failed, only `flush` is retried.
async fn send_batch(
    sink: &dyn LogSink,
    batch: &mut Vec<String>,
    mut backoff: Duration,
    max_backoff: Duration,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    loop {
        let mut sent = 0;
        let mut failed: Option<Box<dyn Error + Send + Sync>> = None;
        for line in batch.iter() {
            match sink.send(line).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    failed = Some(e);
                    break;
                }
            }
        }
        batch.drain(..sent);

        match failed {
            None => break,
            Some(e) => {
                eprintln!("log sink send failed ({}), retrying {} lines in {:?}", e, batch.len(), backoff);
            }
        }

        sleep(backoff).await;
        backoff = std::cmp::min(backoff * 2, max_backoff);
    }

    while let Err(e) = sink.flush().await {
        eprintln!("log sink flush failed ({}), retrying in {:?}", e, backoff);
        sleep(backoff).await;
        backoff = std::cmp::min(backoff * 2, max_backoff);
    }
    Ok(())
}

impl<S> Layer<S> for JsonLogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let log_event = LogEvent {
            timestamp: Utc::now(),
            level: meta.level().to_string(),
            thread: current_thread_name(),
            logger: meta.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            raw_message: None,
            mdc: visitor.fields,
            exception: visitor.exception,
            marker: visitor.marker,
        };

        let line = self.layout.format(&log_event);
        if let Err(_e) = self.sender.try_send(line) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
            eprintln!("log channel full, dropping log line");
        }
    }
}

use tracing::field::{Field, Visit};

/// Collects event fields into the MDC map, lifting `message`, `marker`
/// and `exception` into their own slots.
#[derive(Default)]
pub struct FieldVisitor {
    pub fields: BTreeMap<String, String>,
    pub message: Option<String>,
    pub marker: Option<String>,
    pub exception: Option<String>,
}

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = Some(value),
            key::MARKER => self.marker = Some(value),
            key::EXCEPTION => self.exception = Some(value),
            name => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every accepted line; fails the first `send_failures` sends
    /// after `fail_after` lines and the first `flush_failures` flushes.
    #[derive(Default)]
    struct FlakySink {
        accepted: Mutex<Vec<String>>,
        fail_after: usize,
        send_failures: Mutex<usize>,
        flush_failures: Mutex<usize>,
        flushes: Mutex<usize>,
    }

    #[async_trait]
    impl LogSink for FlakySink {
        async fn send(&self, line: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
            let mut accepted = self.accepted.lock().unwrap();
            let mut failures = self.send_failures.lock().unwrap();
            if accepted.len() == self.fail_after && *failures > 0 {
                *failures -= 1;
                return Err("send refused".into());
            }
            accepted.push(line.to_string());
            Ok(())
        }

        async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
            *self.flushes.lock().unwrap() += 1;
            let mut failures = self.flush_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err("flush refused".into());
            }
            Ok(())
        }
    }

    fn batch() -> Vec<String> {
        vec!["{\"n\":\"1\"}\n".to_string(), "{\"n\":\"2\"}\n".to_string(), "{\"n\":\"3\"}\n".to_string()]
    }

    #[tokio::test]
    async fn failed_flush_does_not_resend_lines() {
        let sink = FlakySink { fail_after: usize::MAX, flush_failures: Mutex::new(1), ..Default::default() };
        let mut lines = batch();

        send_batch(&sink, &mut lines, Duration::from_millis(1), Duration::from_millis(2)).await.unwrap();

        assert!(lines.is_empty());
        assert_eq!(*sink.accepted.lock().unwrap(), batch());
        assert_eq!(*sink.flushes.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn failed_send_retries_only_remaining_lines() {
        let sink = FlakySink { fail_after: 1, send_failures: Mutex::new(2), ..Default::default() };
        let mut lines = batch();

        send_batch(&sink, &mut lines, Duration::from_millis(1), Duration::from_millis(2)).await.unwrap();

        assert!(lines.is_empty());
        assert_eq!(*sink.accepted.lock().unwrap(), batch());
        assert_eq!(*sink.flushes.lock().unwrap(), 1);
    }
}
