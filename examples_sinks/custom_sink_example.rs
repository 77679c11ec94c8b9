use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::{error, info};
use json_log_layout::{
    identity::NoIdentity,
    init::{init_tracing_with_config, LayerConfig},
    sink::LogSink,
    JsonLayout, LayoutConfig,
};

/// Example of integrating a completely custom destination by implementing
/// the `LogSink` trait directly. Imagine this forwards lines to a
/// collector for which this crate does not provide a built-in sink.
struct PrefixedStderrSink;

#[async_trait]
impl LogSink for PrefixedStderrSink {
    async fn send(&self, line: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        eprint!("[collector] {}", line);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let layout = JsonLayout::new(LayoutConfig::new("custom.log", "Acme DB"), Arc::new(NoIdentity))
        .expect("valid layout config");
    let sink: Arc<dyn LogSink> = Arc::new(PrefixedStderrSink);

    init_tracing_with_config(Arc::new(layout), sink, LayerConfig::default());

    info!("custom sink example started");
    error!(db = "my-custom-db", "simulated error sent via custom sink");

    sleep(Duration::from_millis(1500)).await;
}
