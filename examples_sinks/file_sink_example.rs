use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use json_log_layout::identity::EnvIdentity;
use json_log_layout::init::{init_tracing_with_config, LayerConfig};
use json_log_layout::writer_sink::FileSink;
use json_log_layout::{JsonLayout, LayoutConfig};

/// Writes JSON lines to `app.json.log`. Set `JSON_LOGGING_NODE`,
/// `JSON_LOGGING_CLUSTER`, ... to see identity fields appear under `id`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let layout = JsonLayout::new(LayoutConfig::new("app.json.log", "Acme DB"), Arc::new(EnvIdentity))?;
    let sink = Arc::new(FileSink::open("app.json.log").await?);

    let config = LayerConfig { enable_stdout: true, ..LayerConfig::default() };
    init_tracing_with_config(Arc::new(layout), sink, config);

    info!(user = "alice", "session opened");
    warn!(marker = "AUDIT", user = "alice", "password about to expire");
    error!(exception = "stack trace\n\tat frame", "request failed");

    sleep(Duration::from_secs(2)).await;
    Ok(())
}
