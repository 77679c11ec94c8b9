use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{error, Level};

use json_log_layout::identity::{IdentityKey, StaticIdentity};
use json_log_layout::init::{init_tracing_with_config, LayerConfig};
use json_log_layout::noop_sink::NoopSink;
use json_log_layout::{JsonLayout, LayoutConfig};

#[tokio::main]
async fn main() {
    let identity = StaticIdentity::new()
        .with(IdentityKey::Node, "node-1")
        .with(IdentityKey::Stripe, "stripe-1")
        .with(IdentityKey::Cluster, "load");
    let layout_config = LayoutConfig {
        timezone: Some("UTC".to_string()),
        context_name: Some("load".to_string()),
        ..LayoutConfig::new("load.log", "load-test")
    };
    let layout = JsonLayout::new(layout_config, Arc::new(identity)).expect("valid layout config");
    let sink = Arc::new(NoopSink::default());

    let layer_config = LayerConfig {
        channel_buffer: 50_000,
        batch_size: 1_000,
        flush_interval: Duration::from_millis(200),
        max_level: Level::ERROR,
        enable_stdout: false,
    };

    init_tracing_with_config(Arc::new(layout), sink, layer_config);

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, marker = "LOAD", "custom load test error\nwith a second line");
    }

    let elapsed = start.elapsed();
    println!("custom config: laid out {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    sleep(Duration::from_secs(2)).await;
}
