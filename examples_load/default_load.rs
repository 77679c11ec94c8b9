use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::error;

use json_log_layout::init::init_tracing_with_config;
use json_log_layout::identity::EnvIdentity;
use json_log_layout::noop_sink::NoopSink;
use json_log_layout::{JsonLayout, LayoutConfig};

#[tokio::main]
async fn main() {
    let layout = JsonLayout::new(LayoutConfig::new("load.log", "load-test"), Arc::new(EnvIdentity))
        .expect("valid layout config");
    let sink = Arc::new(NoopSink::default());
    init_tracing_with_config(Arc::new(layout), sink, Default::default());

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "default load test error");
    }

    let elapsed = start.elapsed();
    println!("default config: laid out {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    // Give background task a little time to drain the channel
    sleep(Duration::from_secs(2)).await;
}
