use crate::identity::EnvIdentity;
use crate::layer::JsonLogLayer;
use crate::layout::{JsonLayout, LayoutConfig};
use crate::error::LayoutError;
use crate::sink::LogSink;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the logging layer.
///
/// **Fields**
/// - `channel_buffer`: maximum number of lines queued before new lines
///   start being dropped.
/// - `batch_size`: number of lines handed to the sink per batch.
/// - `flush_interval`: maximum interval between flushes even when the
///   batch is not full.
/// - `max_level`: least severe level that is captured.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   added next to [`JsonLogLayer`] for human-readable console output.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub max_level: Level,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
            max_level: Level::INFO,
            enable_stdout: false,
        }
    }
}

/// Build a [`JsonLogLayer`] from a layout and [`LayerConfig`] without
/// installing it, e.g. to compose it with other layers.
pub fn build_layer(
    layout: Arc<JsonLayout>,
    sink: Arc<dyn LogSink>,
    config: &LayerConfig,
) -> (JsonLogLayer, JoinHandle<()>) {
    let (layer, handle) = JsonLogLayer::new(
        layout,
        sink,
        config.channel_buffer,
        config.batch_size,
        config.flush_interval,
    );
    (layer.with_max_level(config.max_level), handle)
}

/// Initialize the global `tracing` subscriber using the provided layout,
/// sink and [`LayerConfig`].
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`JsonLogLayer`] as the global
/// default subscriber, so all `tracing` events in the process are
/// observed by the layer. Must be called from within a Tokio runtime.
///
/// **Panics**
///
/// If a global subscriber is already installed.
pub fn init_tracing_with_config(
    layout: Arc<JsonLayout>,
    sink: Arc<dyn LogSink>,
    config: LayerConfig,
) -> JoinHandle<()> {
    let (layer, handle) = build_layer(layout, sink, &config);

    // Two subscriber shapes because the layer stacks have different types.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    }
    handle
}

/// Initialize tracing from `JSON_LOGGING_*` environment variables with
/// default layer settings.
///
/// **Errors**
///
/// Fails before installing anything when the environment does not
/// provide a valid layout configuration (file and product are required).
pub fn init_tracing(sink: Arc<dyn LogSink>) -> Result<JoinHandle<()>, LayoutError> {
    let layout = JsonLayout::new(LayoutConfig::from_env(), Arc::new(EnvIdentity))?;
    Ok(init_tracing_with_config(Arc::new(layout), sink, LayerConfig::default()))
}
