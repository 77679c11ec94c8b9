//! Single-line JSON log layout.
//!
//! A [`layout::JsonLayout`] turns a [`event::LogEvent`] into one JSON
//! object per line: base fields from the event, deployment fields from the
//! [`enricher::Enricher`], and a hand-rolled [`encoder::JsonEncoder`] that
//! sorts keys and escapes strings exactly like a general-purpose JSON
//! serializer. [`layer::JsonLogLayer`] plugs the layout into `tracing` and
//! ships lines to an async [`sink::LogSink`].

pub mod error;
pub mod key;
pub mod record;
pub mod encoder;
pub mod identity;
pub mod event;
pub mod enricher;
pub mod env;
pub mod layout;
pub mod sink;
pub mod layer;

pub mod init;
pub mod noop_sink;
pub mod writer_sink;

pub use encoder::{encode, escape, JsonEncoder, JsonFormatter};
pub use error::LayoutError;
pub use layout::{JsonLayout, LayoutConfig};
pub use record::{Record, Value};
