use crate::sink::LogSink;
use async_trait::async_trait;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Writes each line to the process stdout.
#[derive(Clone, Default)]
pub struct StdoutSink;

#[async_trait]
impl LogSink for StdoutSink {
    async fn send(&self, line: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut out = tokio::io::stdout();
        out.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        tokio::io::stdout().flush().await?;
        Ok(())
    }
}

/// Appends lines to a file through a buffered writer.
///
/// Lines reach the disk on [`LogSink::flush`], which the layer calls after
/// every batch.
pub struct FileSink {
    path: PathBuf,
    writer: tokio::sync::Mutex<BufWriter<File>>,
}

impl FileSink {
    /// Open `path` for appending, creating it if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path).await?;
        Ok(FileSink {
            path,
            writer: tokio::sync::Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogSink for FileSink {
    async fn send(&self, line: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}

/// Keeps lines in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line received so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl LogSink for MemorySink {
    async fn send(&self, line: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.lines
            .lock()
            .map_err(|_| "memory sink lock poisoned")?
            .push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_clones_share_lines() {
        let sink = MemorySink::new();
        let other = sink.clone();
        other.send("{}\n").await.unwrap();
        assert_eq!(sink.lines(), vec!["{}\n".to_string()]);
    }

    #[tokio::test]
    async fn file_sink_appends() {
        let path = std::env::temp_dir().join(format!("json-log-layout-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let sink = FileSink::open(&path).await.unwrap();
        sink.send("{\"a\":\"1\"}\n").await.unwrap();
        sink.send("{\"a\":\"2\"}\n").await.unwrap();
        sink.flush().await.unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(contents, "{\"a\":\"1\"}\n{\"a\":\"2\"}\n");
        let _ = std::fs::remove_file(&path);
    }
}
