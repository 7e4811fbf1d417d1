//! Dev-mode logging configuration.
//!
//! Writes structured JSONL logs to a central file that can be tailed
//! by external tools. Multi-process safe via append-only semantics.

use crate::json_layer::JsonLayer;
use crate::LogConfig;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Writer installed by `init_dev_subscriber`, kept for explicit flushes.
static CENTRAL_WRITER: OnceLock<CentralLogWriter> = OnceLock::new();

/// Central log file location: `~/.tally/logs/dev.jsonl`.
fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".tally")
        .join("logs")
        .join("dev.jsonl")
}

/// Append-only file writer shared by every layer instance.
#[derive(Clone)]
pub struct CentralLogWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl CentralLogWriter {
    pub fn new(path: &PathBuf) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl io::Write for CentralLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Buffered; lines become visible on newline-terminated flush or `flush()`.
        let mut guard = self.inner.lock();
        let written = guard.write(buf)?;
        if buf.ends_with(b"\n") {
            guard.flush()?;
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

/// MakeWriter implementation for tracing-subscriber
#[derive(Clone)]
pub struct WriterFactory {
    writer: CentralLogWriter,
}

impl<'a> MakeWriter<'a> for WriterFactory {
    type Writer = CentralLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer.clone()
    }
}

/// Build the level filter from RUST_LOG or the configured default.
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Flush the central writer if one has been installed.
pub fn flush_central_writer() -> io::Result<()> {
    match CENTRAL_WRITER.get() {
        Some(writer) => writer.clone().flush(),
        None => Ok(()),
    }
}

/// Initialize the dev subscriber with central JSONL file output.
pub fn init_dev_subscriber(config: &LogConfig) {
    let log_path = config.log_path.clone().unwrap_or_else(default_log_path);

    let writer = CentralLogWriter::new(&log_path)
        .unwrap_or_else(|e| panic!("failed to open log file {:?}: {}", log_path, e));
    let _ = CENTRAL_WRITER.set(writer.clone());

    let writer_factory = WriterFactory { writer };

    let json_layer = JsonLayer::new(
        config.service_name.clone(),
        config.environment.clone(),
        config.mode,
        writer_factory,
    );

    let stderr_layer = if config.also_stderr {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(json_layer.with_filter(env_filter(&config.default_level)))
        .with(stderr_layer.map(|l| l.with_filter(env_filter(&config.default_level))))
        .init();

    tracing::info!(
        log_path = %log_path.display(),
        "observability initialized"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn test_central_log_writer_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("test.jsonl");

        let mut writer = CentralLogWriter::new(&path).unwrap();
        writer.write_all(b"test line\n").unwrap();

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "test line\n");
    }

    #[test]
    fn test_partial_line_visible_after_flush() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.jsonl");

        let mut writer = CentralLogWriter::new(&path).unwrap();
        writer.write_all(b"no newline yet").unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "no newline yet");
    }

    #[test]
    fn test_writer_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deeply").join("nested").join("test.jsonl");

        let writer = CentralLogWriter::new(&path);
        assert!(writer.is_ok());
        assert!(path.parent().unwrap().exists());
    }
}
