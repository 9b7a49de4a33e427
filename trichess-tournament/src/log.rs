//! Line-oriented game log
//!
//! Level 4 - Utilities and configuration

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Optional append-only sink for the human-readable game record.
///
/// Cloning shares the sink. A disabled log drops every line.
#[derive(Clone, Default)]
pub struct GameLog {
    sink: Option<Arc<Mutex<Box<dyn Write + Send>>>>,
}

impl GameLog {
    /// Log that writes nothing
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn stdout() -> Self {
        Self::to_writer(io::stdout())
    }

    pub fn to_writer(writer: impl Write + Send + 'static) -> Self {
        Self { sink: Some(Arc::new(Mutex::new(Box::new(writer)))) }
    }

    /// Log backed by an in-memory buffer that can be read back
    pub fn memory() -> (Self, LogBuffer) {
        let buffer = LogBuffer::default();
        (Self::to_writer(buffer.clone()), buffer)
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Append one line
    pub fn line(&self, text: impl AsRef<str>) {
        let Some(sink) = &self.sink else { return };
        let Ok(mut writer) = sink.lock() else { return };
        if let Err(err) = writeln!(writer, "{}", text.as_ref()).and_then(|_| writer.flush()) {
            tracing::debug!("game log write failed: {err}");
        }
    }
}

impl std::fmt::Debug for GameLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLog").field("enabled", &self.is_enabled()).finish()
    }
}

/// Shared byte buffer; clones see the same contents
#[derive(Clone, Default, Debug)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
